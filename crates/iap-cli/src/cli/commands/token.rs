use anyhow::Context;
use iap_core::AppleTokenSigner;

use crate::cli::args::CredentialArgs;
use crate::exit_codes;

pub fn cmd_apple(credentials: &CredentialArgs) -> anyhow::Result<i32> {
    let config = credentials.to_config()?;
    config.validate().context("invalid verifier configuration")?;

    let apple = config
        .apple
        .as_ref()
        .context("Apple credentials not configured (set --apple-issuer-id and friends)")?;
    let token = AppleTokenSigner::new(apple)?.sign()?;

    println!("{}", token);
    Ok(exit_codes::SUCCESS)
}
