use anyhow::Context;
use iap_core::{Platform, Verifier};

use crate::cli::args::CredentialArgs;
use crate::exit_codes;

pub fn cmd_check(credentials: &CredentialArgs) -> anyhow::Result<i32> {
    let config = credentials.to_config()?;
    let verifier = Verifier::new(config).context("invalid verifier configuration")?;

    println!("environment: {}", verifier.config().environment);
    for platform in [Platform::Google, Platform::Apple] {
        let state = if verifier.supports(platform) {
            "ready"
        } else {
            "not configured"
        };
        println!("{}: {}", platform, state);
    }

    Ok(exit_codes::SUCCESS)
}
