use anyhow::Context;
use iap_core::Verifier;

use crate::cli::args::{CredentialArgs, VerifyArgs};
use crate::exit_codes;

pub async fn cmd_verify(credentials: &CredentialArgs, args: VerifyArgs) -> anyhow::Result<i32> {
    let config = credentials.to_config()?;
    let verifier = Verifier::new(config).context("invalid verifier configuration")?;

    let request = args.to_request();
    tracing::debug!(platform = ?request.platform, "verifying purchase");
    let result = verifier.verify(&request).await;
    let code = if result.is_success {
        exit_codes::SUCCESS
    } else {
        exit_codes::VERIFY_FAILED
    };

    let output = match args.emit_event {
        Some(user_id) if result.is_success => {
            let event = result.into_event(user_id);
            serde_json::to_string_pretty(&event)?
        }
        _ => serde_json::to_string_pretty(&result)?,
    };
    println!("{}", output);

    Ok(code)
}
