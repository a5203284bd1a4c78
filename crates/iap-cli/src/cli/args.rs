use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use iap_core::{
    AppleConfig, Endpoints, Environment, GoogleConfig, ServiceAccountKey, VerificationRequest,
    VerifierConfig,
};

#[derive(Parser)]
#[command(
    name = "iap",
    version,
    about = "Verify in-app purchases against Google Play and the App Store"
)]
pub struct Cli {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Verify one purchase and print the result envelope
    Verify(VerifyArgs),
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCmd),
    /// Mint vendor API tokens (debugging)
    #[command(subcommand)]
    Token(TokenCmd),
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Validate credentials and report which platforms are ready
    Check,
}

#[derive(Subcommand)]
pub enum TokenCmd {
    /// Print a fresh App Store Server API token
    Apple,
}

/// Vendor credentials, from flags or `IAP_*` environment variables.
#[derive(Args, Clone, Debug)]
pub struct CredentialArgs {
    /// sandbox or production
    #[arg(long, global = true, env = "IAP_ENVIRONMENT", default_value = "sandbox")]
    pub environment: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "IAP_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Path to the Google service-account JSON key
    #[arg(long, global = true, env = "IAP_GOOGLE_SERVICE_ACCOUNT")]
    pub google_service_account: Option<PathBuf>,

    #[arg(long, global = true, env = "IAP_APPLE_ISSUER_ID")]
    pub apple_issuer_id: Option<String>,

    #[arg(long, global = true, env = "IAP_APPLE_KEY_ID")]
    pub apple_key_id: Option<String>,

    #[arg(long, global = true, env = "IAP_APPLE_BUNDLE_ID")]
    pub apple_bundle_id: Option<String>,

    /// Path to the App Store Connect `.p8` private key
    #[arg(long, global = true, env = "IAP_APPLE_PRIVATE_KEY")]
    pub apple_private_key: Option<PathBuf>,

    #[arg(long, global = true, env = "IAP_APPLE_SHARED_SECRET", hide_env_values = true)]
    pub apple_shared_secret: Option<String>,

    #[arg(long, global = true, hide = true, env = "IAP_GOOGLE_API_URL")]
    pub google_api_url: Option<String>,

    #[arg(long, global = true, hide = true, env = "IAP_GOOGLE_TOKEN_URL")]
    pub google_token_url: Option<String>,

    #[arg(long, global = true, hide = true, env = "IAP_APPLE_API_URL")]
    pub apple_api_url: Option<String>,
}

impl CredentialArgs {
    pub fn to_config(&self) -> anyhow::Result<VerifierConfig> {
        let environment: Environment = self.environment.parse()?;

        let mut config = VerifierConfig::default()
            .with_environment(environment)
            .with_timeout(self.timeout)
            .with_endpoints(Endpoints {
                google_api_url: self.google_api_url.clone(),
                google_token_url: self.google_token_url.clone(),
                apple_api_url: self.apple_api_url.clone(),
            });

        if let Some(path) = &self.google_service_account {
            let account = ServiceAccountKey::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config = config.with_google(GoogleConfig::new(account));
        }

        if let Some(issuer_id) = &self.apple_issuer_id {
            let mut apple = AppleConfig::new(
                issuer_id.clone(),
                self.apple_key_id.clone().unwrap_or_default(),
                self.apple_bundle_id.clone().unwrap_or_default(),
                String::new(),
            );
            if let Some(path) = &self.apple_private_key {
                apple = apple.load_private_key(path)?;
            }
            if let Some(secret) = &self.apple_shared_secret {
                apple = apple.with_shared_secret(secret.clone());
            }
            config = config.with_apple(apple);
        }

        Ok(config)
    }
}

#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    /// google, apple (legacy: android, ios). Inferred when omitted.
    #[arg(long)]
    pub platform: Option<String>,

    #[arg(long)]
    pub package_name: Option<String>,

    #[arg(long)]
    pub product_id: Option<String>,

    #[arg(long)]
    pub purchase_token: Option<String>,

    #[arg(long)]
    pub transaction_id: Option<String>,

    /// Print the downstream `verify_purchase` event for this user instead of
    /// the envelope (successful verifications only)
    #[arg(long, value_name = "USER_ID")]
    pub emit_event: Option<String>,
}

impl VerifyArgs {
    pub fn to_request(&self) -> VerificationRequest {
        VerificationRequest {
            platform: self.platform.clone(),
            package_name: self.package_name.clone(),
            product_id: self.product_id.clone(),
            purchase_token: self.purchase_token.clone(),
            transaction_id: self.transaction_id.clone(),
        }
    }
}
