//! Command implementations. Each returns a process exit code.

mod config;
mod token;
mod verify;

use crate::cli::args::{Cli, Command, ConfigCmd, TokenCmd};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Verify(args) => verify::cmd_verify(&cli.credentials, args).await,
        Command::Config(ConfigCmd::Check) => config::cmd_check(&cli.credentials),
        Command::Token(TokenCmd::Apple) => token::cmd_apple(&cli.credentials),
    }
}
