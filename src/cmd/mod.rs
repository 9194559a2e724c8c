//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`ping`].

pub mod ping;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::ProxyError;

pub async fn dispatch(cli: Cli) -> Result<(), ProxyError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Ping(args)) => ping::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  passthru v{version} \u{2014} transparent HTTP reverse proxy\n\n  \
         No command provided. To get started:\n\n    \
         passthru run                         Proxy :3003 to the default upstream\n    \
         passthru run -u <URL> -p <PORT>      Proxy a specific upstream\n    \
         passthru validate passthru.yaml      Check a config file\n    \
         passthru --help                      See all commands and options\n"
    );
}
