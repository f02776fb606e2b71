mod cli;
mod commands;
mod config;
mod error;
mod notice;
mod output;
mod prompt;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wgdash_core::{Dashboard, SessionHooks};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::notice::TerminalNotifier;
use crate::prompt::TerminalPrompt;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a server
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wgdash", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let mut dashboard = build_dashboard(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &mut dashboard, &cli.global).await
        }
    }
}

/// Load config, apply flag overrides and wire the session to the terminal.
fn build_dashboard(global: &cli::GlobalOpts) -> Result<Dashboard, CliError> {
    let cfg = config::load_config()?;
    let resolved = config::resolve(global, &cfg)?;
    tracing::debug!(profile = %resolved.name, url = %resolved.session.url, "resolved profile");

    let hooks = SessionHooks {
        tokens: resolved.tokens,
        prompt: Arc::new(TerminalPrompt),
        notifier: Arc::new(TerminalNotifier::new(
            output::should_color(&global.color),
            global.quiet,
        )),
    };
    Ok(Dashboard::new(&resolved.session, hooks)?)
}
