mod cli;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use roster_config::Config;
use roster_core::{AppConfig, Context};

use crate::cli::{Cli, Command, GlobalOpts, OutputFormat};
use crate::commands::places::TagCollector;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
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

async fn run(mut cli: Cli) -> Result<(), CliError> {
    // Shell completions need neither config nor network
    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "roster", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = roster_config::load_config()?;
    if cli.global.output.is_none() {
        cli.global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
    }

    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(&args, &cfg, &cli.global),

        cmd => {
            let app = build_app_config(&cli.global, &cfg)?;
            let ctx = Context::new(app, TagCollector::default())?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global).await
        }
    }
}

/// Build an `AppConfig` from the config file plus CLI overrides.
fn build_app_config(global: &GlobalOpts, cfg: &Config) -> Result<AppConfig, CliError> {
    let mut app = roster_config::to_app_config(cfg)?;

    if let Some(ref url_str) = global.url {
        app.store.url = url_str.parse().map_err(|_| CliError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
    }
    if let Some(secs) = global.timeout {
        app.store.timeout = Duration::from_secs(secs);
    }

    Ok(app)
}
