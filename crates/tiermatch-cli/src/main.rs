//! Tiermatch CLI - rank co-founders and ideas, then compare with the cohort.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tiermatch_cli::commands;
use tiermatch_cli::repl;
use tiermatch_cli::{App, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load or create config
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let config = Config::load_or_create(config_path.as_deref()).context("Failed to load configuration")?;

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    let mut app = App::open(config, cli.user).await.context("Failed to open tiermatch")?;
    if app.status().is_fallback() {
        eprintln!("{}", formatter.matrix_status(app.status()));
    }

    // Handle commands
    let outcome = match cli.command {
        None | Some(Command::Repl) => repl::run_repl(&mut app, &formatter).await,
        Some(cmd) => commands::execute(cmd, &mut app, &formatter).await,
    };

    // Pending edits are written even when the command failed
    app.close().await;
    outcome?;

    Ok(())
}
