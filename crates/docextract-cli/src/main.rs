//! docextract CLI - Schema-driven structured data extraction from documents.

use clap::Parser;
use docextract_cli::commands;
use docextract_cli::config::OutputFormat;
use docextract_cli::{Cli, Command, Config, Formatter};
use docextract_store::SqliteTracker;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color && format == OutputFormat::Table;
    let formatter = Formatter::new(format, color_enabled);

    match run(cli.command, &config, &formatter).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            ExitCode::from(1)
        }
    }
}

/// Exit codes: 0 success, 1 startup or command error, 2 document failed
async fn run(command: Command, config: &Config, formatter: &Formatter) -> docextract_cli::Result<ExitCode> {
    match command {
        Command::CheckSchema(args) => {
            commands::execute_check_schema(args, config, formatter)?;
        }
        Command::Extract(args) => {
            let outcome = commands::execute_extract(args, config, formatter).await?;
            if !outcome.is_success() {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Tokens(args) => {
            commands::execute_tokens(args, config, formatter).await?;
        }
        Command::Status(args) => {
            let tracker = SqliteTracker::new(config.store.resolved_path()?)?;
            commands::execute_status(args, &tracker, formatter)?;
        }
        Command::History(args) => {
            let tracker = SqliteTracker::new(config.store.resolved_path()?)?;
            commands::execute_history(args, &config.store.application_id, &tracker, formatter)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
