//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docextract - Schema-driven structured data extraction from documents.
#[derive(Debug, Parser)]
#[command(name = "docextract")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DOCEXTRACT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile and validate the schema, then print its output contract
    CheckSchema(CheckSchemaArgs),

    /// Extract structured data from a document
    Extract(ExtractArgs),

    /// Show one tracked request
    Status(StatusArgs),

    /// List tracked requests, newest first
    History(HistoryArgs),

    /// Report character, token and chunk counts for a document
    Tokens(TokensArgs),
}

/// Arguments for the check-schema command.
#[derive(Debug, Parser)]
pub struct CheckSchemaArgs {
    /// Schema file (overrides the configured path)
    #[arg(short, long)]
    pub schema: Option<String>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document to process (.pdf, .docx, .txt)
    pub file: PathBuf,

    /// Application the request is tracked under (overrides the configured id)
    #[arg(short, long)]
    pub application_id: Option<String>,

    /// Process without writing a tracker row
    #[arg(long)]
    pub no_track: bool,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Request ID returned by extract
    pub id: String,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Number of results to skip
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Application to list (overrides the configured id)
    #[arg(short, long)]
    pub application_id: Option<String>,
}

/// Arguments for the tokens command.
#[derive(Debug, Parser)]
pub struct TokensArgs {
    /// Document to measure
    pub file: PathBuf,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
