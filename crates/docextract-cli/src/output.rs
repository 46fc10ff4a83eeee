//! Output formatting for the CLI.

use crate::commands::tokens::TokenReport;
use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use docextract_domain::{DocumentId, ExtractionOutcome, OutputContract};
use docextract_gatekeeper::ContractStats;
use docextract_store::TrackerRecord;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Widest message shown in list tables
const MESSAGE_PREVIEW_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of processing one document.
    pub fn outcome(&self, id: Option<DocumentId>, outcome: &ExtractionOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = serde_json::to_value(outcome)?;
                if let (Some(id), Some(map)) = (id, value.as_object_mut()) {
                    map.insert("request_id".to_string(), json!(id.to_string()));
                }
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                if let Some(id) = id {
                    builder.push_record(["Request", &id.to_string()]);
                }
                builder.push_record(["Status", &self.status(outcome.status.as_str())]);
                builder.push_record(["Message", &outcome.message]);

                let mut out = self.key_value_table(builder);
                if let Some(data) = &outcome.data {
                    out.push('\n');
                    out.push_str(&serde_json::to_string_pretty(data)?);
                }
                Ok(out)
            }
        }
    }

    /// Format one tracked request.
    pub fn record(&self, record: &TrackerRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&record.to_json())?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Request", &record.id.to_string()]);
                builder.push_record(["Application", &record.application_id]);
                builder.push_record(["Status", &self.status(record.status.as_str())]);
                builder.push_record(["File", &file_name(&record.metadata)]);
                builder.push_record(["Message", record.message.as_deref().unwrap_or("-")]);
                builder.push_record(["Created", &record.created_at.to_string()]);
                builder.push_record(["Updated", &record.updated_at.to_string()]);

                let mut out = self.key_value_table(builder);
                if let Some(data) = &record.extracted_data {
                    out.push('\n');
                    out.push_str(&serde_json::to_string_pretty(data)?);
                }
                Ok(out)
            }
        }
    }

    /// Format a page of tracked requests.
    pub fn records(&self, records: &[TrackerRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<Value> = records.iter().map(TrackerRecord::to_json).collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No requests found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Status", "File", "Message", "Updated"]);
                for record in records {
                    builder.push_record([
                        record.id.to_string(),
                        self.status(record.status.as_str()),
                        file_name(&record.metadata),
                        preview(record.message.as_deref().unwrap_or("")),
                        record.updated_at.to_string(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a validated output contract.
    pub fn contract(&self, contract: &OutputContract, stats: &ContractStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "name": contract.name,
                "strict": contract.strict,
                "stats": {
                    "max_depth": stats.max_depth,
                    "properties": stats.properties,
                    "name_chars": stats.name_chars,
                },
                "schema": contract.schema,
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Contract", &contract.name]);
                builder.push_record(["Strict", &contract.strict.to_string()]);
                builder.push_record(["Nesting depth", &stats.max_depth.to_string()]);
                builder.push_record(["Properties", &stats.properties.to_string()]);
                builder.push_record(["Name characters", &stats.name_chars.to_string()]);

                let mut out = self.success("Schema is a strict output contract");
                out.push('\n');
                out.push_str(&self.key_value_table(builder));
                out.push('\n');
                out.push_str(&serde_json::to_string_pretty(&contract.schema)?);
                Ok(out)
            }
        }
    }

    /// Format a token report.
    pub fn tokens(&self, report: &TokenReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["File", &report.file]);
                builder.push_record(["Characters", &report.characters.to_string()]);
                builder.push_record(["Tokens", &report.tokens.to_string()]);
                builder.push_record(["Vocabulary", &report.vocabulary]);
                builder.push_record([
                    "Chunks".to_string(),
                    format!(
                        "{} (max {} tokens, overlap {})",
                        report.chunks, report.max_tokens, report.token_overlap
                    ),
                ]);
                Ok(self.key_value_table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn key_value_table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }

    fn status(&self, status: &str) -> String {
        let color = match status {
            "success" => "green",
            "failed" => "red",
            "inprogress" => "cyan",
            _ => "yellow",
        };
        self.colorize(status, color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn file_name(metadata: &Value) -> String {
    metadata
        .get("original_filename")
        .and_then(Value::as_str)
        .unwrap_or("-")
        .to_string()
}

fn preview(message: &str) -> String {
    if message.chars().count() <= MESSAGE_PREVIEW_CHARS {
        return message.to_string();
    }
    let mut short: String = message.chars().take(MESSAGE_PREVIEW_CHARS - 1).collect();
    short.push('…');
    short
}
