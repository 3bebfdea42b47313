// crates/furrow-cli/src/output.rs
//
// Output formatting utilities for the Furrow CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print rows in the requested format, with a heading in table mode.
pub fn print_rows<T: Tabled + Serialize>(title: &str, rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{}", title);
            if rows.is_empty() {
                println!("  (none)");
            } else {
                println!("{}", format_table(rows));
            }
            println!();
        }
        OutputFormat::Json => println!("{}", format_json(rows)),
    }
}
