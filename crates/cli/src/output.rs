//! Terminal rendering for the CLI
//!
//! Commands that print structured data go through these helpers so that
//! `--format` behaves identically everywhere.

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Bordered table for terminals
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML document
    Yaml,
    /// Header/value lines for shell pipelines
    Plain,
}

/// Rows that can lay themselves out in a table
pub trait Tabular {
    fn columns() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

/// Render a listing in the requested format
pub fn print_rows<T: Serialize + Tabular>(rows: &[T], format: OutputFormat) {
    if rows.is_empty() {
        println!("Nothing to show.");
        return;
    }

    match format {
        OutputFormat::Table => println!("{}", render_table(rows)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows).unwrap_or_default())
        }
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(rows).unwrap_or_default()),
        OutputFormat::Plain => {
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                for (column, cell) in T::columns().into_iter().zip(row.cells()) {
                    println!("{}: {}", column, cell);
                }
            }
        }
    }
}

fn render_table<T: Tabular>(rows: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(T::columns());
    for row in rows {
        table.add_row(row.cells());
    }
    table
}

/// Print one value, wrapped in an envelope when JSON output is selected
pub fn print_message(message: &str, format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{}", message);
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}
