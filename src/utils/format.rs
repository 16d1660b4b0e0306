//! Table formatting and output utilities
//!
//! Shared helpers for rendering command output as styled tables, JSON, or
//! key/value listings with optional color.

use crate::error::Result;
use crossterm::style::{Color as CrosstermColor, Stylize};
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Padding, Style},
    Table, Tabled,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Table formatter with color support
pub struct TableFormatter {
    format: OutputFormat,
    no_color: bool,
}

impl TableFormatter {
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        Self { format, no_color }
    }

    /// Create a formatted table from data
    pub fn format_table<T: Tabled + Serialize>(&self, data: &[T]) -> Result<String> {
        if data.is_empty() {
            return Ok("No data to display".to_string());
        }

        match self.format {
            OutputFormat::Table => Ok(self.format_as_table(data)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        }
    }

    fn format_as_table<T: Tabled>(&self, data: &[T]) -> String {
        let mut table = Table::new(data);

        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Padding::new(1, 1, 0, 0));

        if !self.no_color {
            table.with(Modify::new(Rows::first()).with(Color::FG_BLUE));
        }

        table.to_string()
    }
}

/// Console output helpers for non-tabular messages
pub struct DisplayUtils {
    no_color: bool,
}

impl DisplayUtils {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    pub fn format_key_value_pairs<S: AsRef<str>>(&self, pairs: &[(&str, S)]) -> String {
        let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        pairs
            .iter()
            .map(|(key, value)| {
                let value = value.as_ref();
                if self.no_color {
                    format!("{key:width$}  {value}")
                } else {
                    format!("{}  {value}", format!("{key:width$}").with(CrosstermColor::Cyan))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print_success(&self, message: &str) {
        if self.no_color {
            println!("✓ {message}");
        } else {
            println!("✓ {}", message.with(CrosstermColor::Green));
        }
    }

    pub fn print_warning(&self, message: &str) {
        if self.no_color {
            eprintln!("! {message}");
        } else {
            eprintln!("! {}", message.with(CrosstermColor::Yellow));
        }
    }
}
