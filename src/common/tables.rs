//! ASCII table formatting for the text reports
//!
//! Fixed-shape rows derive [`Tabled`]; tables whose columns depend on the data (one column per
//! algorithm) are assembled with [`Builder`].

use tabled::builder::Builder;
use tabled::{Table, Tabled};

/// Formats rows as an ASCII table with an underlined title
///
/// # Arguments
/// * `rows` - Rows to format
/// * `title` - Title printed above the table
///
/// # Returns
/// A formatted ASCII table as a [`String`]
pub fn format_table<T: Tabled>(rows: &[T], title: &str) -> String {
    if rows.is_empty() {
        return with_title(title, "No data available".to_string());
    }

    with_title(title, Table::new(rows).to_string())
}

/// Formats a table from a header and string rows
pub fn format_grid(header: Vec<String>, rows: Vec<Vec<String>>, title: &str) -> String {
    if rows.is_empty() {
        return with_title(title, "No data available".to_string());
    }

    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }

    with_title(title, builder.build().to_string())
}

/// Formats an optional value with the given number of decimals, leaving missing values blank
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

fn with_title(title: &str, body: String) -> String {
    format!("{}\n{}\n{}", title, "=".repeat(title.len()), body)
}
