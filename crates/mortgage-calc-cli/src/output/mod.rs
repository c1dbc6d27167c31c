pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Result fields holding per-period rows rather than a single value.
pub const ROW_FIELDS: [&str; 2] = ["schedule", "yearly"];

/// The first row array carried by a result object, with its field name.
pub fn row_array(result: &serde_json::Map<String, Value>) -> Option<(&'static str, &Vec<Value>)> {
    ROW_FIELDS.iter().find_map(|name| match result.get(*name) {
        Some(Value::Array(rows)) => Some((*name, rows)),
        _ => None,
    })
}
