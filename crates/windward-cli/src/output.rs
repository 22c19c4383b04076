//! Output rendering for command results.
//!
//! Every command produces one `serde_json::Value`; this module turns it
//! into JSON (compact or pretty) or an ASCII table.

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(value: &Value, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let body = if pretty {
                serde_json::to_string_pretty(value)?
            } else {
                serde_json::to_string(value)?
            };
            println!("{body}");
        }
        OutputFormat::Table => {
            println!("{}", render_table(value));
        }
    }
    Ok(())
}

/// Render a value as an ASCII table.
///
/// Arrays of objects become column tables; plain objects become
/// key/value rows; anything else is printed as JSON.
fn render_table(value: &Value) -> String {
    match value {
        Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
            let mut columns: Vec<String> = Vec::new();
            for row in rows {
                if let Some(map) = row.as_object() {
                    for key in map.keys() {
                        if !columns.contains(key) {
                            columns.push(key.clone());
                        }
                    }
                }
            }
            let body: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| cell(row.get(column).unwrap_or(&Value::Null)))
                        .collect()
                })
                .collect();
            grid(&columns, &body)
        }
        Value::Object(map) => {
            let columns = vec!["field".to_owned(), "value".to_owned()];
            let body: Vec<Vec<String>> = map
                .iter()
                .map(|(key, value)| vec![key.clone(), cell(value)])
                .collect();
            grid(&columns, &body)
        }
        other => cell(other),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn grid(columns: &[String], body: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(String::len).collect();
    for row in body {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.len());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut out = vec![line(columns)];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in body {
        out.push(line(row));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_objects_renders_column_table() {
        let value = json!([
            {"symbol": "台積電", "value": 150.0},
            {"symbol": "聯發科", "value": 50.0},
        ]);
        let table = render_table(&value);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("symbol"));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("150"));
    }

    #[test]
    fn plain_object_renders_key_value_rows() {
        let value = json!({"label": "強風", "length": 3});
        let table = render_table(&value);
        assert!(table.contains("label"));
        assert!(table.contains("強風"));
    }

    #[test]
    fn null_cells_render_as_dash() {
        let value = json!([{"a": 1, "b": null}]);
        let table = render_table(&value);
        assert!(table.lines().last().expect("row").contains('-'));
    }
}
