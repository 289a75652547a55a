//! Plain-text rendering of results and state.

use querydesk_core::models::{ContextLoadResult, ContextStatus, Stats, SystemHealth};
use querydesk_core::state::SchemaState;
use querydesk_core::{ApplicationState, ConnectionInfo, HistoryEntry, QueryResult};
use serde_json::Value;

/// Longest cell rendered before truncation.
const MAX_CELL_WIDTH: usize = 40;

/// Characters of a question shown in the history list.
const HISTORY_PREVIEW_CHARS: usize = 60;

/// Query result as SQL, an aligned table, and a summary line.
pub fn result(result: &QueryResult) -> String {
    let mut out = format!("SQL: {}\n", result.sql);

    if result.is_empty() {
        out.push_str(&format!("(0 rows, {:.3}s)", result.execution_time_seconds));
        return out;
    }

    let columns = result.column_names();
    let cells: Vec<Vec<String>> = result
        .results
        .iter()
        .map(|row| columns.iter().map(|col| cell(row.get(*col).unwrap_or(&Value::Null))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells.iter().map(|row| row[i].chars().count()).chain([col.chars().count()]).max().unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns.iter().map(|col| col.to_string()).collect();
    out.push_str(&table_row(&header, &widths));
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    out.push('\n');
    for row in &cells {
        out.push_str(&table_row(row, &widths));
        out.push('\n');
    }

    let noun = if result.row_count() == 1 { "row" } else { "rows" };
    out.push_str(&format!("({} {noun}, {:.3}s)", result.row_count(), result.execution_time_seconds));
    out
}

fn table_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_WIDTH {
        let truncated: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{truncated}…")
    } else {
        text
    }
}

/// Connection banner.
pub fn connected(info: &ConnectionInfo, state: &ApplicationState) -> String {
    let mut out = match info.message() {
        Some(message) => format!("{message} (session {})", info.session_id),
        None => format!("Connected (session {})", info.session_id),
    };
    match &state.schema.error {
        Some(error) => out.push_str(&format!("\nSchema unavailable: {error}")),
        None => out.push_str(&format!("\n{} tables", state.schema.tables.len())),
    }
    out
}

/// Table list with columns.
pub fn schema(schema: &SchemaState) -> String {
    if let Some(error) = &schema.error {
        return format!("Schema unavailable: {error}");
    }
    if schema.tables.is_empty() {
        return "No tables".to_string();
    }

    let mut lines = Vec::new();
    for table in &schema.tables {
        lines.push(table.name.clone());
        for column in &table.columns {
            let mut line = format!("  {} {}", column.name, column.data_type);
            if column.primary_key {
                line.push_str(" PK");
            }
            if let Some(target) = &column.foreign_key {
                line.push_str(&format!(" -> {target}"));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}

pub fn context_status(status: &ContextStatus) -> String {
    let state = if status.loaded { "loaded" } else { "not loaded" };
    if status.message.is_empty() {
        format!("Context {state}")
    } else {
        format!("Context {state}: {}", status.message)
    }
}

pub fn context_load(result: &ContextLoadResult) -> String {
    let mut out = result.message.clone();
    if let Some(count) = result.tables_count {
        out.push_str(&format!(" ({count} tables)"));
    }
    for sample in result.sample_results.iter().flatten() {
        match &sample.error {
            Some(error) => out.push_str(&format!("\n  {}: {error}", sample.table)),
            None => out.push_str(&format!("\n  {}: {} sample rows", sample.table, sample.results.len())),
        }
    }
    out
}

/// Backend statistics block.
pub fn stats(stats: &Stats) -> String {
    let health = match stats.health() {
        SystemHealth::Healthy => "healthy",
        SystemHealth::Busy => "busy",
    };
    format!(
        "Backend {health}\n  active sessions {}\n  total queries {}\n  queued {}, processing {}\n  completed {}, failed {}\n  queue size {}",
        stats.active_sessions,
        stats.total_queries,
        stats.queued,
        stats.processing,
        stats.completed,
        stats.failed,
        stats.queue_size,
    )
}

/// One-line progress shown while a question is running.
pub fn progress_line(stats: &Stats) -> String {
    format!("queued {}, processing {}, queue size {}", stats.queued, stats.processing, stats.queue_size)
}

/// Numbered history list, newest first.
pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No questions yet".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!("{:>2}. [{}] {}", i + 1, entry.timestamp.format("%H:%M:%S"), entry.preview(HISTORY_PREVIEW_CHARS))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> querydesk_core::Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn renders_aligned_table_in_column_order() {
        let result = QueryResult {
            sql: "SELECT name, total FROM customers".into(),
            results: vec![
                row(&[("name", json!("Ada")), ("total", json!(1200))]),
                row(&[("name", json!("Grace Hopper")), ("total", Value::Null)]),
            ],
            execution_time_seconds: 0.25,
        };

        let text = super::result(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SQL: SELECT name, total FROM customers");
        assert_eq!(lines[1], "name         | total");
        assert_eq!(lines[2], "-------------+------");
        assert_eq!(lines[3], "Ada          | 1200");
        assert_eq!(lines[4], "Grace Hopper | NULL");
        assert_eq!(lines[5], "(2 rows, 0.250s)");
    }

    #[test]
    fn empty_result_has_summary_only() {
        let result =
            QueryResult { sql: "SELECT 1 WHERE false".into(), results: vec![], execution_time_seconds: 0.0 };
        assert_eq!(super::result(&result), "SQL: SELECT 1 WHERE false\n(0 rows, 0.000s)");
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "x".repeat(100);
        let rendered = cell(&json!(long));
        assert_eq!(rendered.chars().count(), MAX_CELL_WIDTH);
        assert!(rendered.ends_with('…'));
    }

    #[test]
    fn stats_report_health() {
        let busy = Stats { processing: 5, ..Stats::default() };
        assert!(stats(&busy).starts_with("Backend busy"));
        assert!(stats(&Stats::default()).starts_with("Backend healthy"));
    }
}
