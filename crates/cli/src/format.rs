//! Output formatting for human and JSON modes.

use masterdata::{MasterKey, MasterValue, ReconcileReport};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Result of one command, before formatting.
pub enum Output {
    Keys(Vec<MasterKey>),
    Values(Vec<MasterValue>),
    Value(Option<MasterValue>),
    Written(bool),
    /// Update target does not exist; nothing to do
    NotFound,
    Report(ReconcileReport),
}

pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Human => format_human(output),
    }
}

pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({ "error": format!("{:#}", err) }).to_string(),
        OutputMode::Human => format!("(error) {:#}", err),
    }
}

fn format_json(output: &Output) -> String {
    let value = match output {
        Output::Keys(keys) => json!(keys),
        Output::Values(values) => json!(values),
        Output::Value(value) => json!(value),
        Output::Written(ok) => json!({ "ok": ok }),
        Output::NotFound => json!({ "ok": true, "found": false }),
        Output::Report(report) => json!(report),
    };
    value.to_string()
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Keys(keys) if keys.is_empty() => "(empty)".to_string(),
        Output::Keys(keys) => keys
            .iter()
            .map(|k| row_line(&k.group, k.row_id.as_str(), &k.name, k.is_active, k.is_deleted))
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Values(values) if values.is_empty() => "(empty)".to_string(),
        Output::Values(values) => values
            .iter()
            .map(|v| row_line(&v.group, v.row_id.as_str(), &v.name, v.is_active, v.is_deleted))
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Value(None) => "(nil)".to_string(),
        Output::Value(Some(v)) => {
            row_line(&v.group, v.row_id.as_str(), &v.name, v.is_active, v.is_deleted)
        }
        Output::Written(true) => "OK".to_string(),
        Output::Written(false) => "(not written, see log)".to_string(),
        Output::NotFound => "(no such row)".to_string(),
        Output::Report(r) => format!(
            "{} rows: {} key-groups created, {} values inserted, {} updated ({} written, {} attempt(s))",
            r.candidates, r.keys_created, r.values_inserted, r.values_updated, r.rows_written, r.attempts
        ),
    }
}

fn row_line(group: &str, row_id: &str, name: &str, active: bool, deleted: bool) -> String {
    let mut flags = Vec::new();
    if active {
        flags.push("active");
    }
    if deleted {
        flags.push("deleted");
    }
    format!("{}\t{}\t{}\t{}", group, row_id, name, flags.join(","))
}
