//! Shared record-field extraction for source adapters.
//!
//! Every adapter expresses its field-name fallback chains as explicit
//! tables over these helpers, so the normalization contract of each source
//! is auditable in one place instead of scattered through conditionals.

use crate::types::{FileDiff, FileOperation, ToolRun};
use serde_json::Value;

/// Resolve a dotted path (`"message.role"`, `"choices.0.text"`) inside a
/// JSON value. Numeric segments index into arrays.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => current.get(key),
    })
}

/// First field in `fields` holding a string value.
pub fn first_string(record: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|f| lookup(record, f).and_then(Value::as_str).map(str::to_string))
}

/// First field in `fields` holding any non-null value.
pub fn first_value<'a>(record: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .find_map(|f| lookup(record, f).filter(|v| !v.is_null()))
}

/// Render a value as plain text: strings pass through, everything else
/// serializes compactly.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pretty-printed JSON, the fallback rendering for unknown structures.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Flatten a structured `message` payload to a single string.
///
/// A string body passes through unchanged. An array body renders each
/// element by type — `text` literally, `tool_use` as
/// `[Tool: name] <pretty input>`, `tool_result` as `[Tool Result] <content>`,
/// anything else as pretty JSON — joined with newlines. Other shapes fall
/// back to pretty-printing the whole message.
pub fn render_message(message: &Value) -> String {
    match message.get("content") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .map(render_block)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => pretty(message),
    }
}

fn render_block(block: &Value) -> String {
    match block.get("type").and_then(Value::as_str) {
        Some("text") => block
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some("tool_use") => {
            let name = block.get("name").and_then(Value::as_str).unwrap_or("unknown");
            let input = block.get("input").map(pretty).unwrap_or_default();
            format!("[Tool: {}] {}", name, input)
        }
        Some("tool_result") => {
            let content = block.get("content").map(value_to_string).unwrap_or_default();
            format!("[Tool Result] {}", content)
        }
        _ => pretty(block),
    }
}

/// Field-name fallback chains for a source's tool-run records.
pub struct ToolRunFields {
    pub list: &'static [&'static str],
    pub tool: &'static [&'static str],
    pub command: &'static [&'static str],
    pub input: &'static [&'static str],
    pub output: &'static [&'static str],
    pub error: &'static [&'static str],
    pub exit_code: &'static [&'static str],
}

/// Parse a record's tool runs through a source's field table.
pub fn parse_tool_runs(record: &Value, fields: &ToolRunFields) -> Vec<ToolRun> {
    let Some(list) = first_value(record, fields.list).and_then(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .map(|run| ToolRun {
            tool: first_string(run, fields.tool),
            command: first_string(run, fields.command),
            input: first_value(run, fields.input).map(value_to_string),
            output: first_value(run, fields.output).map(value_to_string),
            error: first_string(run, fields.error),
            exit_code: first_value(run, fields.exit_code)
                .and_then(Value::as_i64)
                .map(|code| code as i32),
        })
        .collect()
}

/// Field-name fallback chains for a source's file-diff records.
pub struct FileDiffFields {
    pub list: &'static [&'static str],
    pub file: &'static [&'static str],
    pub operation: &'static [&'static str],
    pub before: &'static [&'static str],
    pub after: &'static [&'static str],
    pub content: &'static [&'static str],
}

/// Parse a record's file diffs through a source's field table.
///
/// Entries without a usable file path are dropped.
pub fn parse_file_diffs(record: &Value, fields: &FileDiffFields) -> Vec<FileDiff> {
    let Some(list) = first_value(record, fields.list).and_then(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|diff| {
            let file = first_string(diff, fields.file)?;
            Some(FileDiff {
                file,
                operation: FileOperation::from_raw(
                    first_string(diff, fields.operation).as_deref().unwrap_or(""),
                ),
                before: first_string(diff, fields.before),
                after: first_string(diff, fields.after),
                content: first_string(diff, fields.content),
            })
        })
        .collect()
}
