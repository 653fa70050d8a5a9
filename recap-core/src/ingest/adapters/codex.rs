//! OpenAI Codex CLI log adapter
//!
//! Normalizes session logs from `~/.codex/sessions/**/*.jsonl` and
//! `~/.codex/history/**/*.jsonl`, plus Codex-extension JSONL found in the
//! VS Code globalStorage directory.
//!
//! # Error Handling
//!
//! Same contract as the Claude adapter: records without a parseable
//! timestamp are rejected, everything else degrades to defaults, and a
//! missing `~/.codex` yields zero events.

use crate::ingest::adapter::{CollectResult, SourceAdapter, SourcePattern, TimeWindow};
use crate::ingest::content::{
    first_string, first_value, parse_file_diffs, parse_tool_runs, pretty, render_message,
    FileDiffFields, ToolRunFields,
};
use crate::ingest::fs;
use crate::time;
use crate::types::{EventRole, SessionEvent};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

// Field-name fallback chains for Codex records, in lookup order.
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "ts", "time", "created_at"];
const ROLE_FIELDS: &[&str] = &["role", "type"];
const ID_FIELDS: &[&str] = &["id", "message_id"];
const CONTENT_FALLBACK_FIELDS: &[&str] = &["prompt", "text", "query", "response", "choices.0.text"];

const TOOL_RUN_FIELDS: ToolRunFields = ToolRunFields {
    list: &["tools", "tool_calls"],
    tool: &["type", "function.name"],
    command: &["command", "name"],
    input: &["input", "parameters", "arguments"],
    output: &["output", "result", "response"],
    error: &["error", "stderr"],
    exit_code: &["exit_code", "status"],
};

const FILE_DIFF_FIELDS: FileDiffFields = FileDiffFields {
    list: &["file_changes", "diffs"],
    file: &["file", "filename", "path"],
    operation: &["operation", "action", "type"],
    before: &["before", "old_content"],
    after: &["after", "new_content"],
    content: &["content", "new_content"],
};

/// Path segments that never name a project.
const NON_PROJECT_SEGMENTS: &[&str] = &["sessions", "history", ".codex"];

/// JSONL patterns for Codex-related VS Code extensions.
const VSCODE_PATTERNS: &[&str] = &[
    "**/openai*codex*/**/*.jsonl",
    "**/openai*chatgpt*/**/*.jsonl",
    "**/codex*/**/*.jsonl",
];

/// Adapter for OpenAI Codex CLI logs.
pub struct CodexAdapter {
    root: Option<PathBuf>,
    /// VS Code globalStorage base; `None` disables the extension scan.
    vscode_storage: Option<PathBuf>,
}

impl CodexAdapter {
    /// Adapter with the default root (~/.codex) and the platform's VS Code
    /// globalStorage directory.
    pub fn new() -> Self {
        Self {
            root: dirs::home_dir().map(|h| h.join(".codex")),
            vscode_storage: vscode_global_storage(),
        }
    }

    /// Adapter rooted at a custom directory (for testing).
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root: Some(root),
            vscode_storage: None,
        }
    }

    /// Override the VS Code globalStorage base (for testing).
    pub fn with_vscode_storage(mut self, base: PathBuf) -> Self {
        self.vscode_storage = Some(base);
        self
    }
}

impl Default for CodexAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn vscode_global_storage() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let path = if cfg!(target_os = "macos") {
        home.join("Library/Application Support/Code/User/globalStorage")
    } else if cfg!(target_os = "windows") {
        home.join("AppData/Roaming/Code/User/globalStorage")
    } else {
        home.join(".config/Code/User/globalStorage")
    };
    Some(path)
}

impl SourceAdapter for CodexAdapter {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn description(&self) -> &'static str {
        "Codex CLI session and history logs (~/.codex)"
    }

    fn root_path(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![
            SourcePattern {
                pattern: "sessions/**/*.jsonl",
                description: "Codex CLI session logs",
            },
            SourcePattern {
                pattern: "history/**/*.jsonl",
                description: "Codex CLI history logs",
            },
        ]
    }

    fn collect(&self, window: TimeWindow) -> CollectResult {
        let mut result = CollectResult::default();

        if let Some(root) = self.root_path() {
            for (pattern, source) in [
                ("sessions/**/*.jsonl", "sessions"),
                ("history/**/*.jsonl", "history"),
            ] {
                for file in fs::find_files(&[pattern], &root) {
                    for record in fs::read_jsonl(&file) {
                        if let Some(event) = parse_record(&record, &file, source) {
                            if window.contains(event.timestamp) {
                                result.events.push(event);
                            }
                        }
                    }
                    result.files_scanned.push(file);
                }
            }
        }

        if let Some(storage) = &self.vscode_storage {
            for file in fs::find_files(VSCODE_PATTERNS, storage) {
                for record in fs::read_jsonl(&file) {
                    if let Some(event) = parse_vscode_record(&record, &file) {
                        if window.contains(event.timestamp) {
                            result.events.push(event);
                        }
                    }
                }
                result.files_scanned.push(file);
            }
        }

        tracing::debug!(
            events = result.events.len(),
            files = result.files_scanned.len(),
            "Collected Codex events"
        );
        result
    }
}

/// Normalize one Codex CLI JSONL record.
fn parse_record(record: &Value, file_path: &Path, source: &str) -> Option<SessionEvent> {
    let timestamp = first_value(record, TIMESTAMP_FIELDS).and_then(time::parse_timestamp)?;
    let session_id = extract_session_id(file_path);
    let raw_role = first_string(record, ROLE_FIELDS).unwrap_or_else(|| "user".to_string());

    let id = first_string(record, ID_FIELDS)
        .unwrap_or_else(|| format!("codex_{}_{}", session_id, timestamp.timestamp_millis()));

    Some(SessionEvent {
        id,
        timestamp,
        role: EventRole::normalize(&raw_role),
        content: extract_content(record),
        session_id: Some(session_id),
        project: extract_project(record, file_path),
        tool_runs: parse_tool_runs(record, &TOOL_RUN_FIELDS),
        file_diffs: parse_file_diffs(record, &FILE_DIFF_FIELDS),
        metadata: json!({
            "source": format!("codex-{}", source),
            "filePath": file_path.to_string_lossy(),
            "model": record.get("model").cloned().unwrap_or(Value::Null),
            "tokens": first_value(record, &["tokens", "usage"]).cloned().unwrap_or(Value::Null),
        }),
    })
}

/// Normalize one VS Code extension record.
fn parse_vscode_record(record: &Value, file_path: &Path) -> Option<SessionEvent> {
    let timestamp = first_value(record, TIMESTAMP_FIELDS).and_then(time::parse_timestamp)?;
    let session_id = extract_session_id(file_path);
    let raw_role = first_string(record, ROLE_FIELDS).unwrap_or_else(|| "user".to_string());

    let id = first_string(record, ID_FIELDS)
        .unwrap_or_else(|| format!("vscode_{}_{}", session_id, timestamp.timestamp_millis()));

    Some(SessionEvent {
        id,
        timestamp,
        role: EventRole::normalize(&raw_role),
        content: extract_content(record),
        session_id: Some(session_id),
        project: Some("vscode".to_string()),
        tool_runs: parse_tool_runs(record, &TOOL_RUN_FIELDS),
        file_diffs: Vec::new(),
        metadata: json!({
            "source": "codex-vscode",
            "filePath": file_path.to_string_lossy(),
            "workspace": record.get("workspace").cloned().unwrap_or(Value::Null),
            "file": record.get("activeFile").cloned().unwrap_or(Value::Null),
        }),
    })
}

/// Content extraction chain: literal `content`, structured or plain
/// `message`, then the remaining fallbacks, then the whole record.
fn extract_content(record: &Value) -> String {
    if let Some(content) = record.get("content").and_then(Value::as_str) {
        return content.to_string();
    }

    match record.get("message") {
        Some(Value::String(text)) => return text.clone(),
        Some(message @ Value::Object(_)) => return render_message(message),
        _ => {}
    }

    first_string(record, CONTENT_FALLBACK_FIELDS).unwrap_or_else(|| pretty(record))
}

/// Session id from the file path: the stem when it looks like a session
/// identifier (UUID-ish or date-prefixed), otherwise the parent directory.
fn extract_session_id(path: &Path) -> String {
    let stem = fs::file_stem(path).unwrap_or_else(|| "unknown".to_string());

    let uuid_like =
        !stem.is_empty() && stem.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
    let date_prefixed = stem
        .get(0..10)
        .map(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok())
        .unwrap_or(false);

    if uuid_like || date_prefixed {
        return stem;
    }

    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .map(String::from)
        .unwrap_or(stem)
}

/// Project from the record, or the last path segment that isn't a layout
/// directory or the log file itself.
fn extract_project(record: &Value, path: &Path) -> Option<String> {
    if let Some(project) = record.get("project").and_then(Value::as_str) {
        return Some(project.to_string());
    }

    path.iter()
        .rev()
        .filter_map(|part| part.to_str())
        .find(|part| {
            !part.is_empty()
                && *part != "/"
                && !part.contains(".jsonl")
                && !NON_PROJECT_SEGMENTS.contains(part)
        })
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_session_id_shapes() {
        // UUID-ish stem
        assert_eq!(
            extract_session_id(Path::new("/x/019ab86e-1e83-75b0-b2d7.jsonl")),
            "019ab86e-1e83-75b0-b2d7"
        );
        // Date-prefixed stem
        assert_eq!(
            extract_session_id(Path::new("/x/2025-03-10T09-00-00-abc.jsonl")),
            "2025-03-10T09-00-00-abc"
        );
        // Neither: parent directory name
        assert_eq!(
            extract_session_id(Path::new("/home/u/.codex/sessions/25/rollout-notes.jsonl")),
            "25"
        );
    }

    #[test]
    fn test_extract_project_prefers_record_field() {
        let record = serde_json::json!({"project": "my-app"});
        let path = Path::new("/home/u/.codex/sessions/x.jsonl");
        assert_eq!(extract_project(&record, path).as_deref(), Some("my-app"));
    }

    #[test]
    fn test_extract_project_skips_layout_segments() {
        let record = serde_json::json!({});
        let path = Path::new("/home/u/.codex/sessions/x.jsonl");
        // "sessions" and ".codex" are skipped; "u" is the first usable segment
        assert_eq!(extract_project(&record, path).as_deref(), Some("u"));
    }

    #[test]
    fn test_parse_record_content_fallbacks() {
        let path = Path::new("/x/2025-03-10-session.jsonl");

        let prompt = serde_json::json!({"ts": "2025-03-10T11:00:00Z", "prompt": "build it"});
        assert_eq!(parse_record(&prompt, path, "sessions").unwrap().content, "build it");

        let choice = serde_json::json!({
            "created_at": "2025-03-10T11:00:00Z",
            "choices": [{"text": "done"}],
        });
        assert_eq!(parse_record(&choice, path, "history").unwrap().content, "done");

        let structured = serde_json::json!({
            "timestamp": "2025-03-10T11:00:00Z",
            "message": {"role": "assistant", "content": [{"type": "text", "text": "hi"}]},
        });
        assert_eq!(parse_record(&structured, path, "sessions").unwrap().content, "hi");
    }

    #[test]
    fn test_parse_record_tool_runs() {
        let path = Path::new("/x/2025-03-10-session.jsonl");
        let record = serde_json::json!({
            "timestamp": "2025-03-10T11:00:40Z",
            "role": "assistant",
            "content": "cleaning",
            "tools": [{
                "type": "shell",
                "command": "cargo clean",
                "output": "removed target",
                "exit_code": 0,
            }],
        });

        let event = parse_record(&record, path, "sessions").unwrap();
        assert_eq!(event.tool_runs.len(), 1);
        assert_eq!(event.tool_runs[0].tool.as_deref(), Some("shell"));
        assert_eq!(event.tool_runs[0].command.as_deref(), Some("cargo clean"));
        assert_eq!(event.tool_runs[0].exit_code, Some(0));
    }

    #[test]
    fn test_parse_record_rejects_missing_timestamp() {
        let record = serde_json::json!({"role": "user", "content": "hi"});
        assert!(parse_record(&record, Path::new("/x/a.jsonl"), "sessions").is_none());
    }
}
