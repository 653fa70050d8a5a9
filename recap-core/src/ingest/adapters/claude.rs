//! Claude Code log adapter
//!
//! Normalizes session logs from `~/.claude/projects/<project>/<session>.jsonl`
//! plus SpecStory conversation exports (`.specstory/history/`) found in the
//! working directory.
//!
//! # Error Handling
//!
//! - **Missing timestamp**: the record is rejected; everything else degrades
//!   to best-effort defaults (unknown roles become `user`).
//! - **Malformed JSON lines**: skipped individually by the JSONL reader.
//! - **Missing `~/.claude`**: yields zero events, not an error.

use crate::ingest::adapter::{CollectResult, SourceAdapter, SourcePattern, TimeWindow};
use crate::ingest::content::{
    first_string, first_value, parse_file_diffs, parse_tool_runs, pretty, render_message,
    FileDiffFields, ToolRunFields,
};
use crate::ingest::fs;
use crate::time;
use crate::types::{EventRole, SessionEvent};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

// Field-name fallback chains for Claude Code records, in lookup order.
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "ts", "time"];
const ROLE_FIELDS: &[&str] = &["type", "message.role"];
const ID_FIELDS: &[&str] = &["uuid", "id"];
const CONTENT_FALLBACK_FIELDS: &[&str] = &["content", "text", "data"];

const TOOL_RUN_FIELDS: ToolRunFields = ToolRunFields {
    list: &["toolRuns", "tool_runs"],
    tool: &["tool", "name"],
    command: &["command"],
    input: &["input", "parameters"],
    output: &["output", "result"],
    error: &["error"],
    exit_code: &["exitCode", "exit_code"],
};

const FILE_DIFF_FIELDS: FileDiffFields = FileDiffFields {
    list: &["fileDiffs", "file_diffs"],
    file: &["file", "path"],
    operation: &["operation", "type"],
    before: &["before"],
    after: &["after"],
    content: &["content"],
};

/// Heading lines carrying a timestamp delimit SpecStory markdown turns.
const MD_HEADING_PATTERN: &str =
    r"#{1,6}\s*.*?(\d{4}-\d{2}-\d{2}[T\s]\d{2}:\d{2}:\d{2})";

/// Adapter for Claude Code session logs.
pub struct ClaudeCodeAdapter {
    root: Option<PathBuf>,
    /// Base directory for SpecStory conversation scans; `None` disables them.
    specstory_base: Option<PathBuf>,
}

impl ClaudeCodeAdapter {
    /// Adapter with the default root (~/.claude) and SpecStory scans rooted
    /// at the working directory.
    pub fn new() -> Self {
        Self {
            root: dirs::home_dir().map(|h| h.join(".claude")),
            specstory_base: std::env::current_dir().ok(),
        }
    }

    /// Adapter rooted at a custom directory (for testing).
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root: Some(root),
            specstory_base: None,
        }
    }

    /// Override the SpecStory scan base (for testing).
    pub fn with_specstory_base(mut self, base: PathBuf) -> Self {
        self.specstory_base = Some(base);
        self
    }
}

impl Default for ClaudeCodeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for ClaudeCodeAdapter {
    fn name(&self) -> &'static str {
        "claude-code"
    }

    fn description(&self) -> &'static str {
        "Claude Code session logs (~/.claude/projects)"
    }

    fn root_path(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![SourcePattern {
            pattern: "projects/*/*.jsonl",
            description: "Claude Code session logs",
        }]
    }

    fn collect(&self, window: TimeWindow) -> CollectResult {
        let mut result = CollectResult::default();

        for file in self.discover_files() {
            for record in fs::read_jsonl(&file) {
                if let Some(event) = parse_record(&record, &file) {
                    if window.contains(event.timestamp) {
                        result.events.push(event);
                    }
                }
            }
            result.files_scanned.push(file);
        }

        // SpecStory exports live next to the project, not under ~/.claude
        if let Some(base) = &self.specstory_base {
            let specstory_files = fs::find_files(
                &[
                    ".specstory/history/**/*.jsonl",
                    ".specstory/history/**/*.md",
                ],
                base,
            );

            for file in specstory_files {
                if file.extension().and_then(|e| e.to_str()) == Some("md") {
                    result.events.extend(parse_specstory_markdown(&file, window));
                } else {
                    for record in fs::read_jsonl(&file) {
                        if let Some(event) = parse_specstory_record(&record, &file) {
                            if window.contains(event.timestamp) {
                                result.events.push(event);
                            }
                        }
                    }
                }
                result.files_scanned.push(file);
            }
        }

        tracing::debug!(
            events = result.events.len(),
            files = result.files_scanned.len(),
            "Collected Claude Code events"
        );
        result
    }
}

/// Normalize one Claude Code JSONL record, or reject it when no usable
/// timestamp can be parsed.
fn parse_record(record: &Value, file_path: &Path) -> Option<SessionEvent> {
    let timestamp = first_value(record, TIMESTAMP_FIELDS).and_then(time::parse_timestamp)?;

    // ~/.claude/projects/<project>/<session>.jsonl
    let session_id = fs::file_stem(file_path);
    let project = file_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .map(String::from);

    let id = first_string(record, ID_FIELDS).unwrap_or_else(|| {
        format!(
            "{}_{}",
            session_id.as_deref().unwrap_or("session"),
            timestamp.timestamp_millis()
        )
    });
    let raw_role = first_string(record, ROLE_FIELDS).unwrap_or_else(|| "user".to_string());

    Some(SessionEvent {
        id,
        timestamp,
        role: EventRole::normalize(&raw_role),
        content: extract_content(record),
        session_id,
        project,
        tool_runs: parse_tool_runs(record, &TOOL_RUN_FIELDS),
        file_diffs: parse_file_diffs(record, &FILE_DIFF_FIELDS),
        metadata: json!({
            "source": "claude-code",
            "filePath": file_path.to_string_lossy(),
            "cwd": record.get("cwd").cloned().unwrap_or(Value::Null),
            "gitBranch": record.get("gitBranch").cloned().unwrap_or(Value::Null),
            "version": record.get("version").cloned().unwrap_or(Value::Null),
        }),
    })
}

/// Content extraction chain: structured message, tool result, session
/// summary, then the generic field fallbacks, then the whole record.
fn extract_content(record: &Value) -> String {
    if let Some(message) = record.get("message").filter(|m| !m.is_null()) {
        return render_message(message);
    }

    if let Some(result) = record.get("toolUseResult").filter(|v| !v.is_null()) {
        return format!("[Tool Result] {}", pretty(result));
    }

    if record.get("type").and_then(Value::as_str) == Some("summary") {
        if let Some(summary) = record.get("summary").and_then(Value::as_str) {
            return format!("[Session Summary] {}", summary);
        }
    }

    first_string(record, CONTENT_FALLBACK_FIELDS).unwrap_or_else(|| pretty(record))
}

/// SpecStory JSONL records carry their own role field and a path-derived
/// session id.
fn parse_specstory_record(record: &Value, file_path: &Path) -> Option<SessionEvent> {
    let timestamp = first_value(record, TIMESTAMP_FIELDS).and_then(time::parse_timestamp)?;
    let session_id = fs::file_stem(file_path);
    let raw_role = first_string(record, &["role", "type"]).unwrap_or_else(|| "user".to_string());

    let id = first_string(record, &["id"]).unwrap_or_else(|| {
        format!(
            "specstory_{}_{}",
            session_id.as_deref().unwrap_or("unknown"),
            timestamp.timestamp_millis()
        )
    });

    Some(SessionEvent {
        id,
        timestamp,
        role: EventRole::normalize(&raw_role),
        content: extract_content(record),
        session_id,
        project: Some("specstory".to_string()),
        tool_runs: Vec::new(),
        file_diffs: Vec::new(),
        metadata: json!({
            "source": "specstory",
            "filePath": file_path.to_string_lossy(),
        }),
    })
}

/// Parse a SpecStory markdown conversation.
///
/// Heading lines matching [`MD_HEADING_PATTERN`] delimit successive turns;
/// case-insensitive `user:`/`human:` and `assistant:`/`claude:` cues set the
/// block's role (the role persists across blocks until a new cue appears).
/// A block is emitted only once both a timestamp and a role have been seen,
/// the accumulated text is non-blank, and the timestamp falls inside the
/// window.
fn parse_specstory_markdown(path: &Path, window: TimeWindow) -> Vec<SessionEvent> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let Ok(heading_re) = Regex::new(MD_HEADING_PATTERN) else {
        return Vec::new();
    };

    let session_id = fs::file_stem(path);
    let mut events = Vec::new();
    let mut current_timestamp: Option<DateTime<Utc>> = None;
    let mut current_role: Option<EventRole> = None;
    let mut current_text = String::new();

    for line in content.lines() {
        if let Some(caps) = heading_re.captures(line) {
            push_markdown_event(
                &mut events,
                current_timestamp,
                current_role,
                &current_text,
                window,
                path,
                &session_id,
            );
            current_timestamp = caps
                .get(1)
                .and_then(|m| time::parse_timestamp_str(m.as_str()));
            current_text.clear();
        }

        let lowered = line.to_lowercase();
        if lowered.contains("user:") || lowered.contains("human:") {
            current_role = Some(EventRole::User);
        } else if lowered.contains("assistant:") || lowered.contains("claude:") {
            current_role = Some(EventRole::Assistant);
        }

        current_text.push_str(line);
        current_text.push('\n');
    }

    push_markdown_event(
        &mut events,
        current_timestamp,
        current_role,
        &current_text,
        window,
        path,
        &session_id,
    );

    events
}

fn push_markdown_event(
    events: &mut Vec<SessionEvent>,
    timestamp: Option<DateTime<Utc>>,
    role: Option<EventRole>,
    text: &str,
    window: TimeWindow,
    path: &Path,
    session_id: &Option<String>,
) {
    let (Some(timestamp), Some(role)) = (timestamp, role) else {
        return;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || !window.contains(timestamp) {
        return;
    }

    let stem = session_id.clone().unwrap_or_else(|| "unknown".to_string());
    events.push(SessionEvent {
        id: format!("md_{}_{}", stem, events.len()),
        timestamp,
        role,
        content: trimmed.to_string(),
        session_id: Some(stem),
        project: Some("specstory".to_string()),
        tool_runs: Vec::new(),
        file_diffs: Vec::new(),
        metadata: json!({
            "source": "specstory-md",
            "filePath": path.to_string_lossy(),
        }),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_window() -> TimeWindow {
        TimeWindow::new(
            time::parse_timestamp_str("2000-01-01T00:00:00Z").unwrap(),
            time::parse_timestamp_str("2100-01-01T00:00:00Z").unwrap(),
        )
    }

    #[test]
    fn test_parse_record_derives_ids_from_path() {
        let record = serde_json::json!({
            "timestamp": "2025-03-10T09:15:00Z",
            "type": "user",
            "message": {"role": "user", "content": "hello"},
        });
        let path = PathBuf::from("/home/dev/.claude/projects/my-project/session-abc.jsonl");

        let event = parse_record(&record, &path).unwrap();
        assert_eq!(event.session_id.as_deref(), Some("session-abc"));
        assert_eq!(event.project.as_deref(), Some("my-project"));
        assert_eq!(event.role, EventRole::User);
        assert_eq!(event.content, "hello");
        // Synthesized id: no uuid/id in the record
        assert_eq!(event.id, "session-abc_1741598100000");
    }

    #[test]
    fn test_parse_record_rejects_missing_timestamp() {
        let record = serde_json::json!({"type": "user", "message": {"content": "hi"}});
        assert!(parse_record(&record, Path::new("/tmp/s.jsonl")).is_none());
    }

    #[test]
    fn test_extract_content_summary_record() {
        let record = serde_json::json!({
            "type": "summary",
            "summary": "Fixed the build",
            "timestamp": "2025-03-10T09:15:00Z",
        });
        assert_eq!(extract_content(&record), "[Session Summary] Fixed the build");
    }

    #[test]
    fn test_extract_content_tool_use_result() {
        let record = serde_json::json!({"toolUseResult": {"stdout": "ok"}});
        let content = extract_content(&record);
        assert!(content.starts_with("[Tool Result]"));
        assert!(content.contains("stdout"));
    }

    #[test]
    fn test_extract_content_falls_back_to_record_json() {
        let record = serde_json::json!({"weird": true});
        assert!(extract_content(&record).contains("weird"));
    }

    #[test]
    fn test_markdown_blocks_need_role_and_timestamp() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chat.md");
        std::fs::write(
            &path,
            "## 2025-03-10 10:00:00 user:\nPlease add a retry helper.\n\n\
             ## 2025-03-10 10:01:00 assistant:\nAdded `retry` with backoff.\n",
        )
        .unwrap();

        let events = parse_specstory_markdown(&path, wide_window());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].role, EventRole::User);
        assert!(events[0].content.contains("retry helper"));
        assert_eq!(events[1].role, EventRole::Assistant);
        assert_eq!(events[0].id, "md_chat_0");
        assert_eq!(events[0].project.as_deref(), Some("specstory"));
    }

    #[test]
    fn test_markdown_without_role_emits_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "## Notes 2025-03-10 10:00:00\nJust some text.\n").unwrap();

        assert!(parse_specstory_markdown(&path, wide_window()).is_empty());
    }

    #[test]
    fn test_markdown_window_filters_blocks() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chat.md");
        std::fs::write(
            &path,
            "## 2025-03-10 10:00:00 user:\nIn range.\n\n\
             ## 2030-01-01 00:00:00 user:\nOut of range.\n",
        )
        .unwrap();

        let window = TimeWindow::new(
            time::parse_timestamp_str("2025-03-10T00:00:00Z").unwrap(),
            time::parse_timestamp_str("2025-03-10T23:59:59Z").unwrap(),
        );
        let events = parse_specstory_markdown(&path, window);
        assert_eq!(events.len(), 1);
        assert!(events[0].content.contains("In range"));
    }
}
