//! Core domain types for recap
//!
//! These types are the canonical data model that normalizes activity from
//! all supported session-log sources. Serialized field names use camelCase
//! so the `data.json` artifact keeps a stable, tool-independent shape.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | One turn (message or tool invocation) within a session |
//! | **Session** | A time-bounded sequence of events sharing one identifier |
//! | **Chunk** | A size-bounded subset of sessions sent as one unit to the LLM |
//! | **Redaction** | Replacement of sensitive substrings before LLM exposure |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Roles
// ============================================

/// Who authored an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventRole {
    User,
    Assistant,
    System,
    Tool,
}

/// Priority-ordered substring rules for role normalization.
///
/// Rules are evaluated top to bottom against the lower-cased raw string;
/// the first rule with a matching term wins. Terms are the union of the
/// role vocabularies observed across the supported sources.
const ROLE_RULES: &[(EventRole, &[&str])] = &[
    (EventRole::User, &["user", "human"]),
    (EventRole::Assistant, &["assistant", "claude", "bot", "ai"]),
    (EventRole::Tool, &["tool", "function"]),
    (EventRole::System, &["system", "summary"]),
];

impl EventRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventRole::User => "user",
            EventRole::Assistant => "assistant",
            EventRole::System => "system",
            EventRole::Tool => "tool",
        }
    }

    /// Normalize a raw role/type string from a source log.
    ///
    /// Total: every input maps to exactly one role; unrecognized strings
    /// default to [`EventRole::User`].
    pub fn normalize(raw: &str) -> EventRole {
        let lowered = raw.to_lowercase();
        for (role, terms) in ROLE_RULES {
            if terms.iter().any(|term| lowered.contains(term)) {
                return *role;
            }
        }
        EventRole::User
    }
}

impl std::fmt::Display for EventRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Events
// ============================================

/// One shell/tool invocation attached to an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Kind of change a file diff records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Create,
    Update,
    Delete,
}

impl FileOperation {
    /// Map a raw operation string; unrecognized values become `Update`.
    pub fn from_raw(raw: &str) -> FileOperation {
        match raw.to_lowercase().as_str() {
            "create" => FileOperation::Create,
            "delete" => FileOperation::Delete,
            _ => FileOperation::Update,
        }
    }
}

/// One file change attached to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    pub file: String,
    pub operation: FileOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One utterance or tool invocation, normalized from a source record.
///
/// `content` is always a string after normalization; adapters substitute an
/// empty string or a JSON-stringified fallback rather than propagate absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    /// Stable identifier, synthesized when the source lacks one
    pub id: String,
    /// Absolute instant; events without a parseable timestamp are dropped
    pub timestamp: DateTime<Utc>,
    pub role: EventRole,
    /// Normalized text; multi-part messages are flattened with tool markers inline
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_runs: Vec<ToolRun>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_diffs: Vec<FileDiff>,
    /// Provenance bag (file path, source adapter, model, token usage);
    /// never interpreted downstream, only surfaced for debugging
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

// ============================================
// Sessions
// ============================================

/// One continuous conversation: the events sharing a session identifier,
/// chronologically sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub events: Vec<SessionEvent>,
}

/// An error→fix sequence mined from a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSolution {
    pub context: String,
    pub problem: String,
    pub solution: String,
    pub events: Vec<SessionEvent>,
}

// ============================================
// Redaction
// ============================================

/// One sensitive substring found by the redaction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionMatch {
    #[serde(rename = "match")]
    pub matched: String,
    pub pattern: String,
    pub replacement: String,
}

/// Audit trail of a single redaction pass.
///
/// `redacted` is obtained from `original` by replacing each reported
/// match's first remaining occurrence with its replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionResult {
    pub original: String,
    pub redacted: String,
    pub matches: Vec<RedactionMatch>,
}

// ============================================
// Analysis results
// ============================================

/// Summary statistics over one analysis run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    pub total_sessions: usize,
    pub total_events: usize,
    pub total_problems: usize,
}

/// Terminal artifact of the pipeline; constructed once per invocation and
/// never updated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Analyzed date label (`YYYY-MM-DD`, or `<from> to <to>` for ranges)
    pub date: String,
    pub sessions: Vec<SessionSummary>,
    pub daily_report: String,
    pub knowledge: String,
    pub stats: AnalysisStats,
}

// ============================================
// Discovery
// ============================================

/// One row of the sources scan report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub files_found: usize,
    pub paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_normalization_priority() {
        assert_eq!(EventRole::normalize("user"), EventRole::User);
        assert_eq!(EventRole::normalize("Human"), EventRole::User);
        assert_eq!(EventRole::normalize("ASSISTANT"), EventRole::Assistant);
        assert_eq!(EventRole::normalize("claude-3"), EventRole::Assistant);
        assert_eq!(EventRole::normalize("tool_result"), EventRole::Tool);
        assert_eq!(EventRole::normalize("function_call"), EventRole::Tool);
        assert_eq!(EventRole::normalize("system"), EventRole::System);
        assert_eq!(EventRole::normalize("summary"), EventRole::System);
    }

    #[test]
    fn test_role_normalization_first_match_wins() {
        // "user" terms are checked before "assistant" terms
        assert_eq!(EventRole::normalize("user-assistant"), EventRole::User);
    }

    #[test]
    fn test_role_normalization_default() {
        assert_eq!(EventRole::normalize(""), EventRole::User);
        assert_eq!(EventRole::normalize("unknown"), EventRole::User);
        assert_eq!(EventRole::normalize("42"), EventRole::User);
    }

    #[test]
    fn test_file_operation_from_raw() {
        assert_eq!(FileOperation::from_raw("create"), FileOperation::Create);
        assert_eq!(FileOperation::from_raw("DELETE"), FileOperation::Delete);
        assert_eq!(FileOperation::from_raw("modify"), FileOperation::Update);
        assert_eq!(FileOperation::from_raw(""), FileOperation::Update);
    }
}
