//! Size-bounded batching of sessions and their serialized form.
//!
//! Two independent bounds apply: the chunk-level length budget limits how
//! many sessions go into one LLM call, while per-event truncation (content
//! length cap, event count cap, tool-output snippets) bounds the payload of
//! any single session regardless of the chunk budget.

use crate::types::SessionSummary;
use chrono::SecondsFormat;

/// Fixed allowance for a session's header line.
const SESSION_HEADER_LEN: usize = 200;
/// Fixed per-event overhead (timestamp, role, formatting).
const PER_EVENT_OVERHEAD: usize = 150;
/// Chunk length budget.
const MAX_CHUNK_LEN: usize = 80_000;
/// Per-event content cap in the serialized form.
const MAX_EVENT_CONTENT_LEN: usize = 3000;
/// Events rendered per session.
const MAX_EVENTS_PER_SESSION: usize = 100;
/// Tool output/error snippet length.
const TOOL_OUTPUT_SNIPPET_LEN: usize = 300;

/// Estimated serialized length of one session.
pub fn estimate_session_length(session: &SessionSummary) -> usize {
    SESSION_HEADER_LEN
        + session
            .events
            .iter()
            .map(|event| event.content.len() + PER_EVENT_OVERHEAD)
            .sum::<usize>()
}

/// Split sessions into contiguous chunks under the length budget.
///
/// Sessions are consumed in order; a session that would push the running
/// total past the budget closes the current chunk and opens a new one —
/// unless the chunk is still empty, so a single oversized session sits
/// alone rather than being split. Concatenating the chunks reproduces the
/// input exactly.
pub fn split_sessions(sessions: &[SessionSummary]) -> Vec<&[SessionSummary]> {
    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut current_len = 0;

    for (i, session) in sessions.iter().enumerate() {
        let session_len = estimate_session_length(session);

        if current_len + session_len > MAX_CHUNK_LEN && i > chunk_start {
            chunks.push(&sessions[chunk_start..i]);
            chunk_start = i;
            current_len = session_len;
        } else {
            current_len += session_len;
        }
    }

    if chunk_start < sessions.len() {
        chunks.push(&sessions[chunk_start..]);
    }

    chunks
}

/// Char-boundary-safe prefix of at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Serialize a chunk of sessions into the text sent to the model.
pub fn format_sessions(sessions: &[SessionSummary]) -> String {
    sessions
        .iter()
        .map(format_session)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_session(session: &SessionSummary) -> String {
    let mut out = format!(
        "Session: {} ({})\nTime: {} - {}\n",
        session.session_id,
        session.project.as_deref().unwrap_or("unknown project"),
        session.start_time.to_rfc3339_opts(SecondsFormat::Millis, true),
        session.end_time.to_rfc3339_opts(SecondsFormat::Millis, true),
    );

    for event in session.events.iter().take(MAX_EVENTS_PER_SESSION) {
        let (content, truncated) = truncate_chars(&event.content, MAX_EVENT_CONTENT_LEN);
        out.push_str(&format!(
            "[{}] {}: {}",
            event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            event.role,
            content,
        ));
        if truncated {
            out.push_str("... [truncated]");
        }

        if !event.tool_runs.is_empty() {
            let summary = event
                .tool_runs
                .iter()
                .map(|run| {
                    let name = run
                        .tool
                        .as_deref()
                        .or(run.command.as_deref())
                        .unwrap_or("tool");
                    let output = run
                        .output
                        .as_deref()
                        .or(run.error.as_deref())
                        .unwrap_or("executed");
                    let (snippet, _) = truncate_chars(output, TOOL_OUTPUT_SNIPPET_LEN);
                    format!("{}: {}", name, snippet)
                })
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(&format!("\n  Tools: {}", summary));
        }

        out.push('\n');
    }

    out.push_str("---\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventRole, SessionEvent, ToolRun};
    use chrono::{TimeZone, Utc};

    fn session_with_content(id: &str, content_len: usize, event_count: usize) -> SessionSummary {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let events = (0..event_count)
            .map(|i| SessionEvent {
                id: format!("{}-{}", id, i),
                timestamp: ts,
                role: EventRole::User,
                content: "x".repeat(content_len),
                session_id: Some(id.to_string()),
                project: None,
                tool_runs: vec![],
                file_diffs: vec![],
                metadata: serde_json::Value::Null,
            })
            .collect();
        SessionSummary {
            session_id: id.to_string(),
            project: Some("proj".to_string()),
            start_time: ts,
            end_time: ts,
            events,
        }
    }

    #[test]
    fn test_estimate_formula() {
        let session = session_with_content("s", 100, 3);
        assert_eq!(estimate_session_length(&session), 200 + 3 * (100 + 150));
    }

    #[test]
    fn test_split_preserves_sequence() {
        // ~30350 estimated units each: three fit in one chunk, the fourth opens a new one
        let sessions: Vec<_> = (0..5)
            .map(|i| session_with_content(&format!("s{}", i), 3000, 10))
            .collect();

        let chunks = split_sessions(&sessions);
        assert!(chunks.len() > 1);

        let flattened: Vec<&str> = chunks
            .iter()
            .flat_map(|chunk| chunk.iter().map(|s| s.session_id.as_str()))
            .collect();
        let original: Vec<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(flattened, original);
        assert!(chunks.iter().all(|chunk| !chunk.is_empty()));
    }

    #[test]
    fn test_oversized_session_sits_alone() {
        let sessions = vec![
            session_with_content("small", 10, 2),
            session_with_content("huge", 5000, 30), // ~154,700 units on its own
            session_with_content("tail", 10, 2),
        ];

        let chunks = split_sessions(&sessions);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].len(), 1);
        assert_eq!(chunks[1][0].session_id, "huge");
    }

    #[test]
    fn test_empty_input_no_chunks() {
        assert!(split_sessions(&[]).is_empty());
    }

    #[test]
    fn test_format_truncates_long_content() {
        let session = session_with_content("s", 5000, 1);
        let text = format_sessions(std::slice::from_ref(&session));

        assert!(text.contains("... [truncated]"));
        assert!(text.contains("Session: s (proj)"));
        // 3000 chars of content plus markers, not the full 5000
        assert!(text.len() < 4000);
    }

    #[test]
    fn test_format_caps_event_count() {
        let session = session_with_content("s", 5, 150);
        let text = format_sessions(std::slice::from_ref(&session));
        assert_eq!(text.matches("[2023-").count(), 100);
    }

    #[test]
    fn test_format_includes_tool_summary() {
        let mut session = session_with_content("s", 10, 1);
        session.events[0].tool_runs.push(ToolRun {
            tool: Some("Bash".to_string()),
            output: Some("exit status 0".to_string()),
            ..Default::default()
        });
        session.events[0].tool_runs.push(ToolRun {
            command: Some("cargo test".to_string()),
            error: Some("2 tests failed".to_string()),
            ..Default::default()
        });

        let text = format_sessions(std::slice::from_ref(&session));
        assert!(text.contains("Tools: Bash: exit status 0; cargo test: 2 tests failed"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        let (s, truncated) = truncate_chars("héllo wörld", 5);
        assert_eq!(s, "héllo");
        assert!(truncated);

        let (s, truncated) = truncate_chars("short", 100);
        assert_eq!(s, "short");
        assert!(!truncated);
    }
}
