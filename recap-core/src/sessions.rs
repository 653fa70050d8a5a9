//! Clustering of normalized events into per-session summaries.

use crate::types::{SessionEvent, SessionSummary};
use std::collections::HashMap;

/// Session key used when an event carries no identifier.
const UNKNOWN_SESSION: &str = "unknown";

/// Group a flat event list into one summary per distinct session id.
///
/// Groups keep first-encounter order; within a group events are sorted by
/// timestamp with a stable sort, so equal timestamps retain their input
/// order. Events from different sources that share a session id land in the
/// same summary — a deliberate merge (editor-integrated sessions reuse ids),
/// though accidental collisions merge too; this is a known limitation.
pub fn group_into_sessions(events: Vec<SessionEvent>) -> Vec<SessionSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<SessionEvent>> = HashMap::new();

    for event in events {
        let key = event
            .session_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_SESSION.to_string());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(event);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let mut events = groups.remove(&key)?;
            events.sort_by_key(|e| e.timestamp);

            let start_time = events.first()?.timestamp;
            let end_time = events.last()?.timestamp;
            let project = events.first()?.project.clone();

            Some(SessionSummary {
                session_id: key,
                project,
                start_time,
                end_time,
                events,
            })
        })
        .collect()
}
