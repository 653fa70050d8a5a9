//! Event ingestion & normalization layer
//!
//! Turns heterogeneous on-disk session logs into a uniform event stream.
//!
//! ```text
//! ┌──────────────────┐     ┌─────────────────┐     ┌───────────────────┐
//! │   Source Files   │ ──► │  SourceAdapter  │ ──► │  Vec<SessionEvent>│
//! │ (~/.claude, ...) │     │  ├─ ClaudeCode  │     │  (normalized)     │
//! └──────────────────┘     │  └─ Codex       │     └───────────────────┘
//!                          └─────────────────┘
//! ```
//!
//! Adapters run concurrently (each scan is blocking file IO, so it runs on
//! the blocking pool), but results are concatenated in fixed registration
//! order — Claude Code before Codex — so stable-sort tie-breaks on equal
//! timestamps stay deterministic. Each run re-scans from scratch; there is
//! no checkpointing or persistent index.

mod adapter;
pub mod adapters;
mod content;
pub mod fs;

pub use adapter::{CollectResult, SourceAdapter, SourcePattern, TimeWindow};

use std::sync::Arc;

/// The built-in adapters, in concatenation order.
pub fn default_sources() -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(adapters::ClaudeCodeAdapter::new()),
        Arc::new(adapters::CodexAdapter::new()),
    ]
}

/// Collect events from every source concurrently, concatenating results in
/// source order. A source whose collection task fails contributes nothing.
pub async fn collect_events(
    sources: &[Arc<dyn SourceAdapter>],
    window: TimeWindow,
) -> CollectResult {
    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let source = Arc::clone(source);
            tokio::task::spawn_blocking(move || source.collect(window))
        })
        .collect();

    let mut combined = CollectResult::default();
    for handle in handles {
        match handle.await {
            Ok(mut collected) => {
                combined.events.append(&mut collected.events);
                combined.files_scanned.append(&mut collected.files_scanned);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Source collection task failed");
            }
        }
    }
    combined
}
