//! Source adapter abstraction
//!
//! Each supported tool implements [`SourceAdapter`] to turn its on-disk
//! log layout into normalized [`SessionEvent`]s.
//!
//! ## Design principles
//!
//! 1. **Resilience**: per-record failures are logged and skipped, never fatal
//! 2. **Graceful absence**: a missing root directory yields zero events
//! 3. **Best-effort normalization**: only a missing timestamp rejects a
//!    record; every other field degrades to a default

use crate::time;
use crate::types::SessionEvent;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Inclusive time window events are collected for.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        time::is_within_range(ts, self.start, self.end)
    }
}

/// Glob pattern for discovering one of a source's file layouts.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    /// Pattern relative to the adapter root
    pub pattern: &'static str,
    /// Human-readable description for the sources report
    pub description: &'static str,
}

/// Events collected from one source, with provenance for reporting.
#[derive(Debug, Default)]
pub struct CollectResult {
    pub events: Vec<SessionEvent>,
    pub files_scanned: Vec<PathBuf>,
}

/// A log-format adapter for one AI pair-programming tool.
pub trait SourceAdapter: Send + Sync {
    /// Source tag recorded into event metadata ("claude-code", "codex")
    fn name(&self) -> &'static str;

    /// One-line description for the sources report
    fn description(&self) -> &'static str;

    /// Root directory for this source's data (e.g. ~/.claude)
    fn root_path(&self) -> Option<PathBuf>;

    /// Whether the source appears to be installed (root path exists)
    fn is_available(&self) -> bool {
        self.root_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Patterns for discovering this source's log files, relative to the root
    fn source_patterns(&self) -> Vec<SourcePattern>;

    /// Discover all files matching this source's patterns.
    fn discover_files(&self) -> Vec<PathBuf> {
        let Some(root) = self.root_path() else {
            return Vec::new();
        };
        let patterns: Vec<&str> = self.source_patterns().iter().map(|p| p.pattern).collect();
        super::fs::find_files(&patterns, &root)
    }

    /// Collect every event whose timestamp falls inside the window.
    fn collect(&self, window: TimeWindow) -> CollectResult;
}
