//! Heuristic mining of error→fix sequences within sessions.
//!
//! An event triggers a candidate problem when its content matches one of
//! the error-indicator rules, or when any of its tool runs reports a
//! failure. The assistant replies among the next few events form the
//! candidate solution.

use crate::types::{EventRole, ProblemSolution, SessionSummary, ToolRun};
use regex::{Regex, RegexBuilder};

/// Error-indicating content rules, evaluated in order.
const ERROR_RULES: &[&str] = &[
    r"error|exception|traceback|npm ERR!",
    r"TypeError|ValueError|SyntaxError|ReferenceError",
    r"panic|fatal|abort|crash",
    r"failed|failure|unsuccessful",
    r"cannot find|not found|undefined|null",
    r"permission denied|access denied",
    r"connection refused|timeout",
];

/// How many events after a trigger are searched for assistant replies.
const SOLUTION_WINDOW: usize = 4;

pub struct ProblemExtractor {
    patterns: Vec<Regex>,
}

impl ProblemExtractor {
    pub fn new() -> Self {
        let patterns = ERROR_RULES
            .iter()
            .filter_map(|rule| RegexBuilder::new(rule).case_insensitive(true).build().ok())
            .collect();
        Self { patterns }
    }

    fn is_error_content(&self, content: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(content))
    }

    fn is_failed_tool_run(run: &ToolRun) -> bool {
        run.error.as_deref().is_some_and(|e| !e.is_empty())
            || run.exit_code.is_some_and(|code| code != 0)
    }

    /// Mine every session for error→fix sequences.
    pub fn extract(&self, sessions: &[SessionSummary]) -> Vec<ProblemSolution> {
        let mut problems = Vec::new();

        for session in sessions {
            let events = &session.events;

            for (i, event) in events.iter().enumerate() {
                let triggered = self.is_error_content(&event.content)
                    || event.tool_runs.iter().any(Self::is_failed_tool_run);
                if !triggered {
                    continue;
                }

                let solutions: Vec<_> = events[i + 1..]
                    .iter()
                    .take(SOLUTION_WINDOW)
                    .filter(|e| e.role == EventRole::Assistant)
                    .cloned()
                    .collect();
                if solutions.is_empty() {
                    continue;
                }

                let mut chain = vec![event.clone()];
                chain.extend(solutions.iter().cloned());

                problems.push(ProblemSolution {
                    context: session
                        .project
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                    problem: event.content.clone(),
                    solution: solutions
                        .iter()
                        .map(|e| e.content.as_str())
                        .collect::<Vec<_>>()
                        .join("\n"),
                    events: chain,
                });
            }
        }

        problems
    }
}

impl Default for ProblemExtractor {
    fn default() -> Self {
        Self::new()
    }
}
