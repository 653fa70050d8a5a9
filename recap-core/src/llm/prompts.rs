//! Prompt templates for the two document types.
//!
//! The chunk-level templates take the serialized sessions via a
//! `{sessions}` placeholder; integration prompts enumerate per-chunk
//! results and are themselves fed back through the chunk template as the
//! session text.

const DAILY_TEMPLATE: &str = include_str!("prompts/daily.md");
const KNOWLEDGE_TEMPLATE: &str = include_str!("prompts/knowledge.md");

pub fn daily_prompt(sessions: &str, date: &str) -> String {
    DAILY_TEMPLATE
        .replace("{sessions}", sessions)
        .replace("{date}", date)
}

pub fn knowledge_prompt(sessions: &str, date: &str) -> String {
    KNOWLEDGE_TEMPLATE
        .replace("{sessions}", sessions)
        .replace("{date}", date)
}

/// Placeholder daily report when no sessions were found.
pub fn empty_daily_report(date: &str) -> String {
    format!(
        "# Daily Report - {}\n\n## Overview\nNo coding sessions were found for this period.",
        date
    )
}

/// Placeholder knowledge document when no sessions were found.
pub fn empty_knowledge(date: &str) -> String {
    format!(
        "# Knowledge Base - {}\n\n## Note\nNo problems or solutions were found to analyze.",
        date
    )
}

fn enumerate_parts(chunk_analyses: &[String]) -> String {
    chunk_analyses
        .iter()
        .enumerate()
        .map(|(i, analysis)| format!("## Part {}\n{}\n", i + 1, analysis))
        .collect::<Vec<_>>()
        .join("\n---\n\n")
}

/// Integration prompt merging per-chunk daily analyses into one report.
pub fn daily_integration_prompt(chunk_analyses: &[String], date: &str) -> String {
    format!(
        "Integrate the following partial daily-report analyses into a single unified report.\n\n\
         Date: {}\n\n\
         Partial analyses:\n{}\n\n\
         Merge these parts into one complete daily development report:\n\
         1. Overall overview (combine the main work across all parts)\n\
         2. Key outcomes (deduplicated and categorized)\n\
         3. Builds and tests (aggregate successes and failures)\n\
         4. Follow-ups (merged and re-prioritized)\n\n\
         Keep the existing Markdown structure.",
        date,
        enumerate_parts(chunk_analyses)
    )
}

/// Integration prompt merging per-chunk knowledge analyses into one document.
pub fn knowledge_integration_prompt(chunk_analyses: &[String], date: &str) -> String {
    format!(
        "Integrate the following partial knowledge-base analyses into a single unified document.\n\n\
         Date: {}\n\n\
         Partial analyses:\n{}\n\n\
         Merge these parts into one complete knowledge base:\n\
         1. Deduplicate similar problems, keeping the most complete solution\n\
         2. Group by technical area (build/compile, tooling, dependencies)\n\
         3. Extract general rules and best practices\n\
         4. Merge related pitfall notes\n\n\
         Keep the existing Markdown structure.",
        date,
        enumerate_parts(chunk_analyses)
    )
}
