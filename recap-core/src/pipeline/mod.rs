//! Chunked analysis orchestration pipeline
//!
//! Drives one analysis invocation end to end:
//!
//! ```text
//! adapters ──► concat ──► group ──► redact ──► chunk ──► LLM calls ──► integrate
//!                                                          │
//!                                         daily ───────────┤ (concurrent,
//!                                         knowledge ───────┘  independent)
//! ```
//!
//! The two document types run as independent concurrent passes; within a
//! pass, per-chunk calls run concurrently and exactly one integration call
//! merges their outputs. Any LLM failure aborts the whole analysis — no
//! partial output is produced or persisted.

pub mod chunk;
pub mod problems;

pub use problems::ProblemExtractor;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ingest::{self, SourceAdapter, TimeWindow};
use crate::llm::{self, prompts, LlmClient};
use crate::redact::RedactionEngine;
use crate::sessions::group_into_sessions;
use crate::time::{self, format_date};
use crate::types::{AnalysisResult, AnalysisStats, SessionSummary};
use chrono::NaiveDate;
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Skip redaction for this run even when enabled in config
    pub disable_redaction: bool,
    /// Write `daily.md`/`knowledge.md`/`data.json` under this directory
    pub output_dir: Option<PathBuf>,
}

/// Which terminal document a chunked pass produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Daily,
    Knowledge,
}

pub struct AnalysisPipeline {
    config: Config,
    redaction: RedactionEngine,
    sources: Vec<Arc<dyn SourceAdapter>>,
    problems: ProblemExtractor,
}

impl AnalysisPipeline {
    pub fn new(config: Config) -> Self {
        let redaction = RedactionEngine::new(&config.redact);
        Self {
            config,
            redaction,
            sources: ingest::default_sources(),
            problems: ProblemExtractor::new(),
        }
    }

    /// Replace the event sources (for testing).
    pub fn with_sources(mut self, sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        self.sources = sources;
        self
    }

    /// Analyze one local day.
    pub async fn analyze_day(
        &self,
        date: NaiveDate,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult> {
        let tz = time::resolve_timezone(&self.config.timezone);
        let (start, end) = time::day_range(date, tz);
        let date_label = format_date(date);
        let dir_name = date_label.clone();

        self.run(TimeWindow::new(start, end), date_label, dir_name, options)
            .await
    }

    /// Analyze an inclusive local date range.
    ///
    /// A start date after the end date is rejected before any work begins.
    pub async fn analyze_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult> {
        if from > to {
            return Err(Error::InvalidInput(format!(
                "start date {} is after end date {}",
                from, to
            )));
        }

        let tz = time::resolve_timezone(&self.config.timezone);
        let (start, end) = time::date_range(from, to, tz);
        let date_label = format!("{} to {}", format_date(from), format_date(to));
        let dir_name = format!("range-{}_{}", format_date(from), format_date(to));

        self.run(TimeWindow::new(start, end), date_label, dir_name, options)
            .await
    }

    async fn run(
        &self,
        window: TimeWindow,
        date_label: String,
        dir_name: String,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult> {
        let collected = ingest::collect_events(&self.sources, window).await;
        let total_events = collected.events.len();

        let sessions = group_into_sessions(collected.events);
        let total_sessions = sessions.len();
        tracing::info!(
            sessions = total_sessions,
            events = total_events,
            files = collected.files_scanned.len(),
            "Collected sessions"
        );

        let processed = if options.disable_redaction {
            sessions
        } else {
            self.redaction.redact_sessions(&sessions)
        };

        let chunks = chunk::split_sessions(&processed);
        let (daily_report, knowledge) = if chunks.is_empty() {
            // No sessions: fixed placeholders, no LLM client is even built
            (
                prompts::empty_daily_report(&date_label),
                prompts::empty_knowledge(&date_label),
            )
        } else {
            let client = llm::create_client(&self.config.llm)?;
            tokio::try_join!(
                generate_chunked_analysis(&chunks, AnalysisKind::Daily, &date_label, client.as_ref()),
                generate_chunked_analysis(
                    &chunks,
                    AnalysisKind::Knowledge,
                    &date_label,
                    client.as_ref()
                ),
            )?
        };

        let total_problems = self.problems.extract(&processed).len();

        let result = AnalysisResult {
            date: date_label,
            sessions: processed,
            daily_report,
            knowledge,
            stats: AnalysisStats {
                total_sessions,
                total_events,
                total_problems,
            },
        };

        if let Some(output_dir) = &options.output_dir {
            save_results(&result, output_dir, &dir_name)?;
        }

        Ok(result)
    }
}

/// Run the chunk/integration passes for one document type.
///
/// Zero chunks yields the fixed placeholder; one chunk issues a single
/// request; multiple chunks are analyzed concurrently, then exactly one
/// integration request merges the labeled per-chunk outputs.
pub async fn generate_chunked_analysis(
    chunks: &[&[SessionSummary]],
    kind: AnalysisKind,
    date_label: &str,
    client: &dyn LlmClient,
) -> Result<String> {
    match chunks.len() {
        0 => Ok(match kind {
            AnalysisKind::Daily => prompts::empty_daily_report(date_label),
            AnalysisKind::Knowledge => prompts::empty_knowledge(date_label),
        }),
        1 => {
            let input = chunk::format_sessions(chunks[0]);
            request(client, kind, &input, date_label).await
        }
        total => {
            tracing::info!(chunks = total, kind = ?kind, "Analyzing chunks concurrently");

            let chunk_calls = chunks.iter().enumerate().map(|(i, sessions)| {
                let input = chunk::format_sessions(sessions);
                let label = format!("{} (part {}/{})", date_label, i + 1, total);
                async move { request(client, kind, &input, &label).await }
            });
            let analyses = try_join_all(chunk_calls).await?;

            let integration = match kind {
                AnalysisKind::Daily => prompts::daily_integration_prompt(&analyses, date_label),
                AnalysisKind::Knowledge => {
                    prompts::knowledge_integration_prompt(&analyses, date_label)
                }
            };
            request(client, kind, &integration, date_label).await
        }
    }
}

async fn request(
    client: &dyn LlmClient,
    kind: AnalysisKind,
    input: &str,
    date: &str,
) -> Result<String> {
    match kind {
        AnalysisKind::Daily => client.summarize_daily(input, date).await,
        AnalysisKind::Knowledge => client.extract_knowledge(input, date).await,
    }
}

/// Write the three artifacts under a date-named directory.
fn save_results(result: &AnalysisResult, output_dir: &Path, dir_name: &str) -> Result<()> {
    let report_dir = output_dir.join(dir_name);
    std::fs::create_dir_all(&report_dir)?;

    std::fs::write(report_dir.join("daily.md"), &result.daily_report)?;
    std::fs::write(report_dir.join("knowledge.md"), &result.knowledge)?;
    std::fs::write(
        report_dir.join("data.json"),
        serde_json::to_string_pretty(result)?,
    )?;

    tracing::info!(dir = %report_dir.display(), "Saved analysis artifacts");
    Ok(())
}
