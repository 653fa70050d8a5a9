//! # recap-core
//!
//! Core library for recap — daily reports and knowledge extraction from
//! AI pair-programming session logs.
//!
//! This library provides:
//! - Source adapters normalizing Claude Code and Codex logs into events
//! - Session grouping and timezone-aware day/range windows
//! - A pattern-driven redaction engine with a per-match audit trail
//! - A chunked LLM analysis pipeline (map per chunk, reduce via one
//!   integration call) behind three provider clients
//!
//! ## Example
//!
//! ```rust,no_run
//! use recap_core::{AnalysisPipeline, AnalyzeOptions, Config};
//!
//! # async fn demo() -> recap_core::Result<()> {
//! let config = Config::load()?;
//! let pipeline = AnalysisPipeline::new(config);
//! let today = chrono::Utc::now().date_naive();
//! let result = pipeline.analyze_day(today, &AnalyzeOptions::default()).await?;
//! println!("{}", result.daily_report);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{AnalysisPipeline, AnalyzeOptions};
pub use redact::RedactionEngine;
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod redact;
pub mod sessions;
pub mod time;
pub mod types;
