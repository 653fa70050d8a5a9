//! recap - daily reports and knowledge extraction from AI coding sessions
//!
//! Scans local Claude Code and Codex session logs, redacts sensitive
//! content, and drives an LLM summarization workflow.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use recap_core::config::Config;
use recap_core::ingest::SourceAdapter;
use recap_core::pipeline::{AnalysisPipeline, AnalyzeOptions};
use recap_core::types::{AnalysisResult, DataSource};
use recap_core::RedactionEngine;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "recap")]
#[command(about = "Daily reports and knowledge extraction from AI coding session logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze coding sessions and generate reports
    #[command(subcommand)]
    Analyze(AnalyzeCommand),

    /// Scan and list available data sources
    Sources,

    /// Redaction utilities
    #[command(subcommand)]
    Redact(RedactCommand),

    /// View or update configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum AnalyzeCommand {
    /// Analyze today's coding sessions
    Today(AnalyzeArgs),

    /// Analyze coding sessions within a date range
    Range(RangeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Output directory for reports
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Disable content redaction
    #[arg(long)]
    no_redact: bool,

    /// Output the full result as JSON
    #[arg(short, long)]
    json: bool,

    /// LLM provider override (openai, anthropic, generic)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name override
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Args)]
struct RangeArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    from: String,

    /// End date (YYYY-MM-DD)
    #[arg(short, long)]
    to: String,

    #[command(flatten)]
    common: AnalyzeArgs,
}

#[derive(Subcommand)]
enum RedactCommand {
    /// Run the configured patterns against a test string
    Test {
        /// Text to redact
        text: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the resolved configuration
    Show,

    /// Update one configuration value
    /// (provider, model, api-key, base-url, output-dir, timezone)
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        recap_core::logging::init(&config.logging).context("failed to initialize logging")?;

    match cli.command {
        Commands::Analyze(cmd) => run_analyze(cmd, config).await,
        Commands::Sources => run_sources(),
        Commands::Redact(RedactCommand::Test { text }) => run_redact_test(&config, &text),
        Commands::Config(cmd) => run_config(cmd, config),
    }
}

async fn run_analyze(cmd: AnalyzeCommand, mut config: Config) -> Result<()> {
    let (args, range) = match cmd {
        AnalyzeCommand::Today(args) => (args, None),
        AnalyzeCommand::Range(range) => {
            let from = parse_date(&range.from)?;
            let to = parse_date(&range.to)?;
            (range.common, Some((from, to)))
        }
    };

    // Per-invocation provider/model overrides
    if let Some(provider) = &args.provider {
        config.llm.provider = provider
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("invalid --provider value")?;
    }
    if let Some(model) = &args.model {
        config.llm.model = Some(model.clone());
    }

    let options = AnalyzeOptions {
        disable_redaction: args.no_redact,
        output_dir: args.out.clone(),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Collecting session data from Claude Code and Codex...");

    let tz = recap_core::time::resolve_timezone(&config.timezone);
    let pipeline = AnalysisPipeline::new(config);
    let result = match range {
        Some((from, to)) => pipeline.analyze_range(from, to, &options).await,
        None => {
            let today = Utc::now().with_timezone(&tz).date_naive();
            pipeline.analyze_day(today, &options).await
        }
    };

    match result {
        Ok(result) => {
            spinner.finish_and_clear();
            tracing::info!(
                sessions = result.stats.total_sessions,
                events = result.stats.total_events,
                "Analysis complete"
            );
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display_results(&result, args.out.as_deref());
            }
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(anyhow::Error::new(e).context("analysis failed"))
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}': expected YYYY-MM-DD", raw))
}

fn display_results(result: &AnalysisResult, output_dir: Option<&Path>) {
    println!("Analysis Summary");
    println!("  Date:     {}", result.date);
    println!("  Sessions: {}", result.stats.total_sessions);
    println!("  Events:   {}", result.stats.total_events);
    println!("  Problems: {}", result.stats.total_problems);

    match output_dir {
        Some(dir) => println!("\nReports saved under {}", dir.display()),
        None => {
            println!("\n--- Daily Report ---\n{}", result.daily_report);
            println!("\n--- Knowledge ---\n{}", result.knowledge);
        }
    }
}

fn run_sources() -> Result<()> {
    println!("Scanning for available data sources...\n");

    let report: Vec<DataSource> = recap_core::ingest::default_sources()
        .iter()
        .map(|source| {
            let files = source.discover_files();
            DataSource {
                name: source.name().to_string(),
                description: source.description().to_string(),
                available: source.is_available(),
                files_found: files.len(),
                paths: source
                    .root_path()
                    .map(|p| vec![p.display().to_string()])
                    .unwrap_or_default(),
            }
        })
        .collect();

    for source in &report {
        let status = if source.available { "found" } else { "missing" };
        println!("[{}] {} ({} files)", status, source.name, source.files_found);
        println!("    {}", source.description);
        for path in &source.paths {
            println!("    root: {}", path);
        }
        println!();
    }

    let available = report.iter().filter(|s| s.available).count();
    let total_files: usize = report.iter().map(|s| s.files_found).sum();
    println!(
        "Summary: {}/{} sources available, {} files found",
        available,
        report.len(),
        total_files
    );
    if available == 0 {
        println!("No data sources found. Make sure Claude Code or Codex CLI have been used.");
    }

    Ok(())
}

fn run_redact_test(config: &Config, text: &str) -> Result<()> {
    let engine = RedactionEngine::new(&config.redact);
    let result = engine.redact(text);

    println!("Original: {}", result.original);
    println!("Redacted: {}", result.redacted);

    if result.matches.is_empty() {
        println!("No sensitive content matched.");
    } else {
        println!("\nMatches:");
        for m in &result.matches {
            println!("  {} -> {} (pattern: {})", m.matched, m.replacement, m.pattern);
        }
    }

    Ok(())
}

fn run_config(cmd: ConfigCommand, mut config: Config) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            if let Some(key) = shown.llm.api_key.take() {
                shown.llm.api_key = Some(mask_key(&key));
            }
            print!("{}", toml::to_string_pretty(&shown)?);
            println!("\n# config file: {}", Config::config_path().display());
        }
        ConfigCommand::Set { key, value } => {
            config.set_value(&key, &value)?;
            config.save().context("failed to save configuration")?;
            println!("Updated {}.", key);
        }
    }

    Ok(())
}

fn mask_key(key: &str) -> String {
    if key.chars().count() <= 8 {
        "***".to_string()
    } else {
        format!("{}***", key.chars().take(6).collect::<String>())
    }
}
