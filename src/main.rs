//! # logsum CLI
//!
//! The `logsum` binary scans a directory for note/log files, filters them by
//! timeframe, and prints or saves a bullet-point summary.
//!
//! ## Usage
//!
//! ```bash
//! logsum [--config ./logsum.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `logsum run` | Summarize matching files into bullet points |
//! | `logsum files` | List candidate files with their inferred dates |
//!
//! ## Examples
//!
//! ```bash
//! # Summarize the last 7 days of notes in the current directory
//! logsum run
//!
//! # All of May 2025, 10 bullets, saved to a file
//! logsum run --timeframe 2025-05 --bullets 10 --output summary.md
//!
//! # Force the local Ollama backend
//! logsum run --provider ollama --ollama-model llama3.3
//!
//! # Deterministic extraction, no network calls
//! logsum run --provider basic
//!
//! # Inspect which files would be picked up for 2025
//! logsum files --timeframe 2025
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use logsum::config::{self, Config, CustomEndpointConfig};
use logsum::dates::DateExtractor;
use logsum::discover;
use logsum::output;
use logsum::run::{self, RunOutcome};

/// logsum — a local-first note and log summarizer with pluggable AI backends.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; CLI flags override config values. Without a config file, built-in
/// defaults apply (current directory, last 7 days, auto provider).
#[derive(Parser)]
#[command(
    name = "logsum",
    about = "logsum — summarize note and log files into bullet points",
    version,
    long_about = "logsum scans a directory tree for note and log files (.md, .txt, .pdf, .epub), \
    infers each file's date from its filename (falling back to modification time), filters by a \
    timeframe, and condenses the result into bullet points via OpenAI, a local Ollama instance, \
    a custom endpoint, or a deterministic extraction fallback."
)]
struct Cli {
    /// Path to configuration file (TOML). Optional; defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./logsum.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Summarize matching files into bullet points.
    ///
    /// Discovers files, filters them by timeframe, aggregates their content,
    /// and runs the summarization provider chain. In auto mode the chain is
    /// OpenAI → Ollama → basic extraction, so the command always produces a
    /// summary; forcing a specific provider disables the fallback.
    Run {
        /// Directory to search for files (default: from config, else `.`).
        #[arg(long, short = 'd')]
        directory: Option<PathBuf>,

        /// Timeframe: `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`. Omit for the last
        /// 7 days.
        #[arg(long, short = 't')]
        timeframe: Option<String>,

        /// Number of bullet points to generate.
        #[arg(long, short = 'b')]
        bullets: Option<usize>,

        /// Output file path (default: print to stdout).
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Provider: `auto`, `openai`, `ollama`, `custom`, or `basic`.
        #[arg(long)]
        provider: Option<String>,

        /// OpenAI model to use.
        #[arg(long)]
        openai_model: Option<String>,

        /// Ollama model to use.
        #[arg(long)]
        ollama_model: Option<String>,

        /// Custom API endpoint URL (implies `--provider custom` when no
        /// provider is given).
        #[arg(long)]
        custom_url: Option<String>,

        /// API key for the custom endpoint (or set CUSTOM_API_KEY).
        #[arg(long)]
        custom_api_key: Option<String>,

        /// Preserve `<think>` blocks in model output instead of stripping.
        #[arg(long)]
        think: bool,
    },

    /// List candidate files with their inferred dates.
    ///
    /// Shows every discovered file, the date logsum inferred for it, and
    /// where that date came from (filename pattern, fuzzy parse, or file
    /// modification time). Useful for checking what `run` would select.
    Files {
        /// Directory to search for files (default: from config, else `.`).
        #[arg(long, short = 'd')]
        directory: Option<PathBuf>,

        /// Only list files whose inferred date falls in this timeframe.
        #[arg(long, short = 't')]
        timeframe: Option<String>,
    },
}

fn load_or_default(path: &PathBuf) -> Result<Config> {
    let mut cfg = if path.exists() {
        config::load_config(path)?
    } else {
        Config::default()
    };
    cfg.resolve_credentials();
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = load_or_default(&cli.config)?;

    match cli.command {
        Commands::Run {
            directory,
            timeframe,
            bullets,
            output: output_path,
            provider,
            openai_model,
            ollama_model,
            custom_url,
            custom_api_key,
            think,
        } => {
            if let Some(dir) = directory {
                cfg.discovery.root = dir;
            }
            if let Some(count) = bullets {
                cfg.summary.bullet_count = count;
            }
            if let Some(model) = openai_model {
                cfg.openai.model = model;
            }
            if let Some(model) = ollama_model {
                cfg.ollama.model = model;
            }
            if let Some(url) = custom_url {
                let api_key = custom_api_key
                    .or_else(|| cfg.custom.as_ref().and_then(|c| c.api_key.clone()))
                    .or_else(|| std::env::var("CUSTOM_API_KEY").ok());
                cfg.custom = Some(CustomEndpointConfig { url, api_key });
                if provider.is_none() {
                    cfg.summary.provider = "custom".to_string();
                }
            }
            if let Some(provider) = provider {
                cfg.summary.provider = provider;
            }
            if think {
                cfg.summary.preserve_thinking = true;
            }
            config::validate(&cfg)?;

            let timeframe_input = timeframe.unwrap_or_default();
            match run::run_summary(&cfg, &timeframe_input).await? {
                RunOutcome::NoFilesFound { timeframe_label } => {
                    println!("No files found for timeframe: {}", timeframe_label);
                }
                RunOutcome::Summary(report) => {
                    let rendered = output::render_markdown(&report);
                    output::write_output(output_path.as_deref(), &rendered)?;
                }
            }
        }
        Commands::Files {
            directory,
            timeframe,
        } => {
            if let Some(dir) = directory {
                cfg.discovery.root = dir;
            }
            config::validate(&cfg)?;

            let timeframe_input = timeframe.unwrap_or_default();
            let today = chrono::Utc::now().date_naive();
            let tf = logsum::timeframe::Timeframe::parse(&timeframe_input, today)?;

            let candidates = discover::scan(&cfg.discovery)?;
            let extractor = DateExtractor::new();
            let mut listed = 0usize;
            for file in &candidates {
                let inferred = extractor.infer(&file.file_name, file.modified);
                if !tf.contains(inferred.date) {
                    continue;
                }
                println!(
                    "{}  {}  ({})",
                    inferred.date.format("%Y-%m-%d"),
                    file.path.display(),
                    inferred.source.as_str()
                );
                listed += 1;
            }
            println!("{} file(s) in timeframe {}", listed, tf.describe(&timeframe_input));
        }
    }

    Ok(())
}
