//! Pipeline orchestration.
//!
//! Sequences the full flow: discover → infer dates → parse the timeframe
//! once → filter → sort → aggregate → summarize. Per-file problems degrade
//! (skip with warning); a malformed timeframe is fatal; an empty filtered
//! set short-circuits before any provider is touched.

use anyhow::Result;
use chrono::Utc;

use crate::aggregate;
use crate::config::Config;
use crate::dates::DateExtractor;
use crate::discover;
use crate::models::{ProviderKind, SelectedFile, SummaryResult};
use crate::summarize::ProviderChain;
use crate::timeframe::Timeframe;

/// Everything the output layer needs to render a report.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: SummaryResult,
    pub file_names: Vec<String>,
    pub skipped: usize,
    pub timeframe_label: String,
    pub bullet_count: usize,
}

/// Terminal state of a run. `NoFilesFound` is a distinct outcome for
/// user-facing messaging, not an error.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    NoFilesFound { timeframe_label: String },
    Summary(RunReport),
}

/// Discover candidate files, infer their dates, and keep those inside the
/// timeframe, sorted by inferred date then path.
pub fn select_files(config: &Config, timeframe: &Timeframe) -> Result<Vec<SelectedFile>> {
    let candidates = discover::scan(&config.discovery)?;
    let extractor = DateExtractor::new();

    let mut selected: Vec<SelectedFile> = candidates
        .into_iter()
        .map(|file| {
            let inferred = extractor.infer(&file.file_name, file.modified);
            SelectedFile { file, inferred }
        })
        .filter(|sel| timeframe.contains(sel.inferred.date))
        .collect();

    selected.sort_by(|a, b| {
        a.inferred
            .date
            .cmp(&b.inferred.date)
            .then_with(|| a.file.path.cmp(&b.file.path))
    });

    Ok(selected)
}

pub async fn run_summary(config: &Config, timeframe_input: &str) -> Result<RunOutcome> {
    let today = Utc::now().date_naive();
    let timeframe = Timeframe::parse(timeframe_input, today)?;
    let timeframe_label = timeframe.describe(timeframe_input);

    let selected = select_files(config, &timeframe)?;
    if selected.is_empty() {
        return Ok(RunOutcome::NoFilesFound { timeframe_label });
    }

    let aggregated = aggregate::build(&selected);

    let chain = match config.summary.provider.as_str() {
        "auto" => ProviderChain::auto(config),
        "openai" => ProviderChain::forced(ProviderKind::OpenAi, config)?,
        "ollama" => ProviderChain::forced(ProviderKind::Ollama, config)?,
        "custom" => ProviderChain::forced(ProviderKind::Custom, config)?,
        "basic" => ProviderChain::forced(ProviderKind::Basic, config)?,
        other => anyhow::bail!("Unknown summary provider: '{}'", other),
    };

    let bullet_count = config.summary.bullet_count;
    let result = chain.summarize(&aggregated, bullet_count).await?;

    Ok(RunOutcome::Summary(RunReport {
        result,
        file_names: selected.iter().map(|s| s.file.file_name.clone()).collect(),
        skipped: aggregated.skipped,
        timeframe_label,
        bullet_count,
    }))
}
