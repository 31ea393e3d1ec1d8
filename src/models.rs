//! Core data models used throughout logsum.
//!
//! These types represent the files, inferred dates, aggregated content, and
//! summary results that flow through the discovery and summarization pipeline.
//! All of them are built once and never mutated afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;

/// A file produced by discovery, before any date inference.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// File name including extension, as it appears on disk.
    pub file_name: String,
    /// Filesystem modification timestamp.
    pub modified: DateTime<Utc>,
}

/// Where an inferred date came from.
///
/// Variants are listed from highest to lowest confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// A rigid date pattern matched inside the filename.
    FilenamePattern,
    /// A natural-language-tolerant parse of the filename succeeded.
    FuzzyParse,
    /// Fell back to the file's modification timestamp.
    FileMetadata,
}

impl DateSource {
    /// Ordinal confidence: higher is more trustworthy.
    pub fn confidence(&self) -> u8 {
        match self {
            DateSource::FilenamePattern => 2,
            DateSource::FuzzyParse => 1,
            DateSource::FileMetadata => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateSource::FilenamePattern => "filename",
            DateSource::FuzzyParse => "fuzzy",
            DateSource::FileMetadata => "mtime",
        }
    }
}

/// Best-guess calendar date for a file, with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

/// A candidate file that passed the timeframe filter, paired with its date.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file: CandidateFile,
    pub inferred: InferredDate,
}

/// One file's extracted text within the aggregate.
#[derive(Debug, Clone)]
pub struct Section {
    pub file_name: String,
    pub date: NaiveDate,
    pub text: String,
}

/// Ordered file contents with provenance delimiters, ready for summarization.
///
/// Section order matches the selected-file ordering (date ascending, then
/// path). `skipped` counts files that could not be read and were dropped.
#[derive(Debug, Clone, Default)]
pub struct AggregatedContent {
    pub sections: Vec<Section>,
    pub skipped: usize,
}

impl AggregatedContent {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Renders all sections into one string with `=== name (date) ===`
    /// delimiter lines between files.
    pub fn combined(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&format!(
                "=== {} ({}) ===\n{}",
                section.file_name,
                section.date.format("%Y-%m-%d"),
                section.text
            ));
        }
        out
    }
}

/// Identifies a summarization backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    Custom,
    Basic,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Custom => "custom",
            ProviderKind::Basic => "basic",
        };
        write!(f, "{}", name)
    }
}

/// Terminal artifact of a summarization run.
#[derive(Debug, Clone)]
pub struct SummaryResult {
    /// Bullet lines, without leading bullet markers.
    pub bullets: Vec<String>,
    /// The provider that actually produced the bullets.
    pub provider: ProviderKind,
    /// True when the provider used is not the first one attempted, or is
    /// the basic-extraction fallback.
    pub degraded: bool,
}
