//! # logsum
//!
//! A local-first note and log summarizer with pluggable AI backends.
//!
//! logsum scans a directory for note/log files (`.md`, `.txt`, `.pdf`,
//! `.epub`), infers each file's effective date from its filename (falling
//! back to the modification timestamp), filters by a user timeframe, and
//! condenses the selected content into bullet points through a fallback
//! chain of summarization providers.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌───────────┐   ┌────────────┐
//! │ Discover │──▶│ Infer date │──▶│ Timeframe │──▶│ Aggregate   │
//! │ fs globs │   │ per file   │   │ filter    │   │ + delimit   │
//! └──────────┘   └───────────┘   └───────────┘   └─────┬──────┘
//!                                                      ▼
//!                                   OpenAI ─▶ Ollama ─▶ Basic extraction
//!                                   (fallback chain, never fails overall)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! logsum run                          # last 7 days, 5 bullets, auto provider
//! logsum run --timeframe 2025-05      # all of May 2025
//! logsum run --provider basic         # no network, deterministic extraction
//! logsum files --timeframe 2025       # list candidates with inferred dates
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credential resolution |
//! | [`models`] | Core data types |
//! | [`dates`] | Filename date inference |
//! | [`timeframe`] | Timeframe parsing and range filtering |
//! | [`discover`] | Filesystem discovery |
//! | [`extract`] | Plain/PDF/EPUB text extraction |
//! | [`aggregate`] | Content aggregation with provenance delimiters |
//! | [`summarize`] | Provider abstraction and fallback chain |
//! | [`run`] | Pipeline orchestration |
//! | [`output`] | Report rendering and writing |

pub mod aggregate;
pub mod config;
pub mod dates;
pub mod discover;
pub mod extract;
pub mod models;
pub mod output;
pub mod run;
pub mod summarize;
pub mod timeframe;
