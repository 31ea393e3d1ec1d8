//! Filename date inference.
//!
//! Note and log files name their dates in wildly inconsistent ways
//! (`daily_log_2025-07-21.md`, `notes_21-07-2025.txt`, `journal July 21 2025`,
//! or not at all). [`DateExtractor::infer`] resolves each filename to a single
//! best-guess calendar date by trying strategies in decreasing confidence:
//!
//! 1. An ordered list of rigid date patterns. The list order is the
//!    precedence policy; within one pattern, matches are tried left to right
//!    and the first that parses to a valid date wins.
//! 2. A fuzzy parse tolerating month names and loose separators.
//! 3. The file's modification timestamp.
//!
//! The function is total: it never fails and never inspects the file itself,
//! so the same `(file_name, modified)` pair always yields the same result.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;

use crate::models::{DateSource, InferredDate};

/// Sanity bound for fuzzy parses: reject dates further than this many years
/// from today in either direction.
const FUZZY_MAX_YEARS: i32 = 100;

/// How the numeric fields of a matched pattern map onto a date.
#[derive(Debug, Clone, Copy)]
enum FieldOrder {
    /// Year, month, day (ISO-style shapes).
    Ymd,
    /// Day, month, year. If day-first does not form a valid date the two
    /// leading fields are retried swapped (month-first), so `07-21-2025`
    /// still resolves to July 21.
    Dmy,
    /// Eight contiguous digits read as `YYYYMMDD`.
    Compact,
}

pub struct DateExtractor {
    /// (pattern, field order), in precedence order.
    patterns: Vec<(Regex, FieldOrder)>,
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DateExtractor {
    pub fn new() -> Self {
        // Word boundaries are useless here: `_` is a word character, so
        // `log_2025-07-21` has no boundary before the year. Patterns are
        // unanchored and validation happens at parse time instead.
        Self {
            patterns: vec![
                (Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap(), FieldOrder::Ymd),
                (Regex::new(r"(\d{4})_(\d{2})_(\d{2})").unwrap(), FieldOrder::Ymd),
                (Regex::new(r"(\d{2})-(\d{2})-(\d{4})").unwrap(), FieldOrder::Dmy),
                (Regex::new(r"(\d{2})/(\d{2})/(\d{4})").unwrap(), FieldOrder::Dmy),
                (Regex::new(r"(\d{2})_(\d{2})_(\d{4})").unwrap(), FieldOrder::Dmy),
                (Regex::new(r"(\d{8})").unwrap(), FieldOrder::Compact),
            ],
        }
    }

    /// Infer the effective date for a file. Total — always returns a value.
    pub fn infer(&self, file_name: &str, modified: DateTime<Utc>) -> InferredDate {
        let stem = strip_extension(file_name);

        if let Some(date) = self.match_patterns(stem) {
            return InferredDate {
                date,
                source: DateSource::FilenamePattern,
            };
        }

        if let Some(date) = fuzzy_parse(stem, Utc::now().date_naive()) {
            return InferredDate {
                date,
                source: DateSource::FuzzyParse,
            };
        }

        InferredDate {
            date: modified.date_naive(),
            source: DateSource::FileMetadata,
        }
    }

    fn match_patterns(&self, stem: &str) -> Option<NaiveDate> {
        for (pattern, order) in &self.patterns {
            for caps in pattern.captures_iter(stem) {
                if let Some(date) = parse_capture(&caps, *order) {
                    return Some(date);
                }
            }
        }
        None
    }
}

fn parse_capture(caps: &regex::Captures<'_>, order: FieldOrder) -> Option<NaiveDate> {
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    match order {
        FieldOrder::Ymd => {
            let (y, m, d) = (field(1)?, field(2)?, field(3)?);
            NaiveDate::from_ymd_opt(y as i32, m, d)
        }
        FieldOrder::Dmy => {
            let (a, b, y) = (field(1)?, field(2)?, field(3)?);
            // Day-first is the fixed resolution for ambiguous NN-NN shapes;
            // month-first only rescues otherwise-invalid dates.
            NaiveDate::from_ymd_opt(y as i32, b, a)
                .or_else(|| NaiveDate::from_ymd_opt(y as i32, a, b))
        }
        FieldOrder::Compact => {
            let digits = field(1)?;
            let (y, m, d) = (digits / 10_000, digits / 100 % 100, digits % 100);
            // Eight digits match many non-date runs; only accept plausible years.
            if !(1900..=2100).contains(&y) {
                return None;
            }
            NaiveDate::from_ymd_opt(y as i32, m, d)
        }
    }
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Natural-language-tolerant parse: an English month name with an adjacent
/// 1–2 digit day and a 4-digit year anywhere in the name. The day defaults
/// to the 1st when absent. Dates more than [`FUZZY_MAX_YEARS`] from `today`
/// are rejected as implausible.
fn fuzzy_parse(stem: &str, today: NaiveDate) -> Option<NaiveDate> {
    let tokens: Vec<&str> = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let month_idx = tokens.iter().position(|t| month_number(t).is_some())?;
    let month = month_number(tokens[month_idx])?;

    let year = tokens
        .iter()
        .find_map(|t| {
            (t.len() == 4)
                .then(|| t.parse::<i32>().ok())
                .flatten()
        })?;

    // Prefer a day token right after the month name ("July 21"), then right
    // before it ("21 July").
    let day = [month_idx + 1, month_idx.wrapping_sub(1)]
        .iter()
        .filter_map(|&i| tokens.get(i))
        .find_map(|t| {
            if t.len() > 2 {
                return None;
            }
            t.parse::<u32>().ok().filter(|d| (1..=31).contains(d))
        })
        .unwrap_or(1);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let distance = (date.year() - today.year()).abs();
    if distance > FUZZY_MAX_YEARS {
        return None;
    }
    Some(date)
}

fn month_number(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    let month = match lower.as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
