//! Timeframe parsing and inclusive date-range filtering.
//!
//! A timeframe is a closed calendar interval `[start, end]`. User input takes
//! one of four shapes, longest first: `YYYY-MM-DD` (single day), `YYYY-MM`
//! (full month), `YYYY` (full year), or the empty string (last 7 days ending
//! today). Anything else is an [`InvalidTimeframe`] error, fatal to the run —
//! a malformed timeframe is never silently replaced with a default.

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized timeframe '{0}': expected YYYY, YYYY-MM, or YYYY-MM-DD")]
pub struct InvalidTimeframe(pub String);

/// A closed date interval, or the unbounded sentinel.
///
/// `All` never results from user input (the accepted syntax always yields a
/// bounded range); it exists for library callers that want no filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    All,
    Range { start: NaiveDate, end: NaiveDate },
}

impl Timeframe {
    /// Parse user input against `today` (injected for testability).
    pub fn parse(input: &str, today: NaiveDate) -> Result<Timeframe, InvalidTimeframe> {
        let input = input.trim();

        if input.is_empty() {
            let start = today
                .checked_sub_days(Days::new(6))
                .unwrap_or(NaiveDate::MIN);
            return Ok(Timeframe::Range { start, end: today });
        }

        let err = || InvalidTimeframe(input.to_string());

        match input.len() {
            // YYYY
            4 => {
                let year: i32 = input.parse().map_err(|_| err())?;
                let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(err)?;
                let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(err)?;
                Ok(Timeframe::Range { start, end })
            }
            // YYYY-MM
            7 => {
                let (year_s, month_s) = input.split_once('-').ok_or_else(err)?;
                let year: i32 = year_s.parse().map_err(|_| err())?;
                let month: u32 = month_s.parse().map_err(|_| err())?;
                let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(err)?;
                Ok(Timeframe::Range {
                    start,
                    end: month_end(start),
                })
            }
            // YYYY-MM-DD
            10 => {
                let day = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| err())?;
                Ok(Timeframe::Range {
                    start: day,
                    end: day,
                })
            }
            _ => Err(err()),
        }
    }

    /// Inclusive containment check. Total over any date.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Timeframe::All => true,
            Timeframe::Range { start, end } => *start <= date && date <= *end,
        }
    }

    /// Human-readable label for report headers.
    pub fn describe(&self, raw_input: &str) -> String {
        match self {
            Timeframe::All => "all time".to_string(),
            Timeframe::Range { .. } if raw_input.trim().is_empty() => "last 7 days".to_string(),
            Timeframe::Range { .. } => raw_input.trim().to_string(),
        }
    }
}

/// Last day of the month containing `date`.
fn month_end(date: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // First of the next month always exists; its predecessor is the last
    // day of this one, leap years included.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}
