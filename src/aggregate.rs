//! Content aggregation over the selected file set.
//!
//! Reads each selected file in order and collects the results into an
//! [`AggregatedContent`]. A file that cannot be read is skipped with a
//! warning and counted; whitespace-only files are dropped silently. Neither
//! case aborts the run.

use crate::extract;
use crate::models::{AggregatedContent, Section, SelectedFile};

pub fn build(selected: &[SelectedFile]) -> AggregatedContent {
    let mut aggregated = AggregatedContent::default();

    for sel in selected {
        let text = match extract::read_content(&sel.file.path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Warning: skipping file: {}", e);
                aggregated.skipped += 1;
                continue;
            }
        };

        if text.trim().is_empty() {
            continue;
        }

        aggregated.sections.push(Section {
            file_name: sel.file.file_name.clone(),
            date: sel.inferred.date,
            text,
        });
    }

    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateFile, DateSource, InferredDate};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::fs;
    use std::path::Path;

    fn selected(path: &Path, name: &str, date: NaiveDate) -> SelectedFile {
        SelectedFile {
            file: CandidateFile {
                path: path.to_path_buf(),
                file_name: name.to_string(),
                modified: Utc.with_ymd_and_hms(2025, 7, 21, 0, 0, 0).unwrap(),
            },
            inferred: InferredDate {
                date,
                source: DateSource::FilenamePattern,
            },
        }
    }

    #[test]
    fn aggregates_in_input_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = tmp.path().join("a.md");
        let b = tmp.path().join("b.txt");
        fs::write(&a, "task A done").unwrap();
        fs::write(&b, "met client").unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 7, 21).unwrap();
        let agg = build(&[selected(&a, "a.md", date), selected(&b, "b.txt", date)]);

        assert_eq!(agg.sections.len(), 2);
        assert_eq!(agg.skipped, 0);
        assert_eq!(agg.sections[0].file_name, "a.md");
        assert_eq!(agg.sections[1].file_name, "b.txt");
    }

    #[test]
    fn unreadable_file_is_skipped_and_counted() {
        let tmp = tempfile::TempDir::new().unwrap();
        let good = tmp.path().join("good.md");
        fs::write(&good, "still here").unwrap();
        let missing = tmp.path().join("gone.md");

        let date = NaiveDate::from_ymd_opt(2025, 7, 21).unwrap();
        let agg = build(&[
            selected(&missing, "gone.md", date),
            selected(&good, "good.md", date),
        ]);

        assert_eq!(agg.sections.len(), 1);
        assert_eq!(agg.skipped, 1);
        assert_eq!(agg.sections[0].file_name, "good.md");
    }

    #[test]
    fn empty_files_are_dropped_without_counting() {
        let tmp = tempfile::TempDir::new().unwrap();
        let empty = tmp.path().join("empty.md");
        fs::write(&empty, "   \n\n").unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 7, 21).unwrap();
        let agg = build(&[selected(&empty, "empty.md", date)]);
        assert!(agg.is_empty());
        assert_eq!(agg.skipped, 0);
    }
}
