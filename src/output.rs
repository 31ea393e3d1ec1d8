//! Report rendering and writing.
//!
//! Renders a [`RunReport`] into a Markdown document and writes it to stdout
//! or a file. Layout only; the summary content is fixed upstream.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;

use crate::run::RunReport;

pub fn render_markdown(report: &RunReport) -> String {
    let mut out = String::from("# Log Summary\n\n");
    out.push_str(&format!(
        "**Generated:** {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("**Timeframe:** {}\n", report.timeframe_label));
    out.push_str(&format!("**Files processed:** {}\n", report.file_names.len()));
    out.push_str(&format!("**Files:** {}\n", report.file_names.join(", ")));
    if report.skipped > 0 {
        out.push_str(&format!("**Files skipped (unreadable):** {}\n", report.skipped));
    }
    out.push_str(&format!(
        "**Provider:** {}{}\n",
        report.result.provider,
        if report.result.degraded { " (degraded)" } else { "" }
    ));
    out.push_str(&format!(
        "\n## Summary ({} key points)\n\n",
        report.bullet_count
    ));
    for bullet in &report.result.bullets {
        out.push_str(&format!("• {}\n", bullet));
    }
    out
}

pub fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!("Summary saved to: {}", path.display());
        }
        None => {
            println!("{}", rendered);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProviderKind, SummaryResult};

    fn report() -> RunReport {
        RunReport {
            result: SummaryResult {
                bullets: vec!["task A done".to_string(), "met client".to_string()],
                provider: ProviderKind::Basic,
                degraded: true,
            },
            file_names: vec!["a.md".to_string(), "b.txt".to_string()],
            skipped: 1,
            timeframe_label: "2025-07".to_string(),
            bullet_count: 5,
        }
    }

    #[test]
    fn renders_header_and_bullets() {
        let rendered = render_markdown(&report());
        assert!(rendered.contains("**Timeframe:** 2025-07"));
        assert!(rendered.contains("**Files processed:** 2"));
        assert!(rendered.contains("**Files:** a.md, b.txt"));
        assert!(rendered.contains("**Files skipped (unreadable):** 1"));
        assert!(rendered.contains("**Provider:** basic (degraded)"));
        assert!(rendered.contains("## Summary (5 key points)"));
        assert!(rendered.contains("• task A done"));
        assert!(rendered.contains("• met client"));
    }

    #[test]
    fn writes_to_file_creating_parents() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reports/summary.md");
        write_output(Some(path.as_path()), "content").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }
}
