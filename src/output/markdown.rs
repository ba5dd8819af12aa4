//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl runs,
//! including run counters, failures and unfamiliar coverage kinds.

use crate::output::summary::{OutputResult, RunSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// URLs listed per unfamiliar coverage label
const MAX_UNFAMILIAR_URLS: usize = 10;

/// Generates a markdown summary of a run
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let run = &summary.run;
    let totals = &run.totals;
    let mut md = String::new();

    md.push_str("# Coverage Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", run.id));
    md.push_str(&format!("- **Started**: {}\n", run.started_at));
    if let Some(finished) = &run.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", run.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Index Pages**: {}\n", totals.index_pages));
    md.push_str(&format!(
        "- **Artists Discovered**: {}\n",
        totals.artists_discovered
    ));
    md.push_str(&format!(
        "- **Artists Reconciled**: {}\n",
        totals.artists_reconciled
    ));
    md.push_str(&format!("- **Artists Failed**: {}\n", totals.artists_failed));
    md.push_str(&format!(
        "- **Coverage Records**: {}\n",
        totals.coverage_records
    ));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    if totals.extraction_warnings > 0 {
        md.push_str(&format!(
            "- **Skipped Coverage Items**: {}\n",
            totals.extraction_warnings
        ));
    }
    if totals.pagination_cycles > 0 {
        md.push_str(&format!(
            "- **Pagination Cycles**: {}\n",
            totals.pagination_cycles
        ));
    }
    md.push('\n');

    if !totals.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| Error Kind | Artists |\n");
        md.push_str("|------------|---------|\n");
        for (kind, count) in &totals.failures {
            md.push_str(&format!("| {} | {} |\n", kind, count));
        }
        md.push('\n');
    }

    if !summary.unfamiliar.is_empty() {
        md.push_str("## Unfamiliar Coverage Types\n\n");
        for (label, urls) in &summary.unfamiliar {
            md.push_str(&format!("### {} ({} artists)\n\n", label, urls.len()));
            for url in urls.iter().take(MAX_UNFAMILIAR_URLS) {
                md.push_str(&format!("- {}\n", url));
            }
            if urls.len() > MAX_UNFAMILIAR_URLS {
                md.push_str(&format!(
                    "\n... and {} more\n",
                    urls.len() - MAX_UNFAMILIAR_URLS
                ));
            }
            md.push('\n');
        }
    }

    md
}
