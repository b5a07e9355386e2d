use std::path::Path;
use std::time::Duration;

use colored::*;
use resultsnap_common::range::TicketRange;
use resultsnap_core::runner::RunSummary;

use crate::terminal::colors;

type Detail = (String, ColoredString);

pub fn range_to_detail(range: &TicketRange) -> Detail {
    let value = format!("{} → {} ({} tickets)", range.start, range.end, range.len());
    ("Range".to_string(), value.color(colors::ACCENT))
}

pub fn summary_to_details(summary: &RunSummary, output: &Path, staging: &Path) -> Vec<Detail> {
    vec![
        (
            "Saved".to_string(),
            summary.saved.to_string().color(colors::SAVED).bold(),
        ),
        (
            "No result".to_string(),
            summary.no_result.to_string().color(colors::NO_RESULT).bold(),
        ),
        (
            "Failed".to_string(),
            summary.failed.to_string().color(colors::FAILED).bold(),
        ),
        ("Workbook".to_string(), output.display().to_string().normal()),
        ("Staging".to_string(), staging.display().to_string().dimmed()),
    ]
}

pub fn elapsed(total_time: Duration) -> ColoredString {
    format!("{:.2}s", total_time.as_secs_f64()).bold().yellow()
}
