use std::sync::Arc;

use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use resultsnap_core::runner::{Outcome, OutcomeCallback, TicketOutcome};

use crate::terminal::colors;

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] {wide_bar:.green/black} {pos}/{len} {msg}",
    )
    .expect("progress template is valid")
    .tick_strings(&[
        "▁▁▁▁▁",
        "▁▂▂▂▁",
        "▁▄▂▄▁",
        "▂▄▆▄▂",
        "▄▆█▆▄",
        "▂▄▆▄▂",
        "▁▄▂▄▁",
        "▁▂▂▂▁",
    ])
    .progress_chars("━╸ ")
}

/// Turns `span` into a progress bar over `total` tickets.
pub fn attach_bar(span: &Span, total: u64) {
    span.pb_set_style(&bar_style());
    span.pb_set_length(total);
}

/// Advances the bar once per finished ticket and names the last one.
pub fn ticket_progress(span: Span) -> OutcomeCallback {
    Arc::new(move |outcome: &TicketOutcome| {
        span.pb_inc(1);
        span.pb_set_message(&describe(outcome).to_string());
    })
}

fn describe(outcome: &TicketOutcome) -> ColoredString {
    let color = match outcome.outcome {
        Outcome::Saved => colors::SAVED,
        Outcome::NoResult => colors::NO_RESULT,
        Outcome::Failed => colors::FAILED,
    };
    outcome.hallticket.color(color)
}
