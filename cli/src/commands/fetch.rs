use std::time::Duration;

use anyhow::Context;
use colored::*;
use console::Term;
use tracing::{Instrument, info_span, warn};

use resultsnap_common::config::{
    DEFAULT_END_HT, DEFAULT_START_HT, RunConfig, has_workbook_extension,
};
use resultsnap_common::range::TicketRange;
use resultsnap_common::success;
use resultsnap_core::{Pipeline, PipelineReport};

use crate::commands::FetchArgs;
use crate::mprint;
use crate::terminal::{colors, format, print, progress, prompt};

pub async fn fetch(args: FetchArgs, quiet: u8) -> anyhow::Result<()> {
    let term = Term::stdout();
    let config = build_config(args, &term)?;
    print_plan(&config, quiet);

    let pipeline = Pipeline::with_http(config)?;
    let range = pipeline.config().range;

    let span = info_span!("fetch", indicatif.pb_show = true);
    progress::attach_bar(&span, range.len());
    let on_outcome = progress::ticket_progress(span.clone());

    let report = pipeline
        .execute(Some(on_outcome))
        .instrument(span.clone())
        .await?;
    drop(span);

    fetch_ends(&report, quiet);
    Ok(())
}

fn build_config(args: FetchArgs, term: &Term) -> anyhow::Result<RunConfig> {
    let url = match args.url.as_deref() {
        Some(url) => prompt::parse_url(url)?,
        None => prompt::ask_url(term)?,
    };
    let range = resolve_range(&args, term)?;

    if !has_workbook_extension(&args.output) {
        warn!(
            "Output {} does not end in .xlsx, appending it",
            args.output.display()
        );
    }

    let refresh = (!args.no_auto_excel).then(|| Duration::from_secs(args.auto_excel_interval.max(1)));

    Ok(RunConfig::new(url, range, &args.output)
        .with_max_workers(args.max_workers)
        .with_refresh_interval(refresh)
        .with_protect_password(args.protect_password))
}

fn resolve_range(args: &FetchArgs, term: &Term) -> anyhow::Result<TicketRange> {
    if let Some(range) = args.range {
        return Ok(range);
    }

    let start = match args.start {
        Some(start) => start,
        None => prompt::ask_ticket(term, "Start hall ticket", DEFAULT_START_HT)?,
    };
    let end = match args.end {
        Some(end) => end,
        None => prompt::ask_ticket(term, "End hall ticket", DEFAULT_END_HT.max(start))?,
    };
    let end = prompt::ask_end_after(term, start, end)?;

    TicketRange::new(start, end).context("invalid hall ticket range")
}

fn print_plan(config: &RunConfig, quiet: u8) {
    print::header("fetching results", quiet);
    if quiet > 0 {
        return;
    }

    let (key, range) = format::range_to_detail(&config.range);
    let refresh = match config.refresh_interval {
        Some(interval) => format!("every {}s", interval.as_secs()).normal(),
        None => "off".dimmed(),
    };
    let protected = match config.protect_password {
        Some(_) => "grades sheet".normal(),
        None => "off".dimmed(),
    };

    let width = 10;
    print::aligned_line("Target", config.url.as_str().color(colors::ACCENT), width);
    print::aligned_line(&key, range, width);
    print::aligned_line("Workers", config.max_workers, width);
    print::aligned_line("Workbook", config.output.display(), width);
    print::aligned_line("Refresh", refresh, width);
    print::aligned_line("Protection", protected, width);
    mprint!();
}

fn fetch_ends(report: &PipelineReport, quiet: u8) {
    let summary = &report.summary;
    let total: ColoredString = format!("{} tickets", summary.total()).bold().green();
    let output: String = format!(
        "Fetch Complete: {total} processed in {}",
        format::elapsed(summary.elapsed)
    )
    .color(colors::TEXT_DEFAULT)
    .to_string();

    match quiet {
        0 => {
            print::header("Run Summary", quiet);
            print::as_tree_one_level(&format::summary_to_details(
                summary,
                &report.output,
                &report.staging,
            ));
            print::fat_separator();
            print::centerln(&output);
        }
        _ => success!(
            "{output} ({} saved, {} no result, {} failed) -> {}",
            summary.saved,
            summary.no_result,
            summary.failed,
            report.output.display()
        ),
    }
}
