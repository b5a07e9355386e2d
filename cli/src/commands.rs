pub mod convert;
pub mod fetch;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use resultsnap_common::config::{
    DEFAULT_MAX_WORKERS, DEFAULT_OUTPUT_FILE, DEFAULT_REFRESH_INTERVAL_SECS,
};
use resultsnap_common::range::TicketRange;

#[derive(Parser)]
#[command(name = "resultsnap")]
#[command(version, about = "Collects exam results over a hall-ticket range into a workbook.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less console output, repeat for even less
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch results for a range of hall tickets
    #[command(alias = "f")]
    Fetch(FetchArgs),
    /// Convert a JSON or NDJSON results file to a workbook
    #[command(alias = "c")]
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Result page the search form is posted to
    #[arg(long)]
    pub url: Option<String>,

    /// First hall ticket
    #[arg(long, conflicts_with = "range")]
    pub start: Option<u64>,

    /// Last hall ticket, inclusive
    #[arg(long, conflicts_with = "range")]
    pub end: Option<u64>,

    /// START-END, the end may be abbreviated (110624861001-64)
    #[arg(long)]
    pub range: Option<TicketRange>,

    /// Concurrent requests
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,

    /// Workbook to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Do not refresh the workbook while fetching
    #[arg(long)]
    pub no_auto_excel: bool,

    /// Seconds between background workbook refreshes
    #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL_SECS)]
    pub auto_excel_interval: u64,

    /// Protect the grades sheet with this password
    #[arg(long)]
    pub protect_password: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// JSON array or NDJSON file of results
    pub input: PathBuf,

    /// Workbook to write, defaults to INPUT with an .xlsx extension
    pub output: Option<PathBuf>,

    /// Protect the grades sheet with this password
    #[arg(long)]
    pub protect_password: Option<String>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
