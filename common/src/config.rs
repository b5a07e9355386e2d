use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::range::TicketRange;

pub const DEFAULT_START_HT: u64 = 110624861001;
pub const DEFAULT_END_HT: u64 = 110624861064;
pub const DEFAULT_MAX_WORKERS: usize = 15;
pub const DEFAULT_OUTPUT_FILE: &str = "ou_results.xlsx";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const USER_AGENT: &str = "Mozilla/5.0";

pub const WORKBOOK_EXTENSION: &str = "xlsx";
pub const STAGING_EXTENSION: &str = "ndjson";

/// Everything a run needs, fixed before the first request goes out.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Result page the search form is posted to.
    pub url: String,
    pub range: TicketRange,
    /// Upper bound on concurrent requests.
    pub max_workers: usize,
    /// Final workbook. Always ends in `.xlsx`.
    pub output: PathBuf,
    /// NDJSON staging log next to `output`.
    pub staging: PathBuf,
    /// Period of the background workbook refresh, `None` disables it.
    pub refresh_interval: Option<Duration>,
    /// Protects the `grades` sheet when set.
    pub protect_password: Option<String>,
}

impl RunConfig {
    pub fn new(url: impl Into<String>, range: TicketRange, output: impl AsRef<Path>) -> Self {
        let output = coerce_workbook_path(output.as_ref());
        let staging = staging_path_for(&output);
        Self {
            url: url.into(),
            range,
            max_workers: DEFAULT_MAX_WORKERS,
            output,
            staging,
            refresh_interval: Some(Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS)),
            protect_password: None,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_protect_password(mut self, password: Option<String>) -> Self {
        self.protect_password = password.filter(|p| !p.is_empty());
        self
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            url: self.url.clone(),
            ..FetchSettings::default()
        }
    }
}

/// Request-level knobs of the HTTP result source.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            user_agent: USER_AGENT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

pub fn has_workbook_extension(path: &Path) -> bool {
    path.to_string_lossy()
        .to_ascii_lowercase()
        .ends_with(&format!(".{WORKBOOK_EXTENSION}"))
}

/// Appends `.xlsx` unless the path already carries it (any case).
pub fn coerce_workbook_path(path: &Path) -> PathBuf {
    if has_workbook_extension(path) {
        return path.to_path_buf();
    }
    let mut raw = path.as_os_str().to_owned();
    raw.push(format!(".{WORKBOOK_EXTENSION}"));
    PathBuf::from(raw)
}

pub fn staging_path_for(output: &Path) -> PathBuf {
    output.with_extension(STAGING_EXTENSION)
}
