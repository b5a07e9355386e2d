//! # Staging Log
//!
//! The run's durable source of truth: newline-delimited JSON, one
//! [`ResultRecord`] per line, synced to disk after every append. The workbook
//! is always derived from this file and can be rebuilt from it at any time.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use resultsnap_common::record::ResultRecord;

/// Append-only record log shared by all fetch workers.
///
/// Appends are serialized by an internal lock, so concurrent callers never
/// interleave partial lines.
pub struct StagingLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    appended: AtomicUsize,
    notifier: Option<Sender<()>>,
}

impl StagingLog {
    /// Creates the log, truncating whatever a previous run left behind.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            appended: AtomicUsize::new(0),
            notifier: None,
        })
    }

    /// Signals `notifier` after every append. Signals coalesce: a full channel
    /// already means "new data".
    pub fn with_notifier(mut self, notifier: Sender<()>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended since the log was created.
    pub fn len(&self) -> usize {
        self.appended.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes one record as a JSON line, flushes and syncs it.
    ///
    /// Blocks on disk I/O; call from a blocking context.
    pub fn append(&self, record: &ResultRecord) -> io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        {
            let mut writer = self
                .writer
                .lock()
                .map_err(|_| io::Error::other("staging log lock poisoned"))?;
            writer.write_all(line.as_bytes())?;
            writer.flush()?;
            // Best effort, some filesystems do not support it.
            if let Err(e) = writer.get_ref().sync_data() {
                debug!("sync of {} failed: {e}", self.path.display());
            }
        }

        self.appended.fetch_add(1, Ordering::Relaxed);
        if let Some(notifier) = &self.notifier {
            let _ = notifier.try_send(());
        }
        Ok(())
    }
}

/// Reads every record from a staging log or a JSON array file.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<ResultRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading records from {}", path.display()))?;
    parse_records(&text).with_context(|| format!("parsing records from {}", path.display()))
}

/// Parses NDJSON or a JSON array of records.
///
/// Malformed NDJSON lines and array elements that are not records are skipped;
/// a file starting with `[` that is not a JSON array at all is an error.
pub fn parse_records(text: &str) -> anyhow::Result<Vec<ResultRecord>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if text.starts_with('[') {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(text).context("input is not a valid JSON array")?;
        let records = values
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping array element {idx}: {e}");
                    None
                }
            })
            .collect();
        return Ok(records);
    }

    let records = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed line {}: {e}", idx + 1);
                None
            }
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resultsnap_common::record::RecordStatus;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn placeholder(ticket: u64) -> ResultRecord {
        ResultRecord::placeholder(ticket.to_string(), RecordStatus::NoResult)
    }

    #[test]
    fn create_truncates_previous_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ou_results.ndjson");
        fs::write(&path, "{\"student\":{\"hallticket\":\"old\"}}\n").unwrap();

        let log = StagingLog::create(&path).unwrap();

        assert!(log.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn appended_records_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("run.ndjson");
        let log = StagingLog::create(&path).unwrap();

        for ticket in [110624861002, 110624861001, 110624861003] {
            log.append(&placeholder(ticket)).unwrap();
        }

        let records = load_records(&path).unwrap();
        let tickets: BTreeSet<&str> = records.iter().map(|r| r.hallticket()).collect();

        assert_eq!(log.len(), 3);
        assert_eq!(
            tickets,
            BTreeSet::from(["110624861001", "110624861002", "110624861003"])
        );
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn concurrent_appends_never_interleave() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.ndjson");
        let log = Arc::new(StagingLog::create(&path).unwrap());

        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.append(&placeholder(worker * 100 + i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 200);
        assert!(text
            .lines()
            .all(|line| serde_json::from_str::<ResultRecord>(line).is_ok()));
    }

    #[test]
    fn append_signals_notifier_without_blocking() {
        let dir = TempDir::new().unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::channel(1);
        let log = StagingLog::create(dir.path().join("run.ndjson"))
            .unwrap()
            .with_notifier(tx);

        log.append(&placeholder(1)).unwrap();
        log.append(&placeholder(2)).unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn parse_skips_blank_and_malformed_lines() {
        let text = "\n{\"student\":{\"hallticket\":\"1\"},\"marks\":[],\"result\":null}\nnot json\n\n{\"student\":{\"hallticket\":\"2\"}}\n";
        let records = parse_records(text).unwrap();
        let tickets: Vec<&str> = records.iter().map(|r| r.hallticket()).collect();
        assert_eq!(tickets, vec!["1", "2"]);
    }

    #[test]
    fn parse_accepts_json_array() {
        let text = r#"[{"student":{"hallticket":"9"},"marks":[],"result":"PASSED"}, {"oops":1}]"#;
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result.as_deref(), Some("PASSED"));
    }

    #[test]
    fn parse_rejects_broken_array_and_accepts_empty() {
        assert!(parse_records("[{\"student\":").is_err());
        assert!(parse_records("  \n").unwrap().is_empty());
    }
}
