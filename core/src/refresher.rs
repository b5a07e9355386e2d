//! Background task that keeps the workbook current while a run is going.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::report;

/// How long [`Refresher::stop`] waits for an in-progress refresh.
pub const STOP_GRACE: Duration = Duration::from_secs(5);

/// Where the refresher reads from and writes to.
#[derive(Debug, Clone)]
pub struct SnapshotTarget {
    pub staging: PathBuf,
    pub output: PathBuf,
    pub protect_password: Option<String>,
}

pub struct Refresher {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<usize>,
}

impl Refresher {
    /// Starts the loop. It wakes on a message from `new_data` or after
    /// `interval`, whichever comes first.
    pub fn spawn(target: SnapshotTarget, interval: Duration, new_data: mpsc::Receiver<()>) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(refresh_loop(target, interval, new_data, stop_rx));
        Self { stop_tx, handle }
    }

    /// Signals the loop to finish and waits up to [`STOP_GRACE`]. Returns the
    /// number of snapshots written, or `None` if the task did not end cleanly.
    pub async fn stop(self) -> Option<usize> {
        let _ = self.stop_tx.send(());
        let mut handle = self.handle;

        match tokio::time::timeout(STOP_GRACE, &mut handle).await {
            Ok(Ok(written)) => Some(written),
            Ok(Err(e)) => {
                error!("Refresher task failed: {e}");
                None
            }
            Err(_) => {
                warn!("Refresher did not stop within {}s", STOP_GRACE.as_secs());
                handle.abort();
                None
            }
        }
    }
}

async fn refresh_loop(
    target: SnapshotTarget,
    interval: Duration,
    mut new_data: mpsc::Receiver<()>,
    mut stop_rx: oneshot::Receiver<()>,
) -> usize {
    let mut written = 0;

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            msg = new_data.recv() => {
                if msg.is_none() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {}
        }

        while new_data.try_recv().is_ok() {}

        let job = target.clone();
        let refreshed = tokio::task::spawn_blocking(move || {
            report::regenerate(&job.staging, &job.output, job.protect_password.as_deref())
        })
        .await;

        match refreshed {
            Ok(Ok(Some(count))) => {
                written += 1;
                info!("Workbook refreshed with {count} records");
            }
            Ok(Ok(None)) => debug!("Nothing staged yet"),
            Ok(Err(e)) => error!("Workbook refresh failed: {e:#}"),
            Err(e) => error!("Workbook refresh task failed: {e}"),
        }
    }

    debug!("Refresher stopped after {written} snapshots");
    written
}
