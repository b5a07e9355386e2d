//! # Worker Pool
//!
//! Runs one fetch task per hall ticket with a fixed concurrency limit. Every
//! task ends with exactly one record in the staging log: the parsed result, or
//! a placeholder saying why there is none.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use resultsnap_common::range::TicketRange;
use resultsnap_common::record::{RecordStatus, ResultRecord};

use crate::fetcher::ResultSource;
use crate::staging::StagingLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A result page was parsed and stored.
    Saved,
    /// The page had no result, a `NO_RESULT` placeholder was stored.
    NoResult,
    /// The request or the append failed.
    Failed,
}

#[derive(Debug, Clone)]
pub struct TicketOutcome {
    pub hallticket: String,
    pub outcome: Outcome,
}

/// Invoked after each ticket is appended. Called from worker tasks.
pub type OutcomeCallback = Arc<dyn Fn(&TicketOutcome) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub no_result: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.saved + self.no_result + self.failed
    }

    fn tally(&mut self, joined: Result<Outcome, JoinError>) {
        match joined {
            Ok(Outcome::Saved) => self.saved += 1,
            Ok(Outcome::NoResult) => self.no_result += 1,
            Ok(Outcome::Failed) => self.failed += 1,
            Err(e) => {
                error!("Worker task died: {e}");
                self.failed += 1;
            }
        }
    }
}

/// Fetches every ticket of `range` with at most `max_workers` requests in
/// flight and waits for all of them.
pub async fn run_range(
    source: Arc<dyn ResultSource>,
    log: Arc<StagingLog>,
    range: TicketRange,
    max_workers: usize,
    on_outcome: Option<OutcomeCallback>,
) -> RunSummary {
    let start_time = Instant::now();
    let permits = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks: JoinSet<Outcome> = JoinSet::new();
    let mut summary = RunSummary::default();

    for hallticket in range.tickets() {
        // The semaphore is never closed.
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let source = source.clone();
        let log = log.clone();
        let on_outcome = on_outcome.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let result = process_ticket(source.as_ref(), log, hallticket).await;
            if let Some(callback) = on_outcome {
                callback(&result);
            }
            result.outcome
        });

        while let Some(joined) = tasks.try_join_next() {
            summary.tally(joined);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        summary.tally(joined);
    }

    summary.elapsed = start_time.elapsed();
    summary
}

async fn process_ticket(
    source: &dyn ResultSource,
    log: Arc<StagingLog>,
    hallticket: String,
) -> TicketOutcome {
    debug!("Fetching {hallticket} ...");

    let (record, mut outcome) = match source.lookup(&hallticket).await {
        Ok(Some(record)) => (record, Outcome::Saved),
        Ok(None) => (
            ResultRecord::placeholder(&hallticket, RecordStatus::NoResult),
            Outcome::NoResult,
        ),
        Err(e) => {
            error!("✖ ERROR {hallticket}: {e}");
            (
                ResultRecord::placeholder(&hallticket, RecordStatus::FetchFailed),
                Outcome::Failed,
            )
        }
    };

    match tokio::task::spawn_blocking(move || log.append(&record)).await {
        Ok(Ok(())) => match outcome {
            Outcome::Saved => info!("✔ SAVED {hallticket}"),
            Outcome::NoResult => warn!("⚠ NO RESULT {hallticket}, placeholder saved"),
            Outcome::Failed => warn!("Placeholder saved for {hallticket}"),
        },
        Ok(Err(e)) => {
            error!("✖ Could not stage {hallticket}: {e}");
            outcome = Outcome::Failed;
        }
        Err(e) => {
            error!("✖ Could not stage {hallticket}: {e}");
            outcome = Outcome::Failed;
        }
    }

    TicketOutcome { hallticket, outcome }
}
