//! One complete run: stage every ticket, keep the workbook fresh, then write
//! the final report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info};

use resultsnap_common::config::RunConfig;
use resultsnap_common::record::ResultRecord;

use crate::fetcher::{HttpResultSource, ResultSource};
use crate::refresher::{Refresher, SnapshotTarget};
use crate::report;
use crate::runner::{self, OutcomeCallback, RunSummary};
use crate::staging::{self, StagingLog};

pub struct Pipeline {
    config: RunConfig,
    source: Arc<dyn ResultSource>,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub summary: RunSummary,
    pub records: Vec<ResultRecord>,
    pub output: PathBuf,
    pub staging: PathBuf,
}

impl Pipeline {
    pub fn new(config: RunConfig, source: Arc<dyn ResultSource>) -> Self {
        Self { config, source }
    }

    /// Pipeline backed by the real result page.
    pub fn with_http(config: RunConfig) -> anyhow::Result<Self> {
        let source = HttpResultSource::new(&config.fetch_settings())
            .context("failed to set up HTTP client")?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub async fn execute(&self, on_outcome: Option<OutcomeCallback>) -> anyhow::Result<PipelineReport> {
        let config = &self.config;

        let mut log = StagingLog::create(&config.staging).with_context(|| {
            format!("failed to create staging log {}", config.staging.display())
        })?;

        let refresher = match config.refresh_interval {
            Some(interval) => {
                let (tx, rx) = mpsc::channel(1);
                log = log.with_notifier(tx);
                let target = SnapshotTarget {
                    staging: config.staging.clone(),
                    output: config.output.clone(),
                    protect_password: config.protect_password.clone(),
                };
                debug!("Refreshing workbook every {}s", interval.as_secs());
                Some(Refresher::spawn(target, interval, rx))
            }
            None => None,
        };

        let log = Arc::new(log);
        let summary = runner::run_range(
            self.source.clone(),
            log.clone(),
            config.range,
            config.max_workers,
            on_outcome,
        )
        .await;

        // Closes the notification channel before the refresher is stopped.
        drop(log);
        if let Some(refresher) = refresher {
            if let Some(snapshots) = refresher.stop().await {
                debug!("Background refresher wrote {snapshots} snapshots");
            }
        }

        let records = staging::load_records(&config.staging)?;
        info!("Building workbook from {} records", records.len());

        let password = config.protect_password.clone();
        let output = config.output.clone();
        let snapshot = records.clone();
        tokio::task::spawn_blocking(move || {
            report::write_report(&snapshot, &output, password.as_deref())
        })
        .await
        .context("workbook task failed")?
        .with_context(|| format!("failed to write {}", config.output.display()))?;

        Ok(PipelineReport {
            summary,
            records,
            output: config.output.clone(),
            staging: config.staging.clone(),
        })
    }
}
