//! # Report Builder
//!
//! Turns the staged records into the four sheets of the results workbook
//! (`results`, `grades`, `marks`, `raw`) and writes them out as xlsx.
//!
//! Building is pure and lives in [`tables`]; [`xlsx`] owns everything that
//! touches `rust_xlsxwriter` and the filesystem.

use std::io;
use std::path::Path;

use anyhow::{Context, ensure};
use thiserror::Error;
use tracing::debug;

use resultsnap_common::record::ResultRecord;

use crate::staging::load_records;

pub mod tables;
pub mod xlsx;

pub use xlsx::write_workbook;

/// Hard limits of the xlsx format.
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLUMNS: usize = 16_384;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not serialize record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("could not write workbook: {0}")]
    Io(#[from] io::Error),

    #[error("sheet '{sheet}' has {rows} rows and {columns} columns, more than a workbook can hold")]
    TooLarge {
        sheet: &'static str,
        rows: usize,
        columns: usize,
    },
}

/// One worksheet: a header and rows of optional cells, all the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: &'static str,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub protected: bool,
}

impl Sheet {
    pub fn new(name: &'static str, columns: Vec<String>) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
            protected: false,
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).and_then(|c| c.as_deref()))
                .collect(),
        )
    }

    /// Whether the cell at worksheet position `(row, col)` is locked when the
    /// workbook is opened. Row 0 is the header.
    pub fn is_locked(&self, row: usize, col: usize) -> bool {
        self.protected && row > 0 && col > 0
    }

    fn check_bounds(&self) -> Result<(), ReportError> {
        if self.rows.len() + 1 > MAX_ROWS || self.columns.len() > MAX_COLUMNS {
            return Err(ReportError::TooLarge {
                sheet: self.name,
                rows: self.rows.len(),
                columns: self.columns.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub results: Sheet,
    pub grades: Sheet,
    pub marks: Sheet,
    pub raw: Sheet,
}

impl Report {
    pub fn from_records(records: &[ResultRecord]) -> Result<Self, ReportError> {
        let report = tables::build(records)?;
        for sheet in report.sheets() {
            sheet.check_bounds()?;
        }
        Ok(report)
    }

    /// Marks the `grades` sheet as protected: only the header row and the
    /// hallticket column stay editable.
    pub fn protect_grades(&mut self) {
        self.grades.protected = true;
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> [&Sheet; 4] {
        [&self.results, &self.grades, &self.marks, &self.raw]
    }
}

/// Builds the report for `records` and writes it to `output`.
pub fn write_report(
    records: &[ResultRecord],
    output: &Path,
    password: Option<&str>,
) -> Result<Report, ReportError> {
    let mut report = Report::from_records(records)?;
    if password.is_some() {
        report.protect_grades();
    }
    write_workbook(&report, output, password)?;
    Ok(report)
}

/// Rebuilds the workbook from everything in the staging log. Returns the
/// number of records written, or `None` when the log is still empty.
pub fn regenerate(
    staging: &Path,
    output: &Path,
    password: Option<&str>,
) -> anyhow::Result<Option<usize>> {
    let records = load_records(staging)?;
    if records.is_empty() {
        debug!("Staging log is empty, nothing to refresh");
        return Ok(None);
    }

    write_report(&records, output, password)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(Some(records.len()))
}

/// Standalone conversion of a JSON array or NDJSON file into a workbook.
/// Returns the number of records written.
pub fn convert(input: &Path, output: &Path, password: Option<&str>) -> anyhow::Result<usize> {
    ensure!(input.is_file(), "input file {} does not exist", input.display());
    regenerate(input, output, password)?
        .with_context(|| format!("no data found in {}", input.display()))
}
