//! # Result Records
//!
//! One [`ResultRecord`] exists per hall ticket processed in a run. Records are
//! created by a fetch worker, appended once to the staging log and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};

/// Personal details block of a result page.
///
/// Only `hallticket` is guaranteed; placeholders carry nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub hallticket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl StudentRecord {
    pub fn new(hallticket: impl Into<String>) -> Self {
        Self {
            hallticket: hallticket.into(),
            gender: None,
            name: None,
            father: None,
            course: None,
        }
    }
}

/// One row of the marks table. `credits` stays a string, the page is not
/// consistent about number formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkEntry {
    pub code: String,
    pub subject: String,
    pub credits: String,
    pub grade: String,
}

/// Why a record carries no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// The page was reachable but did not contain a result.
    NoResult,
    /// The request itself failed (timeout, connection reset, ...).
    FetchFailed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::NoResult => "NO_RESULT",
            RecordStatus::FetchFailed => "FETCH_FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub student: StudentRecord,
    #[serde(default)]
    pub marks: Vec<MarkEntry>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

impl ResultRecord {
    /// A record standing in for a ticket without retrievable data.
    pub fn placeholder(hallticket: impl Into<String>, status: RecordStatus) -> Self {
        Self {
            student: StudentRecord::new(hallticket),
            marks: Vec::new(),
            result: None,
            status: Some(status),
        }
    }

    pub fn hallticket(&self) -> &str {
        &self.student.hallticket
    }

    pub fn is_placeholder(&self) -> bool {
        self.status.is_some()
    }
}
