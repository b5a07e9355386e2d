//! # Result Page Parser
//!
//! The result page is hand-written HTML with three tables that carry data,
//! told apart only by their `id`:
//!
//! * `AutoNumber3`: personal details, label/value pairs laid out in rows 1-3.
//! * `AutoNumber4`: one mark per row from the third row on.
//! * `AutoNumber5`: the final result in the third cell of the third row.
//!
//! The parser is a pure function. Anything that does not look like a result
//! page is reported as absent rather than as an error.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use resultsnap_common::record::{MarkEntry, ResultRecord, StudentRecord};

/// Text only present on pages that carry a result.
pub const RESULT_MARKER: &str = "Personal Details";

const MARKS_FIRST_ROW: usize = 2;
const MARK_MIN_CELLS: usize = 4;

static PERSONAL_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("#AutoNumber3"));
static MARKS_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("#AutoNumber4"));
static RESULT_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("#AutoNumber5"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("selector literals are valid CSS")
}

/// Extracts a [`ResultRecord`] from one response body.
///
/// Returns `None` when the marker text is missing or the personal details
/// table is incomplete. A partially filled record is never returned.
pub fn parse_result_page(body: &str) -> Option<ResultRecord> {
    if !body.contains(RESULT_MARKER) {
        trace!("result marker missing");
        return None;
    }

    let document = Html::parse_document(body);

    let personal = document.select(&PERSONAL_TABLE).next()?;
    let student = extract_student(&table_cells(personal))?;

    let marks = document
        .select(&MARKS_TABLE)
        .next()
        .map(|table| extract_marks(&table_cells(table)))
        .unwrap_or_default();

    let result = document
        .select(&RESULT_TABLE)
        .next()
        .and_then(|table| extract_final_result(&table_cells(table)));

    Some(ResultRecord {
        student,
        marks,
        result,
        status: None,
    })
}

/// Text of every `td` of every `tr` below `table`, row by row.
fn table_cells(table: ElementRef<'_>) -> Vec<Vec<String>> {
    table
        .select(&ROW)
        .map(|row| row.select(&CELL).map(cell_text).collect())
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

fn cell(rows: &[Vec<String>], row: usize, col: usize) -> Option<String> {
    rows.get(row)?.get(col).cloned()
}

fn extract_student(rows: &[Vec<String>]) -> Option<StudentRecord> {
    Some(StudentRecord {
        hallticket: cell(rows, 1, 1)?,
        gender: Some(cell(rows, 1, 3)?),
        name: Some(cell(rows, 2, 1)?),
        father: Some(cell(rows, 2, 3)?),
        course: Some(cell(rows, 3, 1)?),
    })
}

fn extract_marks(rows: &[Vec<String>]) -> Vec<MarkEntry> {
    rows.iter()
        .skip(MARKS_FIRST_ROW)
        .filter(|cells| cells.len() >= MARK_MIN_CELLS)
        .map(|cells| MarkEntry {
            code: cells[0].clone(),
            subject: cells[1].clone(),
            credits: cells[2].clone(),
            grade: cells[3].clone(),
        })
        .collect()
}

fn extract_final_result(rows: &[Vec<String>]) -> Option<String> {
    cell(rows, 2, 2)
}
