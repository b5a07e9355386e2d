use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use resultsnap_common::record::ResultRecord;

use super::{Report, ReportError, Sheet};

const HALLTICKET: &str = "hallticket";

const CORE_COLUMNS: [&str; 7] = [
    HALLTICKET,
    "student.name",
    "student.father",
    "student.gender",
    "student.course",
    "result",
    "status",
];

const MARK_COLUMNS: [&str; 5] = [HALLTICKET, "code", "subject", "credits", "grade"];

/// grade, credits and subject of one `(hallticket, code)` pair.
#[derive(Debug, Clone)]
struct PivotCell {
    grade: String,
    credits: String,
    subject: String,
}

/// Marks reshaped to one entry per hallticket and subject code.
#[derive(Debug, Default)]
struct Pivot {
    cells: HashMap<String, HashMap<String, PivotCell>>,
    /// Codes by descending frequency, ties in first-seen order.
    codes_by_frequency: Vec<String>,
}

impl Pivot {
    fn from_marks(marks: &Sheet) -> Self {
        let mut cells: HashMap<String, HashMap<String, PivotCell>> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for row in &marks.rows {
            let [ht, code, subject, credits, grade] = match row.as_slice() {
                [a, b, c, d, e] => [a, b, c, d, e].map(|v| v.clone().unwrap_or_default()),
                _ => continue,
            };

            match counts.iter_mut().find(|(c, _)| *c == code) {
                Some((_, n)) => *n += 1,
                None => counts.push((code.clone(), 1)),
            }

            cells.entry(ht).or_default().entry(code).or_insert(PivotCell {
                grade,
                credits,
                subject,
            });
        }

        // Stable, so equal counts keep first-seen order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            cells,
            codes_by_frequency: counts.into_iter().map(|(c, _)| c).collect(),
        }
    }

    fn lookup(&self, hallticket: &str, code: &str) -> Option<&PivotCell> {
        self.cells.get(hallticket)?.get(code)
    }
}

pub(super) fn build(records: &[ResultRecord]) -> Result<Report, ReportError> {
    let marks = marks_sheet(records);
    let pivot = Pivot::from_marks(&marks);

    Ok(Report {
        results: results_sheet(records, &pivot),
        grades: grades_sheet(&pivot),
        marks,
        raw: raw_sheet(records)?,
    })
}

/// Dotted columns of one record, marks excluded.
fn flatten(record: &ResultRecord) -> Vec<(&'static str, Option<String>)> {
    let student = &record.student;
    let mut fields = vec![
        (HALLTICKET, Some(student.hallticket.clone())),
        ("student.hallticket", Some(student.hallticket.clone())),
    ];

    let optional = [
        ("student.gender", &student.gender),
        ("student.name", &student.name),
        ("student.father", &student.father),
        ("student.course", &student.course),
    ];
    for (column, value) in optional {
        if let Some(value) = value {
            fields.push((column, Some(value.clone())));
        }
    }

    fields.push(("result", record.result.clone()));
    if let Some(status) = record.status {
        fields.push(("status", Some(status.as_str().to_string())));
    }
    fields
}

fn results_sheet(records: &[ResultRecord], pivot: &Pivot) -> Sheet {
    let mut seen: Vec<&'static str> = Vec::new();
    let flattened: Vec<HashMap<&'static str, Option<String>>> = records
        .iter()
        .map(|record| {
            let fields = flatten(record);
            for (column, _) in &fields {
                if !seen.contains(column) {
                    seen.push(column);
                }
            }
            fields.into_iter().collect()
        })
        .collect();

    let mut columns: Vec<String> = CORE_COLUMNS
        .iter()
        .filter(|c| seen.contains(*c))
        .map(|c| c.to_string())
        .collect();
    for code in &pivot.codes_by_frequency {
        columns.push(format!("grade_{code}"));
        columns.push(format!("credits_{code}"));
        columns.push(format!("subject_{code}"));
    }
    let mut leftovers: Vec<&str> = seen
        .iter()
        .copied()
        .filter(|c| !CORE_COLUMNS.contains(c))
        .collect();
    leftovers.sort_unstable();
    columns.extend(leftovers.into_iter().map(str::to_string));

    let mut rows: Vec<Vec<Option<String>>> = flattened
        .iter()
        .map(|fields| {
            let ht = fields
                .get(HALLTICKET)
                .cloned()
                .flatten()
                .unwrap_or_default();
            columns
                .iter()
                .map(|column| match fields.get(column.as_str()) {
                    Some(value) => value.clone(),
                    None => pivot_value(pivot, &ht, column),
                })
                .collect()
        })
        .collect();

    sort_by_hallticket(&mut rows, 0);

    Sheet {
        rows,
        ..Sheet::new("results", columns)
    }
}

fn pivot_value(pivot: &Pivot, hallticket: &str, column: &str) -> Option<String> {
    let (kind, code) = column.split_once('_')?;
    let cell = pivot.lookup(hallticket, code)?;
    match kind {
        "grade" => Some(cell.grade.clone()),
        "credits" => Some(cell.credits.clone()),
        "subject" => Some(cell.subject.clone()),
        _ => None,
    }
}

fn grades_sheet(pivot: &Pivot) -> Sheet {
    let codes: BTreeSet<&str> = pivot.codes_by_frequency.iter().map(String::as_str).collect();

    let mut columns = vec![HALLTICKET.to_string()];
    columns.extend(codes.iter().map(|c| c.to_string()));

    let mut rows: Vec<Vec<Option<String>>> = pivot
        .cells
        .iter()
        .map(|(ht, by_code)| {
            std::iter::once(Some(ht.clone()))
                .chain(
                    codes
                        .iter()
                        .map(|code| by_code.get(*code).map(|cell| cell.grade.clone())),
                )
                .collect()
        })
        .collect();

    // HashMap order is arbitrary; settle it before the numeric sort.
    rows.sort_by(|a, b| a[0].cmp(&b[0]));
    sort_by_hallticket(&mut rows, 0);

    Sheet {
        rows,
        ..Sheet::new("grades", columns)
    }
}

fn marks_sheet(records: &[ResultRecord]) -> Sheet {
    let rows = records
        .iter()
        .flat_map(|record| {
            let ht = record.hallticket();
            record.marks.iter().map(move |mark| {
                vec![
                    Some(ht.to_string()),
                    Some(mark.code.clone()),
                    Some(mark.subject.clone()),
                    Some(mark.credits.clone()),
                    Some(mark.grade.clone()),
                ]
            })
        })
        .collect();

    Sheet {
        rows,
        ..Sheet::new("marks", MARK_COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

fn raw_sheet(records: &[ResultRecord]) -> Result<Sheet, ReportError> {
    let rows = records
        .iter()
        .map(|record| serde_json::to_string(record).map(|json| vec![Some(json)]))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Sheet {
        rows,
        ..Sheet::new("raw", vec!["json".to_string()])
    })
}

/// Numeric order when every key parses as an integer, text order otherwise.
fn sort_by_hallticket(rows: &mut [Vec<Option<String>>], key: usize) {
    let numeric: Option<Vec<i128>> = rows
        .iter()
        .map(|row| row.get(key)?.as_deref()?.trim().parse::<i128>().ok())
        .collect();

    match numeric {
        Some(keys) => {
            let mut keyed: Vec<(i128, Vec<Option<String>>)> =
                keys.into_iter().zip(rows.iter_mut().map(std::mem::take)).collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
                *slot = row;
            }
        }
        None => rows.sort_by(|a, b| compare_text(a.get(key), b.get(key))),
    }
}

fn compare_text(a: Option<&Option<String>>, b: Option<&Option<String>>) -> Ordering {
    let a = a.and_then(|v| v.as_deref()).unwrap_or_default();
    let b = b.and_then(|v| v.as_deref()).unwrap_or_default();
    a.cmp(b)
}
