use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};
use tempfile::Builder;
use tracing::debug;

use super::{Report, ReportError, Sheet};

/// Writes `report` to `path` through a temporary sibling file, so readers
/// never observe a half-written workbook.
pub fn write_workbook(
    report: &Report,
    path: &Path,
    password: Option<&str>,
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    for sheet in report.sheets() {
        let worksheet = workbook.add_worksheet();
        fill_worksheet(worksheet, sheet, password)?;
    }
    let buffer = workbook.save_to_buffer()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = Builder::new()
        .prefix(".resultsnap-")
        .suffix(".xlsx.tmp")
        .tempfile_in(dir)?;
    staged.write_all(&buffer)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    debug!("Wrote {} bytes to {}", buffer.len(), path.display());
    Ok(())
}

fn fill_worksheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet,
    password: Option<&str>,
) -> Result<(), ReportError> {
    worksheet.set_name(sheet.name)?;

    let mut header = Format::new().set_bold();
    let unlocked = Format::new().set_unlocked();
    if sheet.protected {
        header = header.set_unlocked();
    }

    for (col, name) in sheet.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as ColNum, name, &header)?;
    }

    for (idx, row) in sheet.rows.iter().enumerate() {
        let row_num = (idx + 1) as RowNum;
        for (col, value) in row.iter().enumerate() {
            let col_num = col as ColNum;
            let editable = sheet.protected && !sheet.is_locked(idx + 1, col);
            match (value, editable) {
                (Some(text), true) => {
                    worksheet.write_string_with_format(row_num, col_num, text, &unlocked)?;
                }
                (Some(text), false) => {
                    worksheet.write_string(row_num, col_num, text)?;
                }
                (None, true) => {
                    worksheet.write_blank(row_num, col_num, &unlocked)?;
                }
                (None, false) => {}
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;

    if sheet.protected {
        match password {
            Some(password) => worksheet.protect_with_password(password),
            None => worksheet.protect(),
        };
    }
    Ok(())
}
