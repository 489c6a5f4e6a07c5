//! Tabular data reading.
//!
//! Turns a spreadsheet or CSV file into rows of text cells. Workbooks are
//! read with `calamine` (first worksheet only), CSV files with `csv`.

use calamine::{Data, Reader};
use std::path::Path;

use crate::error::{DocMergeError, Result};

/// One row of text cells, in column order.
pub type Row = Vec<String>;

/// Read every row of the table at `path`.
///
/// Rows keep their original position: blank rows are returned as rows of
/// empty strings, and cells past the end of a short CSV record are simply
/// absent.
///
/// # Errors
///
/// Returns [`DocMergeError::ManifestUnreadable`] if the file does not exist,
/// has an unsupported extension, or cannot be parsed.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    if !path.is_file() {
        return Err(DocMergeError::manifest_unreadable(path, "file not found"));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path),
        other => Err(DocMergeError::manifest_unreadable(
            path,
            format!("unsupported manifest type '.{other}'"),
        )),
    }
}

fn read_csv(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DocMergeError::manifest_unreadable(path, e.to_string()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DocMergeError::manifest_unreadable(path, e.to_string()))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(rows)
}

fn read_workbook(path: &Path) -> Result<Vec<Row>> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| DocMergeError::manifest_unreadable(path, e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| DocMergeError::manifest_unreadable(path, e.to_string()))?,
        None => return Err(DocMergeError::manifest_unreadable(path, "workbook has no sheets")),
    };

    // The range starts at the first used cell; pad so column 0 stays column 0
    // and leading blank rows keep their row numbers.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Row> = vec![Vec::new(); first_row as usize];

    for cells in range.rows() {
        let mut row = vec![String::new(); first_col as usize];
        row.extend(cells.iter().map(cell_to_string));
        rows.push(row);
    }

    Ok(rows)
}

/// Render a cell as text.
///
/// Integral numbers drop their fractional part, so a cell holding `3` reads
/// as `"3"` rather than `"3.0"`.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}
