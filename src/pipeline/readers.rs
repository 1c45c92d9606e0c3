// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ImportError;
use crate::models::RawTable;
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::path::Path;

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Read a CSV export with a header row. Ragged rows are accepted, fully
/// blank ones are skipped.
pub fn read_csv(path: &Path) -> Result<RawTable, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if is_blank_row(&headers) {
        return Err(ImportError::EmptyFile(path.display().to_string()));
    }

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let row: Vec<String> = rec.iter().map(|c| c.to_string()).collect();
        if !is_blank_row(&row) {
            rows.push(row);
        }
    }
    debug!("read {} csv row(s) from {}", rows.len(), path.display());
    Ok(RawTable::new(headers, rows))
}

fn excel_serial_to_iso(serial: f64) -> String {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|base| base.checked_add_signed(Duration::days(serial.trunc() as i64)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| serial.to_string())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_iso(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

/// Pick the header row of a worksheet: the first row with at least two
/// non-empty cells. Title banners above the table are skipped.
fn split_header(rows: Vec<Vec<String>>) -> Option<RawTable> {
    let header_at = rows
        .iter()
        .position(|r| r.iter().filter(|c| !c.is_empty()).count() >= 2)?;
    let mut iter = rows.into_iter().skip(header_at);
    let headers = iter.next()?;
    let rows = iter.filter(|r| !is_blank_row(r)).collect();
    Some(RawTable::new(headers, rows))
}

/// Read one worksheet (the named one, or the first). Returns the table and
/// the sheet name actually used.
pub fn read_excel(path: &Path, sheet: Option<&str>) -> Result<(RawTable, String), ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_owned();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted || n.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| ImportError::SheetNotFound(wanted.to_string()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::EmptyFile(path.display().to_string()))?,
    };

    let range = workbook.worksheet_range(&name)?;
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    let table =
        split_header(rows).ok_or_else(|| ImportError::EmptyFile(path.display().to_string()))?;
    debug!(
        "read {} row(s) from sheet '{}' of {}",
        table.rows.len(),
        name,
        path.display()
    );
    Ok((table, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(f, "{}", content).unwrap();
        f
    }

    #[test]
    fn csv_rows_are_trimmed_and_blank_lines_skipped() {
        let f = csv_file("\u{feff}Date, Description ,Amount\n01/02/2024,  Coffee ,4.50\n,,\n01/03/2024,Tea\n");
        let t = read_csv(f.path()).unwrap();
        assert_eq!(t.headers, vec!["Date", "Description", "Amount"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0], vec!["01/02/2024", "Coffee", "4.50"]);
        assert_eq!(t.rows[1], vec!["01/03/2024", "Tea"]);
    }

    #[test]
    fn empty_csv_is_rejected() {
        let f = csv_file("");
        assert!(matches!(read_csv(f.path()), Err(ImportError::EmptyFile(_))));
    }

    #[test]
    fn header_row_skips_banners() {
        let rows = vec![
            vec!["Account Statement".to_string(), String::new(), String::new()],
            vec![String::new(), String::new(), String::new()],
            vec!["Date".to_string(), "Payee".to_string(), "Amount".to_string()],
            vec!["2024-01-01".to_string(), "Shop".to_string(), "-5".to_string()],
        ];
        let t = split_header(rows).unwrap();
        assert_eq!(t.headers, vec!["Date", "Payee", "Amount"]);
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn excel_serials_become_iso_dates() {
        assert_eq!(excel_serial_to_iso(45292.0), "2024-01-01");
        assert_eq!(excel_serial_to_iso(45292.75), "2024-01-01");
    }
}
