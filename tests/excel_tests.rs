// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::error::ImportError;
use billfold::pipeline::{ImportOptions, import_statement};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// Two sheets named after years; the first has a title banner above its table
// and month/day dates only.
fn workbook(dir: &Path) -> PathBuf {
    let path = dir.join("statement.xlsx");
    let mut wb = Workbook::new();
    {
        let ws = wb.add_worksheet();
        ws.set_name("2022").unwrap();
        ws.write_string(0, 0, "Checking Account Statement").unwrap();
        ws.write_string(2, 0, "Date").unwrap();
        ws.write_string(2, 1, "Description").unwrap();
        ws.write_string(2, 2, "Amount").unwrap();
        ws.write_string(3, 0, "03/15").unwrap();
        ws.write_string(3, 1, "TRADER JOE'S #552").unwrap();
        ws.write_number(3, 2, -23.41).unwrap();
        ws.write_string(4, 0, "03/16").unwrap();
        ws.write_string(4, 1, "PAYROLL ACME").unwrap();
        ws.write_number(4, 2, 1500.0).unwrap();
    }
    {
        let ws = wb.add_worksheet();
        ws.set_name("2023").unwrap();
        ws.write_string(0, 0, "Date").unwrap();
        ws.write_string(0, 1, "Description").unwrap();
        ws.write_string(0, 2, "Amount").unwrap();
        ws.write_string(1, 0, "07/04").unwrap();
        ws.write_string(1, 1, "NETFLIX.COM").unwrap();
        ws.write_number(1, 2, -15.49).unwrap();
    }
    wb.save(&path).unwrap();
    path
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn first_sheet_is_read_past_its_banner_with_year_from_sheet_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(dir.path());
    let report =
        import_statement(&path, &ImportOptions::default().with_source("schwab")).unwrap();

    assert_eq!(report.file_type, "xlsx");
    assert_eq!(report.dropped_rows, 0);
    let rows = &report.transactions;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, date(2022, 3, 15));
    assert_eq!(rows[0].category.as_deref(), Some("Groceries"));
    assert_eq!(rows[0].amount, dec("-23.41"));
    assert_eq!(rows[1].date, date(2022, 3, 16));
    assert_eq!(rows[1].category.as_deref(), Some("Income"));
    assert_eq!(rows[1].amount, dec("1500"));
}

#[test]
fn named_sheet_is_selected() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(dir.path());
    let options = ImportOptions {
        sheet: Some("2023".into()),
        ..ImportOptions::default().with_source("schwab")
    };
    let report = import_statement(&path, &options).unwrap();
    assert_eq!(report.transactions.len(), 1);
    assert_eq!(report.transactions[0].date, date(2023, 7, 4));
    assert_eq!(report.transactions[0].category.as_deref(), Some("Entertainment"));
}

#[test]
fn unknown_sheet_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = workbook(dir.path());
    let options = ImportOptions {
        sheet: Some("Nope".into()),
        ..ImportOptions::default().with_source("schwab")
    };
    let err = import_statement(&path, &options).unwrap_err();
    assert!(matches!(err, ImportError::SheetNotFound(ref s) if s == "Nope"));
}
