// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recovery of statement dates that are partial or in mixed formats.
//!
//! Rows are parsed with a generic parser first. Whatever is left goes through
//! year inference, `MM/DD` completion, an ordered list of explicit formats and
//! finally a manual `MM/DD` reconstruction. Rows that survive all of that are
//! dropped and counted, never failed as a batch.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static YEAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(20\d{2})(?:\D|$)").expect("static regex"));
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}$").expect("static regex"));
static MONTH_DAY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})(?:\D|$)").expect("static regex"));
static FOUR_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("static regex"));

const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];
const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Tried in order on rows the generic parser left behind.
pub const EXPLICIT_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d-%b-%y",
];

const SAMPLE_SIZE: usize = 5;

/// Where a statement's dates came from, for year inference.
#[derive(Debug, Clone)]
pub struct DateContext {
    pub filename: Option<String>,
    pub sheet_name: Option<String>,
    pub headers: Vec<String>,
    pub current_year: i32,
}

impl DateContext {
    pub fn new(filename: Option<&Path>) -> Self {
        DateContext {
            filename: filename
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string()),
            sheet_name: None,
            headers: Vec::new(),
            current_year: Local::now().year(),
        }
    }

    pub fn with_sheet(mut self, sheet: Option<&str>) -> Self {
        self.sheet_name = sheet.map(|s| s.to_string());
        self
    }

    pub fn with_headers(mut self, headers: &[String]) -> Self {
        self.headers = headers.to_vec();
        self
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Filename, then sheet name, then any header, then the current year.
    pub fn infer_year(&self) -> i32 {
        let from = |s: &str| {
            YEAR_TOKEN
                .captures(s)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<i32>().ok())
        };
        self.filename
            .as_deref()
            .and_then(from)
            .or_else(|| self.sheet_name.as_deref().and_then(from))
            .or_else(|| self.headers.iter().find_map(|h| from(h.as_str())))
            .unwrap_or(self.current_year)
    }
}

/// Parsed dates keyed by input row, plus what could not be recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRecovery {
    pub parsed: Vec<(usize, NaiveDate)>,
    /// Non-blank rows no strategy could parse.
    pub dropped: Vec<usize>,
    pub blank: usize,
    /// Set when year inference was needed.
    pub inferred_year: Option<i32>,
}

impl DateRecovery {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.parsed.iter().map(|(_, d)| *d).collect()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

fn parse_with(value: &str, fmt: &str) -> Option<NaiveDate> {
    // chrono's %Y happily reads "24" as year 24.
    if fmt.contains("%Y") && !FOUR_DIGITS.is_match(value) {
        return None;
    }
    if fmt.contains("%H") {
        NaiveDateTime::parse_from_str(value, fmt).ok().map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(value, fmt).ok()
    }
}

/// The catch-all parser used for the first bulk attempt.
pub fn parse_generic(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    GENERIC_DATE_FORMATS
        .iter()
        .chain(GENERIC_DATETIME_FORMATS)
        .find_map(|fmt| parse_with(value, fmt))
}

fn month_day_with_year(value: &str, year: i32) -> Option<NaiveDate> {
    let caps = MONTH_DAY_PREFIX.captures(value)?;
    let m: u32 = caps.get(1)?.as_str().parse().ok()?;
    let d: u32 = caps.get(2)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, m, d)
}

/// Recover calendar dates for a column of raw date strings.
pub fn parse_dates<S: AsRef<str>>(values: &[S], ctx: &DateContext) -> DateRecovery {
    let values: Vec<&str> = values.iter().map(|v| v.as_ref().trim()).collect();
    let mut out: Vec<Option<NaiveDate>> = values.iter().map(|v| parse_generic(v)).collect();
    let blank = values.iter().filter(|v| v.is_empty()).count();
    let mut recovery = DateRecovery {
        blank,
        ..DateRecovery::default()
    };

    let pending = |out: &[Option<NaiveDate>]| -> Vec<usize> {
        (0..values.len())
            .filter(|&i| out[i].is_none() && !values[i].is_empty())
            .collect()
    };

    let mut unparsed = pending(&out);
    if !unparsed.is_empty() {
        let year = ctx.infer_year();
        recovery.inferred_year = Some(year);
        debug!("{} date(s) need recovery, inferred year {}", unparsed.len(), year);

        let sample: Vec<&str> = unparsed.iter().take(SAMPLE_SIZE).map(|&i| values[i]).collect();
        if sample.iter().all(|v| MONTH_DAY.is_match(v)) {
            for &i in &unparsed {
                if MONTH_DAY.is_match(values[i]) {
                    out[i] = parse_with(&format!("{}/{}", values[i], year), "%m/%d/%Y");
                }
            }
            unparsed = pending(&out);
        }

        for fmt in EXPLICIT_FORMATS {
            if unparsed.is_empty() {
                break;
            }
            for &i in &unparsed {
                out[i] = parse_with(values[i], fmt);
            }
            unparsed = pending(&out);
        }

        for &i in &unparsed {
            out[i] = month_day_with_year(values[i], year);
        }
        unparsed = pending(&out);
    }

    recovery.parsed = out
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.map(|d| (i, d)))
        .collect();
    recovery.dropped = unparsed;
    if !recovery.dropped.is_empty() {
        warn!(
            "dropping {} row(s) with unrecoverable dates (e.g. '{}')",
            recovery.dropped.len(),
            values[recovery.dropped[0]]
        );
    }
    recovery
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(name: &str) -> DateContext {
        DateContext::new(Some(Path::new(name))).with_current_year(2019)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_column_parses_in_one_pass() {
        let r = parse_dates(&["2024-01-05", "2024-02-29"], &ctx("x.csv"));
        assert_eq!(r.dates(), vec![ymd(2024, 1, 5), ymd(2024, 2, 29)]);
        assert_eq!(r.inferred_year, None);
        assert_eq!(r.dropped_count(), 0);
    }

    #[test]
    fn month_day_takes_year_from_filename() {
        let r = parse_dates(&["03/15"], &ctx("2023_statement.csv"));
        assert_eq!(r.dates(), vec![ymd(2023, 3, 15)]);
        assert_eq!(r.inferred_year, Some(2023));
    }

    #[test]
    fn year_inference_priority() {
        let c = ctx("statement.csv")
            .with_sheet(Some("FY2021"))
            .with_headers(&["Date 2022".to_string()]);
        assert_eq!(c.infer_year(), 2021);
        let c = ctx("statement.csv").with_headers(&["Posted 2022".to_string()]);
        assert_eq!(c.infer_year(), 2022);
        assert_eq!(ctx("statement.csv").infer_year(), 2019);
        // Directory names are not consulted.
        let c = DateContext::new(Some(Path::new("/data/2018/stmt.csv"))).with_current_year(2019);
        assert_eq!(c.infer_year(), 2019);
        assert_eq!(ctx("chase_2024-03.csv").with_sheet(Some("2020")).infer_year(), 2024);
    }

    #[test]
    fn explicit_formats_recover_mixed_columns() {
        let r = parse_dates(&["2024-01-05", "15-03-2024", "03/15/24"], &ctx("x.csv"));
        assert_eq!(
            r.dates(),
            vec![ymd(2024, 1, 5), ymd(2024, 3, 15), ymd(2024, 3, 15)]
        );
        assert_eq!(r.parsed.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn two_digit_year_is_not_read_as_year_24() {
        let r = parse_dates(&["01/02/24"], &ctx("x.csv"));
        assert_eq!(r.dates(), vec![ymd(2024, 1, 2)]);
    }

    #[test]
    fn manual_reconstruction_handles_trailing_noise() {
        let r = parse_dates(&["2024-01-01", "03/15*"], &ctx("2022 stmt.csv"));
        assert_eq!(r.dates(), vec![ymd(2024, 1, 1), ymd(2022, 3, 15)]);
    }

    #[test]
    fn unrecoverable_rows_are_dropped_and_counted() {
        let r = parse_dates(&["2024-01-05", "not a date", "", "02/30"], &ctx("2023.csv"));
        assert_eq!(r.dates(), vec![ymd(2024, 1, 5)]);
        assert_eq!(r.dropped, vec![1, 3]);
        assert_eq!(r.blank, 1);
    }

    #[test]
    fn blank_column_yields_nothing_and_drops_nothing() {
        let r = parse_dates(&["", "  ", ""], &ctx("x.csv"));
        assert!(r.parsed.is_empty());
        assert_eq!(r.dropped_count(), 0);
        let empty: [&str; 0] = [];
        let r = parse_dates(&empty, &ctx("x.csv"));
        assert!(r.parsed.is_empty());
        assert_eq!(r.dropped_count(), 0);
    }

    #[test]
    fn generic_parser_accepts_datetimes() {
        assert_eq!(parse_generic("2024-05-06 13:45:00"), Some(ymd(2024, 5, 6)));
        assert_eq!(parse_generic("2024-05-06T13:45:00Z"), Some(ymd(2024, 5, 6)));
        assert_eq!(parse_generic("Mar 4, 2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_generic("03/15"), None);
    }
}
