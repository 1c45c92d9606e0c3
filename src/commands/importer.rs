// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::ImportReport;
use crate::pipeline::{ImportOptions, import_statement};
use crate::utils::{LAST_IMPORT_SOURCE, fmt_money, optional_arg, pretty_table, required_arg, set_setting};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::io::{self, Write};
use std::path::Path;

const SAMPLE_ROWS: usize = 10;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let path = required_arg(m, "path")?;
    let options = ImportOptions {
        source_hint: optional_arg(m, "source").map(|s| s.to_string()),
        sheet: optional_arg(m, "sheet").map(|s| s.to_string()),
        pages: optional_arg(m, "pages").map(parse_pages).transpose()?,
        rules: db::load_user_rules(conn)?,
        vocabulary: db::vocabulary(conn)?,
    };
    let dry_run = m.get_flag("dry_run");

    let report = import_statement(Path::new(path), &options)?;
    let saved = if dry_run {
        None
    } else {
        let n = db::append_transactions(conn, &report.transactions)?;
        set_setting(conn, LAST_IMPORT_SOURCE, &report.source)?;
        Some(n)
    };

    write_report(
        &report,
        path,
        saved,
        m.get_flag("json"),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
}

/// With `json`, `out` receives only the JSON report and the summary goes to
/// `err`; otherwise both go to `out`.
pub fn write_report(
    report: &ImportReport,
    path: &str,
    saved: Option<usize>,
    json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
    } else if !report.transactions.is_empty() {
        writeln!(out, "{}", sample_table(report))?;
        if report.transactions.len() > SAMPLE_ROWS {
            writeln!(out, "... and {} more", report.transactions.len() - SAMPLE_ROWS)?;
        }
    }
    let summary: &mut dyn Write = if json { err } else { out };
    for line in summary_lines(report, path, saved) {
        writeln!(summary, "{}", line)?;
    }
    Ok(())
}

fn summary_lines(report: &ImportReport, path: &str, saved: Option<usize>) -> Vec<String> {
    let mut lines = vec![match saved {
        Some(n) => format!("Imported {} transaction(s) from {} ({})", n, path, report.source),
        None => format!(
            "Dry run: parsed {} transaction(s) from {} ({}), nothing saved",
            report.transactions.len(),
            path,
            report.source
        ),
    }];
    if report.skipped_rows > 0 {
        lines.push(format!(
            "Skipped {} row(s) without a date or amount",
            report.skipped_rows
        ));
    }
    lines.extend(report.warnings.iter().map(|w| format!("Warning: {}", w)));
    if report.low_confidence {
        lines.push(format!(
            "Note: low-confidence extraction ({}); check the rows before relying on them",
            report.extraction_strategy.as_deref().unwrap_or("no strategy matched")
        ));
    }
    lines
}

/// `"1, 3,4"` -> `[1, 3, 4]`
pub fn parse_pages(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<usize>()
                .with_context(|| format!("Invalid page number '{}'", p))
        })
        .collect()
}

fn sample_table(report: &ImportReport) -> comfy_table::Table {
    let rows: Vec<Vec<String>> = report
        .transactions
        .iter()
        .take(SAMPLE_ROWS)
        .map(|t| {
            vec![
                t.date.to_string(),
                t.description.clone(),
                fmt_money(&t.amount),
                t.category.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(&["Date", "Description", "Amount", "Category"], rows)
}
