// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Statement import: file in, normalized transactions out.
//!
//! The stages run strictly in order: file type, source, raw table, column
//! mapping, date recovery, source sign convention, categorization and finally
//! category-based sign enforcement. Persisting the batch is up to the caller.

pub mod categorize;
pub mod columns;
pub mod dates;
pub mod filetype;
pub mod pdf;
pub mod readers;
pub mod signs;
pub mod sources;

use crate::error::ImportError;
use crate::models::{ImportReport, RawTable, Transaction};
use categorize::{UserRules, Vocabulary, categorize_with};
use columns::{MappedTable, map_columns};
use dates::{DateContext, parse_dates};
use filetype::{FileType, detect_file_type};
use log::{debug, info, warn};
use pdf::{DETECTION_PAGES, PdfDocument};
use rust_decimal::Decimal;
use signs::{apply_source_convention, normalize_signs};
use sources::{SourceProfile, detect_from_headers, detect_from_text, lookup};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;

const UPLOAD_PREFIX: &str = "billfold-upload-";

/// Caller choices for one import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Skip detection and use this source.
    pub source_hint: Option<String>,
    /// Worksheet to read from an Excel workbook; the first one otherwise.
    pub sheet: Option<String>,
    /// 1-based PDF pages to extract from.
    pub pages: Option<Vec<usize>>,
    pub rules: UserRules,
    /// Categories rules may assign; standard ones unless the caller adds more.
    pub vocabulary: Vocabulary,
}

impl ImportOptions {
    pub fn with_source(mut self, source: &str) -> Self {
        self.source_hint = Some(source.to_string());
        self
    }
}

/// What `preview` shows before anything is imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Table(RawTable),
    Text(Vec<String>),
}

/// Parse a statement amount. Accepts `$`, thousands separators, `(12.00)`
/// for negatives and a trailing `CR`/`DR` marker.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s = raw.trim().to_uppercase();
    let mut marker = None;
    for (suffix, credit) in [("CR", true), ("DR", false)] {
        if let Some(rest) = s.strip_suffix(suffix) {
            marker = Some(credit);
            s = rest.trim_end().to_string();
            break;
        }
    }
    let parenthesized = s.starts_with('(') && s.ends_with(')');
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')' | '+') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value = Decimal::from_str(&cleaned).ok()?;
    Some(match marker {
        Some(true) => value.abs(),
        Some(false) => -value.abs(),
        None if parenthesized => -value.abs(),
        None => value,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn hinted_profile(options: &ImportOptions) -> Result<Option<&'static SourceProfile>, ImportError> {
    options.source_hint.as_deref().map(lookup).transpose()
}

fn read_tabular(
    path: &Path,
    file_type: FileType,
    sheet: Option<&str>,
) -> Result<(RawTable, Option<String>), ImportError> {
    if file_type.is_excel() {
        let (table, name) = readers::read_excel(path, sheet)?;
        Ok((table, Some(name)))
    } else {
        Ok((readers::read_csv(path)?, None))
    }
}

fn open_pdf(path: &Path) -> (PdfDocument, Option<String>) {
    match PdfDocument::open(path) {
        Ok(doc) => (doc, None),
        Err(e) => {
            warn!("could not read text from {}: {}", path.display(), e);
            (PdfDocument::default(), Some(e.to_string()))
        }
    }
}

/// Identify the issuing source of a statement, or `None` when nothing matches.
pub fn detect_source(path: &Path) -> Result<Option<&'static str>, ImportError> {
    let found = match detect_file_type(path) {
        ft @ (FileType::Csv | FileType::Xlsx | FileType::Xls) => {
            let (table, _) = read_tabular(path, ft, None)?;
            detect_from_headers(&table.headers)
        }
        FileType::Pdf => detect_from_text(&open_pdf(path).0.head(DETECTION_PAGES)),
        FileType::Unknown => return Err(ImportError::UnsupportedFormat(display_name(path))),
    };
    debug!("detected source {:?} for {}", found, path.display());
    Ok(found)
}

fn build_transactions(
    report: &mut ImportReport,
    mapped: &MappedTable,
    ctx: &DateContext,
    profile: &SourceProfile,
    strict_amounts: bool,
) -> Result<Vec<Transaction>, ImportError> {
    let raw_dates: Vec<&str> = mapped.rows.iter().map(|r| r.date.as_str()).collect();
    let recovery = parse_dates(&raw_dates, ctx);
    report.dropped_rows += recovery.dropped_count();
    report.skipped_rows += recovery.blank;
    if let Some(year) = recovery.inferred_year {
        debug!("dates without a year were completed with {}", year);
    }

    let mut batch = Vec::with_capacity(recovery.parsed.len());
    for (i, date) in recovery.parsed {
        let row = &mapped.rows[i];
        if row.amount.trim().trim_matches('-').is_empty() {
            report.skipped_rows += 1;
            continue;
        }
        let amount = match parse_amount(&row.amount) {
            Some(a) => a,
            None if strict_amounts => {
                return Err(ImportError::InvalidAmount {
                    row: i + 1,
                    value: row.amount.clone(),
                });
            }
            None => {
                report.skipped_rows += 1;
                continue;
            }
        };
        batch.push(Transaction {
            date,
            description: row.description.clone(),
            amount,
            source: profile.id.to_string(),
            category: row.category.clone(),
            original_category: row.original_category.clone(),
        });
    }

    if report.dropped_rows > 0 {
        report.warnings.push(format!(
            "{} row(s) dropped because their date could not be recognized",
            report.dropped_rows
        ));
    }
    Ok(batch)
}

fn extract_tabular(
    path: &Path,
    file_type: FileType,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let hinted = hinted_profile(options)?;
    let (table, sheet) = read_tabular(path, file_type, options.sheet.as_deref())?;
    let profile = match hinted {
        Some(p) => p,
        None => detect_from_headers(&table.headers)
            .map(lookup)
            .transpose()?
            .ok_or_else(|| ImportError::SourceNotDetected(display_name(path)))?,
    };
    let mapped = map_columns(&table, Some(profile))?;
    let ctx = DateContext::new(Some(path))
        .with_sheet(sheet.as_deref())
        .with_headers(&table.headers);

    let mut report = ImportReport::new(profile.id, file_type.as_str());
    let mut batch = build_transactions(&mut report, &mapped, &ctx, profile, true)?;
    apply_source_convention(&mut batch, profile);
    report.transactions = batch;
    Ok(report)
}

fn extract_pdf(path: &Path, options: &ImportOptions) -> Result<ImportReport, ImportError> {
    let hinted = hinted_profile(options)?;
    let (doc, open_error) = open_pdf(path);
    let profile = match hinted {
        Some(p) => p,
        None => detect_from_text(&doc.head(DETECTION_PAGES))
            .map(lookup)
            .transpose()?
            .ok_or_else(|| ImportError::SourceNotDetected(display_name(path)))?,
    };

    let mut report = ImportReport::new(profile.id, FileType::Pdf.as_str());
    report.low_confidence = true;
    report.warnings.extend(open_error);

    debug!("{} has {} page(s) of text", path.display(), doc.page_count());
    let text = doc.text(options.pages.as_deref());
    match pdf::run_chain(&pdf::default_chain(), &text, Some(profile)) {
        Some(found) => {
            let mapped = map_columns(&found.table, Some(profile))?;
            let ctx = DateContext::new(Some(path)).with_headers(&found.table.headers);
            let mut batch = build_transactions(&mut report, &mapped, &ctx, profile, false)?;
            if !found.signs_resolved {
                apply_source_convention(&mut batch, profile);
            }
            report.extraction_strategy = Some(found.strategy.to_string());
            report.transactions = batch;
        }
        None => {
            warn!("no extraction strategy produced rows for {}", path.display());
            report
                .warnings
                .push("No transactions could be extracted from this PDF".to_string());
        }
    }
    report
        .warnings
        .push("PDF extraction is best-effort; review the imported rows".to_string());
    Ok(report)
}

/// Everything up to and including the source's sign convention; rows are not
/// categorized yet.
pub fn extract_statement(path: &Path, options: &ImportOptions) -> Result<ImportReport, ImportError> {
    match detect_file_type(path) {
        ft @ (FileType::Csv | FileType::Xlsx | FileType::Xls) => extract_tabular(path, ft, options),
        FileType::Pdf => extract_pdf(path, options),
        FileType::Unknown => Err(ImportError::UnsupportedFormat(display_name(path))),
    }
}

/// Import one statement file into a categorized, sign-normalized batch.
pub fn import_statement(path: &Path, options: &ImportOptions) -> Result<ImportReport, ImportError> {
    let mut report = extract_statement(path, options)?;
    let batch = std::mem::take(&mut report.transactions);
    report.transactions = normalize_signs(categorize_with(batch, &options.rules, &options.vocabulary));
    info!(
        "imported {} transaction(s) from {} as {} ({} dropped, {} skipped)",
        report.transactions.len(),
        display_name(path),
        report.source,
        report.dropped_rows,
        report.skipped_rows
    );
    Ok(report)
}

fn import_in_dir(
    dir: TempDir,
    bytes: &[u8],
    filename: &str,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| ImportError::UnsupportedFormat(filename.to_string()))?;
    let path = dir.path().join(name);
    fs::write(&path, bytes)?;
    let result = import_statement(&path, options);
    if let Err(e) = dir.close() {
        warn!("could not remove upload directory: {}", e);
    }
    result
}

/// Import an uploaded file. The bytes are staged in a private temporary
/// directory under their original name, which is removed on every path out.
pub fn import_upload(
    bytes: &[u8],
    filename: &str,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let dir = tempfile::Builder::new().prefix(UPLOAD_PREFIX).tempdir()?;
    import_in_dir(dir, bytes, filename, options)
}

/// Like [`import_upload`], staging under `base` instead of the system temp dir.
pub fn import_upload_in(
    base: &Path,
    bytes: &[u8],
    filename: &str,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let dir = tempfile::Builder::new()
        .prefix(UPLOAD_PREFIX)
        .tempdir_in(base)?;
    import_in_dir(dir, bytes, filename, options)
}

/// First `rows` rows of a tabular file, or first `rows` text lines of a PDF.
pub fn preview(path: &Path, options: &ImportOptions, rows: usize) -> Result<Preview, ImportError> {
    match detect_file_type(path) {
        ft @ (FileType::Csv | FileType::Xlsx | FileType::Xls) => {
            let (mut table, _) = read_tabular(path, ft, options.sheet.as_deref())?;
            table.rows.truncate(rows);
            Ok(Preview::Table(table))
        }
        FileType::Pdf => {
            let doc = PdfDocument::open(path)?;
            let lines = doc
                .text(options.pages.as_deref())
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(rows)
                .map(str::to_string)
                .collect();
            Ok(Preview::Text(lines))
        }
        FileType::Unknown => Err(ImportError::UnsupportedFormat(display_name(path))),
    }
}
