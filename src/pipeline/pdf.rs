// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Best-effort transaction extraction from PDF statements.
//!
//! Text is pulled out of the document once, then handed to an ordered chain
//! of strategies. Each strategy either produces a table, declines with
//! `Ok(None)`, or fails; failures are logged and the next strategy runs.
//! Every result from here is low confidence.

use crate::error::ImportError;
use crate::models::RawTable;
use crate::pipeline::columns::resolve_mapping;
use crate::pipeline::parse_amount;
use crate::pipeline::sources::SourceProfile;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::path::Path;

/// Pages consulted when sniffing the issuing bank.
pub const DETECTION_PAGES: usize = 3;

const PAGE_BREAK: char = '\u{000C}';
const AMOUNT: &str = r"[-+]?\$?\d[\d,]*\.\d{2}";

static COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}|\t").expect("static regex"));
static LEADING_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[/-]\d{1,2}").expect("static regex"));
static WELLS_FARGO_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\d{{2}}/\d{{2}}/\d{{2,4}})\s+(.+?)\s+({})", AMOUNT)).expect("static regex")
});
static CHASE_ACTIVITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)ACCOUNT\s+ACTIVITY(.*?)(?:INTEREST\s+CHARGED|FEES\s+CHARGED|TOTALS\s+YEAR-TO-DATE|\z)")
        .expect("static regex")
});
static CHASE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\d{{2}}/\d{{2}})\s+(.*?)\s+({})", AMOUNT)).expect("static regex")
});
static CHASE_LOOSE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\d{{2}}/\d{{2}})\s+([A-Z0-9].*?)\s+({})", AMOUNT)).expect("static regex")
});
static BOA_TRANSACTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Transactions(.*?)(?:Interest\s+Charged|Totals\s+Year-to-Date|\z)")
        .expect("static regex")
});
static BOA_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(\d{{2}}/\d{{2}})\s+(\d{{2}}/\d{{2}})\s+(.+?)(?:\s+\d{{4,}}\s+\d{{4,}})?\s+({})",
        AMOUNT
    ))
    .expect("static regex")
});
static GENERIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?m)^\s*(\d{{1,2}}/\d{{1,2}}(?:/\d{{2,4}})?)\s+(.+?)\s+({}(?:\s*(?:CR|DR))?)\s*$",
        AMOUNT
    ))
    .expect("static regex")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

const CHASE_SECTIONS: &[&str] = &[
    "PAYMENTS AND OTHER CREDITS",
    "PURCHASE",
    "CASH ADVANCES",
    "FEES CHARGED",
    "INTEREST CHARGED",
];
const CHASE_CREDIT_SECTION: &str = "PAYMENTS AND OTHER CREDITS";
const CREDIT_WORDS: &[&str] = &["PAYMENT", "CREDIT", "DEPOSIT", "REFUND", "RETURN"];

/// Extracted page text.
#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    pages: Vec<String>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let text = pdf_extract::extract_text(path).map_err(|e| ImportError::Extraction {
            strategy: "pdf-text".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_text(&text))
    }

    /// Pages are separated by form feeds, as `pdf-extract` emits them.
    pub fn from_text(text: &str) -> Self {
        let mut pages: Vec<String> = text.split(PAGE_BREAK).map(|p| p.to_string()).collect();
        while pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        PdfDocument { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of the requested 1-based pages. Out-of-range numbers are ignored;
    /// when none are usable the whole document is returned.
    pub fn text(&self, pages: Option<&[usize]>) -> String {
        let wanted: Vec<&String> = pages
            .unwrap_or(&[])
            .iter()
            .filter(|&&p| p >= 1 && p <= self.pages.len())
            .map(|&p| &self.pages[p - 1])
            .collect();
        if wanted.is_empty() {
            self.pages.join("\n")
        } else {
            debug!("extracting from {} selected page(s)", wanted.len());
            wanted.into_iter().cloned().collect::<Vec<_>>().join("\n")
        }
    }

    pub fn head(&self, n: usize) -> String {
        self.pages.iter().take(n).cloned().collect::<Vec<_>>().join("\n")
    }
}

/// A table produced by one strategy.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub strategy: &'static str,
    pub table: RawTable,
    /// Amounts already carry inflow/outflow signs, so the source's own
    /// convention must not be applied again.
    pub signs_resolved: bool,
}

pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    fn extract(
        &self,
        text: &str,
        source: Option<&SourceProfile>,
    ) -> Result<Option<Extraction>, ImportError>;
}

fn headers(with_post_date: bool) -> Vec<String> {
    let mut h = vec!["Date".to_string(), "Description".to_string(), "Amount".to_string()];
    if with_post_date {
        h.push("Post Date".to_string());
    }
    h
}

fn clean_description(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").to_string()
}

fn signed_amount(strategy: &str, raw: &str, inflow: bool) -> Result<String, ImportError> {
    let value = parse_amount(raw).ok_or_else(|| ImportError::Extraction {
        strategy: strategy.to_string(),
        reason: format!("unreadable amount '{}'", raw),
    })?;
    let value: Decimal = if inflow { value.abs() } else { -value.abs() };
    Ok(value.to_string())
}

fn populated(
    strategy: &'static str,
    table: RawTable,
    signs_resolved: bool,
) -> Option<Extraction> {
    if table.is_empty() {
        None
    } else {
        Some(Extraction {
            strategy,
            table,
            signs_resolved,
        })
    }
}

/// Column-aligned text tables: a header line naming a date and an amount
/// column, followed by rows split on the same wide gaps.
pub struct TableLayout;

impl ExtractionStrategy for TableLayout {
    fn name(&self) -> &'static str {
        "table-layout"
    }

    fn extract(
        &self,
        text: &str,
        source: Option<&SourceProfile>,
    ) -> Result<Option<Extraction>, ImportError> {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for line in text.lines() {
            let cells: Vec<String> = COLUMN_GAP
                .split(line.trim())
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            let width = header.as_ref().map(|h| h.len());
            match width {
                None => {
                    let lowered = line.to_lowercase();
                    if cells.len() >= 3 && lowered.contains("date") && lowered.contains("amount") {
                        header = Some(cells);
                    }
                }
                Some(n) => {
                    if cells.len() == n && LEADING_DATE.is_match(&cells[0]) {
                        rows.push(cells);
                    }
                }
            }
        }
        let Some(header) = header else {
            return Ok(None);
        };
        resolve_mapping(&header, source).map_err(|e| ImportError::Extraction {
            strategy: self.name().to_string(),
            reason: e.to_string(),
        })?;
        Ok(populated(self.name(), RawTable::new(header, rows), false))
    }
}

/// Per-bank text rules for Wells Fargo, Chase and Bank of America.
pub struct SourceText;

impl SourceText {
    fn wells_fargo(&self, text: &str) -> Result<Option<Extraction>, ImportError> {
        let rows = WELLS_FARGO_LINE
            .captures_iter(text)
            .map(|c| {
                vec![
                    c[1].to_string(),
                    clean_description(&c[2]),
                    c[3].replace(['$', ','], ""),
                ]
            })
            .collect();
        Ok(populated(self.name(), RawTable::new(headers(false), rows), false))
    }

    fn chase(&self, text: &str) -> Result<Option<Extraction>, ImportError> {
        let mut rows = Vec::new();
        if let Some(activity) = CHASE_ACTIVITY.captures(text).and_then(|c| c.get(1)) {
            let activity = activity.as_str();
            for (i, section) in CHASE_SECTIONS.iter().enumerate() {
                let Some(start) = activity.find(section) else {
                    continue;
                };
                let end = CHASE_SECTIONS[i + 1..]
                    .iter()
                    .filter_map(|next| activity[start + 1..].find(next).map(|p| p + start + 1))
                    .min()
                    .unwrap_or(activity.len());
                let inflow = *section == CHASE_CREDIT_SECTION;
                for c in CHASE_LINE.captures_iter(&activity[start..end]) {
                    let description = clean_description(&c[2]);
                    if description.to_lowercase().contains("date of transaction") {
                        continue;
                    }
                    rows.push(vec![
                        c[1].to_string(),
                        description,
                        signed_amount(self.name(), &c[3], inflow)?,
                    ]);
                }
            }
        }
        if rows.is_empty() {
            for c in CHASE_LOOSE_LINE.captures_iter(text) {
                let description = clean_description(&c[2]);
                let upper = description.to_uppercase();
                if upper.contains("DATE OF TRANSACTION") {
                    continue;
                }
                let inflow = ["PAYMENT", "CREDIT", "REFUND"]
                    .iter()
                    .any(|w| upper.contains(w));
                rows.push(vec![
                    c[1].to_string(),
                    description,
                    signed_amount(self.name(), &c[3], inflow)?,
                ]);
            }
        }
        Ok(populated(self.name(), RawTable::new(headers(false), rows), true))
    }

    fn bank_of_america(&self, text: &str) -> Result<Option<Extraction>, ImportError> {
        let block = BOA_TRANSACTIONS
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        let mut rows = Vec::new();
        for scope in block.into_iter().chain(std::iter::once(text)) {
            for c in BOA_LINE.captures_iter(scope) {
                let description = clean_description(&c[3]);
                if description.contains("Transaction") && description.contains("Date") {
                    continue;
                }
                let upper = description.to_uppercase();
                let negative = c[4].starts_with('-');
                let inflow = negative || CREDIT_WORDS.iter().any(|w| upper.contains(w));
                rows.push(vec![
                    c[1].to_string(),
                    description,
                    signed_amount(self.name(), &c[4], inflow)?,
                    c[2].to_string(),
                ]);
            }
            if !rows.is_empty() {
                break;
            }
        }
        Ok(populated(self.name(), RawTable::new(headers(true), rows), true))
    }
}

impl ExtractionStrategy for SourceText {
    fn name(&self) -> &'static str {
        "source-text"
    }

    fn extract(
        &self,
        text: &str,
        source: Option<&SourceProfile>,
    ) -> Result<Option<Extraction>, ImportError> {
        match source.map(|s| s.id) {
            Some("wells_fargo") => self.wells_fargo(text),
            Some("chase") => self.chase(text),
            Some("bank_of_america") => self.bank_of_america(text),
            _ => Ok(None),
        }
    }
}

/// Any `MM/DD[/YY] description amount` line.
pub struct GenericText;

impl ExtractionStrategy for GenericText {
    fn name(&self) -> &'static str {
        "generic-text"
    }

    fn extract(
        &self,
        text: &str,
        _source: Option<&SourceProfile>,
    ) -> Result<Option<Extraction>, ImportError> {
        let rows = GENERIC_LINE
            .captures_iter(text)
            .map(|c| vec![c[1].to_string(), clean_description(&c[2]), c[3].trim().to_string()])
            .collect();
        Ok(populated(self.name(), RawTable::new(headers(false), rows), false))
    }
}

pub fn default_chain() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![Box::new(TableLayout), Box::new(SourceText), Box::new(GenericText)]
}

/// Run `chain` in order; the first populated result wins.
pub fn run_chain(
    chain: &[Box<dyn ExtractionStrategy>],
    text: &str,
    source: Option<&SourceProfile>,
) -> Option<Extraction> {
    for strategy in chain {
        match strategy.extract(text, source) {
            Ok(Some(found)) => {
                debug!(
                    "pdf strategy '{}' produced {} row(s)",
                    found.strategy,
                    found.table.rows.len()
                );
                return Some(found);
            }
            Ok(None) => debug!("pdf strategy '{}' declined", strategy.name()),
            Err(e) => warn!("pdf strategy '{}' failed: {}", strategy.name(), e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sources::lookup;

    struct Failing;

    impl ExtractionStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract(
            &self,
            _text: &str,
            _source: Option<&SourceProfile>,
        ) -> Result<Option<Extraction>, ImportError> {
            Err(ImportError::Extraction {
                strategy: "failing".into(),
                reason: "boom".into(),
            })
        }
    }

    #[test]
    fn page_selection_ignores_out_of_range_numbers() {
        let doc = PdfDocument::from_text("one\u{000C}two\u{000C}three\u{000C}");
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.text(Some(&[2][..])), "two");
        assert_eq!(doc.text(Some(&[3, 9][..])), "three");
        assert_eq!(doc.text(Some(&[0, 9][..])), "one\ntwo\nthree");
        assert_eq!(doc.head(2), "one\ntwo");
    }

    #[test]
    fn table_layout_reads_aligned_columns() {
        let text = "Statement\nDate        Description          Amount\n01/05/2024  COFFEE SHOP   -4.50\n01/06/2024  PAYROLL   1,200.00\nTotal  1195.50\n";
        let found = TableLayout.extract(text, None).unwrap().unwrap();
        assert_eq!(found.table.headers, vec!["Date", "Description", "Amount"]);
        assert_eq!(found.table.rows.len(), 2);
        assert_eq!(found.table.rows[1][2], "1,200.00");
        assert!(!found.signs_resolved);
    }

    #[test]
    fn chase_sections_decide_signs() {
        let text = "ACCOUNT ACTIVITY\nPAYMENTS AND OTHER CREDITS\n01/10 AUTOMATIC PAYMENT - THANK YOU -250.00\nPURCHASE\n01/11 STARBUCKS STORE 123 5.75\n01/12 AMAZON MKTPL 1,020.10\nTOTALS YEAR-TO-DATE\n";
        let found = SourceText
            .extract(text, Some(lookup("chase").unwrap()))
            .unwrap()
            .unwrap();
        let amounts: Vec<&str> = found.table.rows.iter().map(|r| r[2].as_str()).collect();
        assert_eq!(amounts, vec!["250.00", "-5.75", "-1020.10"]);
        assert_eq!(found.table.rows[1][1], "STARBUCKS STORE 123");
        assert!(found.signs_resolved);
    }

    #[test]
    fn bank_of_america_block_keeps_post_dates() {
        let text = "Transactions\n02/03 02/04 WHOLE FOODS MARKET 4321 8765 45.12\n02/05 02/05 PAYMENT THANK YOU -300.00\nInterest Charged\n";
        let found = SourceText
            .extract(text, Some(lookup("bank_of_america").unwrap()))
            .unwrap()
            .unwrap();
        assert_eq!(found.table.headers.len(), 4);
        assert_eq!(found.table.rows[0], vec!["02/03", "WHOLE FOODS MARKET", "-45.12", "02/04"]);
        assert_eq!(found.table.rows[1][2], "300.00");
    }

    #[test]
    fn source_text_declines_unknown_sources() {
        let found = SourceText
            .extract("01/02 THING 3.00", Some(lookup("schwab").unwrap()))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn failing_strategy_does_not_stop_the_chain() {
        let chain: Vec<Box<dyn ExtractionStrategy>> = vec![Box::new(Failing), Box::new(GenericText)];
        let found = run_chain(&chain, "03/15 CORNER STORE 12.00\n", None).unwrap();
        assert_eq!(found.strategy, "generic-text");
        assert_eq!(found.table.rows[0], vec!["03/15", "CORNER STORE", "12.00"]);
    }

    #[test]
    fn exhausted_chain_yields_nothing() {
        assert!(run_chain(&default_chain(), "no transactions here", None).is_none());
    }
}
