// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized statement line.
///
/// `amount` is positive for inflows and negative for outflows once the
/// pipeline has run, whatever the source bank used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub source: String,
    pub category: Option<String>,
    pub original_category: Option<String>,
}

/// A transaction as persisted, with its row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub source: String,
    pub category: Option<String>,
    pub original_category: Option<String>,
}

impl From<StoredTransaction> for Transaction {
    fn from(st: StoredTransaction) -> Self {
        Transaction {
            date: st.date,
            description: st.description,
            amount: st.amount,
            source: st.source,
            category: st.category,
            original_category: st.original_category,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub month: String, // YYYY-MM
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub name: String,
    pub balance: Decimal,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    pub pattern: String,
    pub category: String,
}

/// Header row plus string cells, as read from a CSV, a worksheet or a PDF
/// extraction strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of importing one statement file.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub file_type: String,
    pub transactions: Vec<Transaction>,
    /// Rows whose date could not be recovered by any strategy.
    pub dropped_rows: usize,
    /// Rows without a date or amount at all (blank lines, totals).
    pub skipped_rows: usize,
    /// Set for PDF imports, whose extraction is best-effort.
    pub low_confidence: bool,
    pub extraction_strategy: Option<String>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn new(source: &str, file_type: &str) -> Self {
        ImportReport {
            source: source.to_string(),
            file_type: file_type.to_string(),
            transactions: Vec::new(),
            dropped_rows: 0,
            skipped_rows: 0,
            low_confidence: false,
            extraction_strategy: None,
            warnings: Vec::new(),
        }
    }
}
