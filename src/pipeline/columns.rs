// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ImportError;
use crate::models::RawTable;
use crate::pipeline::parse_amount;
use crate::pipeline::sources::SourceProfile;
use rust_decimal::Decimal;

const DATE_KEYWORDS: &[&str] = &["date", "transaction date", "posted date", "time", "day"];
const DESCRIPTION_KEYWORDS: &[&str] =
    &["description", "payee", "merchant", "transaction", "name", "memo"];
const AMOUNT_KEYWORDS: &[&str] = &[
    "amount",
    "debit",
    "credit",
    "payment",
    "deposit",
    "withdrawal",
    "value",
];
const CATEGORY_KEYWORDS: &[&str] = &["category"];

/// Where the amount of a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    Single(usize),
    /// Separate outflow/inflow columns, as some Excel exports have.
    Split { debit: usize, credit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: usize,
    pub description: usize,
    pub amount: AmountColumns,
    pub post_date: Option<usize>,
    pub original_category: Option<usize>,
}

/// One row with canonical field names; values are still raw strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedRow {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub post_date: Option<String>,
    pub category: Option<String>,
    pub original_category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MappedTable {
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    pub rows: Vec<MappedRow>,
}

fn find_alias(headers: &[String], aliases: &[&str], used: &[usize]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .enumerate()
            .find(|(i, h)| !used.contains(i) && h.trim().eq_ignore_ascii_case(alias))
            .map(|(i, _)| i)
    })
}

/// Highest-ranked keyword first; within a keyword, the leftmost column wins.
fn find_keyword(headers: &[String], keywords: &[&str], used: &[usize]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    keywords.iter().find_map(|kw| {
        lowered
            .iter()
            .enumerate()
            .find(|(i, h)| !used.contains(i) && h.contains(kw))
            .map(|(i, _)| i)
    })
}

fn split_amount(headers: &[String], bound: usize, used: &[usize]) -> AmountColumns {
    let name = headers[bound].to_lowercase();
    let partner = |kw: &str| find_keyword(headers, &[kw], used);
    if name.contains("debit") || name.contains("withdrawal") {
        if let Some(credit) = partner("credit").or_else(|| partner("deposit")) {
            return AmountColumns::Split { debit: bound, credit };
        }
    } else if name.contains("credit") || name.contains("deposit") {
        if let Some(debit) = partner("debit").or_else(|| partner("withdrawal")) {
            return AmountColumns::Split { debit, credit: bound };
        }
    }
    AmountColumns::Single(bound)
}

/// Bind the table's headers to the canonical fields.
///
/// Exact aliases of `profile` are tried first, then keyword matching over all
/// headers. Fails with [`ImportError::MissingColumn`] naming every required
/// field that stayed unbound.
pub fn resolve_mapping(
    headers: &[String],
    profile: Option<&SourceProfile>,
) -> Result<ColumnMapping, ImportError> {
    let mut used: Vec<usize> = Vec::new();
    let alias = |aliases: &[&str], used: &[usize]| find_alias(headers, aliases, used);

    let mut date = profile.and_then(|p| alias(p.date, &used));
    used.extend(date);
    let mut amount = profile.and_then(|p| alias(p.amount, &used));
    used.extend(amount);
    let mut description = profile.and_then(|p| alias(p.description, &used));
    used.extend(description);

    if date.is_none() {
        date = find_keyword(headers, DATE_KEYWORDS, &used);
        used.extend(date);
    }
    if amount.is_none() {
        amount = find_keyword(headers, AMOUNT_KEYWORDS, &used);
        used.extend(amount);
    }
    if description.is_none() {
        description = find_keyword(headers, DESCRIPTION_KEYWORDS, &used);
        used.extend(description);
    }

    let (date, description, amount) = match (date, description, amount) {
        (Some(d), Some(desc), Some(a)) => (d, desc, a),
        _ => {
            let mut fields = Vec::new();
            if date.is_none() {
                fields.push("date".to_string());
            }
            if description.is_none() {
                fields.push("description".to_string());
            }
            if amount.is_none() {
                fields.push("amount".to_string());
            }
            return Err(ImportError::MissingColumn {
                fields,
                headers: headers.iter().map(|h| h.trim().to_string()).collect(),
            });
        }
    };

    let amount = split_amount(headers, amount, &used);
    if let AmountColumns::Split { debit, credit } = amount {
        used.extend([debit, credit]);
    }

    let post_date = profile.and_then(|p| alias(p.post_date, &used));
    used.extend(post_date);
    let original_category = profile
        .and_then(|p| alias(p.original_category, &used))
        .or_else(|| find_keyword(headers, CATEGORY_KEYWORDS, &used));

    Ok(ColumnMapping {
        date,
        description,
        amount,
        post_date,
        original_category,
    })
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn optional_cell(row: &[String], idx: Option<usize>) -> Option<String> {
    idx.map(|i| cell(row, i)).filter(|s| !s.is_empty())
}

/// Magnitude of a debit or credit cell; `None` for blank or zero.
fn side(raw: &str) -> Option<Decimal> {
    parse_amount(raw).map(|v| v.abs()).filter(|v| !v.is_zero())
}

fn amount_cell(row: &[String], amount: AmountColumns) -> String {
    match amount {
        AmountColumns::Single(i) => cell(row, i),
        AmountColumns::Split { debit, credit } => {
            let d = cell(row, debit);
            let c = cell(row, credit);
            // Unreadable text is passed through so the row fails loudly.
            for raw in [&d, &c] {
                if !raw.is_empty() && parse_amount(raw).is_none() {
                    return raw.clone();
                }
            }
            match (side(&d), side(&c)) {
                (Some(d), Some(c)) => (c - d).to_string(),
                (Some(d), None) => (-d).to_string(),
                (None, Some(c)) => c.to_string(),
                (None, None) if d.is_empty() && c.is_empty() => String::new(),
                (None, None) => Decimal::ZERO.to_string(),
            }
        }
    }
}

/// Rename a raw table onto the canonical schema.
pub fn map_columns(
    table: &RawTable,
    profile: Option<&SourceProfile>,
) -> Result<MappedTable, ImportError> {
    let mapping = resolve_mapping(&table.headers, profile)?;
    let rows = table
        .rows
        .iter()
        .map(|row| MappedRow {
            date: cell(row, mapping.date),
            description: cell(row, mapping.description),
            amount: amount_cell(row, mapping.amount),
            post_date: optional_cell(row, mapping.post_date),
            category: None,
            original_category: optional_cell(row, mapping.original_category),
        })
        .collect();
    Ok(MappedTable {
        headers: table.headers.clone(),
        mapping,
        rows,
    })
}
