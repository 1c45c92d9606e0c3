// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Known statement sources and how to recognise them.
//!
//! Adding a bank is a data change: append a [`SourceProfile`] to `PROFILES`
//! and, if it can be recognised, a signature to `HEADER_SIGNATURES` and
//! `TEXT_SIGNATURES`.

use crate::error::ImportError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Column aliases and conventions of one bank export format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub date: &'static [&'static str],
    pub description: &'static [&'static str],
    pub amount: &'static [&'static str],
    pub post_date: &'static [&'static str],
    pub original_category: &'static [&'static str],
    /// Expenses are exported as positive numbers and income as negative.
    pub flip_sign: bool,
}

static PROFILES: Lazy<Vec<SourceProfile>> = Lazy::new(|| {
    vec![
        SourceProfile {
            id: "wells_fargo",
            name: "Wells Fargo",
            date: &["Date"],
            description: &["Description"],
            amount: &["Amount"],
            post_date: &[],
            original_category: &["Category"],
            flip_sign: true,
        },
        SourceProfile {
            id: "chase",
            name: "Chase",
            date: &["Transaction Date"],
            description: &["Description"],
            amount: &["Amount"],
            post_date: &["Post Date"],
            original_category: &["Category"],
            flip_sign: true,
        },
        SourceProfile {
            id: "bank_of_america",
            name: "Bank of America",
            date: &["Posted Date", "Date"],
            description: &["Payee", "Description"],
            amount: &["Amount"],
            post_date: &[],
            original_category: &["Category"],
            flip_sign: false,
        },
        SourceProfile {
            id: "apple_pay",
            name: "Apple Pay",
            date: &["Date", "Transaction Date"],
            description: &["Description", "Merchant"],
            amount: &["Amount (USD)", "Amount"],
            post_date: &["Clearing Date"],
            original_category: &["Category"],
            flip_sign: false,
        },
        SourceProfile {
            id: "schwab",
            name: "Charles Schwab",
            date: &["Date"],
            description: &["Description"],
            amount: &["Amount"],
            post_date: &[],
            original_category: &[],
            flip_sign: false,
        },
    ]
});

// Multi-substring rules come first; single keywords are too loose to be
// trusted before them.
const HEADER_SIGNATURES: &[(&str, &[&str])] = &[
    ("chase", &["transaction date", "post date"]),
    ("bank_of_america", &["posted date", "payee"]),
    ("apple_pay", &["clearing date", "amount (usd)"]),
    ("wells_fargo", &["wells"]),
    ("apple_pay", &["apple"]),
    ("schwab", &["schwab"]),
];

static TEXT_SIGNATURES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("wells_fargo", r"wells\s+fargo"),
        ("bank_of_america", r"bank\s+of\s+america"),
        ("chase", r"\bchase\b"),
        ("schwab", r"\bschwab\b"),
        ("apple_pay", r"\bapple\b"),
    ]
    .into_iter()
    .filter_map(|(id, pat)| Regex::new(&format!("(?i){}", pat)).ok().map(|re| (id, re)))
    .collect()
});

pub fn known_ids() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.id).collect()
}

/// Canonical form of a user-supplied source name: "Bank of America",
/// "bank-of-america" and "bank_of_america" all resolve alike.
fn normalize_id(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

pub fn lookup(id: &str) -> Result<&'static SourceProfile, ImportError> {
    let wanted = normalize_id(id);
    PROFILES
        .iter()
        .find(|p| p.id == wanted || normalize_id(p.name) == wanted)
        .ok_or_else(|| ImportError::UnsupportedSource(id.trim().to_string()))
}

/// Identify a tabular export by its header row.
pub fn detect_from_headers<S: AsRef<str>>(headers: &[S]) -> Option<&'static str> {
    let joined = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    HEADER_SIGNATURES
        .iter()
        .find(|(_, required)| required.iter().all(|needle| joined.contains(needle)))
        .map(|(id, _)| *id)
}

/// Identify an unstructured statement (PDF text) by the bank names it mentions.
pub fn detect_from_text(text: &str) -> Option<&'static str> {
    TEXT_SIGNATURES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(id, _)| *id)
}
