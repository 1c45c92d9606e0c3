// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{self, TransactionFilter};
use crate::models::Transaction;
use crate::pipeline::signs::sign_matches_category;
use crate::utils::{fmt_money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub id: i64,
    pub detail: String,
}

/// Stored rows whose sign disagrees with their category, or whose category
/// is missing or no longer in the vocabulary.
pub fn find_issues(conn: &Connection) -> Result<Vec<Issue>> {
    let vocab = db::vocabulary(conn)?;
    let mut issues = Vec::new();
    for st in db::load_transactions(conn, &TransactionFilter::default())? {
        let id = st.id;
        let t = Transaction::from(st);
        match t.category.as_deref() {
            None => issues.push(Issue {
                kind: "missing_category",
                id,
                detail: t.description.clone(),
            }),
            Some(c) if !vocab.contains(c) => issues.push(Issue {
                kind: "unknown_category",
                id,
                detail: c.to_string(),
            }),
            Some(_) => {}
        }
        if !sign_matches_category(&t) {
            issues.push(Issue {
                kind: "sign_mismatch",
                id,
                detail: format!(
                    "{} {}",
                    fmt_money(&t.amount),
                    t.category.as_deref().unwrap_or_default()
                ),
            });
        }
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = find_issues(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.id.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Transaction", "Detail"], rows));
    }
    Ok(())
}
