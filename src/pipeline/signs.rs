// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use crate::pipeline::sources::SourceProfile;

/// Categories whose transactions are inflows.
pub const INCOME_CATEGORIES: &[&str] = &["Income", "Investments", "Refund"];

pub fn is_income_category(category: Option<&str>) -> bool {
    category.is_some_and(|c| INCOME_CATEGORIES.contains(&c))
}

/// Undo a source's reversed sign convention. Runs right after import,
/// before categorization.
pub fn apply_source_convention(transactions: &mut [Transaction], profile: &SourceProfile) {
    if !profile.flip_sign {
        return;
    }
    for t in transactions.iter_mut().filter(|t| !t.amount.is_zero()) {
        t.amount = -t.amount;
    }
}

/// Force income categories positive and everything else negative.
/// Zero amounts are left alone.
pub fn normalize_signs(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    for t in transactions.iter_mut() {
        if t.amount.is_zero() {
            continue;
        }
        t.amount = if is_income_category(t.category.as_deref()) {
            t.amount.abs()
        } else {
            -t.amount.abs()
        };
    }
    transactions
}

/// True when the stored sign agrees with the category.
pub fn sign_matches_category(t: &Transaction) -> bool {
    if t.amount.is_zero() {
        return true;
    }
    t.amount.is_sign_positive() == is_income_category(t.category.as_deref())
}
