// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category assignment: bank category translation, user rules and the
//! static keyword table.

use crate::error::ImportError;
use crate::models::{Rule, Transaction};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const MISCELLANEOUS: &str = "Miscellaneous";

pub const STANDARD_CATEGORIES: &[&str] = &[
    "Groceries",
    "Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Housing",
    "Utilities",
    "Health",
    "Insurance",
    "Education",
    "Income",
    "Investments",
    "Subscriptions",
    "Travel",
    "Personal Care",
    "Gifts & Donations",
    "Fees & Charges",
    MISCELLANEOUS,
    UNCATEGORIZED,
];

// First match wins, so overlapping keywords ("gas", "interest", "insurance")
// resolve to the earlier category.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Groceries",
        &[
            "trader", "safeway", "grocery", "market", "food", "whole foods", "albertsons",
            "kroger", "publix", "aldi",
        ],
    ),
    (
        "Dining",
        &[
            "restaurant", "mcdonalds", "starbucks", "coffee", "doordash", "grubhub",
            "uber eats", "chipotle", "wendys", "burger", "pizza", "taco", "cafe",
        ],
    ),
    (
        "Transportation",
        &[
            "uber", "lyft", "gas", "shell", "chevron", "transit", "parking", "exxon", "mobil",
            "bp", "valero", "toll", "auto", "car",
        ],
    ),
    (
        "Shopping",
        &[
            "amazon", "target", "walmart", "bestbuy", "ebay", "etsy", "costco", "sams club",
            "macys", "nordstrom", "tj maxx", "marshalls", "kohls",
        ],
    ),
    (
        "Entertainment",
        &[
            "netflix", "hbo", "spotify", "movie", "hulu", "disney", "theatre", "theater",
            "cinema", "apple music", "prime video", "youtube", "games",
        ],
    ),
    (
        "Housing",
        &[
            "rent", "mortgage", "hoa", "maintenance", "apartment", "property", "lease",
            "landlord", "home", "house",
        ],
    ),
    (
        "Utilities",
        &[
            "electric", "water", "gas", "internet", "phone", "utility", "bill", "power",
            "cable", "comcast", "verizon", "at&t", "sprint", "sewer",
        ],
    ),
    (
        "Health",
        &[
            "doctor", "pharmacy", "medical", "fitness", "gym", "health", "dental", "vision",
            "cvs", "walgreens", "hospital", "clinic", "insurance",
        ],
    ),
    (
        "Insurance",
        &[
            "insurance", "geico", "allstate", "state farm", "progressive", "nationwide",
            "liberty mutual", "farmers", "policy",
        ],
    ),
    (
        "Education",
        &[
            "tuition", "course", "book", "school", "university", "college", "student", "loan",
            "class", "education", "learning",
        ],
    ),
    (
        "Income",
        &[
            "payroll", "salary", "deposit", "dividend", "direct deposit", "payment received",
            "interest", "refund", "tax return",
        ],
    ),
    (
        "Investments",
        &[
            "investment", "transfer to", "schwab", "fidelity", "vanguard", "etrade",
            "robinhood", "stocks", "bonds", "mutual fund", "retirement",
        ],
    ),
    (
        "Subscriptions",
        &["subscription", "membership", "monthly", "annual fee", "renewal", "recurring"],
    ),
    (
        "Travel",
        &[
            "hotel", "flight", "airbnb", "airline", "expedia", "booking.com", "airfare",
            "vacation", "travel", "resort", "cruise", "tour", "trip",
        ],
    ),
    (
        "Personal Care",
        &[
            "salon", "haircut", "spa", "beauty", "cosmetics", "barber", "stylist", "nail",
            "massage",
        ],
    ),
    (
        "Gifts & Donations",
        &[
            "gift", "donation", "charity", "donate", "present", "gofundme", "fundraiser",
            "patreon", "kickstarter",
        ],
    ),
    (
        "Fees & Charges",
        &[
            "fee", "charge", "interest", "overdraft", "penalty", "late", "service charge",
            "atm fee", "bank fee",
        ],
    ),
];

/// Bank-provided category labels (Chase, Bank of America, Wells Fargo) and
/// their canonical names, in substring-match order.
const BANK_CATEGORIES: &[(&str, &str)] = &[
    ("Food & Drink", "Dining"),
    ("Groceries", "Groceries"),
    ("Travel", "Travel"),
    ("Shopping", "Shopping"),
    ("Bills & Utilities", "Utilities"),
    ("Health & Wellness", "Health"),
    ("Entertainment", "Entertainment"),
    ("Gas", "Transportation"),
    ("Home", "Housing"),
    ("Education", "Education"),
    ("Personal", "Personal Care"),
    ("Gifts & Donations", "Gifts & Donations"),
    ("Business Services", MISCELLANEOUS),
    ("Dining", "Dining"),
    ("Grocery", "Groceries"),
    ("Travel & Entertainment", "Entertainment"),
    ("Household Expenses", "Housing"),
    ("Auto & Transport", "Transportation"),
    ("Subscriptions", "Subscriptions"),
    ("Income & Transfers", "Income"),
    ("Dining Out", "Dining"),
    ("Groceries/Supermarkets", "Groceries"),
    ("Transportation", "Transportation"),
    ("Shopping/Retail", "Shopping"),
    ("Home/Rent", "Housing"),
    ("Utilities", "Utilities"),
    ("Health/Medical", "Health"),
    ("Insurance", "Insurance"),
    ("Education/School", "Education"),
    ("Income", "Income"),
    ("Investments", "Investments"),
    ("Travel/Vacation", "Travel"),
];

static KEYWORD_TABLE: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
                .expect("keyword table compiles");
            (*category, re)
        })
        .collect()
});

static BANK_CATEGORY_EXACT: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| BANK_CATEGORIES.iter().copied().collect());

/// Standard categories plus user-defined ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    names: BTreeSet<String>,
}

impl Vocabulary {
    pub fn standard() -> Self {
        Self::with_custom::<&str>(&[])
    }

    pub fn with_custom<S: AsRef<str>>(custom: &[S]) -> Self {
        let names = STANDARD_CATEGORIES
            .iter()
            .map(|s| s.to_string())
            .chain(
                custom
                    .iter()
                    .map(|s| s.as_ref().trim().to_string())
                    .filter(|s| !s.is_empty()),
            )
            .collect();
        Vocabulary { names }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.names.contains(category)
    }

    /// Sorted and de-duplicated.
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn is_standard_category(name: &str) -> bool {
    STANDARD_CATEGORIES.contains(&name)
}

/// `standard ∪ custom`, de-duplicated and sorted.
pub fn load_categories<S: AsRef<str>>(custom: &[S]) -> Vec<String> {
    Vocabulary::with_custom(custom).names()
}

/// User-defined `pattern -> category` overrides, newest first.
#[derive(Debug, Clone, Default)]
pub struct UserRules {
    rules: Vec<(Regex, String)>,
}

impl UserRules {
    pub fn compile(rules: &[Rule]) -> Result<Self, ImportError> {
        let mut sorted: Vec<&Rule> = rules.iter().collect();
        sorted.sort_by(|a, b| b.id.cmp(&a.id));
        let rules = sorted
            .into_iter()
            .map(|r| {
                Regex::new(&r.pattern)
                    .map(|re| (re, r.category.clone()))
                    .map_err(|err| ImportError::InvalidPattern {
                        pattern: r.pattern.clone(),
                        reason: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UserRules { rules })
    }

    pub fn lookup(&self, description: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(description))
            .map(|(_, c)| c.as_str())
    }
}

/// Translate a bank's own category label to the canonical vocabulary.
pub fn map_original_category(original: &str) -> &'static str {
    let original = original.trim();
    if let Some(mapped) = BANK_CATEGORY_EXACT.get(original) {
        return mapped;
    }
    let lowered = original.to_lowercase();
    BANK_CATEGORIES
        .iter()
        .find(|(bank, _)| lowered.contains(&bank.to_lowercase()))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(MISCELLANEOUS)
}

/// First category of the keyword table with a whole-word hit.
pub fn keyword_category(description: &str) -> Option<&'static str> {
    KEYWORD_TABLE
        .iter()
        .find(|(_, re)| re.is_match(description))
        .map(|(c, _)| *c)
}

/// The category a single transaction should carry.
///
/// A rule whose category has left `vocab` is ignored and keyword matching
/// takes over.
pub fn category_for(t: &Transaction, rules: &UserRules, vocab: &Vocabulary) -> String {
    if let Some(original) = t.original_category.as_deref().filter(|s| !s.trim().is_empty()) {
        return map_original_category(original).to_string();
    }
    if let Some(existing) = t.category.as_deref().filter(|s| !s.trim().is_empty()) {
        return existing.to_string();
    }
    let description = t.description.trim();
    if description.is_empty() {
        return UNCATEGORIZED.to_string();
    }
    if let Some(c) = rules.lookup(description).filter(|c| vocab.contains(c)) {
        return c.to_string();
    }
    keyword_category(description)
        .unwrap_or(MISCELLANEOUS)
        .to_string()
}

pub fn categorize(transactions: Vec<Transaction>) -> Vec<Transaction> {
    categorize_with(transactions, &UserRules::default(), &Vocabulary::standard())
}

pub fn categorize_with(
    mut transactions: Vec<Transaction>,
    rules: &UserRules,
    vocab: &Vocabulary,
) -> Vec<Transaction> {
    for t in transactions.iter_mut() {
        t.category = Some(category_for(t, rules, vocab));
    }
    transactions
}
