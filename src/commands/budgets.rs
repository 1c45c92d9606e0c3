// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{self, TransactionFilter};
use crate::pipeline::categorize::UNCATEGORIZED;
use crate::utils::{
    fmt_money, maybe_print_json, optional_arg, parse_decimal, parse_month, pretty_table,
    required_arg,
};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("report", sub)) => report(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(required_arg(sub, "month")?)?;
    let cat = required_arg(sub, "category")?;
    let amount = parse_decimal(required_arg(sub, "amount")?)?;
    db::set_budget(conn, &month, cat, amount)?;
    println!("Budget set for {} / {} = {}", month, cat, fmt_money(&amount));
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = optional_arg(sub, "month").map(parse_month).transpose()?;
    let data = db::list_budgets(conn, month.as_deref())?
        .into_iter()
        .map(|b| vec![b.month, b.category, fmt_money(&b.amount)])
        .collect();
    println!("{}", pretty_table(&["Month", "Category", "Budget"], data));
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

/// Budget against spending for one month. Spending is the negated sum of
/// the month's negative amounts; a category shows up if it has either.
pub fn budget_report(conn: &Connection, month: &str) -> Result<Vec<BudgetLine>> {
    let mut lines: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for b in db::list_budgets(conn, Some(month))? {
        lines.entry(b.category).or_default().0 = b.amount;
    }
    let filter = TransactionFilter {
        month: Some(month.to_string()),
        ..TransactionFilter::default()
    };
    for t in db::load_transactions(conn, &filter)? {
        if t.amount < Decimal::ZERO {
            let cat = t.category.unwrap_or_else(|| UNCATEGORIZED.to_string());
            lines.entry(cat).or_default().1 -= t.amount;
        }
    }
    Ok(lines
        .into_iter()
        .map(|(category, (budget, spent))| BudgetLine {
            category,
            budget,
            spent,
            remaining: budget - spent,
        })
        .collect())
}

fn report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(required_arg(sub, "month")?)?;
    let data = budget_report(conn, &month)?;

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|l| {
                vec![
                    l.category.clone(),
                    fmt_money(&l.budget),
                    fmt_money(&l.spent),
                    fmt_money(&l.remaining),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining"], rows)
        );
    }
    Ok(())
}
