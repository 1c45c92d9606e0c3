// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{self, TransactionFilter};
use crate::models::StoredTransaction;
use crate::utils::{
    fmt_money, maybe_print_json, optional_arg, parse_id, parse_month, pretty_table, required_arg,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("set-category", sub)) => {
            let id = parse_id(required_arg(sub, "id")?)?;
            let category = required_arg(sub, "category")?;
            db::update_transaction_category(conn, id, category)?;
            println!("Transaction {} -> {}", id, category);
        }
        Some(("rm", sub)) => {
            let id = parse_id(required_arg(sub, "id")?)?;
            db::delete_transaction(conn, id)?;
            println!("Removed transaction {}", id);
        }
        Some(("reindex", _)) => {
            let n = db::reindex_by_date(conn)?;
            println!("Renumbered {} transaction(s) by date", n);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.description.clone(),
                    fmt_money(&t.amount),
                    t.source.clone(),
                    t.category.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Amount", "Source", "Category"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<StoredTransaction>> {
    let filter = TransactionFilter {
        month: optional_arg(sub, "month").map(parse_month).transpose()?,
        category: optional_arg(sub, "category").map(|s| s.to_string()),
        source: optional_arg(sub, "source").map(|s| s.to_string()),
        limit: sub.get_one::<usize>("limit").copied(),
        newest_first: true,
        ..TransactionFilter::default()
    };
    db::load_transactions(conn, &filter)
}
