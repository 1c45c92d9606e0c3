// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::utils::{fmt_money, parse_decimal, pretty_table, required_arg};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let name = required_arg(sub, "name")?;
            let amount = parse_decimal(required_arg(sub, "amount")?)?;
            db::set_account_balance(conn, name, amount)?;
            println!("Balance for '{}' = {}", name, fmt_money(&amount));
        }
        Some(("list", _)) => {
            let mut data: Vec<Vec<String>> = db::list_account_balances(conn)?
                .into_iter()
                .map(|b| vec![b.name, fmt_money(&b.balance), b.updated_at])
                .collect();
            data.push(vec![
                "Total".into(),
                fmt_money(&db::total_balance(conn)?),
                String::new(),
            ]);
            println!("{}", pretty_table(&["Account", "Balance", "Updated"], data));
        }
        Some(("rm", sub)) => {
            let name = required_arg(sub, "name")?;
            db::delete_account_balance(conn, name)?;
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
