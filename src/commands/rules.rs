// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::utils::{parse_id, pretty_table, required_arg};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let pattern = required_arg(sub, "pattern")?;
            let category = required_arg(sub, "category")?;
            let id = db::add_rule(conn, pattern, category)?;
            println!("Added rule {}: /{}/ -> {}", id, pattern, category);
        }
        Some(("list", _)) => {
            let data = db::list_rules(conn)?
                .into_iter()
                .map(|r| vec![r.id.to_string(), r.pattern, r.category])
                .collect();
            println!("{}", pretty_table(&["ID", "Pattern", "Category"], data));
        }
        Some(("rm", sub)) => {
            let id = parse_id(required_arg(sub, "id")?)?;
            db::delete_rule(conn, id)?;
            println!("Removed rule {}", id);
        }
        _ => {}
    }
    Ok(())
}
