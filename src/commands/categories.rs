// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::pipeline::categorize::is_standard_category;
use crate::utils::{pretty_table, required_arg};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required_arg(sub, "name")?;
            db::add_custom_category(conn, name)?;
            println!("Added category '{}'", name);
        }
        Some(("list", _)) => {
            let data = db::load_categories(conn)?
                .into_iter()
                .map(|name| {
                    let kind = if is_standard_category(&name) {
                        "standard"
                    } else {
                        "custom"
                    };
                    vec![name, kind.to_string()]
                })
                .collect();
            println!("{}", pretty_table(&["Category", "Kind"], data));
        }
        Some(("rm", sub)) => {
            let name = required_arg(sub, "name")?;
            let removal = db::delete_custom_category(conn, name)?;
            println!("Removed category '{}'", name);
            if removal.moved > 0 {
                println!("Moved {} transaction(s) to Miscellaneous", removal.moved);
            }
            if removal.rules_removed > 0 {
                println!("Deleted {} rule(s) that assigned it", removal.rules_removed);
            }
        }
        Some(("replace", sub)) => {
            let from = required_arg(sub, "from")?;
            let to = required_arg(sub, "to")?;
            let n = db::replace_category(conn, from, to)?;
            println!("Recategorized {} transaction(s): '{}' -> '{}'", n, from, to);
        }
        _ => {}
    }
    Ok(())
}
