// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::{cli, commands::balances, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn run_balance(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["billfold", "balance"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("balance", m)) = matches.subcommand() {
        balances::handle(conn, m)
    } else {
        panic!("balance command not parsed");
    }
}

#[test]
fn balances_upsert_and_total() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();

    run_balance(&conn, &["set", "--name", "Checking", "--amount", "1200.50"]).unwrap();
    run_balance(&conn, &["set", "--name", "Card", "--amount", "-300"]).unwrap();
    run_balance(&conn, &["set", "--name", "Checking", "--amount", "1000"]).unwrap();

    let listed = db::list_account_balances(&conn).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Card");
    assert_eq!(db::total_balance(&conn).unwrap(), Decimal::from_str("700").unwrap());

    run_balance(&conn, &["rm", "--name", "Card"]).unwrap();
    assert!(run_balance(&conn, &["rm", "--name", "Card"]).is_err());
    assert_eq!(db::total_balance(&conn).unwrap(), Decimal::from_str("1000").unwrap());
}
