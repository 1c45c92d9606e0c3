// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::commands::budgets::{self, budget_report};
use billfold::models::Transaction;
use billfold::{cli, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn tx(date: &str, amount: &str, category: &str) -> Transaction {
    Transaction {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        description: "x".into(),
        amount: dec(amount),
        source: "wells_fargo".into(),
        category: Some(category.into()),
        original_category: None,
    }
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    db::append_transactions(
        &mut conn,
        &[
            tx("2025-03-02", "-30.00", "Groceries"),
            tx("2025-03-09", "-45.50", "Groceries"),
            tx("2025-03-15", "3000", "Income"),
            tx("2025-04-01", "-99", "Groceries"),
            tx("2025-03-20", "-12", "Dining"),
        ],
    )
    .unwrap();
    conn
}

#[test]
fn budget_set_upserts() {
    let conn = setup();
    for amount in ["100", "150"] {
        let matches = cli::build_cli().get_matches_from([
            "billfold",
            "budget",
            "set",
            "--month",
            "2025-03",
            "--category",
            "Groceries",
            "--amount",
            amount,
        ]);
        if let Some(("budget", b)) = matches.subcommand() {
            budgets::handle(&conn, b).unwrap();
        } else {
            panic!("budget command not parsed");
        }
    }
    let listed = db::list_budgets(&conn, Some("2025-03")).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].amount, dec("150"));
}

#[test]
fn budget_set_rejects_bad_month_and_category() {
    let conn = setup();
    assert!(db::set_budget(&conn, "2025-03", "Yachts", dec("10")).is_err());
    let matches = cli::build_cli().get_matches_from([
        "billfold", "budget", "set", "--month", "2025-13", "--category", "Dining", "--amount", "5",
    ]);
    if let Some(("budget", b)) = matches.subcommand() {
        let err = budgets::handle(&conn, b).unwrap_err();
        assert!(err.to_string().contains("Invalid month"));
    } else {
        panic!("budget command not parsed");
    }
}

#[test]
fn report_compares_spending_with_budget() {
    let conn = setup();
    db::set_budget(&conn, "2025-03", "Groceries", dec("100")).unwrap();
    db::set_budget(&conn, "2025-03", "Travel", dec("200")).unwrap();

    let lines = budget_report(&conn, "2025-03").unwrap();
    let names: Vec<&str> = lines.iter().map(|l| l.category.as_str()).collect();
    assert_eq!(names, vec!["Dining", "Groceries", "Travel"]);

    let groceries = &lines[1];
    assert_eq!(groceries.spent, dec("75.50"));
    assert_eq!(groceries.remaining, dec("24.50"));

    let dining = &lines[0];
    assert_eq!(dining.budget, Decimal::ZERO);
    assert_eq!(dining.spent, dec("12"));

    assert_eq!(lines[2].spent, Decimal::ZERO);
}
