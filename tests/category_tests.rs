// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::db::{self, TransactionFilter};
use billfold::models::Transaction;
use billfold::pipeline::categorize::STANDARD_CATEGORIES;
use billfold::pipeline::{ImportOptions, import_statement};
use billfold::{cli, commands::categories};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run_category(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["billfold", "category"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("category", cat_m)) = matches.subcommand() {
        categories::handle(conn, cat_m)
    } else {
        panic!("category command not parsed");
    }
}

fn pet_expense(category: &str) -> Transaction {
    Transaction {
        date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        description: "Vet visit".into(),
        amount: Decimal::new(-8000, 2),
        source: "chase".into(),
        category: Some(category.into()),
        original_category: None,
    }
}

#[test]
fn vocabulary_is_standard_plus_custom_sorted() {
    let mut conn = setup();
    run_category(&mut conn, &["add", "--name", " Pets "]).unwrap();
    let all = db::load_categories(&conn).unwrap();
    assert_eq!(all.len(), STANDARD_CATEGORIES.len() + 1);
    assert!(all.contains(&"Pets".to_string()));
    let mut sorted = all.clone();
    sorted.sort();
    assert_eq!(all, sorted);
}

#[test]
fn standard_categories_cannot_be_added_or_removed() {
    let mut conn = setup();
    assert!(run_category(&mut conn, &["add", "--name", "Dining"]).is_err());
    let err = run_category(&mut conn, &["rm", "--name", "Dining"]).unwrap_err();
    assert!(err.to_string().contains("cannot be removed"));
}

#[test]
fn duplicate_custom_category_is_rejected() {
    let conn = setup();
    db::add_custom_category(&conn, "Pets").unwrap();
    assert!(db::add_custom_category(&conn, "Pets").is_err());
}

#[test]
fn removing_a_custom_category_moves_its_rows_to_miscellaneous() {
    let mut conn = setup();
    db::add_custom_category(&conn, "Pets").unwrap();
    db::append_transactions(&mut conn, &[pet_expense("Pets")]).unwrap();

    run_category(&mut conn, &["rm", "--name", "Pets"]).unwrap();

    let rows = db::load_transactions(&conn, &TransactionFilter::default()).unwrap();
    assert_eq!(rows[0].category.as_deref(), Some("Miscellaneous"));
    assert!(!db::vocabulary(&conn).unwrap().contains("Pets"));
}

#[test]
fn replace_moves_every_matching_row() {
    let mut conn = setup();
    db::append_transactions(
        &mut conn,
        &[pet_expense("Health"), pet_expense("Health"), pet_expense("Dining")],
    )
    .unwrap();
    db::add_custom_category(&conn, "Pets").unwrap();

    run_category(&mut conn, &["replace", "--from", "Health", "--to", "Pets"]).unwrap();

    let pets = db::load_transactions(
        &conn,
        &TransactionFilter {
            category: Some("Pets".into()),
            ..TransactionFilter::default()
        },
    )
    .unwrap();
    assert_eq!(pets.len(), 2);
}

#[test]
fn removing_a_category_drops_its_rules_so_imports_stay_in_vocabulary() {
    let mut conn = setup();
    db::add_custom_category(&conn, "Pets").unwrap();
    db::add_rule(&conn, "(?i)zzqx", "Pets").unwrap();
    db::add_rule(&conn, "(?i)kibble", "Groceries").unwrap();

    let removal = db::delete_custom_category(&mut conn, "Pets").unwrap();
    assert_eq!(removal.rules_removed, 1);
    let left = db::list_rules(&conn).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].category, "Groceries");

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(
        file,
        "Transaction Date,Post Date,Description,Category,Type,Amount,Memo\n\
         01/20/2024,01/21/2024,ZZQX 8812,,Sale,12.00,\n"
    )
    .unwrap();
    file.flush().unwrap();
    let options = ImportOptions {
        rules: db::load_user_rules(&conn).unwrap(),
        vocabulary: db::vocabulary(&conn).unwrap(),
        ..ImportOptions::default()
    };
    let report = import_statement(file.path(), &options).unwrap();
    let category = report.transactions[0].category.as_deref().unwrap();
    assert_eq!(category, "Miscellaneous");
    assert!(db::vocabulary(&conn).unwrap().contains(category));
}

#[test]
fn failed_removal_leaves_rows_and_rules_untouched() {
    let mut conn = setup();
    db::add_custom_category(&conn, "Pets").unwrap();
    db::append_transactions(&mut conn, &[pet_expense("Pets")]).unwrap();
    db::add_rule(&conn, "(?i)vet", "Pets").unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_rule_delete BEFORE DELETE ON rules
         BEGIN SELECT RAISE(ABORT, 'rules are locked'); END;",
    )
    .unwrap();

    assert!(db::delete_custom_category(&mut conn, "Pets").is_err());

    let rows = db::load_transactions(&conn, &TransactionFilter::default()).unwrap();
    assert_eq!(rows[0].category.as_deref(), Some("Pets"));
    assert!(db::vocabulary(&conn).unwrap().contains("Pets"));
    assert_eq!(db::list_rules(&conn).unwrap().len(), 1);
}
