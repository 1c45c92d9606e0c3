// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::pipeline::{ImportOptions, Preview, detect_source, preview};
use billfold::utils::{LAST_IMPORT_SOURCE, set_setting};
use billfold::{cli, commands, db};
use rusqlite::Connection;
use std::io::Write;

fn statement(suffix: &str, body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn detects_sources_from_headers() {
    let chase = statement(
        ".csv",
        "Transaction Date,Post Date,Description,Category,Type,Amount\n01/02/2024,01/03/2024,X,,Sale,1\n",
    );
    assert_eq!(detect_source(chase.path()).unwrap(), Some("chase"));

    let boa = statement(".csv", "Posted Date,Reference Number,Payee,Address,Amount\n");
    assert_eq!(detect_source(boa.path()).unwrap(), Some("bank_of_america"));

    let plain = statement(".csv", "Date,Description,Amount\n2024-01-02,X,1\n");
    assert_eq!(detect_source(plain.path()).unwrap(), None);
}

#[test]
fn detect_command_runs_for_unknown_files() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    set_setting(&conn, LAST_IMPORT_SOURCE, "schwab").unwrap();

    let plain = statement(".csv", "Date,Description,Amount\n2024-01-02,X,1\n");
    let matches = cli::build_cli().get_matches_from([
        "billfold",
        "detect",
        "--path",
        plain.path().to_str().unwrap(),
    ]);
    if let Some(("detect", m)) = matches.subcommand() {
        commands::detect::handle(&conn, m).unwrap();
    } else {
        panic!("detect command not parsed");
    }
}

#[test]
fn preview_truncates_rows() {
    let file = statement(
        ".csv",
        "Date,Description,Amount\n2024-01-01,A,1\n2024-01-02,B,2\n2024-01-03,C,3\n",
    );
    match preview(file.path(), &ImportOptions::default(), 2).unwrap() {
        Preview::Table(table) => {
            assert_eq!(table.headers, vec!["Date", "Description", "Amount"]);
            assert_eq!(table.rows.len(), 2);
            assert_eq!(table.rows[1][1], "B");
        }
        other => panic!("unexpected preview {:?}", other),
    }

    let matches = cli::build_cli().get_matches_from([
        "billfold",
        "preview",
        "--path",
        file.path().to_str().unwrap(),
        "--rows",
        "1",
    ]);
    if let Some(("preview", m)) = matches.subcommand() {
        commands::preview::handle(m).unwrap();
    } else {
        panic!("preview command not parsed");
    }
}

#[test]
fn preview_accepts_sheet_and_pages() {
    let matches = cli::build_cli().get_matches_from([
        "billfold",
        "preview",
        "--path",
        "statement.pdf",
        "--pages",
        "2, 3",
        "--sheet",
        "March",
    ]);
    if let Some(("preview", m)) = matches.subcommand() {
        let options = commands::preview::preview_options(m).unwrap();
        assert_eq!(options.pages, Some(vec![2, 3]));
        assert_eq!(options.sheet.as_deref(), Some("March"));
    } else {
        panic!("preview command not parsed");
    }
}
