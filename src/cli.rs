// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::DB_ENV;
use clap::{Arg, ArgAction, Command, arg, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON").action(ArgAction::SetTrue))
        .arg(arg!(--jsonl "Print one JSON object per line").action(ArgAction::SetTrue))
}

pub fn build_cli() -> Command {
    Command::new("billfold")
        .version(crate_version!())
        .about("Import, categorize and budget bank and card statements")
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .global(true)
                .env(DB_ENV)
                .help("SQLite database file (defaults to the platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database and print its location"))
        .subcommand(
            Command::new("detect")
                .about("Detect which bank issued a statement")
                .arg(arg!(--path <PATH> "Statement file").required(true)),
        )
        .subcommand(
            Command::new("preview")
                .about("Show the first rows of a statement without importing")
                .arg(arg!(--path <PATH> "Statement file").required(true))
                .arg(arg!(--sheet <SHEET> "Excel worksheet").required(false))
                .arg(arg!(--pages <PAGES> "PDF pages, e.g. 1,2").required(false))
                .arg(
                    arg!(--rows <N> "Rows to show")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .default_value("5"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import a CSV, Excel or PDF statement")
                .arg(arg!(--path <PATH> "Statement file").required(true))
                .arg(arg!(--source <SOURCE> "wells_fargo, chase, bank_of_america, apple_pay or schwab").required(false))
                .arg(arg!(--sheet <SHEET> "Excel worksheet").required(false))
                .arg(arg!(--pages <PAGES> "PDF pages, e.g. 1,2").required(false))
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Parse and categorize but do not save"),
                )
                .arg(arg!(--json "Print the imported rows as JSON").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the category vocabulary")
                .subcommand(
                    Command::new("add").arg(arg!(--name <NAME> "Category name").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm").arg(arg!(--name <NAME> "Category name").required(true)),
                )
                .subcommand(
                    Command::new("replace")
                        .about("Move every transaction from one category to another")
                        .arg(arg!(--from <FROM>).required(true))
                        .arg(arg!(--to <TO>).required(true)),
                ),
        )
        .subcommand(
            Command::new("rules")
                .about("Regex rules that categorize descriptions")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--pattern <REGEX>).required(true))
                        .arg(arg!(--category <CATEGORY>).required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Inspect and correct stored transactions")
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(arg!(--month <YYYY_MM>).required(false))
                        .arg(arg!(--category <CATEGORY>).required(false))
                        .arg(arg!(--source <SOURCE>).required(false))
                        .arg(
                            arg!(--limit <N>)
                                .required(false)
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("set-category")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(arg!(--category <CATEGORY>).required(true)),
                )
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true)))
                .subcommand(
                    Command::new("reindex").about("Renumber ids in date order"),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets per category")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--month <YYYY_MM>).required(true))
                        .arg(arg!(--category <CATEGORY>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true)),
                )
                .subcommand(Command::new("list").arg(arg!(--month <YYYY_MM>).required(false)))
                .subcommand(json_flags(
                    Command::new("report").arg(arg!(--month <YYYY_MM>).required(true)),
                )),
        )
        .subcommand(
            Command::new("balance")
                .about("Current account balances")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(arg!(--name <NAME>).required(true))),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        arg!(--format <FORMAT> "csv or json")
                            .required(false)
                            .default_value("csv"),
                    )
                    .arg(arg!(--out <PATH>).required(true)),
            ),
        )
        .subcommand(
            Command::new("doctor").about("Check stored transactions for sign and category problems"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn db_flag_is_global() {
        let m = build_cli().get_matches_from(["billfold", "tx", "list", "--db", "/tmp/x.sqlite"]);
        assert_eq!(m.get_one::<String>("db").map(String::as_str), Some("/tmp/x.sqlite"));
    }
}
