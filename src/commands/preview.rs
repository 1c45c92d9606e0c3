// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::importer::parse_pages;
use crate::pipeline::{ImportOptions, Preview, preview};
use crate::utils::{optional_arg, pretty_table, required_arg};
use anyhow::Result;
use std::path::Path;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let path = required_arg(m, "path")?;
    let rows = m.get_one::<usize>("rows").copied().unwrap_or(5);
    let options = preview_options(m)?;

    match preview(Path::new(path), &options, rows)? {
        Preview::Table(table) => {
            let width = table.headers.len();
            let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
            let data = table
                .rows
                .into_iter()
                .map(|mut r| {
                    r.resize(width, String::new());
                    r
                })
                .collect();
            println!("{}", pretty_table(&headers, data));
        }
        Preview::Text(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub fn preview_options(m: &clap::ArgMatches) -> Result<ImportOptions> {
    Ok(ImportOptions {
        sheet: optional_arg(m, "sheet").map(|s| s.to_string()),
        pages: optional_arg(m, "pages").map(parse_pages).transpose()?,
        ..ImportOptions::default()
    })
}
