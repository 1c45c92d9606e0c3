// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::pipeline::detect_source;
use crate::pipeline::filetype::detect_file_type;
use crate::utils::{LAST_IMPORT_SOURCE, get_setting, required_arg};
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let path = Path::new(required_arg(m, "path")?);
    let file_type = detect_file_type(path);
    match detect_source(path)? {
        Some(source) => println!("{} ({})", source, file_type),
        None => {
            println!("unknown ({})", file_type);
            if let Some(last) = get_setting(conn, LAST_IMPORT_SOURCE)? {
                println!("Hint: the previous import used --source {}", last);
            }
        }
    }
    Ok(())
}
