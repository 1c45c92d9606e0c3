// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Pdf,
    Xlsx,
    Xls,
    Unknown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Pdf => "pdf",
            FileType::Xlsx => "xlsx",
            FileType::Xls => "xls",
            FileType::Unknown => "unknown",
        }
    }

    pub fn is_excel(&self) -> bool {
        matches!(self, FileType::Xlsx | FileType::Xls)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a file by its extension alone. Never fails.
pub fn detect_file_type(path: impl AsRef<Path>) -> FileType {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.trim().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => FileType::Csv,
        "pdf" => FileType::Pdf,
        "xlsx" => FileType::Xlsx,
        "xls" => FileType::Xls,
        _ => FileType::Unknown,
    }
}
