// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Structural failures of the statement import pipeline.
///
/// Anything in here aborts the import of a whole file. Partial data-quality
/// problems (unparseable dates, low-confidence PDF extraction) are reported on
/// [`crate::models::ImportReport`] instead.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported source '{0}' (known sources: {known})", known = crate::pipeline::sources::known_ids().join(", "))]
    UnsupportedSource(String),

    #[error("Unsupported file format '{0}' (use csv, xlsx, xls or pdf)")]
    UnsupportedFormat(String),

    #[error("Could not detect the statement source of '{0}'; pass --source explicitly")]
    SourceNotDetected(String),

    #[error("Missing required column(s) {}: headers seen were [{}]", .fields.join(", "), .headers.join(", "))]
    MissingColumn {
        fields: Vec<String>,
        headers: Vec<String>,
    },

    #[error("Invalid amount '{value}' on row {row}")]
    InvalidAmount { row: usize, value: String },

    #[error("Extraction strategy '{strategy}' failed: {reason}")]
    Extraction { strategy: String, reason: String },

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("File '{0}' contains no header row")]
    EmptyFile(String),

    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),
}

impl ImportError {
    /// Names of the canonical fields that could not be bound, if any.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ImportError::MissingColumn { fields, .. } => fields,
            _ => &[],
        }
    }
}
