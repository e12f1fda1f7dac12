//! Error taxonomy for the sales pipeline

use thiserror::Error;

/// Failures surfaced by the sales extract, transform and load stages
#[derive(Debug, Error)]
pub enum SalesError {
    /// A source could not be read or parsed
    #[error("Failed to extract {origin}: {reason}")]
    Extraction { origin: String, reason: String },

    /// Batches disagree on their column sets, or lack a required column
    #[error(
        "Column mismatch in '{batch}': expected [{}], found [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    SchemaMismatch {
        batch: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Nothing was handed to the transformer
    #[error("No batches to transform")]
    EmptyInput,

    /// A Sale_Date value, raw or imputed, is not a calendar value
    #[error("Unparseable Sale_Date at row {row}: {}", describe_date(.value))]
    DateParse { row: usize, value: Option<String> },

    /// A Quantity or Price value is not a finite number
    #[error("Unparseable {column} at row {row}: '{value}'")]
    ValueParse {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// The destination was unreachable or rejected the write
    #[error("Failed to load into '{table}': {reason}")]
    Load { table: String, reason: String },
}

fn describe_date(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "missing and no date to impute".to_string(),
    }
}

impl SalesError {
    pub fn extraction(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Extraction {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn load(table: impl Into<String>, reason: impl ToString) -> Self {
        Self::Load {
            table: table.into(),
            reason: reason.to_string(),
        }
    }
}
