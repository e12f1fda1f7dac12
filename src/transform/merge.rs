//! Schema check and concatenation of raw batches

use crate::sales::{RAW_COLUMNS, RawBatch, RawRecord, SalesError};

/// A raw record tagged with its rank in the merged sequence
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedRecord {
    pub position: usize,
    pub record: RawRecord,
}

/// Concatenates column-compatible batches in batch order, then row order
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchMerger;

impl BatchMerger {
    pub fn new() -> Self {
        Self
    }

    /// Verify every batch has the same column set and that the set carries
    /// all raw sales columns. Nothing is merged unless the check passes.
    pub fn check_schema(&self, batches: &[RawBatch]) -> Result<(), SalesError> {
        let first = batches.first().ok_or(SalesError::EmptyInput)?;
        let reference = first.column_set();

        for batch in &batches[1..] {
            if batch.column_set() != reference {
                return Err(SalesError::SchemaMismatch {
                    batch: batch.source().to_string(),
                    expected: reference.iter().map(|c| c.to_string()).collect(),
                    found: batch.column_set().iter().map(|c| c.to_string()).collect(),
                });
            }
        }

        if !first.missing_columns().is_empty() {
            return Err(SalesError::SchemaMismatch {
                batch: first.source().to_string(),
                expected: RAW_COLUMNS.iter().map(|c| c.to_string()).collect(),
                found: first.columns().to_vec(),
            });
        }

        let extra = first.extra_columns();
        if !extra.is_empty() {
            log::warn!(
                "Dropping column(s) not in the sales schema: {}",
                extra.join(", ")
            );
        }

        Ok(())
    }

    /// Check the schema and concatenate all batches into one working sequence
    pub fn merge(&self, batches: Vec<RawBatch>) -> Result<Vec<PositionedRecord>, SalesError> {
        self.check_schema(&batches)?;

        let merged: Vec<PositionedRecord> = batches
            .into_iter()
            .flat_map(RawBatch::into_records)
            .enumerate()
            .map(|(position, record)| PositionedRecord { position, record })
            .collect();

        log::debug!("Merged {} row(s)", merged.len());
        Ok(merged)
    }
}
