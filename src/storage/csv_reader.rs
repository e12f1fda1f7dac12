//! CSV parsing into raw sales batches

use crate::sales::{RAW_COLUMNS, RawBatch, RawRecord};
use csv::ReaderBuilder;
use eyre::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Reads comma-delimited text with a header row into a [`RawBatch`]
///
/// Cells equal to one of the null markers become null. Rows shorter than
/// the header get nulls for the missing cells. Values are not trimmed.
pub struct CsvReader {
    null_markers: HashSet<String>,
}

impl CsvReader {
    pub fn new(null_markers: impl IntoIterator<Item = String>) -> Self {
        Self {
            null_markers: null_markers.into_iter().collect(),
        }
    }

    /// Read a CSV file from disk
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<RawBatch> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        self.read_from(path.display().to_string(), file)
    }

    /// Read CSV from an in-memory body
    pub fn read_str(&self, source: impl Into<String>, content: &str) -> Result<RawBatch> {
        self.read_from(source.into(), content.as_bytes())
    }

    fn read_from(&self, source: String, input: impl std::io::Read) -> Result<RawBatch> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header of {}", source))?
            .iter()
            .map(String::from)
            .collect();

        if columns.iter().all(|c| c.is_empty()) {
            eyre::bail!("CSV header of {} is empty", source);
        }

        // Column index for each raw sales column present in the header
        let indices: Vec<(&str, usize)> = RAW_COLUMNS
            .iter()
            .filter_map(|name| columns.iter().position(|c| c == name).map(|i| (*name, i)))
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.with_context(|| format!("Failed to parse CSV row in {}", source))?;

            let mut record = RawRecord::default();
            for (name, index) in &indices {
                let value = row
                    .get(*index)
                    .filter(|cell| !self.null_markers.contains(*cell))
                    .map(String::from);
                record.set(name, value);
            }
            records.push(record);
        }

        log::debug!("Read {} row(s) from {}", records.len(), source);
        Ok(RawBatch::new(source, columns, records))
    }
}
