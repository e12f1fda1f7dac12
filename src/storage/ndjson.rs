//! NDJSON (Newline Delimited JSON) output of canonical batches

use crate::etl::Loader;
use crate::sales::CanonicalBatch;

use eyre::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes each canonical record as one JSON line
///
/// Writes to a file when given a path, otherwise to standard output.
/// Used for dry runs that skip the database.
pub struct NdjsonWriter {
    path: Option<PathBuf>,
}

impl NdjsonWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    pub fn stdout() -> Self {
        Self { path: None }
    }

    /// Render a batch as NDJSON text
    pub fn render(batch: &CanonicalBatch) -> Result<String> {
        let mut out = String::new();
        for record in batch.records() {
            out.push_str(
                &serde_json::to_string(record).context("Failed to serialize record to JSON")?,
            );
            out.push('\n');
        }
        Ok(out)
    }

    /// Write a batch, replacing any previous file content
    pub fn write(&self, batch: &CanonicalBatch) -> Result<()> {
        let content = Self::render(batch)?;

        match &self.path {
            Some(path) => std::fs::write(path, content)
                .with_context(|| format!("Failed to write NDJSON file: {}", path.display()))?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

impl Loader for NdjsonWriter {
    type Batch = CanonicalBatch;

    async fn load(&self, batch: Self::Batch) -> Result<usize> {
        self.write(&batch)?;
        Ok(batch.len())
    }
}
