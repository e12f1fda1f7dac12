//! Extractor trait for data extraction from various sources

use eyre::Result;

/// A failure that was isolated to one part of a source
///
/// Extractors that read many independent objects record these instead of
/// aborting, so the remaining objects still make it into the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionFailure {
    /// Where the failure happened (file path, object key, ...)
    pub source: String,
    /// Human readable cause
    pub reason: String,
}

impl ExtractionFailure {
    pub fn new(source: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            source: source.into(),
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

/// Result of one extraction call: the items that were read plus a record of
/// the isolated failures
#[derive(Debug)]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub failures: Vec<ExtractionFailure>,
}

impl<T> Extraction<T> {
    /// An extraction where everything succeeded
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Extractor trait for extracting data from a source
///
/// Implementors define how to extract items from sources like:
/// - Local CSV files
/// - Object storage buckets
///
/// # Example
/// ```no_run
/// use sales_etl::etl::{Extraction, Extractor};
/// use eyre::Result;
/// use std::path::PathBuf;
///
/// struct LineExtractor {
///     path: PathBuf,
/// }
///
/// impl Extractor for LineExtractor {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Extraction<Self::Item>> {
///         let content = std::fs::read_to_string(&self.path)?;
///         Ok(Extraction::complete(content.lines().map(String::from).collect()))
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails as a whole (network, I/O, parsing, etc.).
    /// Failures confined to one object are reported in [`Extraction::failures`].
    fn extract(&self) -> impl std::future::Future<Output = Result<Extraction<Self::Item>>> + Send;
}
