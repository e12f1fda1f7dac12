//! Loader trait for loading data to destinations

use eyre::Result;

/// Loader trait for loading a transformed batch to a destination
///
/// # Example
/// ```no_run
/// use sales_etl::etl::Loader;
/// use eyre::Result;
/// use std::path::PathBuf;
///
/// struct FileLoader {
///     output: PathBuf,
/// }
///
/// impl Loader for FileLoader {
///     type Batch = Vec<String>;
///
///     async fn load(&self, batch: Self::Batch) -> Result<usize> {
///         std::fs::write(&self.output, batch.join("\n"))?;
///         Ok(batch.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The batch type accepted by the destination
    type Batch: Send;

    /// Load a batch to the destination
    ///
    /// Returns the number of records written
    ///
    /// # Errors
    /// Returns an error if loading fails (unreachable destination, rejected write, etc.)
    fn load(&self, batch: Self::Batch) -> impl std::future::Future<Output = Result<usize>> + Send;
}
