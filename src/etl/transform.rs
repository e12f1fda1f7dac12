//! Transformer trait for data transformation

use eyre::Result;

/// Batches that can report how many records they carry
pub trait RecordCount {
    fn record_count(&self) -> usize;
}

impl<T> RecordCount for Vec<T> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

/// Transformer trait for turning the extracted items into one output batch
///
/// The transformer receives every extracted item in a single call. Cleaning
/// rules that depend on column-wide statistics (a mode, a schema check) need
/// to see the whole set before touching any row.
///
/// # Example
/// ```
/// use sales_etl::etl::Transformer;
/// use eyre::Result;
///
/// struct Concat;
///
/// impl Transformer for Concat {
///     type Input = Vec<i32>;
///     type Output = Vec<i32>;
///
///     fn transform(&self, inputs: Vec<Self::Input>) -> Result<Self::Output> {
///         Ok(inputs.into_iter().flatten().collect())
///     }
/// }
///
/// let out = Concat.transform(vec![vec![1, 2], vec![3]]).unwrap();
/// assert_eq!(out, vec![1, 2, 3]);
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output batch type after transformation
    type Output: RecordCount + Send;

    /// Transform all extracted items into one output batch
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, inputs: Vec<Self::Input>) -> Result<Self::Output>;
}
