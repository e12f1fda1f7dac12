//! Pipeline orchestration for ETL operations

use super::{ExtractionFailure, Extractor, Loader, RecordCount, Transformer};
use eyre::Result;

/// Outcome of one pipeline run
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Number of items the extractor produced
    pub batches: usize,
    /// Isolated extraction failures that did not stop the run
    pub failures: Vec<ExtractionFailure>,
    /// Number of records in the transformed batch
    pub records: usize,
    /// Number of records the loader reported as written
    pub loaded: usize,
}

/// ETL Pipeline that runs Extract, Transform, and Load in sequence
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use sales_etl::etl::Pipeline;
/// # use sales_etl::etl::{Extraction, Extractor, Transformer, Loader};
/// # use eyre::Result;
/// # struct MyExtractor;
/// # impl Extractor for MyExtractor {
/// #     type Item = Vec<i32>;
/// #     async fn extract(&self) -> Result<Extraction<Self::Item>> {
/// #         Ok(Extraction::complete(vec![]))
/// #     }
/// # }
/// # struct MyTransformer;
/// # impl Transformer for MyTransformer {
/// #     type Input = Vec<i32>;
/// #     type Output = Vec<i32>;
/// #     fn transform(&self, inputs: Vec<Self::Input>) -> Result<Self::Output> {
/// #         Ok(inputs.concat())
/// #     }
/// # }
/// # struct MyLoader;
/// # impl Loader for MyLoader {
/// #     type Batch = Vec<i32>;
/// #     async fn load(&self, batch: Self::Batch) -> Result<usize> { Ok(batch.len()) }
/// # }
///
/// # async fn example() -> Result<()> {
/// let pipeline = Pipeline::new(MyExtractor, MyTransformer, MyLoader);
///
/// let report = pipeline.run().await?;
/// println!("Loaded {} records", report.loaded);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Batch = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract items from source
    /// 2. Transform all items into one batch
    /// 3. Load the batch to the destination
    ///
    /// # Errors
    /// Returns an error if any stage fails. A transform error means the
    /// loader is never called.
    pub async fn run(&self) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();
        self.run_into(&mut report).await?;
        Ok(report)
    }

    /// Run the pipeline, filling `report` as each stage finishes
    ///
    /// When a stage fails, `report` still holds everything gathered before
    /// the failure (extracted batch count and isolated failures).
    pub async fn run_into(&self, report: &mut PipelineReport) -> Result<()> {
        log::info!("Starting ETL pipeline");

        log::debug!("Extracting from source...");
        let extraction = self.extractor.extract().await?;
        log::info!("Extracted {} item(s)", extraction.items.len());
        for failure in &extraction.failures {
            log::warn!("Skipped {}", failure);
        }
        report.batches = extraction.items.len();
        report.failures = extraction.failures;

        log::debug!("Transforming items...");
        let transformed = self.transformer.transform(extraction.items)?;
        report.records = transformed.record_count();
        log::info!("Transformed into {} record(s)", report.records);

        log::debug!("Loading to destination...");
        report.loaded = self.loader.load(transformed).await?;
        log::info!("Loaded {} record(s)", report.loaded);

        Ok(())
    }
}
