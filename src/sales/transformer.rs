//! The sales cleaning transformer

use super::{CanonicalBatch, RawBatch, SalesError};
use crate::config::CleaningPolicy;
use crate::etl::Transformer;
use crate::transform::{BatchMerger, DateParser, Deduplicator, Deriver, Imputer, TextNormalizer};
use eyre::Result;

/// Cleans raw sales batches into one canonical batch
///
/// Steps, in order:
/// 1. merge: schema check, then concatenate batches
/// 2. impute: fill missing values, coerce numbers
/// 3. dedupe: drop exact duplicates, keeping first occurrences
/// 4. normalize: trim text columns
/// 5. derive: `sales_amount` and the typed `Sale_Date`
///
/// The transform is a pure function of its input. Any failure aborts the
/// whole batch.
///
/// # Example
/// ```
/// use sales_etl::etl::Transformer;
/// use sales_etl::sales::{RawBatch, RawRecord, SalesTransformer};
///
/// let record = RawRecord {
///     product: Some(" Pen ".to_string()),
///     quantity: Some("2".to_string()),
///     price: Some("1.5".to_string()),
///     sale_date: Some("2024-01-05".to_string()),
///     ..Default::default()
/// };
/// let batch = RawBatch::with_standard_columns("jan.csv", vec![record.clone(), record]);
///
/// let out = SalesTransformer::default().transform(vec![batch]).unwrap();
/// assert_eq!(out.len(), 1);
/// assert_eq!(out.records()[0].product, "Pen");
/// assert_eq!(out.records()[0].sales_amount, 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct SalesTransformer {
    merger: BatchMerger,
    imputer: Imputer,
    deduplicator: Deduplicator,
    normalizer: TextNormalizer,
    deriver: Deriver,
}

impl Default for SalesTransformer {
    fn default() -> Self {
        Self::new(&CleaningPolicy::default())
    }
}

impl SalesTransformer {
    pub fn new(policy: &CleaningPolicy) -> Self {
        let dates = DateParser::new(policy.date_formats.clone());
        Self {
            merger: BatchMerger::new(),
            imputer: Imputer::new(policy.unknown_text.clone(), dates.clone()),
            deduplicator: Deduplicator::new(),
            normalizer: TextNormalizer::new(),
            deriver: Deriver::new(dates),
        }
    }

    /// Run every cleaning step, returning the typed error on failure
    pub fn clean(&self, batches: Vec<RawBatch>) -> Result<CanonicalBatch, SalesError> {
        let merged = self.merger.merge(batches)?;
        let imputed = self.imputer.impute(merged)?;
        let mut unique = self.deduplicator.dedupe(imputed);
        self.normalizer.normalize(&mut unique);
        let records = self.deriver.derive(unique)?;

        Ok(CanonicalBatch::new(records))
    }
}

impl Transformer for SalesTransformer {
    type Input = RawBatch;
    type Output = CanonicalBatch;

    fn transform(&self, inputs: Vec<Self::Input>) -> Result<Self::Output> {
        Ok(self.clean(inputs)?)
    }
}
