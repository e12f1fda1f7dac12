//! Cleaning steps for sales batches
//!
//! Each step is a pass over the full row collection. The
//! [`SalesTransformer`](crate::sales::SalesTransformer) runs them in a fixed
//! order: merge, impute, dedupe, normalize, derive.

mod dates;
mod dedupe;
mod derive;
mod impute;
mod merge;
mod normalize;

pub use dates::{DEFAULT_DATE_FORMATS, DateParser};
pub use dedupe::Deduplicator;
pub use derive::Deriver;
pub use impute::{ImputedRow, Imputer, date_mode};
pub use merge::{BatchMerger, PositionedRecord};
pub use normalize::TextNormalizer;
