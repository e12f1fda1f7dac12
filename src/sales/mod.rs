//! Sales record domain
//!
//! Raw and canonical record shapes, the error taxonomy, and the concrete
//! extract/transform/load stages for the sales job:
//! - [`CsvFileExtractor`] / [`ObjectStoreExtractor`] produce [`RawBatch`]es
//! - [`SalesTransformer`] cleans them into one [`CanonicalBatch`]
//! - [`SalesTableLoader`] appends the batch to the `sales_transactions` table

mod error;
mod extractor;
mod loader;
mod record;
mod transformer;

pub use error::SalesError;
pub use extractor::{CsvFileExtractor, ObjectStoreExtractor};
pub use loader::{SALES_TABLE, SalesTableLoader};
pub use record::{
    CANONICAL_COLUMNS, CATEGORY, CUSTOMER_REGION, CanonicalBatch, CanonicalRecord, PRICE, PRODUCT,
    QUANTITY, RAW_COLUMNS, RawBatch, RawRecord, SALE_DATE, SALES_AMOUNT,
};
pub use transformer::SalesTransformer;
