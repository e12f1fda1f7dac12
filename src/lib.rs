//! Sales ETL
//!
//! Batch job that extracts raw sales CSV files, cleans them into one
//! canonical batch, and appends that batch to the `sales_transactions` table

pub mod cli;
pub mod client;
pub mod config;
pub mod etl;
pub mod sales;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use client::{Auth, AuthType, HttpObjectStore};
pub use config::{CleaningPolicy, ObjectStoreConfig, SinkConfig};
pub use etl::{Extractor, Loader, Pipeline, PipelineReport, Transformer};
pub use sales::{
    CanonicalBatch, CanonicalRecord, CsvFileExtractor, ObjectStoreExtractor, RawBatch, RawRecord,
    SalesError, SalesTableLoader, SalesTransformer,
};
pub use storage::{CsvReader, DirectoryObjectStore, NdjsonWriter, ObjectStore};
