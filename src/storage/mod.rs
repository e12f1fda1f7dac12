//! Source and output storage
//!
//! This module handles file and object I/O:
//! - CSV parsing into raw batches
//! - Object stores (trait plus a local directory implementation)
//! - NDJSON output for dry runs

mod csv_reader;
mod directory;
mod ndjson;
mod object_store;

pub use csv_reader::CsvReader;
pub use directory::DirectoryObjectStore;
pub use ndjson::NdjsonWriter;
pub use object_store::ObjectStore;
