//! Core ETL (Extract, Transform, Load) abstractions
//!
//! This module provides trait definitions for building batch jobs that
//! extract data from sources, transform it, and load it to destinations.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::{Extraction, ExtractionFailure, Extractor};
pub use load::Loader;
pub use pipeline::{Pipeline, PipelineReport};
pub use transform::{RecordCount, Transformer};
