//! CLI helper functions

use crate::{
    client::{AuthType, HttpObjectStore},
    config::{CleaningPolicy, ObjectStoreConfig, SinkConfig},
    etl::{Extractor, Pipeline, PipelineReport},
    sales::{
        CsvFileExtractor, ObjectStoreExtractor, RawBatch, SalesTableLoader, SalesTransformer,
    },
    storage::{CsvReader, DirectoryObjectStore, NdjsonWriter, ObjectStore},
};
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Where the canonical batch goes
pub enum Destination {
    /// Append to the sales table
    Database(SinkConfig),
    /// Dry run: NDJSON to a file, or to stdout when None
    Ndjson(Option<PathBuf>),
}

impl Destination {
    /// Database sink from SALES_DB_URL, or stdout NDJSON for a dry run
    pub fn from_env(dry_run: bool) -> Result<Self> {
        match dry_run {
            true => Ok(Self::Ndjson(None)),
            false => Ok(Self::Database(SinkConfig::from_env()?)),
        }
    }
}

/// Where the raw CSV objects come from in a bucket run
pub enum BucketSource {
    /// S3-compatible HTTP endpoint
    Http {
        /// Base URL, None reads OBJECT_STORE_ENDPOINT
        endpoint: Option<String>,
        /// Forced auth kind, None picks from the environment
        auth: Option<AuthType>,
    },
    /// Local directory holding one subdirectory per bucket
    Directory(PathBuf),
}

/// Load the cleaning policy, falling back to defaults without a file
pub fn load_policy(path: Option<&Path>) -> Result<CleaningPolicy> {
    match path {
        Some(path) => {
            log::info!("Loading cleaning policy from {}", path.display());
            CleaningPolicy::read(path)
        }
        None => Ok(CleaningPolicy::default()),
    }
}

/// Run the job over a single local CSV file
///
/// Pipeline: CsvFileExtractor → SalesTransformer → SalesTableLoader | NdjsonWriter
///
/// `report` is filled as stages finish, so it is meaningful on error too.
pub async fn run_local(
    path: impl AsRef<Path>,
    policy: &CleaningPolicy,
    destination: Destination,
    report: &mut PipelineReport,
) -> Result<()> {
    let path = path.as_ref();
    log::info!("Extracting sales records from {}", path.display());

    let reader = CsvReader::new(policy.null_markers.iter().cloned());
    let extractor = CsvFileExtractor::new(path, reader);
    run_to(extractor, policy, destination, report).await
}

/// Run the job over every CSV object under `prefix` in `bucket`
///
/// Pipeline: ObjectStoreExtractor → SalesTransformer → SalesTableLoader | NdjsonWriter
pub async fn run_bucket(
    bucket: &str,
    prefix: &str,
    source: BucketSource,
    policy: &CleaningPolicy,
    destination: Destination,
    report: &mut PipelineReport,
) -> Result<()> {
    let reader = CsvReader::new(policy.null_markers.iter().cloned());

    match source {
        BucketSource::Http { endpoint, auth } => {
            let config = ObjectStoreConfig::from_env(endpoint.as_deref(), auth.as_ref())?;
            log::debug!("Using {} auth for {}", config.auth, config.endpoint);
            let store = HttpObjectStore::try_new(config.endpoint, bucket, config.auth)?;
            run_store(store, prefix, reader, policy, destination, report).await
        }
        BucketSource::Directory(dir) => {
            let root = dir.join(bucket);
            if !root.is_dir() {
                eyre::bail!("Bucket directory not found: {}", root.display());
            }
            let store = DirectoryObjectStore::new(root);
            run_store(store, prefix, reader, policy, destination, report).await
        }
    }
}

async fn run_store<S: ObjectStore>(
    store: S,
    prefix: &str,
    reader: CsvReader,
    policy: &CleaningPolicy,
    destination: Destination,
    report: &mut PipelineReport,
) -> Result<()> {
    log::info!(
        "Extracting sales records from {} with prefix '{}'",
        store.location(),
        prefix
    );
    let extractor = ObjectStoreExtractor::new(store, prefix, reader);
    run_to(extractor, policy, destination, report).await
}

async fn run_to<E>(
    extractor: E,
    policy: &CleaningPolicy,
    destination: Destination,
    report: &mut PipelineReport,
) -> Result<()>
where
    E: Extractor<Item = RawBatch>,
{
    let transformer = SalesTransformer::new(policy);

    match destination {
        Destination::Database(sink) => {
            let loader = SalesTableLoader::connect(&sink)
                .await
                .context("Failed to open the sales database")?;
            Pipeline::new(extractor, transformer, loader)
                .run_into(report)
                .await
        }
        Destination::Ndjson(path) => {
            let writer = match path {
                Some(path) => NdjsonWriter::new(path),
                None => NdjsonWriter::stdout(),
            };
            Pipeline::new(extractor, transformer, writer)
                .run_into(report)
                .await
        }
    }
}
