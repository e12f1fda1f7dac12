//! Extractors producing raw sales batches

use super::{RawBatch, SalesError};
use crate::etl::{Extraction, ExtractionFailure, Extractor};
use crate::storage::{CsvReader, ObjectStore};
use eyre::Result;
use std::path::{Path, PathBuf};

/// Extracts one batch from a local CSV file
///
/// Any read or parse failure is fatal; there is no partial-file recovery.
pub struct CsvFileExtractor {
    path: PathBuf,
    reader: CsvReader,
}

impl CsvFileExtractor {
    pub fn new(path: impl AsRef<Path>, reader: CsvReader) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader,
        }
    }
}

impl Extractor for CsvFileExtractor {
    type Item = RawBatch;

    async fn extract(&self) -> Result<Extraction<Self::Item>> {
        let batch = self
            .reader
            .read_path(&self.path)
            .map_err(|e| {
                SalesError::extraction(self.path.display().to_string(), format!("{:#}", e))
            })?;

        log::info!("Extracted {} row(s) from {}", batch.len(), batch.source());
        Ok(Extraction::complete(vec![batch]))
    }
}

/// Extracts one batch per `.csv` object under a prefix
///
/// A failure to list the bucket is fatal. A failure to fetch, decode or
/// parse a single object is logged and recorded, and the remaining objects
/// are still extracted.
///
/// # Example
/// ```no_run
/// use sales_etl::config::CleaningPolicy;
/// use sales_etl::etl::Extractor;
/// use sales_etl::sales::ObjectStoreExtractor;
/// use sales_etl::storage::{CsvReader, DirectoryObjectStore};
///
/// # async fn example() -> eyre::Result<()> {
/// let store = DirectoryObjectStore::new("./bucket");
/// let reader = CsvReader::new(CleaningPolicy::default().null_markers);
/// let extractor = ObjectStoreExtractor::new(store, "2024/", reader);
///
/// let extraction = extractor.extract().await?;
/// for failure in &extraction.failures {
///     eprintln!("skipped {}", failure);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ObjectStoreExtractor<S> {
    store: S,
    prefix: String,
    reader: CsvReader,
}

impl<S: ObjectStore> ObjectStoreExtractor<S> {
    pub fn new(store: S, prefix: impl Into<String>, reader: CsvReader) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            reader,
        }
    }

    /// Keys to extract: CSV objects only, in key order
    async fn csv_keys(&self) -> Result<Vec<String>> {
        let keys = self.store.list(&self.prefix).await.map_err(|e| {
            SalesError::extraction(self.store.location(), format!("listing failed: {:#}", e))
        })?;

        let mut csv_keys: Vec<String> = keys.into_iter().filter(|k| k.ends_with(".csv")).collect();
        csv_keys.sort();
        Ok(csv_keys)
    }

    async fn fetch(&self, key: &str) -> Result<RawBatch> {
        let body = self.store.get(key).await?;
        let text = String::from_utf8(body)
            .map_err(|e| eyre::eyre!("Object body is not UTF-8: {}", e))?;
        self.reader.read_str(key, &text)
    }
}

impl<S: ObjectStore> Extractor for ObjectStoreExtractor<S> {
    type Item = RawBatch;

    async fn extract(&self) -> Result<Extraction<Self::Item>> {
        let keys = self.csv_keys().await?;
        log::info!(
            "Found {} CSV object(s) in {} with prefix '{}'",
            keys.len(),
            self.store.location(),
            self.prefix
        );

        let mut extraction = Extraction::complete(Vec::with_capacity(keys.len()));
        for key in keys {
            match self.fetch(&key).await {
                Ok(batch) => {
                    log::info!("Extracted {} row(s) from {}", batch.len(), key);
                    extraction.items.push(batch);
                }
                Err(e) => {
                    log::error!("Failed to extract {}: {:#}", key, e);
                    extraction
                        .failures
                        .push(ExtractionFailure::new(key, format!("{:#}", e)));
                }
            }
        }

        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningPolicy;
    use crate::storage::DirectoryObjectStore;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const HEADER: &str = "Product,Category,Quantity,Price,Sale_Date,Customer_Region";

    fn reader() -> CsvReader {
        CsvReader::new(CleaningPolicy::default().null_markers)
    }

    #[tokio::test]
    async fn test_csv_file_extractor() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Pen,Office,2,1.5,2024-01-05,East").unwrap();
        writeln!(file, "Ink,,1,3,,West").unwrap();

        let extraction = CsvFileExtractor::new(file.path(), reader())
            .extract()
            .await
            .unwrap();

        assert!(extraction.is_complete());
        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].len(), 2);
    }

    #[tokio::test]
    async fn test_csv_file_extractor_missing_file_is_fatal() {
        let err = CsvFileExtractor::new("/nonexistent/sales-jan.csv", reader())
            .extract()
            .await
            .unwrap_err();

        match err.downcast_ref::<SalesError>() {
            Some(SalesError::Extraction { origin, .. }) => {
                assert_eq!(origin, "/nonexistent/sales-jan.csv")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_object_store_skips_non_csv_and_isolates_failures() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("sales-jan.csv"),
            format!("{}\nPen,Office,2,1.5,2024-01-05,East\n", HEADER),
        )
        .unwrap();
        std::fs::write(temp.path().join("readme.txt"), "not data").unwrap();
        // Invalid UTF-8 body
        std::fs::write(temp.path().join("sales-broken.csv"), b"\xff\xfe\x00A").unwrap();
        std::fs::write(
            temp.path().join("sales-mar.csv"),
            format!("{}\nInk,Office,1,3,2024-03-01,West\n", HEADER),
        )
        .unwrap();

        let extractor =
            ObjectStoreExtractor::new(DirectoryObjectStore::new(temp.path()), "", reader());
        let extraction = extractor.extract().await.unwrap();

        let sources: Vec<&str> = extraction.items.iter().map(|b| b.source()).collect();
        assert_eq!(sources, vec!["sales-jan.csv", "sales-mar.csv"]);
        assert_eq!(extraction.failures.len(), 1);
        assert_eq!(extraction.failures[0].source, "sales-broken.csv");
    }

    #[tokio::test]
    async fn test_object_store_prefix_filter() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("2024")).unwrap();
        std::fs::write(temp.path().join("2024/jan.csv"), format!("{}\n", HEADER)).unwrap();
        std::fs::write(temp.path().join("old.csv"), format!("{}\n", HEADER)).unwrap();

        let extractor =
            ObjectStoreExtractor::new(DirectoryObjectStore::new(temp.path()), "2024/", reader());
        let extraction = extractor.extract().await.unwrap();

        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].source(), "2024/jan.csv");
    }

    #[tokio::test]
    async fn test_object_store_listing_failure_is_fatal() {
        let extractor = ObjectStoreExtractor::new(
            DirectoryObjectStore::new("/nonexistent/bucket"),
            "",
            reader(),
        );
        let err = extractor.extract().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SalesError>(),
            Some(SalesError::Extraction { .. })
        ));
    }
}
