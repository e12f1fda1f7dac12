//! Integration tests for the sales job
//!
//! These run the full extract → transform → load pipeline against real
//! files on disk and a temporary libsql database.

use libsql::Builder;
use sales_etl::cli::{BucketSource, Destination, run_bucket, run_local};
use sales_etl::config::{CleaningPolicy, SinkConfig};
use sales_etl::etl::PipelineReport;
use sales_etl::sales::{SALES_TABLE, SalesError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "Product,Category,Quantity,Price,Sale_Date,Customer_Region\n";

fn write_csv(dir: &Path, name: &str, rows: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, format!("{HEADER}{rows}")).unwrap();
    path
}

fn database(dir: &Path) -> (PathBuf, Destination) {
    let path = dir.join("sales.db");
    let sink = SinkConfig::new(path.display().to_string());
    (path, Destination::Database(sink))
}

async fn local(csv: &Path, destination: Destination) -> eyre::Result<PipelineReport> {
    let mut report = PipelineReport::default();
    run_local(csv, &CleaningPolicy::default(), destination, &mut report).await?;
    Ok(report)
}

async fn bucket(
    root: PathBuf,
    prefix: &str,
    destination: Destination,
) -> eyre::Result<PipelineReport> {
    let mut report = PipelineReport::default();
    run_bucket(
        "raw-sales",
        prefix,
        BucketSource::Directory(root),
        &CleaningPolicy::default(),
        destination,
        &mut report,
    )
    .await?;
    Ok(report)
}

async fn table_exists(db_path: &Path) -> bool {
    let db = Builder::new_local(db_path).build().await.unwrap();
    let conn = db.connect().unwrap();
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            libsql::params![SALES_TABLE],
        )
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    row.get::<i64>(0).unwrap() == 1
}

/// Rows as (Product, Category, Quantity, Price, Sale_Date, Customer_Region, sales_amount)
async fn stored_rows(
    db_path: &Path,
) -> Vec<(String, String, f64, f64, String, String, f64)> {
    let db = Builder::new_local(db_path).build().await.unwrap();
    let conn = db.connect().unwrap();
    let mut rows = conn
        .query(
            "SELECT \"Product\", \"Category\", \"Quantity\", \"Price\", \"Sale_Date\", \
             \"Customer_Region\", \"sales_amount\" FROM sales_transactions ORDER BY rowid",
            (),
        )
        .await
        .unwrap();

    let mut out = Vec::new();
    while let Some(row) = rows.next().await.unwrap() {
        out.push((
            row.get::<String>(0).unwrap(),
            row.get::<String>(1).unwrap(),
            row.get::<f64>(2).unwrap(),
            row.get::<f64>(3).unwrap(),
            row.get::<String>(4).unwrap(),
            row.get::<String>(5).unwrap(),
            row.get::<f64>(6).unwrap(),
        ));
    }
    out
}

#[tokio::test]
async fn test_local_file_duplicate_after_trimming() {
    let temp = TempDir::new().unwrap();
    let csv = write_csv(
        temp.path(),
        "sales.csv",
        " Pen ,,2,1.5,2024-01-05,East\n\
         Pen,,2,1.5,2024-01-05,East\n",
    );
    let (db_path, destination) = database(temp.path());

    let report = local(&csv, destination).await.unwrap();

    assert_eq!(report.batches, 1);
    assert_eq!(report.records, 1);
    assert_eq!(report.loaded, 1);
    assert!(report.failures.is_empty());

    let rows = stored_rows(&db_path).await;
    assert_eq!(
        rows,
        vec![(
            "Pen".to_string(),
            "Unknown".to_string(),
            2.0,
            1.5,
            "2024-01-05 00:00:00".to_string(),
            "East".to_string(),
            3.0
        )]
    );
}

#[tokio::test]
async fn test_repeated_runs_append() {
    let temp = TempDir::new().unwrap();
    let csv = write_csv(temp.path(), "sales.csv", "Pen,Office,2,1.5,2024-01-05,East\n");
    let db_path = temp.path().join("sales.db");

    for _ in 0..2 {
        let destination = Destination::Database(SinkConfig::new(db_path.display().to_string()));
        local(&csv, destination).await.unwrap();
    }

    assert_eq!(stored_rows(&db_path).await.len(), 2);
}

#[tokio::test]
async fn test_local_missing_file_is_extraction_error() {
    let temp = TempDir::new().unwrap();
    let (db_path, destination) = database(temp.path());

    let err = local(&temp.path().join("absent.csv"), destination)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SalesError>(),
        Some(SalesError::Extraction { .. })
    ));
    assert!(!table_exists(&db_path).await);
}

#[tokio::test]
async fn test_bucket_skips_broken_object_and_loads_the_rest() {
    let temp = TempDir::new().unwrap();
    let buckets = temp.path().join("buckets");
    write_csv(
        &buckets.join("raw-sales"),
        "2024/01.csv",
        "Pen,Office,2,1.5,2024-01-05,East\n\
         Ink,,1,3,,West\n",
    );
    write_csv(
        &buckets.join("raw-sales"),
        "2024/02.csv",
        "Pad,Office,4,2,2024-02-01,North\n",
    );
    std::fs::write(buckets.join("raw-sales/2024/03.csv"), b"\xff\xfe\x00A").unwrap();
    std::fs::write(buckets.join("raw-sales/2024/notes.txt"), "ignored").unwrap();
    write_csv(
        &buckets.join("raw-sales"),
        "2023/12.csv",
        "Old,Office,1,1,2023-12-01,East\n",
    );
    let (db_path, destination) = database(temp.path());

    let report = bucket(buckets, "2024/", destination).await.unwrap();

    assert_eq!(report.batches, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, "2024/03.csv");
    assert_eq!(report.loaded, 3);

    let rows = stored_rows(&db_path).await;
    let products: Vec<&str> = rows.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(products, vec!["Pen", "Ink", "Pad"]);

    // Ink had no date: the mode ties on count, the earliest date wins
    assert_eq!(rows[1].1, "Unknown");
    assert_eq!(rows[1].4, "2024-01-05 00:00:00");
    assert_eq!(rows[1].6, 3.0);
}

#[tokio::test]
async fn test_schema_mismatch_loads_nothing() {
    let temp = TempDir::new().unwrap();
    let bucket_dir = temp.path().join("raw-sales");
    write_csv(&bucket_dir, "a.csv", "Pen,Office,2,1.5,2024-01-05,East\n");
    std::fs::write(
        bucket_dir.join("b.csv"),
        "Product,Category,Quantity,Price,Sale_Date,Customer_Region,Discount\n\
         Pad,Office,1,2,2024-01-06,West,0.1\n",
    )
    .unwrap();
    let (db_path, destination) = database(temp.path());

    let err = bucket(temp.path().to_path_buf(), "", destination)
        .await
        .unwrap_err();

    match err.downcast_ref::<SalesError>() {
        Some(SalesError::SchemaMismatch { batch, .. }) => assert_eq!(batch, "b.csv"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!table_exists(&db_path).await);
}

#[tokio::test]
async fn test_unparseable_date_loads_nothing() {
    let temp = TempDir::new().unwrap();
    let csv = write_csv(
        temp.path(),
        "sales.csv",
        "Pen,Office,2,1.5,2024-01-05,East\n\
         Pad,Office,1,2,someday,West\n",
    );
    let (db_path, destination) = database(temp.path());

    let err = local(&csv, destination).await.unwrap_err();

    match err.downcast_ref::<SalesError>() {
        Some(SalesError::DateParse { row, value }) => {
            assert_eq!(*row, 1);
            assert_eq!(value.as_deref(), Some("someday"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!table_exists(&db_path).await);
}

#[tokio::test]
async fn test_dry_run_writes_ndjson() {
    let temp = TempDir::new().unwrap();
    let csv = write_csv(
        temp.path(),
        "sales.csv",
        "Pen,Office,2,1.5,2024-01-05,East\n\
         NA,Office,NA,2,2024-01-05,West\n",
    );
    let out = temp.path().join("dry-run.ndjson");

    let report = local(&csv, Destination::Ndjson(Some(out.clone())))
        .await
        .unwrap();
    assert_eq!(report.loaded, 2);

    let lines: Vec<serde_json::Value> = std::fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["Product"], "Unknown");
    assert_eq!(lines[1]["Quantity"], 0.0);
    assert_eq!(lines[1]["sales_amount"], 0.0);
    assert_eq!(lines[1]["Sale_Date"], "2024-01-05T00:00:00");
}
