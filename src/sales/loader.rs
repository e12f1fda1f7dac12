//! Append loader for the `sales_transactions` table

use super::{CANONICAL_COLUMNS, CanonicalBatch, PRICE, QUANTITY, SALES_AMOUNT, SalesError};
use crate::config::SinkConfig;
use crate::etl::Loader;
use eyre::Result;
use libsql::{Builder, Database};
use regex::Regex;

/// Default destination table
pub const SALES_TABLE: &str = "sales_transactions";

/// Sale dates are stored as ISO-8601 text in this format
const SALE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Appends canonical batches to a SQL table through libsql
///
/// Every batch is inserted in a single transaction: either all of its rows
/// land or none do. Existing rows are never updated, deleted or compared
/// against. The table is created when it does not exist yet.
///
/// # Example
/// ```no_run
/// use sales_etl::config::SinkConfig;
/// use sales_etl::etl::Loader;
/// use sales_etl::sales::{CanonicalBatch, SalesTableLoader};
///
/// # async fn example() -> eyre::Result<()> {
/// let loader = SalesTableLoader::connect(&SinkConfig::new("sales.db")).await?;
/// let count = loader.load(CanonicalBatch::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct SalesTableLoader {
    db: Database,
    table: String,
}

impl SalesTableLoader {
    /// Open the destination described by `config`
    ///
    /// # Errors
    /// Returns [`SalesError::Load`] if the table name is not a plain SQL
    /// identifier or the database cannot be opened
    pub async fn connect(config: &SinkConfig) -> Result<Self> {
        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?;
        if !identifier.is_match(&config.table) {
            return Err(
                SalesError::load(&config.table, "table name is not a plain identifier").into(),
            );
        }

        let db = if config.is_remote() {
            log::info!("Connecting to remote database at {}", config.url);
            Builder::new_remote(
                config.url.clone(),
                config.auth_token.clone().unwrap_or_default(),
            )
            .build()
            .await
        } else {
            log::info!("Opening local database {}", config.local_path());
            Builder::new_local(config.local_path()).build().await
        }
        .map_err(|e| {
            SalesError::load(&config.table, format!("Failed to connect to database: {e}"))
        })?;

        Ok(Self {
            db,
            table: config.table.clone(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn create_table_sql(&self) -> String {
        let columns = CANONICAL_COLUMNS
            .iter()
            .map(|column| {
                let sql_type = match *column {
                    QUANTITY | PRICE | SALES_AMOUNT => "REAL",
                    _ => "TEXT",
                };
                format!("\"{}\" {} NOT NULL", column, sql_type)
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("CREATE TABLE IF NOT EXISTS \"{}\" ({})", self.table, columns)
    }

    fn insert_sql(&self) -> String {
        let columns = CANONICAL_COLUMNS
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; CANONICAL_COLUMNS.len()].join(", ");

        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table, columns, placeholders
        )
    }

    /// Insert every record of `batch` in one transaction
    async fn append(&self, batch: &CanonicalBatch) -> Result<usize, SalesError> {
        let fail = |action: &str, e: libsql::Error| {
            SalesError::load(&self.table, format!("{action}: {e}"))
        };

        let conn = self
            .db
            .connect()
            .map_err(|e| fail("Failed to get database connection", e))?;

        conn.execute(&self.create_table_sql(), ())
            .await
            .map_err(|e| fail("Failed to create table", e))?;

        let tx = conn
            .transaction()
            .await
            .map_err(|e| fail("Failed to begin transaction", e))?;

        let insert = self.insert_sql();
        for (index, record) in batch.records().iter().enumerate() {
            let result = tx
                .execute(
                    &insert,
                    libsql::params![
                        record.product.clone(),
                        record.category.clone(),
                        record.quantity,
                        record.price,
                        record.sale_date.format(SALE_DATE_FORMAT).to_string(),
                        record.customer_region.clone(),
                        record.sales_amount
                    ],
                )
                .await;

            if let Err(e) = result {
                if let Err(rollback) = tx.rollback().await {
                    log::error!("Failed to roll back after insert error: {}", rollback);
                }
                return Err(fail(&format!("Failed to insert record {index}"), e));
            }
        }

        tx.commit()
            .await
            .map_err(|e| fail("Failed to commit transaction", e))?;

        Ok(batch.len())
    }
}

impl Loader for SalesTableLoader {
    type Batch = CanonicalBatch;

    async fn load(&self, batch: Self::Batch) -> Result<usize> {
        if batch.is_empty() {
            log::info!("No sales records to load");
            return Ok(0);
        }

        log::debug!("Appending {} record(s) to '{}'", batch.len(), self.table);
        let count = self.append(&batch).await?;

        log::info!("Appended {} record(s) to '{}'", count, self.table);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::CanonicalRecord;
    use chrono::NaiveDate;
    use std::path::Path;
    use tempfile::TempDir;

    fn record(product: &str, quantity: f64, price: f64) -> CanonicalRecord {
        CanonicalRecord {
            product: product.to_string(),
            category: "Office".to_string(),
            quantity,
            price,
            sale_date: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            customer_region: "East".to_string(),
            sales_amount: quantity * price,
        }
    }

    async fn count_rows(path: &Path, table: &str) -> i64 {
        let db = Builder::new_local(path).build().await.unwrap();
        let conn = db.connect().unwrap();
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM \"{}\"", table), ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        row.get::<i64>(0).unwrap()
    }

    #[tokio::test]
    async fn test_sql_statements() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sales.db");
        let loader = SalesTableLoader::connect(&SinkConfig::new(path.display().to_string()))
            .await
            .unwrap();

        assert_eq!(
            loader.insert_sql(),
            "INSERT INTO \"sales_transactions\" (\"Product\", \"Category\", \"Quantity\", \
             \"Price\", \"Sale_Date\", \"Customer_Region\", \"sales_amount\") \
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        );
        assert!(loader.create_table_sql().contains("\"Quantity\" REAL NOT NULL"));
        assert!(loader.create_table_sql().contains("\"Sale_Date\" TEXT NOT NULL"));
    }

    #[tokio::test]
    async fn test_append_creates_table_and_stores_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sales.db");
        let loader = SalesTableLoader::connect(&SinkConfig::new(path.display().to_string()))
            .await
            .unwrap();

        let count = loader
            .load(CanonicalBatch::new(vec![record("Pen", 2.0, 1.5)]))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let db = Builder::new_local(&path).build().await.unwrap();
        let conn = db.connect().unwrap();
        let mut rows = conn
            .query(
                "SELECT \"Product\", \"Sale_Date\", \"sales_amount\" FROM sales_transactions",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "Pen");
        assert_eq!(row.get::<String>(1).unwrap(), "2024-01-05 00:00:00");
        assert_eq!(row.get::<f64>(2).unwrap(), 3.0);
    }

    #[tokio::test]
    async fn test_append_never_dedupes_against_existing_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sales.db");
        let loader = SalesTableLoader::connect(&SinkConfig::new(path.display().to_string()))
            .await
            .unwrap();

        let batch = CanonicalBatch::new(vec![record("Pen", 2.0, 1.5), record("Ink", 1.0, 3.0)]);
        loader.load(batch.clone()).await.unwrap();
        loader.load(batch).await.unwrap();

        assert_eq!(count_rows(&path, SALES_TABLE).await, 4);
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_whole_batch() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sales.db");

        // Destination that rejects large quantities
        {
            let db = Builder::new_local(&path).build().await.unwrap();
            let conn = db.connect().unwrap();
            conn.execute(
                "CREATE TABLE sales_transactions (\"Product\" TEXT NOT NULL, \
                 \"Category\" TEXT NOT NULL, \
                 \"Quantity\" REAL NOT NULL CHECK (\"Quantity\" < 5), \"Price\" REAL NOT NULL, \
                 \"Sale_Date\" TEXT NOT NULL, \"Customer_Region\" TEXT NOT NULL, \
                 \"sales_amount\" REAL NOT NULL)",
                (),
            )
            .await
            .unwrap();
        }

        let loader = SalesTableLoader::connect(&SinkConfig::new(path.display().to_string()))
            .await
            .unwrap();
        let err = loader
            .load(CanonicalBatch::new(vec![record("Pen", 1.0, 1.0), record("Pad", 10.0, 1.0)]))
            .await
            .unwrap_err();

        match err.downcast_ref::<SalesError>() {
            Some(SalesError::Load { table, reason }) => {
                assert_eq!(table, SALES_TABLE);
                assert!(reason.contains("record 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(count_rows(&path, SALES_TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sales.db");
        let loader = SalesTableLoader::connect(&SinkConfig::new(path.display().to_string()))
            .await
            .unwrap();

        assert_eq!(loader.load(CanonicalBatch::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unsafe_table_name() {
        let config = SinkConfig::new(":memory:").with_table("sales; DROP TABLE x");
        let err = SalesTableLoader::connect(&config).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SalesError>(),
            Some(SalesError::Load { .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sales.db");
        let config = SinkConfig::new(path.display().to_string()).with_table("sales_staging");
        let loader = SalesTableLoader::connect(&config).await.unwrap();
        assert_eq!(loader.table(), "sales_staging");

        loader
            .load(CanonicalBatch::new(vec![record("Pen", 1.0, 1.0)]))
            .await
            .unwrap();
        assert_eq!(count_rows(&path, "sales_staging").await, 1);
    }
}
