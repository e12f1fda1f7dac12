//! Record and batch types flowing through the pipeline

use crate::etl::RecordCount;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;

pub const PRODUCT: &str = "Product";
pub const CATEGORY: &str = "Category";
pub const QUANTITY: &str = "Quantity";
pub const PRICE: &str = "Price";
pub const SALE_DATE: &str = "Sale_Date";
pub const CUSTOMER_REGION: &str = "Customer_Region";
pub const SALES_AMOUNT: &str = "sales_amount";

/// Columns every raw batch must carry (exact, case-sensitive names)
pub const RAW_COLUMNS: [&str; 6] = [PRODUCT, CATEGORY, QUANTITY, PRICE, SALE_DATE, CUSTOMER_REGION];

/// Columns of the canonical output, in destination table order
pub const CANONICAL_COLUMNS: [&str; 7] = [
    PRODUCT,
    CATEGORY,
    QUANTITY,
    PRICE,
    SALE_DATE,
    CUSTOMER_REGION,
    SALES_AMOUNT,
];

/// One row as extracted. Every field is untrusted text and may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub product: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub sale_date: Option<String>,
    pub customer_region: Option<String>,
}

impl RawRecord {
    /// Set a field by its column name
    ///
    /// Returns false if the column is not one of the raw sales columns.
    pub fn set(&mut self, column: &str, value: Option<String>) -> bool {
        let slot = match column {
            PRODUCT => &mut self.product,
            CATEGORY => &mut self.category,
            QUANTITY => &mut self.quantity,
            PRICE => &mut self.price,
            SALE_DATE => &mut self.sale_date,
            CUSTOMER_REGION => &mut self.customer_region,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// An ordered set of raw records read from one source
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    source: String,
    columns: Vec<String>,
    records: Vec<RawRecord>,
}

impl RawBatch {
    /// Create a batch from the header columns seen in the source
    pub fn new(source: impl Into<String>, columns: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self {
            source: source.into(),
            columns,
            records,
        }
    }

    /// Create a batch carrying exactly the six raw columns
    pub fn with_standard_columns(source: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self::new(
            source,
            RAW_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        )
    }

    /// Name of the file or object this batch came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Header columns in source order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Header columns as an order-insensitive set
    pub fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    /// Raw sales columns absent from this batch's header
    pub fn missing_columns(&self) -> Vec<&'static str> {
        let present = self.column_set();
        RAW_COLUMNS
            .iter()
            .copied()
            .filter(|c| !present.contains(c))
            .collect()
    }

    /// Header columns that are not raw sales columns
    pub fn extra_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| !RAW_COLUMNS.contains(c))
            .collect()
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A cleaned, typed sales record ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Sale_Date")]
    pub sale_date: NaiveDateTime,
    #[serde(rename = "Customer_Region")]
    pub customer_region: String,
    pub sales_amount: f64,
}

/// The deduplicated output of one transform run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalBatch {
    records: Vec<CanonicalRecord>,
}

impl CanonicalBatch {
    pub fn new(records: Vec<CanonicalRecord>) -> Self {
        Self { records }
    }

    /// Output columns, identical for every batch regardless of input nulls
    pub fn columns(&self) -> [&'static str; 7] {
        CANONICAL_COLUMNS
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordCount for CanonicalBatch {
    fn record_count(&self) -> usize {
        self.records.len()
    }
}
