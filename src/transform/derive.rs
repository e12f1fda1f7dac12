//! Derived fields: typed sale date and sales amount

use super::{DateParser, ImputedRow};
use crate::sales::{CanonicalRecord, SalesError};

/// Computes `sales_amount` and parses `Sale_Date` for every row
///
/// Date parsing is all-or-nothing: the first unparseable value fails the
/// whole batch.
#[derive(Debug, Clone, Default)]
pub struct Deriver {
    dates: DateParser,
}

impl Deriver {
    pub fn new(dates: DateParser) -> Self {
        Self { dates }
    }

    pub fn derive(&self, rows: Vec<ImputedRow>) -> Result<Vec<CanonicalRecord>, SalesError> {
        rows.into_iter()
            .map(|row| {
                let sale_date = row
                    .sale_date
                    .as_deref()
                    .and_then(|text| self.dates.parse(text))
                    .ok_or_else(|| SalesError::DateParse {
                        row: row.position,
                        value: row.sale_date.clone(),
                    })?;

                Ok(CanonicalRecord {
                    sales_amount: row.quantity * row.price,
                    product: row.product,
                    category: row.category,
                    quantity: row.quantity,
                    price: row.price,
                    sale_date,
                    customer_region: row.customer_region,
                })
            })
            .collect()
    }
}
