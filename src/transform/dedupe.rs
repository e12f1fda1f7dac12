//! Exact-duplicate removal

use super::ImputedRow;
use std::collections::HashSet;

/// Identity of a row across the six raw columns
///
/// Text compares in trimmed form, numbers by value.
#[derive(Debug, PartialEq, Eq, Hash)]
struct RowKey<'a> {
    product: &'a str,
    category: &'a str,
    quantity: u64,
    price: u64,
    sale_date: Option<&'a str>,
    customer_region: &'a str,
}

impl<'a> RowKey<'a> {
    fn of(row: &'a ImputedRow) -> Self {
        Self {
            product: row.product.trim(),
            category: row.category.trim(),
            quantity: number_bits(row.quantity),
            price: number_bits(row.price),
            sale_date: row.sale_date.as_deref().map(str::trim),
            customer_region: row.customer_region.trim(),
        }
    }
}

// -0.0 and 0.0 are the same value
fn number_bits(value: f64) -> u64 {
    let value = if value == 0.0 { 0.0f64 } else { value };
    value.to_bits()
}

/// Keeps the first occurrence of every distinct row, in merged order
#[derive(Debug, Default, Clone, Copy)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    pub fn dedupe(&self, rows: Vec<ImputedRow>) -> Vec<ImputedRow> {
        let before = rows.len();

        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(rows.len());
            rows.iter().map(|row| seen.insert(RowKey::of(row))).collect()
        };

        let unique: Vec<ImputedRow> = rows
            .into_iter()
            .zip(keep)
            .filter_map(|(row, keep)| keep.then_some(row))
            .collect();

        log::debug!("Removed {} duplicate row(s)", before - unique.len());
        unique
    }
}
