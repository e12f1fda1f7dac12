//! Missing value imputation

use super::{DateParser, PositionedRecord};
use crate::sales::{PRICE, QUANTITY, SalesError};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A row after imputation: text columns filled, numbers coerced
///
/// `sale_date` is still raw text. It stays `None` only when the whole batch
/// had no date to take a mode from.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedRow {
    pub position: usize,
    pub product: String,
    pub category: String,
    pub quantity: f64,
    pub price: f64,
    pub sale_date: Option<String>,
    pub customer_region: String,
}

/// Fills missing values column by column
///
/// - Product, Category, Customer_Region: the placeholder text
/// - Quantity, Price: zero
/// - Sale_Date: the most frequent date of the batch (see [`date_mode`])
///
/// Whitespace-only values count as missing.
#[derive(Debug, Clone)]
pub struct Imputer {
    placeholder: String,
    dates: DateParser,
}

impl Imputer {
    pub fn new(placeholder: impl Into<String>, dates: DateParser) -> Self {
        Self {
            placeholder: placeholder.into(),
            dates,
        }
    }

    pub fn impute(&self, rows: Vec<PositionedRecord>) -> Result<Vec<ImputedRow>, SalesError> {
        let mode = date_mode(
            rows.iter().filter_map(|r| present(&r.record.sale_date)),
            &self.dates,
        );
        match &mode {
            Some(date) => log::debug!("Imputing missing Sale_Date with '{}'", date),
            None => log::debug!("No Sale_Date values present, nothing to impute from"),
        }

        rows.into_iter()
            .map(|PositionedRecord { position, record }| {
                Ok(ImputedRow {
                    position,
                    product: self.text_or_placeholder(record.product),
                    category: self.text_or_placeholder(record.category),
                    quantity: number_or_zero(position, QUANTITY, &record.quantity)?,
                    price: number_or_zero(position, PRICE, &record.price)?,
                    sale_date: match record.sale_date {
                        Some(date) if !date.trim().is_empty() => Some(date),
                        _ => mode.clone(),
                    },
                    customer_region: self.text_or_placeholder(record.customer_region),
                })
            })
            .collect()
    }

    fn text_or_placeholder(&self, value: Option<String>) -> String {
        match value {
            Some(text) if !text.trim().is_empty() => text,
            _ => self.placeholder.clone(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn number_or_zero(
    row: usize,
    column: &'static str,
    value: &Option<String>,
) -> Result<f64, SalesError> {
    let Some(text) = present(value) else {
        return Ok(0.0);
    };

    match text.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(SalesError::ValueParse {
            row,
            column,
            value: text.to_string(),
        }),
    }
}

/// The most frequent date text among `values`
///
/// Values are compared after trimming. Ties go to the earliest calendar
/// value; candidates that do not parse rank after those that do, and any
/// remaining tie falls back to text order. The result does not depend on the
/// order of `values`.
pub fn date_mode<'a>(
    values: impl IntoIterator<Item = &'a str>,
    parser: &DateParser,
) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.trim()).or_default() += 1;
    }

    let top = counts.values().copied().max()?;
    counts
        .into_iter()
        .filter(|(_, count)| *count == top)
        .map(|(text, _)| (parser.parse(text), text))
        .min_by(|(a_date, a_text), (b_date, b_text)| {
            let by_date = match (a_date, b_date) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_date.then_with(|| a_text.cmp(b_text))
        })
        .map(|(_, text)| text.to_string())
}
