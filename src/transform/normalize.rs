//! Text normalization

use super::ImputedRow;

/// Trims leading and trailing whitespace from Product, Category and
/// Customer_Region
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, rows: &mut [ImputedRow]) {
        for row in rows.iter_mut() {
            trim_in_place(&mut row.product);
            trim_in_place(&mut row.category);
            trim_in_place(&mut row.customer_region);
        }
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_text_columns_only() {
        let mut rows = vec![ImputedRow {
            position: 0,
            product: "  Pen\t".to_string(),
            category: " Office".to_string(),
            quantity: 1.0,
            price: 2.0,
            sale_date: Some(" 2024-01-05 ".to_string()),
            customer_region: "East ".to_string(),
        }];

        TextNormalizer::new().normalize(&mut rows);

        assert_eq!(rows[0].product, "Pen");
        assert_eq!(rows[0].category, "Office");
        assert_eq!(rows[0].customer_region, "East");
        assert_eq!(rows[0].sale_date.as_deref(), Some(" 2024-01-05 "));
    }

    #[test]
    fn test_placeholder_with_whitespace_is_trimmed() {
        let mut rows = vec![ImputedRow {
            position: 0,
            product: " n/a ".to_string(),
            category: " n/a ".to_string(),
            quantity: 0.0,
            price: 0.0,
            sale_date: None,
            customer_region: " n/a ".to_string(),
        }];

        TextNormalizer::new().normalize(&mut rows);
        assert_eq!(rows[0].product, "n/a");
        assert_eq!(rows[0].customer_region, "n/a");
    }
}
