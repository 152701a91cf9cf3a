// Receipt data model
// Raw (as uploaded / as stored on disk) and validated receipt shapes

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CATEGORY
// ============================================================================

/// Product category. The six fixed categories drive the breakdown views;
/// anything else a receipt carries is kept as `Other` so it still counts in
/// the unfiltered index but never shows up in a fixed-category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Food,
    Health,
    Clothing,
    Electronics,
    Entertainment,
    Travel,
    Other(String),
}

impl Category {
    /// The fixed category surface, in display order.
    pub const FIXED: [Category; 6] = [
        Category::Food,
        Category::Health,
        Category::Clothing,
        Category::Electronics,
        Category::Entertainment,
        Category::Travel,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Health => "Health",
            Category::Clothing => "Clothing",
            Category::Electronics => "Electronics",
            Category::Entertainment => "Entertainment",
            Category::Travel => "Travel",
            Category::Other(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Food" => Category::Food,
            "Health" => Category::Health,
            "Clothing" => Category::Clothing,
            "Electronics" => Category::Electronics,
            "Entertainment" => Category::Entertainment,
            "Travel" => Category::Travel,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MALFORMED DATA
// ============================================================================

/// A receipt or product line is missing a required field.
///
/// Surfaced by `ReceiptStore::load` and `ReceiptStore::append`; the failed
/// operation aborts before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedData {
    pub field: String,
    pub message: String,
}

impl MalformedData {
    pub(crate) fn missing(field: &str) -> Self {
        MalformedData {
            field: field.to_string(),
            message: "required field is missing".to_string(),
        }
    }
}

impl fmt::Display for MalformedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed receipt data: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for MalformedData {}

// ============================================================================
// VALIDATED SHAPES
// ============================================================================

/// One line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub category: Category,
}

/// One purchase record: shop, timestamp, product lines. Immutable once
/// validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub shop: String,
    /// Purchase time as epoch seconds.
    pub date: i64,
    pub products: Vec<ProductLine>,
}

// ============================================================================
// RAW SHAPES
// ============================================================================

/// Receipt as it arrives from disk or the OCR pipeline, before validation.
/// Every field is optional so a broken record deserializes instead of
/// failing deep inside serde; validation then reports which field is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReceipt {
    pub shop: Option<String>,
    pub date: Option<i64>,
    pub products: Option<Vec<RawProductLine>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProductLine {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub category: Option<Category>,
}

impl TryFrom<RawProductLine> for ProductLine {
    type Error = MalformedData;

    fn try_from(raw: RawProductLine) -> Result<Self, MalformedData> {
        Ok(ProductLine {
            name: raw.name.ok_or_else(|| MalformedData::missing("name"))?,
            price: raw.price.ok_or_else(|| MalformedData::missing("price"))?,
            quantity: raw.quantity.ok_or_else(|| MalformedData::missing("quantity"))?,
            // Category is not required by the upload pipeline; an absent one
            // behaves like an unknown category string.
            category: raw.category.unwrap_or_default(),
        })
    }
}

impl TryFrom<RawReceipt> for Receipt {
    type Error = MalformedData;

    fn try_from(raw: RawReceipt) -> Result<Self, MalformedData> {
        let products = raw
            .products
            .ok_or_else(|| MalformedData::missing("products"))?
            .into_iter()
            .map(ProductLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Receipt {
            shop: raw.shop.unwrap_or_default(),
            date: raw.date.unwrap_or_default(),
            products,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_string() {
        assert_eq!(Category::from("Food".to_string()), Category::Food);
        assert_eq!(Category::from("Travel".to_string()), Category::Travel);
        assert_eq!(
            Category::from("Groceries".to_string()),
            Category::Other("Groceries".to_string())
        );
    }

    #[test]
    fn test_category_serde_round_trip() {
        let json = serde_json::to_string(&Category::Electronics).unwrap();
        assert_eq!(json, "\"Electronics\"");

        let parsed: Category = serde_json::from_str("\"Food\"").unwrap();
        assert_eq!(parsed, Category::Food);

        let unknown: Category = serde_json::from_str("\"Garden\"").unwrap();
        assert_eq!(unknown, Category::Other("Garden".to_string()));
    }

    #[test]
    fn test_raw_receipt_deserializes_with_missing_fields() {
        let raw: RawReceipt =
            serde_json::from_str(r#"{"products": [{"name": "Milk", "price": 2.0}]}"#).unwrap();

        assert!(raw.shop.is_none());
        assert!(raw.date.is_none());
        let products = raw.products.unwrap();
        assert_eq!(products[0].name.as_deref(), Some("Milk"));
        assert!(products[0].quantity.is_none());
    }

    #[test]
    fn test_validation_defaults_optional_fields() {
        let raw = RawReceipt {
            shop: None,
            date: None,
            products: Some(vec![RawProductLine {
                name: Some("Milk".to_string()),
                price: Some(2.0),
                quantity: Some(1.0),
                category: None,
            }]),
        };

        let receipt = Receipt::try_from(raw).unwrap();
        assert_eq!(receipt.shop, "");
        assert_eq!(receipt.date, 0);
        assert_eq!(receipt.products[0].category, Category::Other(String::new()));
    }

    #[test]
    fn test_validation_requires_products() {
        let raw = RawReceipt {
            shop: Some("A".to_string()),
            date: Some(100),
            products: None,
        };

        let err = Receipt::try_from(raw).unwrap_err();
        assert_eq!(err.field, "products");
    }

    #[test]
    fn test_validation_requires_product_fields() {
        for (name, price, quantity, expected) in [
            (None, Some(1.0), Some(1.0), "name"),
            (Some("Milk"), None, Some(1.0), "price"),
            (Some("Milk"), Some(1.0), None, "quantity"),
        ] {
            let raw = RawReceipt {
                shop: Some("A".to_string()),
                date: Some(100),
                products: Some(vec![RawProductLine {
                    name: name.map(str::to_string),
                    price,
                    quantity,
                    category: Some(Category::Food),
                }]),
            };

            let err = Receipt::try_from(raw).unwrap_err();
            assert_eq!(err.field, expected);
        }
    }
}
