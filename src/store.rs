// Receipt store - one source's receipts plus the product-aggregate index
// derived from them

use crate::receipt::{Category, MalformedData, ProductLine, RawReceipt, Receipt};
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// PRODUCT AGGREGATE
// ============================================================================

/// Cumulative price/quantity for one product name across all receipts in a
/// store. Category and shop are frozen at the product's first occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAggregate {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub category: Category,
    pub shop: String,
}

// ============================================================================
// PRODUCT INDEX
// ============================================================================

/// Insertion-ordered map from product name to its aggregate.
///
/// Iteration order is first-occurrence order; the ranking and lookup
/// functions depend on that, so a plain HashMap will not do here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductIndex {
    entries: Vec<ProductAggregate>,
    by_name: HashMap<String, usize>,
}

impl ProductIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the aggregate for an exact (case-sensitive) product name.
    pub fn get(&self, name: &str) -> Option<&ProductAggregate> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Aggregates in first-occurrence order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProductAggregate> {
        self.entries.iter()
    }

    /// The accumulation rule: sum price and quantity per name, keep category
    /// and shop from the first occurrence.
    fn fold(&mut self, shop: &str, line: &ProductLine) {
        match self.by_name.get(&line.name) {
            Some(&i) => {
                let aggregate = &mut self.entries[i];
                aggregate.price += line.price;
                aggregate.quantity += line.quantity;
            }
            None => {
                self.by_name.insert(line.name.clone(), self.entries.len());
                self.entries.push(ProductAggregate {
                    name: line.name.clone(),
                    price: line.price,
                    quantity: line.quantity,
                    category: line.category.clone(),
                    shop: shop.to_string(),
                });
            }
        }
    }
}

// ============================================================================
// RECEIPT STORE
// ============================================================================

/// One source's receipt collection (user, friends, or global) with its
/// derived product index.
///
/// Invariant: `products` is always the fold of every ProductLine in
/// `receipts`, in the order the receipts arrived. `append` applies the same
/// accumulation rule `load` does, and validates before mutating, so a failed
/// append leaves the store exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct ReceiptStore {
    receipts: Vec<Receipt>,
    products: ProductIndex,
}

impl ReceiptStore {
    /// Build a store from raw receipt records. All-or-nothing: every record
    /// is validated before the index is built, so a single malformed record
    /// rejects the whole load.
    pub fn load(raw: Vec<RawReceipt>) -> Result<Self, MalformedData> {
        let receipts = raw
            .into_iter()
            .map(Receipt::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_receipts(receipts))
    }

    /// Build a store from already-validated receipts, folding the product
    /// index in sequence order.
    pub fn from_receipts(receipts: Vec<Receipt>) -> Self {
        let mut products = ProductIndex::default();
        for receipt in &receipts {
            for line in &receipt.products {
                products.fold(&receipt.shop, line);
            }
        }
        ReceiptStore { receipts, products }
    }

    /// Validate and add one receipt: prepend to `receipts` (display order is
    /// most-recent-first) and fold its lines into the index. Returns the
    /// stored receipt so callers can persist exactly what was added.
    pub fn append(&mut self, raw: RawReceipt) -> Result<&Receipt, MalformedData> {
        let receipt = Receipt::try_from(raw)?;
        for line in &receipt.products {
            self.products.fold(&receipt.shop, line);
        }
        self.receipts.insert(0, receipt);
        Ok(&self.receipts[0])
    }

    /// Receipts, most recent first.
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// The product-aggregate index.
    pub fn products(&self) -> &ProductIndex {
        &self.products
    }
}

// ============================================================================
// TESTS
// ============================================================================
