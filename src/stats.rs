// Statistics over a receipt store
// Pure functions: rankings, totals, calendar-month buckets, product lookup

use crate::receipt::Category;
use crate::store::{ProductAggregate, ReceiptStore};
use chrono::{DateTime, Months, Utc};
use serde::Serialize;

/// Shop reported for a product lookup that matched nothing.
pub const FALLBACK_SHOP: &str = "TESCO";

// ============================================================================
// RESULT SHAPES
// ============================================================================

/// Two independent rankings over the same product set. "Most spent" and
/// "most bought" diverge, so both are returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProducts {
    pub price: Vec<ProductAggregate>,
    pub quantity: Vec<ProductAggregate>,
}

/// Summed price and quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub price: f64,
    pub quantity: f64,
}

/// Totals for one calendar-month-wide window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub price: f64,
    pub quantity: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Result of a product lookup. Zero-valued (with [`FALLBACK_SHOP`]) when the
/// query matched nothing; callers tell "no data" apart from "error" by the
/// zeros, never by a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub price: f64,
    pub quantity: f64,
    pub avg: f64,
    pub shop: String,
}

// ============================================================================
// RANKINGS & TOTALS
// ============================================================================

/// Top `n` products by cumulative price and, independently, by cumulative
/// quantity, optionally restricted to one category. Both sorts are stable
/// and descending, so ties keep the index's first-occurrence order.
pub fn top_products(store: &ReceiptStore, category: Option<&Category>, n: usize) -> TopProducts {
    let matching: Vec<&ProductAggregate> = store
        .products()
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == *c))
        .collect();

    let mut by_price = matching.clone();
    by_price.sort_by(|a, b| b.price.total_cmp(&a.price));

    let mut by_quantity = matching;
    by_quantity.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));

    TopProducts {
        price: by_price.into_iter().take(n).cloned().collect(),
        quantity: by_quantity.into_iter().take(n).cloned().collect(),
    }
}

/// Cumulative price/quantity over every aggregate matching `category`, or
/// over all of them when no category is given. O(products).
pub fn total(store: &ReceiptStore, category: Option<&Category>) -> Totals {
    let mut totals = Totals::default();
    for aggregate in store.products().iter() {
        if category.map_or(true, |c| aggregate.category == *c) {
            totals.price += aggregate.price;
            totals.quantity += aggregate.quantity;
        }
    }
    totals
}

/// Price/quantity summed over product lines whose receipt falls in
/// `[start, end]`. Both bounds are inclusive; a receipt dated exactly on a
/// boundary is counted. Re-scans the raw receipts since the aggregate index
/// has no dates.
pub fn interval_total(store: &ReceiptStore, start: DateTime<Utc>, end: DateTime<Utc>) -> Totals {
    let mut totals = Totals::default();
    for receipt in store.receipts() {
        let Some(date) = DateTime::from_timestamp(receipt.date, 0) else {
            continue;
        };
        if start <= date && date <= end {
            for line in &receipt.products {
                totals.price += line.price;
                totals.quantity += line.quantity;
            }
        }
    }
    totals
}

// ============================================================================
// MONTHLY TREND
// ============================================================================

/// [`months_data_at`] anchored to the current instant.
pub fn months_data(store: &ReceiptStore, months: usize) -> Vec<MonthBucket> {
    months_data_at(store, months, Utc::now())
}

/// `months` calendar-month buckets ending at `now`, oldest first. The newest
/// bucket is (now − 1 month, now); each earlier bucket shifts both endpoints
/// back one calendar month. Month stepping clamps at short months (Mar 31 →
/// Feb 28), so bucket widths vary and adjacent buckets may drift.
pub fn months_data_at(store: &ReceiptStore, months: usize, now: DateTime<Utc>) -> Vec<MonthBucket> {
    let mut end = now;
    let mut start = month_earlier(now);

    let mut buckets = Vec::with_capacity(months);
    for _ in 0..months {
        let totals = interval_total(store, start, end);
        buckets.push(MonthBucket {
            price: totals.price,
            quantity: totals.quantity,
            start,
            end,
        });
        end = month_earlier(end);
        start = month_earlier(start);
    }

    buckets.reverse();
    buckets
}

/// One calendar month earlier, clamped at short months. Saturates at the
/// chrono range floor, which no real receipt date reaches.
fn month_earlier(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.checked_sub_months(Months::new(1)).unwrap_or(instant)
}

// ============================================================================
// PRODUCT LOOKUP
// ============================================================================

/// First aggregate (in index order) whose lowercased name starts with
/// `query`. The query itself is compared verbatim, so an uppercase query
/// never matches anything; the upstream clients always send lowercase and
/// this asymmetry is kept until a deliberate fix.
pub fn product_data(store: &ReceiptStore, query: &str) -> ProductSummary {
    for aggregate in store.products().iter() {
        if aggregate.name.to_lowercase().starts_with(query) {
            let avg = if aggregate.quantity == 0.0 {
                0.0
            } else {
                aggregate.price / aggregate.quantity
            };
            return ProductSummary {
                price: aggregate.price,
                quantity: aggregate.quantity,
                avg,
                shop: aggregate.shop.clone(),
            };
        }
    }

    ProductSummary {
        price: 0.0,
        quantity: 0.0,
        avg: 0.0,
        shop: FALLBACK_SHOP.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
