// Multi-source aggregation
// Fans the stats functions out over the user, friends, and global stores and
// assembles the comparison payloads

use crate::receipt::Category;
use crate::stats::{self, MonthBucket, ProductSummary, Totals, TopProducts};
use crate::store::{ProductAggregate, ReceiptStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// SOURCES
// ============================================================================

/// The three receipt stores every comparison runs over. The host constructs
/// this once and passes it to each call; there is no process-global state
/// and no lazy loading behind the scenes.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub user: ReceiptStore,
    pub friends: ReceiptStore,
    pub global: ReceiptStore,
}

// ============================================================================
// PAYLOADS
// ============================================================================

/// Per-source rankings and totals for one (optional) category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub user_top: TopProducts,
    pub friends_top: TopProducts,
    pub global_top: TopProducts,
    pub user_total: Totals,
    pub friends_total: Totals,
    pub global_total: Totals,
}

/// Per-source totals for every fixed category. All six categories are always
/// present so a breakdown can render zero-spend rows; product lines carrying
/// any other category value are simply absent from this view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsBySource {
    pub user: BTreeMap<String, Totals>,
    pub friends: BTreeMap<String, Totals>,
    pub global: BTreeMap<String, Totals>,
}

/// Per-source monthly trend buckets, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub user: Vec<MonthBucket>,
    pub friends: Vec<MonthBucket>,
    pub global: Vec<MonthBucket>,
}

/// Per-source product lookup. `shop` repeats the user's shop at the top
/// level for clients that only render one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductStats {
    pub user: ProductSummary,
    pub friends: ProductSummary,
    pub global: ProductSummary,
    pub shop: String,
}

/// The user's single most-spent-on and most-bought product. None when the
/// user store is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSingle {
    pub price: Option<ProductAggregate>,
    pub quantity: Option<ProductAggregate>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

impl Sources {
    /// Rankings and totals for one category (or all products) across the
    /// three stores. Pure assembly; each store is queried identically.
    pub fn category_stats(&self, category: Option<&Category>, n: usize) -> CategoryStats {
        CategoryStats {
            user_top: stats::top_products(&self.user, category, n),
            friends_top: stats::top_products(&self.friends, category, n),
            global_top: stats::top_products(&self.global, category, n),
            user_total: stats::total(&self.user, category),
            friends_total: stats::total(&self.friends, category),
            global_total: stats::total(&self.global, category),
        }
    }

    /// Full category breakdown for each source.
    pub fn totals(&self) -> TotalsBySource {
        TotalsBySource {
            user: breakdown(&self.user),
            friends: breakdown(&self.friends),
            global: breakdown(&self.global),
        }
    }

    /// [`Self::month_totals_at`] anchored to the current instant.
    pub fn month_totals(&self, months: usize) -> MonthTotals {
        self.month_totals_at(months, Utc::now())
    }

    /// Monthly trend for each source over the same window, so the three
    /// series line up bucket for bucket.
    pub fn month_totals_at(&self, months: usize, now: DateTime<Utc>) -> MonthTotals {
        MonthTotals {
            user: stats::months_data_at(&self.user, months, now),
            friends: stats::months_data_at(&self.friends, months, now),
            global: stats::months_data_at(&self.global, months, now),
        }
    }

    /// Product lookup across the three stores.
    pub fn product_stats(&self, query: &str) -> ProductStats {
        let user = stats::product_data(&self.user, query);
        ProductStats {
            shop: user.shop.clone(),
            user,
            friends: stats::product_data(&self.friends, query),
            global: stats::product_data(&self.global, query),
        }
    }

    /// The user's top product by spend and by count, unfiltered.
    pub fn top_single(&self) -> TopSingle {
        let TopProducts { price, quantity } = stats::top_products(&self.user, None, 1);
        TopSingle {
            price: price.into_iter().next(),
            quantity: quantity.into_iter().next(),
        }
    }
}

fn breakdown(store: &ReceiptStore) -> BTreeMap<String, Totals> {
    Category::FIXED
        .iter()
        .map(|category| {
            (
                category.as_str().to_string(),
                stats::total(store, Some(category)),
            )
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{ProductLine, Receipt};

    fn single_line_store(name: &str, price: f64, quantity: f64, category: Category) -> ReceiptStore {
        ReceiptStore::from_receipts(vec![Receipt {
            shop: "Shop".to_string(),
            date: 100,
            products: vec![ProductLine {
                name: name.to_string(),
                price,
                quantity,
                category,
            }],
        }])
    }

    fn sample_sources() -> Sources {
        Sources {
            user: single_line_store("Milk", 5.0, 3.0, Category::Food),
            friends: single_line_store("Milk", 8.0, 4.0, Category::Food),
            global: single_line_store("Socks", 20.0, 2.0, Category::Clothing),
        }
    }

    #[test]
    fn test_category_stats_fans_out_per_store() {
        let sources = sample_sources();
        let result = sources.category_stats(Some(&Category::Food), 5);

        assert_eq!(result.user_total.price, 5.0);
        assert_eq!(result.friends_total.price, 8.0);
        // Global store has no Food spend
        assert_eq!(result.global_total.price, 0.0);
        assert!(result.global_top.price.is_empty());
        assert_eq!(result.user_top.price[0].name, "Milk");
    }

    #[test]
    fn test_totals_breakdown_has_all_fixed_categories() {
        let sources = sample_sources();
        let result = sources.totals();

        for source in [&result.user, &result.friends, &result.global] {
            assert_eq!(source.len(), 6);
            for category in &Category::FIXED {
                assert!(source.contains_key(category.as_str()));
            }
        }

        assert_eq!(result.user["Food"].price, 5.0);
        assert_eq!(result.user["Travel"], Totals::default());
        assert_eq!(result.global["Clothing"].quantity, 2.0);
    }

    #[test]
    fn test_totals_breakdown_drops_unknown_categories() {
        let sources = Sources {
            user: single_line_store("Seeds", 4.0, 1.0, Category::Other("Garden".to_string())),
            ..Sources::default()
        };

        let result = sources.totals();
        let spent: f64 = result.user.values().map(|t| t.price).sum();
        assert_eq!(spent, 0.0);

        // Still counted by the unfiltered views
        assert_eq!(stats::total(&sources.user, None).price, 4.0);
    }

    #[test]
    fn test_month_totals_series_share_the_window() {
        use chrono::TimeZone;

        let sources = sample_sources();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let result = sources.month_totals_at(12, now);

        assert_eq!(result.user.len(), 12);
        assert_eq!(result.friends.len(), 12);
        assert_eq!(result.global.len(), 12);
        for i in 0..12 {
            assert_eq!(result.user[i].start, result.friends[i].start);
            assert_eq!(result.user[i].end, result.global[i].end);
        }
    }

    #[test]
    fn test_product_stats_surfaces_user_shop() {
        let sources = sample_sources();

        let result = sources.product_stats("milk");
        assert_eq!(result.shop, result.user.shop);
        assert_eq!(result.user.price, 5.0);
        assert_eq!(result.friends.price, 8.0);
        // No milk in the global store: zero-valued placeholder
        assert_eq!(result.global.price, 0.0);
        assert_eq!(result.global.shop, stats::FALLBACK_SHOP);
    }

    #[test]
    fn test_top_single_reads_the_user_store() {
        let sources = sample_sources();
        let result = sources.top_single();

        assert_eq!(result.price.unwrap().name, "Milk");
        assert_eq!(result.quantity.unwrap().name, "Milk");
    }

    #[test]
    fn test_top_single_empty_store_is_none() {
        let sources = Sources::default();
        let result = sources.top_single();

        assert!(result.price.is_none());
        assert!(result.quantity.is_none());
    }
}
