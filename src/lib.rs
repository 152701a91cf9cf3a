// Spendscope - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod ocr;
pub mod receipt;
pub mod sources;
pub mod stats;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use ocr::OcrEngine;
pub use receipt::{Category, MalformedData, ProductLine, RawProductLine, RawReceipt, Receipt};
pub use sources::{
    CategoryStats, MonthTotals, ProductStats, Sources, TopSingle, TotalsBySource,
};
pub use stats::{
    interval_total, months_data, months_data_at, product_data, top_products, total,
    MonthBucket, ProductSummary, Totals, TopProducts, FALLBACK_SHOP,
};
pub use storage::{append_to_source, load_source, load_sources, save_source, SourcePaths};
pub use store::{ProductAggregate, ProductIndex, ReceiptStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
