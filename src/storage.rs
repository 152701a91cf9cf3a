// JSON-file persistence
// Each source is one JSON array of receipts, newest first, treated as an
// append-only log owned by the upload pipeline

use crate::receipt::{RawReceipt, Receipt};
use crate::sources::Sources;
use crate::store::ReceiptStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The backing files for the three sources.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    pub user: PathBuf,
    pub friends: PathBuf,
    pub global: PathBuf,
}

impl SourcePaths {
    /// Standard file names inside a data directory.
    pub fn from_dir(dir: &Path) -> Self {
        SourcePaths {
            user: dir.join("receipts.json"),
            friends: dir.join("receipts_friends.json"),
            global: dir.join("receipts_all.json"),
        }
    }
}

/// Read one source file into raw receipt records.
pub fn load_source(path: &Path) -> Result<Vec<RawReceipt>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read receipts file: {}", path.display()))?;
    let receipts = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse receipts file: {}", path.display()))?;
    Ok(receipts)
}

/// Write a full receipt list back to a source file.
pub fn save_source(path: &Path, receipts: &[Receipt]) -> Result<()> {
    let json = serde_json::to_string_pretty(receipts)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write receipts file: {}", path.display()))?;
    Ok(())
}

/// Prepend one receipt to a source file, creating the file if needed. The
/// rest of the file is carried over untouched, so records this process never
/// validated survive the rewrite.
pub fn append_to_source(path: &Path, receipt: &Receipt) -> Result<()> {
    let mut entries: Vec<serde_json::Value> = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read receipts file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse receipts file: {}", path.display()))?
    } else {
        Vec::new()
    };

    entries.insert(0, serde_json::to_value(receipt)?);

    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write receipts file: {}", path.display()))?;
    Ok(())
}

/// Load and validate all three sources. Done once at startup; the stores are
/// kept in memory afterwards and only the user store ever grows.
pub fn load_sources(paths: &SourcePaths) -> Result<Sources> {
    Ok(Sources {
        user: ReceiptStore::load(load_source(&paths.user)?)
            .with_context(|| format!("invalid receipt in {}", paths.user.display()))?,
        friends: ReceiptStore::load(load_source(&paths.friends)?)
            .with_context(|| format!("invalid receipt in {}", paths.friends.display()))?,
        global: ReceiptStore::load(load_source(&paths.global)?)
            .with_context(|| format!("invalid receipt in {}", paths.global.display()))?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{Category, ProductLine};
    use tempfile::tempdir;

    fn sample_receipt(shop: &str, date: i64) -> Receipt {
        Receipt {
            shop: shop.to_string(),
            date,
            products: vec![ProductLine {
                name: "Milk".to_string(),
                price: 2.0,
                quantity: 1.0,
                category: Category::Food,
            }],
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipts.json");

        save_source(&path, &[sample_receipt("A", 100), sample_receipt("B", 200)]).unwrap();
        let raw = load_source(&path).unwrap();

        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].shop.as_deref(), Some("A"));

        let store = ReceiptStore::load(raw).unwrap();
        assert_eq!(store.products().get("Milk").unwrap().price, 4.0);
    }

    #[test]
    fn test_append_to_source_prepends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("receipts.json");

        append_to_source(&path, &sample_receipt("A", 100)).unwrap();
        append_to_source(&path, &sample_receipt("B", 200)).unwrap();

        let raw = load_source(&path).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].shop.as_deref(), Some("B"));
        assert_eq!(raw[1].shop.as_deref(), Some("A"));
    }

    #[test]
    fn test_load_source_missing_file_names_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");

        let err = load_source(&path).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_load_sources_builds_all_three_stores() {
        let dir = tempdir().unwrap();
        let paths = SourcePaths::from_dir(dir.path());

        save_source(&paths.user, &[sample_receipt("A", 100)]).unwrap();
        save_source(&paths.friends, &[sample_receipt("B", 200)]).unwrap();
        save_source(&paths.global, &[]).unwrap();

        let sources = load_sources(&paths).unwrap();
        assert_eq!(sources.user.receipts().len(), 1);
        assert_eq!(sources.friends.receipts()[0].shop, "B");
        assert!(sources.global.receipts().is_empty());
    }
}
