use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use spendscope::{storage, top_products, Category, OcrEngine, Receipt, SourcePaths};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 2 && args[1] == "scan" {
        // Scan mode: OCR one receipt image into the user store
        run_scan(Path::new(&args[2]))?;
    } else {
        // Report mode (default)
        run_report()?;
    }

    Ok(())
}

fn data_dir() -> PathBuf {
    PathBuf::from(env::var("SPENDSCOPE_DATA").unwrap_or_else(|_| "data".to_string()))
}

fn run_report() -> Result<()> {
    println!("🧾 Spendscope - Spending Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let paths = SourcePaths::from_dir(&data_dir());
    let sources = storage::load_sources(&paths)?;
    println!(
        "✓ Loaded {} receipts (yours), {} (friends), {} (everyone)",
        sources.user.receipts().len(),
        sources.friends.receipts().len(),
        sources.global.receipts().len()
    );

    // Top products
    println!("\n📈 Your top products by spend:");
    let top = top_products(&sources.user, None, 5);
    for (i, product) in top.price.iter().enumerate() {
        println!(
            "   {}. {:<24} ${:>8.2}  x{}",
            i + 1,
            product.name,
            product.price,
            product.quantity
        );
    }
    if top.price.is_empty() {
        println!("   (no receipts yet - run: spendscope scan <image>)");
    }

    // Category breakdown, all three sources side by side
    println!("\n📊 Spending by category (you / friends / everyone):");
    let totals = sources.totals();
    for category in &Category::FIXED {
        let name = category.as_str();
        let user = totals.user.get(name).copied().unwrap_or_default();
        let friends = totals.friends.get(name).copied().unwrap_or_default();
        let global = totals.global.get(name).copied().unwrap_or_default();
        println!(
            "   {:<14} ${:>8.2} / ${:>8.2} / ${:>8.2}",
            name, user.price, friends.price, global.price
        );
    }

    // Monthly trend
    println!("\n📅 Your last 12 months:");
    let months = sources.month_totals(12);
    for bucket in &months.user {
        println!(
            "   {}  ${:>8.2}  x{}",
            bucket.start.format("%b %Y"),
            bucket.price,
            bucket.quantity
        );
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Report complete");

    Ok(())
}

fn run_scan(image: &Path) -> Result<()> {
    println!("🧾 Scanning receipt image: {}", image.display());

    let dir = data_dir();
    let paths = SourcePaths::from_dir(&dir);

    // Keep a copy of the image alongside the data, the way the upload
    // pipeline stores what it processed
    let staged = stage_upload(&dir, image)?;
    println!("✓ Image stored at {}", staged.display());

    let script = env::var("SPENDSCOPE_OCR_SCRIPT").unwrap_or_else(|_| "receipt.py".to_string());
    let engine = OcrEngine::new(script);
    let raw = engine.scan(&staged)?;

    let receipt = Receipt::try_from(raw)?;
    println!(
        "✓ Recognized receipt from {} with {} products",
        receipt.shop,
        receipt.products.len()
    );

    storage::append_to_source(&paths.user, &receipt)?;
    println!("✅ Receipt added to {}", paths.user.display());

    Ok(())
}

fn stage_upload(dir: &Path, image: &Path) -> Result<PathBuf> {
    let uploads = dir.join("uploads");
    fs::create_dir_all(&uploads)
        .with_context(|| format!("failed to create upload directory: {}", uploads.display()))?;

    let ext = image.extension().and_then(|e| e.to_str()).unwrap_or("img");
    let staged = uploads.join(format!("{}.{}", Uuid::new_v4(), ext));
    fs::copy(image, &staged)
        .with_context(|| format!("failed to stage upload: {}", image.display()))?;

    Ok(staged)
}
