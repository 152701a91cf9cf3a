// Spendscope - Web Server
// REST API with Axum over the in-memory receipt sources

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tower_http::cors::CorsLayer;

use spendscope::{storage, Category, RawReceipt, Receipt, SourcePaths, Sources};

/// Shared application state. Reads take the lock shared; the single writer
/// (receipt append) takes it exclusively, so the store's receipt list and
/// product index always move together.
#[derive(Clone)]
struct AppState {
    sources: Arc<RwLock<Sources>>,
    user_path: PathBuf,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize)]
struct CategoryStatsParams {
    category: Option<String>,
    n: Option<usize>,
}

#[derive(Deserialize)]
struct MonthTotalsParams {
    n: Option<usize>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/receipts - The user's receipts, newest first
async fn get_receipts(State(state): State<AppState>) -> impl IntoResponse {
    let sources = state.sources.read().unwrap();
    let receipts: Vec<Receipt> = sources.user.receipts().to_vec();
    Json(ApiResponse::ok(receipts))
}

/// GET /api/category_stats?category=&n= - Per-source rankings and totals
async fn get_category_stats(
    State(state): State<AppState>,
    Query(params): Query<CategoryStatsParams>,
) -> impl IntoResponse {
    let category = params
        .category
        .filter(|c| !c.is_empty())
        .map(Category::from);
    let n = params.n.unwrap_or(5);

    let sources = state.sources.read().unwrap();
    Json(ApiResponse::ok(sources.category_stats(category.as_ref(), n)))
}

/// GET /api/totals - Full category breakdown for every source
async fn get_totals(State(state): State<AppState>) -> impl IntoResponse {
    let sources = state.sources.read().unwrap();
    Json(ApiResponse::ok(sources.totals()))
}

/// GET /api/month_totals?n= - Monthly trend for every source
async fn get_month_totals(
    State(state): State<AppState>,
    Query(params): Query<MonthTotalsParams>,
) -> impl IntoResponse {
    let months = params.n.unwrap_or(12);

    let sources = state.sources.read().unwrap();
    Json(ApiResponse::ok(sources.month_totals(months)))
}

/// GET /api/top - The user's single top product
async fn get_top(State(state): State<AppState>) -> impl IntoResponse {
    let sources = state.sources.read().unwrap();
    Json(ApiResponse::ok(sources.top_single()))
}

/// GET /api/product_stats/:query - Product lookup across sources
async fn get_product_stats(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded product query
    let decoded = urlencoding::decode(&query)
        .unwrap_or_else(|_| query.clone().into())
        .into_owned();

    let sources = state.sources.read().unwrap();
    Json(ApiResponse::ok(sources.product_stats(&decoded)))
}

/// POST /api/receipts - Append one receipt to the user store and its file
async fn post_receipt(
    State(state): State<AppState>,
    Json(raw): Json<RawReceipt>,
) -> impl IntoResponse {
    let receipt = {
        let mut sources = state.sources.write().unwrap();
        match sources.user.append(raw) {
            Ok(receipt) => receipt.clone(),
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string())))
                    .into_response();
            }
        }
    };

    if let Err(e) = storage::append_to_source(&state.user_path, &receipt) {
        eprintln!("Error persisting receipt: {:#}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err("failed to persist receipt")),
        )
            .into_response();
    }

    (StatusCode::OK, Json(ApiResponse::ok(receipt))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🧾 Spendscope - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let data_dir = PathBuf::from(
        std::env::var("SPENDSCOPE_DATA").unwrap_or_else(|_| "data".to_string()),
    );
    let paths = SourcePaths::from_dir(&data_dir);

    if !paths.user.exists() {
        eprintln!("❌ Receipt data not found at {:?}", paths.user);
        eprintln!("   Set SPENDSCOPE_DATA to the directory holding");
        eprintln!("   receipts.json, receipts_friends.json and receipts_all.json");
        std::process::exit(1);
    }

    let sources = storage::load_sources(&paths).expect("Failed to load receipt sources");
    println!("✓ Receipts loaded from {:?}", data_dir);

    // Create shared state
    let state = AppState {
        sources: Arc::new(RwLock::new(sources)),
        user_path: paths.user.clone(),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/receipts", get(get_receipts).post(post_receipt))
        .route("/category_stats", get(get_category_stats))
        .route("/totals", get(get_totals))
        .route("/month_totals", get(get_month_totals))
        .route("/top", get(get_top))
        .route("/product_stats/:query", get(get_product_stats))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/receipts");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
