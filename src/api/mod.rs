//! # لایه API
//!
//! این ماژول HTTP handlers و routing رو مدیریت میکنه.
//!
//! ## مفاهیم Rust + Axum:
//! - **Router**: تعریف مسیرها
//! - **Extractors**: استخراج داده از request
//! - **State**: اشتراک state بین handlers
//! - **Middleware**: پردازش قبل/بعد از handler
//!
//! ## ساختار URL‌ها:
//! - `POST /api/shorten` - ساخت URL کوتاه
//! - `GET /api/stats/:code` - آمار یک لینک
//! - `GET /health` - Health check
//! - `GET /:code` - Redirect به URL اصلی

mod extractors;
mod handlers;
mod middleware;

pub use extractors::*;
pub use handlers::*;
pub use middleware::*;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::services::AppState;

/// حداکثر زمان پردازش هر request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =====================================
// Router Builder
// =====================================
/// ساخت Router اصلی برنامه
///
/// # مفاهیم:
/// - `.nest()`: گروه‌بندی route‌ها زیر `/api`
/// - `.layer()`: اولین layer در `ServiceBuilder` بیرونی‌ترینه
/// - `.with_state()`: تزریق state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes())
        // مسیرهای ثابت بالا به این پارامتر اولویت دارن
        .route("/:code", get(handlers::url::redirect))
        .layer(
            ServiceBuilder::new()
                // Request ID - حتی روی پاسخ timeout هم میشینه
                .layer(axum_middleware::from_fn(request_id))
                // Tracing - لاگ کردن request‌ها
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(request_timing))
                // Timeout - پاسخ 408 بعد از ۳۰ ثانیه
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                // Compression - فشرده‌سازی response
                .layer(CompressionLayer::new())
                // CORS - اجازه دسترسی از دامنه‌های دیگه
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Route‌های API
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(handlers::url::shorten))
        .route("/stats/:code", get(handlers::stats::get_stats))
}
