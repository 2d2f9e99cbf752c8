//! # Health Check Handler
//!
//! برای بررسی سلامت سرویس

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::{models::HealthResponse, services::AppState};

/// پیام health وقتی store جواب نمیده
pub const STORAGE_UNAVAILABLE: &str = "Storage unavailable";

// =====================================
// Health Check
// =====================================
/// بررسی سلامت سرویس
///
/// # مفاهیم:
/// - Health check برای Kubernetes/Docker
/// - شمردن رکوردها هم اتصال و هم schema رو چک میکنه (با self-heal)
///
/// # Endpoint
/// `GET /health`
///
/// # Response
/// ```json
/// { "status": "ok", "total_urls": 3 }
/// ```
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.resolve_service.total().await {
        Ok(total) => (StatusCode::OK, Json(HealthResponse::ok(total))),
        Err(err) => {
            error!(error = %err, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse::error(STORAGE_UNAVAILABLE)),
            )
        }
    }
}
