//! # Stats Handler
//!
//! آمار یک لینک؛ شمارنده کلیک رو تغییر نمیده

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{OptionExt, Result},
    models::StatsResponse,
    services::AppState,
};

/// گرفتن آمار یک short code
///
/// # Endpoint
/// `GET /api/stats/:code`
///
/// # Response
/// ```json
/// {
///   "short_code": "aZ3k9Q",
///   "original_url": "https://example.com",
///   "created_at": "2024-01-01T12:00:00Z",
///   "clicks": 42
/// }
/// ```
/// یا `404 {"error": "Not found"}`
pub async fn get_stats(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>> {
    let record = state.resolve_service.stats(&code).await?.ok_or_not_found()?;

    Ok(Json(StatsResponse::from(record)))
}
