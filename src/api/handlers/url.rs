//! # URL Handlers
//!
//! ساخت لینک کوتاه و redirect

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::{
    api::extractors::ShortenBody,
    error::{Result, GENERIC_SERVER_ERROR},
    models::ShortenResponse,
    services::AppState,
    utils::encode_location,
};

/// بدنه متنی 404 روی مسیر redirect
pub const SHORT_URL_NOT_FOUND: &str = "Short URL not found";

// =====================================
// Create Short URL
// =====================================
/// ساخت URL کوتاه جدید
///
/// # Endpoint
/// `POST /api/shorten`
///
/// # Request Body
/// ```json
/// { "url": "https://example.com/long-url" }
/// ```
///
/// # Response (201)
/// ```json
/// {
///   "short_code": "aZ3k9Q",
///   "original_url": "https://example.com/long-url",
///   "created_at": "2024-01-01T12:00:00Z"
/// }
/// ```
pub async fn shorten(
    State(state): State<AppState>,
    ShortenBody(request): ShortenBody,
) -> Result<impl IntoResponse> {
    let record = state
        .shorten_service
        .shorten(request.url.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(ShortenResponse::from(record))))
}

// =====================================
// Redirect
// =====================================
/// Redirect به URL اصلی
///
/// # مفاهیم:
/// - `Path<String>`: استخراج پارامتر از URL
/// - پاسخ‌های این مسیر متن ساده‌ان، نه JSON
///
/// # Endpoint
/// `GET /:code`
///
/// # Response
/// - 302 با header `Location` (کاراکترهای غیرمجاز `%XX` میشن)
/// - 404 متن `Short URL not found`
/// - 404 خالی برای `favicon.ico` (بدون رفتن سراغ store)
/// - 500 متن `Server error`
pub async fn redirect(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    if code == "favicon.ico" {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.resolve_service.resolve(&code).await {
        Ok(Some(original_url)) => {
            info!(short_code = %code, "Redirecting");
            found(&original_url)
        }
        Ok(None) => (StatusCode::NOT_FOUND, SHORT_URL_NOT_FOUND).into_response(),
        Err(err) => {
            error!(short_code = %code, error = %err, "Redirect failed");
            server_error()
        }
    }
}

/// پاسخ 302 Found
///
/// `Redirect` خود axum فقط 303/307/308 میسازه.
/// آدرس قبل از رفتن توی header percent-encode میشه.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(&encode_location(location)) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(err) => {
            error!(error = %err, "Stored URL is not a valid Location header");
            server_error()
        }
    }
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_SERVER_ERROR).into_response()
}
