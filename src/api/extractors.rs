//! # Custom Extractors
//!
//! Extractor‌های سفارشی برای استخراج داده از request
//!
//! ## مفاهیم Rust + Axum:
//! - **FromRequest**: extractor که body رو مصرف میکنه
//! - **Rejection**: نوع خطا برای extractors

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::HeaderMap,
    Json,
};
use tracing::debug;

use crate::models::ShortenRequest;

/// اسم header شناسه request
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// =====================================
// Shorten Body Extractor
// =====================================
/// بدنه `POST /api/shorten`
///
/// هیچوقت reject نمیکنه: بدنه خالی، JSON خراب یا content-type اشتباه
/// همه مثل «url فرستاده نشده» رفتار میشن تا سرویس پیام 400 درست رو بده.
///
/// # استفاده در handler:
/// ```rust,ignore
/// async fn handler(ShortenBody(request): ShortenBody) -> ... {
///     // request.url ممکنه None باشه
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShortenBody(pub ShortenRequest);

#[async_trait]
impl<S> FromRequest<S> for ShortenBody
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<ShortenRequest>::from_request(req, state).await {
            Ok(Json(request)) => Ok(Self(request)),
            Err(rejection) => {
                debug!(%rejection, "Unreadable shorten body");
                Ok(Self::default())
            }
        }
    }
}

// =====================================
// Request ID Extractor
// =====================================
/// شناسه request: از header کلاینت یا یه nanoid جدید
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// از header بخون یا جدید بساز
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| nanoid::nanoid!(12));

        Self(id)
    }
}

