//! # Data Transfer Objects (DTOs)
//!
//! شکل دقیق بدنه‌های JSON که API قبول میکنه یا برمیگردونه.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UrlRecord;

// =====================================
// Request DTOs
// =====================================
/// درخواست `POST /api/shorten`
///
/// `url` یه `Option` هست: `{}` و `{"url": null}` هر دو باید
/// به خطای 400 «URL is required» برسن، نه خطای deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: Option<String>,
}

// =====================================
// Response DTOs
// =====================================
/// پاسخ 201 بعد از ساخت لینک
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<UrlRecord> for ShortenResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_code: record.short_code,
            original_url: record.original_url,
            created_at: record.created_at,
        }
    }
}

/// پاسخ `GET /api/stats/:code`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub clicks: i64,
}

impl From<UrlRecord> for StatsResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_code: record.short_code,
            original_url: record.original_url,
            created_at: record.created_at,
            clicks: record.clicks,
        }
    }
}

// =====================================
// Health Check
// =====================================
/// پاسخ health check
///
/// حالت سالم: `{"status": "ok", "total_urls": 3}`
/// حالت خطا: `{"status": "error", "message": "Storage unavailable"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_urls: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    /// ساخت پاسخ سالم
    #[must_use]
    pub fn ok(total_urls: i64) -> Self {
        Self {
            status: "ok".to_string(),
            total_urls: Some(total_urls),
            message: None,
        }
    }

    /// ساخت پاسخ خطا
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            total_urls: None,
            message: Some(message.into()),
        }
    }
}
