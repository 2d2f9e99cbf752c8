//! # ماژول مدیریت خطاها (Error Handling)
//!
//! همه خطاهای موتور کوتاه‌کننده اینجا تعریف میشن.
//!
//! ## دسته‌بندی خطاها
//!
//! | خطا | معنی | HTTP |
//! |-----|------|------|
//! | `InvalidUrl` | ورودی کاربر مشکل داره | 400 |
//! | `NotFound` | کد ناشناخته | 404 |
//! | `DuplicateCode` | برخورد یکتایی موقع insert (داخلی، retry میشه) | 500 |
//! | `CodeSpaceExhausted` | همه تلاش‌های تخصیص کد برخورد داشتن | 503 |
//! | `StorageUnavailable` | schema خراب یا گم شده، حتی بعد از self-heal | 500 |
//!
//! ## مفاهیم Rust:
//! - **thiserror**: derive macro برای Error trait
//! - **From Trait**: تبدیل خودکار `sqlx::Error` با طبقه‌بندی
//! - **Result Type Alias**: alias برای ساده‌تر شدن کد

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

// =====================================
// Result Type Alias
// =====================================
/// نوع Result سفارشی برنامه
///
/// به جای `Result<UrlRecord, AppError>` مینویسیم `Result<UrlRecord>`
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// پیام عمومی برای همه خطاهای سمت سرور
///
/// جزئیات داخلی فقط لاگ میشن و هیچوقت به کلاینت نمیرسن
pub const GENERIC_SERVER_ERROR: &str = "Server error";

// =====================================
// Custom Error Enum
// =====================================
/// خطای اصلی برنامه
#[derive(Debug, Error)]
pub enum AppError {
    // ----------------------------------------
    // خطاهای کاربر (4xx)
    // ----------------------------------------
    /// URL نامعتبر یا خالی - 400
    #[error("{0}")]
    InvalidUrl(String),

    /// پیدا نشد - 404
    #[error("{0}")]
    NotFound(String),

    // ----------------------------------------
    // خطاهای تخصیص کد
    // ----------------------------------------
    /// کد تکراری موقع insert
    ///
    /// این خطا باید داخل سرویس retry بشه، نه اینکه به کاربر برسه
    #[error("Short code '{0}' already exists")]
    DuplicateCode(String),

    /// هیچ کد آزادی پیدا نشد - 503
    #[error("Could not allocate a unique short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    // ----------------------------------------
    // خطاهای سرور (5xx)
    // ----------------------------------------
    /// ذخیره‌ساز در دسترس نیست (schema گم شده یا خراب)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// خطای سرور
    #[error("Server error: {0}")]
    Server(String),

    /// خطای تنظیمات
    #[error("Configuration error: {0}")]
    Config(String),

    // ----------------------------------------
    // خطاهای تبدیل شده از کتابخانه‌ها
    // ----------------------------------------
    /// خطای دیتابیس
    ///
    /// `From<sqlx::Error>` دستی پیاده‌سازی شده (پایین‌تر)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// خطای IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// گرفتن HTTP status code متناسب با خطا
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CodeSpaceExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,

            Self::DuplicateCode(_)
            | Self::StorageUnavailable(_)
            | Self::Server(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// آیا این یه خطای سرور هست؟
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// پیامی که به کلاینت نشون داده میشه
    ///
    /// برای خطاهای 5xx همیشه پیام عمومی برمیگرده
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            GENERIC_SERVER_ERROR.to_string()
        } else {
            self.to_string()
        }
    }

    /// خطای 404 استاندارد API
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound("Not found".to_string())
    }
}

// =====================================
// sqlx Error Classification
// =====================================
/// آیا این خطا یعنی schema گم شده یا فایل دیتابیس خرابه؟
///
/// - `no such table`: جدول پاک شده (مثلا فایل دیتابیس حذف شده)
/// - کد 11 (`SQLITE_CORRUPT`) و 26 (`SQLITE_NOTADB`): فایل خراب
#[must_use]
pub fn is_schema_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.message().contains("no such table") {
                return true;
            }
            db_err.code().as_deref().is_some_and(is_corruption_code)
        }
        _ => false,
    }
}

/// کد نتیجه SQLite (ساده یا extended) مال خرابی فایله؟
///
/// sqlx کد extended رو میده (مثلا 267 = `SQLITE_CORRUPT_VTAB`)؛
/// بایت پایینش کد اصلیه.
fn is_corruption_code(code: &str) -> bool {
    const SQLITE_CORRUPT: i32 = 11;
    const SQLITE_NOTADB: i32 = 26;

    code.parse::<i32>()
        .is_ok_and(|code| matches!(code & 0xff, SQLITE_CORRUPT | SQLITE_NOTADB))
}

/// آیا این خطا نقض قید UNIQUE هست؟
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if is_schema_error(&err) {
            AppError::StorageUnavailable(err.to_string())
        } else if is_unique_violation(&err) {
            AppError::DuplicateCode(err.to_string())
        } else {
            AppError::Database(err)
        }
    }
}

// =====================================
// Error Response DTO
// =====================================
/// بدنه JSON خطا: `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// ساخت پاسخ خطای جدید
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// =====================================
// IntoResponse Implementation
// =====================================
/// تبدیل AppError به Response HTTP
///
/// خطاهای سرور با جزئیات کامل لاگ میشن ولی کلاینت فقط پیام عمومی میبینه.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "Server error occurred");
        }

        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}

// =====================================
// Option Extensions
// =====================================
/// Extension trait برای Option
pub trait OptionExt<T> {
    /// تبدیل None به `AppError::NotFound("Not found")`
    fn ok_or_not_found(self) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> Result<T> {
        self.ok_or_else(AppError::not_found)
    }
}
