//! # مدل URL
//!
//! Entity اصلی: یک ردیف از جدول `urls`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =====================================
// URL Entity
// =====================================
/// رکورد یک لینک کوتاه
///
/// # مفاهیم:
/// - `#[derive(FromRow)]`: تبدیل خودکار از ردیف دیتابیس
/// - فیلدها بعد از ساخت تغییر نمیکنن، جز `clicks` که فقط زیاد میشه
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UrlRecord {
    /// شناسه عددی که دیتابیس میده
    pub id: i64,

    /// کد کوتاه (مثلا "aZ3k9Q")
    pub short_code: String,

    /// آدرس اصلی
    pub original_url: String,

    /// زمان ساخت
    pub created_at: DateTime<Utc>,

    /// تعداد کلیک
    pub clicks: i64,
}
