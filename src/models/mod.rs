//! # ماژول مدل‌ها (Domain Models)
//!
//! این ماژول مدل‌های داده برنامه رو تعریف میکنه.
//!
//! ## تفاوت انواع مدل:
//! - **Entity** (`UrlRecord`): داده‌ای که در دیتابیس ذخیره میشه
//! - **DTO**: شکل دقیق JSON ورودی/خروجی API

mod url;
mod dto;

// Re-export همه مدل‌ها
pub use url::*;
pub use dto::*;
