//! # سرویس resolve و آمار
//!
//! پیدا کردن آدرس اصلی، شمردن کلیک و گزارش آمار.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::{database::UrlStore, error::Result, models::UrlRecord};

// =====================================
// Resolve Service
// =====================================
/// سرویس خواندن لینک‌ها
#[derive(Clone)]
pub struct ResolveService {
    store: Arc<dyn UrlStore>,
}

impl ResolveService {
    #[must_use]
    pub fn new(store: Arc<dyn UrlStore>) -> Self {
        Self { store }
    }

    /// پیدا کردن آدرس اصلی و ثبت یک کلیک
    ///
    /// کلیک قبل از برگردوندن آدرس ثبت میشه، پس خوندن آمار بعد از redirect
    /// همیشه این کلیک رو میبینه. کد ناشناخته هیچ چیزی رو تغییر نمیده.
    ///
    /// # Returns
    /// - `Ok(Some(url))`: آدرس اصلی
    /// - `Ok(None)`: کد وجود نداره
    #[instrument(skip(self))]
    pub async fn resolve(&self, code: &str) -> Result<Option<String>> {
        let Some(record) = self.store.get_by_code(code).await? else {
            debug!("Unknown short code");
            return Ok(None);
        };

        // رکورد بین lookup و increment پاک شده؛ redirect همچنان انجام میشه
        if !self.store.increment_clicks(code).await? {
            warn!("Short code vanished before its click was counted");
        }

        Ok(Some(record.original_url))
    }

    /// رکورد کامل بدون تغییر شمارنده
    #[instrument(skip(self))]
    pub async fn stats(&self, code: &str) -> Result<Option<UrlRecord>> {
        self.store.get_by_code(code).await
    }

    /// تعداد کل لینک‌ها
    pub async fn total(&self) -> Result<i64> {
        self.store.count().await
    }
}
