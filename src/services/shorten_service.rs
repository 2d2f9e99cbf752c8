//! # سرویس کوتاه‌سازی
//!
//! اعتبارسنجی ورودی → تخصیص کد → insert → برگردوندن رکورد

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    database::UrlStore,
    error::{AppError, Result},
    models::UrlRecord,
    utils,
};

use super::{Allocation, CodeGenerator};

/// پیام خطا وقتی `url` فرستاده نشده
pub const URL_REQUIRED: &str = "URL is required";

/// پیام خطا وقتی scheme درست نیست
pub const URL_SCHEME_REQUIRED: &str = "URL must start with http:// or https://";

// =====================================
// Shorten Service
// =====================================
/// سرویس ساخت لینک کوتاه
///
/// # مسئولیت‌ها:
/// - چک کردن scheme آدرس (بدون normalize یا dedup)
/// - گرفتن کد آزاد از `CodeGenerator`
/// - retry وقتی insert با `DuplicateCode` رد میشه
#[derive(Clone)]
pub struct ShortenService {
    store: Arc<dyn UrlStore>,
    generator: CodeGenerator,
    insert_retries: u32,
}

impl ShortenService {
    /// ساخت سرویس جدید
    #[must_use]
    pub fn new(store: Arc<dyn UrlStore>, generator: CodeGenerator, insert_retries: u32) -> Self {
        Self {
            store,
            generator,
            insert_retries,
        }
    }

    /// ساخت لینک کوتاه جدید
    ///
    /// # Arguments
    /// * `url` - آدرس اصلی؛ `None` یعنی کلاینت اصلا `url` نفرستاده
    ///
    /// # Errors
    /// - `InvalidUrl`: آدرس نیست، خالیه یا scheme اشتباهه (هیچ رکوردی ساخته نمیشه)
    /// - `CodeSpaceExhausted`: کد آزاد پیدا نشد
    /// - خطاهای store
    #[instrument(skip(self))]
    pub async fn shorten(&self, url: Option<&str>) -> Result<UrlRecord> {
        let url = url.ok_or_else(|| AppError::InvalidUrl(URL_REQUIRED.to_string()))?;

        if !utils::has_http_scheme(url) {
            return Err(AppError::InvalidUrl(URL_SCHEME_REQUIRED.to_string()));
        }

        let rounds = self.insert_retries.saturating_add(1);

        for round in 1..=rounds {
            let code = match self.generator.allocate(self.store.as_ref()).await? {
                Allocation::Fresh(code) => code,
                Allocation::ExhaustedRetries {
                    last_candidate,
                    attempts,
                } => {
                    warn!(%last_candidate, attempts, "Refusing to reuse a colliding short code");
                    return Err(AppError::CodeSpaceExhausted { attempts });
                }
            };

            match self.store.insert(&code, url).await {
                Ok(record) => {
                    info!(short_code = %record.short_code, "Created new short URL");
                    return Ok(record);
                }
                // کد بین exists و insert گرفته شد؛ دوباره از اول
                Err(AppError::DuplicateCode(code)) => {
                    warn!(%code, round, "Short code taken before insert, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(AppError::CodeSpaceExhausted { attempts: rounds })
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Database, MockUrlStore, SqliteUrlStore};
    use crate::services::code_generator::tests::ScriptedStrategy;
    use crate::services::RandomStrategy;
    use chrono::Utc;

    fn record(code: &str, url: &str) -> UrlRecord {
        UrlRecord {
            id: 1,
            short_code: code.to_string(),
            original_url: url.to_string(),
            created_at: Utc::now(),
            clicks: 0,
        }
    }

    async fn sqlite_service() -> (ShortenService, Arc<SqliteUrlStore>) {
        let store = Arc::new(SqliteUrlStore::new(Database::in_memory().await.unwrap()));
        let generator = CodeGenerator::new(Arc::new(RandomStrategy), 6, 10);
        (ShortenService::new(store.clone(), generator, 3), store)
    }

    #[tokio::test]
    async fn test_rejects_missing_url() {
        let (service, store) = sqlite_service().await;

        let err = service.shorten(None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(ref msg) if msg == URL_REQUIRED));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_schemes_without_writing() {
        let (service, store) = sqlite_service().await;

        for bad in ["", "ftp://x", "example.com", "javascript:alert(1)"] {
            let err = service.shorten(Some(bad)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidUrl(ref msg) if msg == URL_SCHEME_REQUIRED));
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stores_url_as_is() {
        let (service, _store) = sqlite_service().await;

        let url = "https://exa mple.com/%%%/../?q=<>";
        let record = service.shorten(Some(url)).await.unwrap();

        assert_eq!(record.original_url, url);
        assert_eq!(record.short_code.len(), 6);
        assert_eq!(record.clicks, 0);
    }

    #[tokio::test]
    async fn test_same_url_gets_distinct_codes() {
        let (service, _store) = sqlite_service().await;

        let first = service.shorten(Some("https://example.com")).await.unwrap();
        let second = service.shorten(Some("https://example.com")).await.unwrap();

        assert_ne!(first.short_code, second.short_code);
    }

    #[tokio::test]
    async fn test_retries_after_duplicate_insert() {
        let mut store = MockUrlStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_insert()
            .withf(|code, _| code.starts_with("race"))
            .times(1)
            .returning(|code, _| Err(AppError::DuplicateCode(code.to_string())));
        store
            .expect_insert()
            .withf(|code, _| code.starts_with("calm"))
            .times(1)
            .returning(|code, url| Ok(record(code, url)));

        let generator = CodeGenerator::new(
            Arc::new(ScriptedStrategy::new(&["race01", "calm02"])),
            6,
            10,
        );
        let service = ShortenService::new(Arc::new(store), generator, 3);

        let created = service.shorten(Some("https://example.com")).await.unwrap();
        assert_eq!(created.short_code, "calm02");
    }

    #[tokio::test]
    async fn test_gives_up_after_insert_retries() {
        let mut store = MockUrlStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_insert()
            .times(2)
            .returning(|code, _| Err(AppError::DuplicateCode(code.to_string())));

        let generator = CodeGenerator::new(
            Arc::new(ScriptedStrategy::new(&["aaaaaa", "bbbbbb"])),
            6,
            10,
        );
        let service = ShortenService::new(Arc::new(store), generator, 1);

        let err = service.shorten(Some("https://example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::CodeSpaceExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_exhausted_generator_is_an_error() {
        let mut store = MockUrlStore::new();
        store.expect_exists().times(2).returning(|_| Ok(true));
        store.expect_insert().never();

        let generator = CodeGenerator::new(
            Arc::new(ScriptedStrategy::new(&["busy01", "busy02"])),
            6,
            2,
        );
        let service = ShortenService::new(Arc::new(store), generator, 3);

        let err = service.shorten(Some("https://example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::CodeSpaceExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_max_insert_retries_still_shortens() {
        let mut store = MockUrlStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_insert()
            .times(1)
            .returning(|code, url| Ok(record(code, url)));

        let generator = CodeGenerator::new(Arc::new(ScriptedStrategy::new(&["maxr01"])), 6, 10);
        let service = ShortenService::new(Arc::new(store), generator, u32::MAX);

        let created = service.shorten(Some("https://example.com")).await.unwrap();
        assert_eq!(created.short_code, "maxr01");
    }
}
