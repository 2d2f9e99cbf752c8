//! # Repository Pattern
//!
//! لایه انتزاعی بین سرویس‌ها و SQLite.
//!
//! ## Repository Pattern چیه؟
//! - منطق برنامه نمیدونه داده کجا ذخیره میشه
//! - تست کردن راحت‌تر میشه (با mockall میشه mock کرد)
//!
//! ## تضمین‌ها
//! - یکتایی `short_code` رو قید `UNIQUE` دیتابیس تضمین میکنه، نه `exists`
//! - `increment_clicks` یه دستور اتمیک `clicks = clicks + 1` هست

use async_trait::async_trait;
use chrono::Utc;

use super::Database;
use crate::error::{AppError, Result};
use crate::models::UrlRecord;

// =====================================
// Store Trait
// =====================================
/// عملیات ذخیره‌ساز لینک‌ها
///
/// # مفاهیم:
/// - `#[async_trait]`: macro برای async در traits
/// - `Send + Sync`: امکان share بین task‌ها پشت `Arc<dyn UrlStore>`
/// - در تست‌ها `MockUrlStore` از روی همین trait ساخته میشه
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// آیا رکوردی با این کد هست؟
    ///
    /// فقط یه فیلتر اولیه‌ست؛ بین این چک و insert ممکنه کس دیگه‌ای همین کد رو بگیره
    async fn exists(&self, code: &str) -> Result<bool>;

    /// ساخت رکورد جدید با `clicks = 0`
    ///
    /// # Errors
    /// `AppError::DuplicateCode` اگه کد قبلا وجود داشته باشه
    async fn insert(&self, code: &str, original_url: &str) -> Result<UrlRecord>;

    /// پیدا کردن با short_code
    async fn get_by_code(&self, code: &str) -> Result<Option<UrlRecord>>;

    /// افزایش اتمیک شمارنده کلیک
    ///
    /// `false` یعنی رکوردی با این کد نبود
    async fn increment_clicks(&self, code: &str) -> Result<bool>;

    /// تعداد کل رکوردها
    async fn count(&self) -> Result<i64>;
}

// =====================================
// SQLite Store
// =====================================
/// پیاده‌سازی `UrlStore` روی SQLite
///
/// هر متد از `Database::with_recovery` رد میشه تا خرابی schema
/// یک بار خودکار ترمیم بشه.
#[derive(Debug, Clone)]
pub struct SqliteUrlStore {
    db: Database,
}

impl SqliteUrlStore {
    /// ساخت store جدید
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// دسترسی به دیتابیس زیرین
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl UrlStore for SqliteUrlStore {
    async fn exists(&self, code: &str) -> Result<bool> {
        let count = self
            .db
            .with_recovery("exists", move |pool| async move {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM urls WHERE short_code = ?")
                    .bind(code)
                    .fetch_one(&pool)
                    .await
            })
            .await?;

        Ok(count > 0)
    }

    async fn insert(&self, code: &str, original_url: &str) -> Result<UrlRecord> {
        let now = Utc::now();

        // RETURNING: رکورد ساخته شده رو با همون دستور برمیگردونه
        // `fetch_all` دستور رو تا آخر اجرا میکنه؛ با `fetch_one` commit
        // ممکنه بعد از برگشتن این متد اتفاق بیفته
        let inserted = self
            .db
            .with_recovery("insert", move |pool| async move {
                sqlx::query_as::<_, UrlRecord>(
                    r#"
                    INSERT INTO urls (short_code, original_url, created_at, clicks)
                    VALUES (?, ?, ?, 0)
                    RETURNING id, short_code, original_url, created_at, clicks
                    "#,
                )
                .bind(code)
                .bind(original_url)
                .bind(now)
                .fetch_all(&pool)
                .await
                .and_then(|rows| rows.into_iter().next().ok_or(sqlx::Error::RowNotFound))
            })
            .await;

        // پیام sqlx کد رو نداره؛ کد واقعی جایگزینش میشه
        inserted.map_err(|err| match err {
            AppError::DuplicateCode(_) => AppError::DuplicateCode(code.to_string()),
            other => other,
        })
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<UrlRecord>> {
        self.db
            .with_recovery("get_by_code", move |pool| async move {
                sqlx::query_as::<_, UrlRecord>(
                    r#"
                    SELECT id, short_code, original_url, created_at, clicks
                    FROM urls
                    WHERE short_code = ?
                    "#,
                )
                .bind(code)
                .fetch_optional(&pool)
                .await
            })
            .await
    }

    async fn increment_clicks(&self, code: &str) -> Result<bool> {
        let result = self
            .db
            .with_recovery("increment_clicks", move |pool| async move {
                sqlx::query("UPDATE urls SET clicks = clicks + 1 WHERE short_code = ?")
                    .bind(code)
                    .execute(&pool)
                    .await
            })
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        self.db
            .with_recovery("count", move |pool| async move {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM urls")
                    .fetch_one(&pool)
                    .await
            })
            .await
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreHealth;

    async fn store() -> SqliteUrlStore {
        SqliteUrlStore::new(Database::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = store().await;

        let record = store.insert("abc123", "https://example.com/a").await.unwrap();
        assert_eq!(record.short_code, "abc123");
        assert_eq!(record.original_url, "https://example.com/a");
        assert_eq!(record.clicks, 0);
        assert!(record.id > 0);

        let found = store.get_by_code("abc123").await.unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let store = store().await;

        let first = store.insert("aaaaaa", "https://a.io").await.unwrap();
        let second = store.insert("bbbbbb", "https://b.io").await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = store().await;
        store.insert("dup001", "https://first.io").await.unwrap();

        let err = store.insert("dup001", "https://second.io").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateCode(code) if code == "dup001"));

        // رکورد اول دست نخورده
        let record = store.get_by_code("dup001").await.unwrap().unwrap();
        assert_eq!(record.original_url, "https://first.io");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exists() {
        let store = store().await;
        assert!(!store.exists("xyz789").await.unwrap());

        store.insert("xyz789", "https://x.io").await.unwrap();
        assert!(store.exists("xyz789").await.unwrap());
    }

    #[tokio::test]
    async fn test_codes_are_case_sensitive() {
        let store = store().await;
        store.insert("AbCdEf", "https://upper.io").await.unwrap();

        assert!(!store.exists("abcdef").await.unwrap());
        store.insert("abcdef", "https://lower.io").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_increment_clicks() {
        let store = store().await;
        store.insert("clk001", "https://c.io").await.unwrap();

        assert!(store.increment_clicks("clk001").await.unwrap());
        assert!(store.increment_clicks("clk001").await.unwrap());

        let record = store.get_by_code("clk001").await.unwrap().unwrap();
        assert_eq!(record.clicks, 2);
    }

    #[tokio::test]
    async fn test_increment_unknown_code_signals_not_found() {
        let store = store().await;
        assert!(!store.increment_clicks("nope00").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_heals_missing_table() {
        let store = store().await;
        sqlx::query("DROP TABLE urls")
            .execute(&store.database().pool())
            .await
            .unwrap();

        let record = store.insert("heal01", "https://h.io").await.unwrap();
        assert_eq!(record.short_code, "heal01");
        assert_eq!(store.database().health(), StoreHealth::Healthy);
    }

    #[tokio::test]
    async fn test_lookup_after_wipe_is_not_found() {
        let store = store().await;
        store.insert("gone01", "https://g.io").await.unwrap();

        sqlx::query("DROP TABLE urls")
            .execute(&store.database().pool())
            .await
            .unwrap();

        assert_eq!(store.get_by_code("gone01").await.unwrap(), None);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    /// رکورد تازه باید از همه اتصال‌های pool دیده بشه
    #[tokio::test]
    async fn test_insert_is_visible_to_other_connections() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("urls.db").display());
        let store = SqliteUrlStore::new(Database::connect(&url).await.unwrap());

        for round in 0..5 {
            let code = format!("vis{round:03}");
            store.insert(&code, "https://example.com/v").await.unwrap();

            let lookups: Vec<_> = (0..40)
                .map(|_| {
                    let store = store.clone();
                    let code = code.clone();
                    tokio::spawn(async move { store.get_by_code(&code).await })
                })
                .collect();

            for lookup in lookups {
                let found = lookup.await.unwrap().unwrap();
                assert_eq!(found.map(|r| r.short_code), Some(code.clone()));
            }
        }

        assert_eq!(store.count().await.unwrap(), 5);
    }
}
