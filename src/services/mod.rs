//! # ماژول سرویس‌ها (Business Logic Layer)
//!
//! ## لایه‌بندی معماری
//!
//! ```text
//! ┌─────────────────┐
//! │    API Layer    │  <-- HTTP handlers (axum)
//! ├─────────────────┤
//! │  Service Layer  │  <-- تخصیص کد، resolve، آمار (اینجا!)
//! ├─────────────────┤
//! │   UrlStore      │  <-- trait ذخیره‌ساز + self-heal
//! ├─────────────────┤
//! │    Database     │  <-- SQLite
//! └─────────────────┘
//! ```
//!
//! ## مفاهیم Rust:
//! - **Dependency Injection**: سرویس‌ها `Arc<dyn UrlStore>` میگیرن
//! - **Arc<T>**: اشتراک امن بین task‌ها

mod code_generator;
mod resolve_service;
mod shorten_service;

pub use code_generator::*;
pub use resolve_service::*;
pub use shorten_service::*;

use std::sync::Arc;

use tracing::info;

use crate::{
    config::{CodeStrategyKind, Config},
    database::{Database, SqliteUrlStore, UrlStore},
    error::Result,
};

// =====================================
// Application State
// =====================================
/// وضعیت برنامه که بین همه handlers اشتراک‌گذاری میشه
///
/// # مفاهیم:
/// - `Clone`: فقط `Arc`‌ها clone میشن، نه داده
/// - در axum با `with_state` تزریق میشه
#[derive(Clone)]
pub struct AppState {
    /// سرویس ساخت لینک
    pub shorten_service: Arc<ShortenService>,

    /// سرویس redirect و آمار
    pub resolve_service: Arc<ResolveService>,
}

impl AppState {
    /// ساخت AppState روی SQLite
    ///
    /// برای استراتژی ترتیبی، شمارنده از تعداد رکوردهای فعلی شروع میشه
    /// تا بعد از restart کدهای قبلی دوباره کاندید نشن.
    ///
    /// # Errors
    /// اگه شمردن رکوردها شکست بخوره
    pub async fn build(db: Database, config: Config) -> Result<Self> {
        let store: Arc<dyn UrlStore> = Arc::new(SqliteUrlStore::new(db));

        let offset = match config.code_strategy {
            CodeStrategyKind::Sequential => u64::try_from(store.count().await?).unwrap_or(0),
            CodeStrategyKind::Random => 0,
        };

        let generator = CodeGenerator::from_config(&config, offset);
        info!(
            strategy = ?config.code_strategy,
            code_length = generator.length(),
            "Code generator ready"
        );

        Ok(Self::from_parts(&config, store, generator))
    }

    /// ساخت از اجزای آماده (مثلا store جایگزین در تست‌ها)
    #[must_use]
    pub fn from_parts(config: &Config, store: Arc<dyn UrlStore>, generator: CodeGenerator) -> Self {
        Self {
            shorten_service: Arc::new(ShortenService::new(
                store.clone(),
                generator,
                config.insert_retries,
            )),
            resolve_service: Arc::new(ResolveService::new(store)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    #[tokio::test]
    async fn test_sequential_state_skips_existing_codes() {
        let db = Database::in_memory().await.unwrap();
        let config = ConfigBuilder::new()
            .code_strategy(CodeStrategyKind::Sequential)
            .build();

        let first = AppState::build(db.clone(), config.clone()).await.unwrap();
        let a = first
            .shorten_service
            .shorten(Some("https://a.io"))
            .await
            .unwrap();

        // مثل restart: state جدید روی همون دیتابیس
        let second = AppState::build(db, config).await.unwrap();
        let b = second
            .shorten_service
            .shorten(Some("https://b.io"))
            .await
            .unwrap();

        assert_ne!(a.short_code, b.short_code);
        assert_eq!(second.resolve_service.total().await.unwrap(), 2);
    }
}
