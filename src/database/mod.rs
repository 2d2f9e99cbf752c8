//! # ماژول دیتابیس (Database Layer)
//!
//! این ماژول لایه ارتباط با SQLite رو مدیریت میکنه.
//!
//! ## مفاهیم Rust:
//! - **Connection Pool**: هر عملیات یه اتصال میگیره و زود پس میده
//! - **async/await**: برنامه‌نویسی غیرهمزمان
//! - **Higher-order function**: `with_recovery` یه closure میگیره و
//!   در صورت خرابی schema یک بار دوباره اجراش میکنه
//! - **ArcSwap**: اگه فایل دیتابیس پاک بشه، pool جدید جای قبلی میشینه
//!
//! ## الگوهای طراحی:
//! - Repository Pattern: جداسازی لایه داده از منطق (`repository.rs`)
//! - State Machine: بازیابی schema (`recovery.rs`)

mod recovery;
mod repository;

pub use recovery::*;
pub use repository::*;

use std::{
    future::Future,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use arc_swap::ArcSwap;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{is_schema_error, AppError, Result};

/// schema جدول لینک‌ها
///
/// همه دستورها `IF NOT EXISTS` دارن، پس اجرای دوباره امنه
pub const SCHEMA_SQL: &str = include_str!("../../migrations/0001_create_urls.sql");

/// فایل‌های جانبی SQLite در حالت WAL
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

// =====================================
// Database Connection
// =====================================
/// اتصال به دیتابیس با Connection Pool
///
/// # مفاهیم:
/// - `ArcSwap<SqlitePool>`: pool رو میشه بدون قفل عوض کرد
/// - `health` و `reinit_lock` بین همه clone‌ها مشترکن
/// - `file` فقط برای دیتابیس روی دیسک پر میشه
#[derive(Debug, Clone)]
pub struct Database {
    pool: Arc<ArcSwap<SqlitePool>>,
    file: Option<Arc<DatabaseFile>>,
    health: Arc<HealthCell>,
    reinit_lock: Arc<Mutex<()>>,
}

/// مسیر فایل و تنظیمات اتصال، برای باز کردن دوباره pool
#[derive(Debug)]
struct DatabaseFile {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl Database {
    /// اتصال به دیتابیس و اعمال schema
    ///
    /// # Arguments
    /// * `database_url` - آدرس دیتابیس (مثلا `sqlite://data/urls.db?mode=rwc`)
    ///
    /// # Errors
    /// خطا برمیگردونه اگه اتصال یا ساخت schema موفق نباشه
    pub async fn connect(database_url: impl AsRef<str>) -> Result<Self> {
        let url = database_url.as_ref();
        let path = database_file_path(url);

        // ساخت پوشه فایل دیتابیس اگه وجود نداره
        if let Some(parent) = path.as_deref().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = open_pool(options.clone()).await?;
        info!(database_url = %url, "Database pool created");

        let file = path.map(|path| Arc::new(DatabaseFile { path, options }));
        let db = Self::from_pool(pool, file);
        db.initialize().await?;
        Ok(db)
    }

    /// دیتابیس in-memory (برای تست‌ها و اجرای موقت)
    ///
    /// فقط یه اتصال داریم و هیچوقت بسته نمیشه، چون هر اتصال
    /// `:memory:` دیتابیس جدای خودش رو داره.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self::from_pool(pool, None);
        db.initialize().await?;
        Ok(db)
    }

    fn from_pool(pool: SqlitePool, file: Option<Arc<DatabaseFile>>) -> Self {
        Self {
            pool: Arc::new(ArcSwap::from_pointee(pool)),
            file,
            health: Arc::new(HealthCell::default()),
            reinit_lock: Arc::new(Mutex::new(())),
        }
    }

    /// pool فعلی
    ///
    /// بعد از باز شدن دوباره فایل، pool قبلی بسته میشه؛ نگهش ندارید.
    #[must_use]
    pub fn pool(&self) -> SqlitePool {
        SqlitePool::clone(&self.pool.load())
    }

    /// وضعیت فعلی ماشین حالت بازیابی
    #[must_use]
    pub fn health(&self) -> StoreHealth {
        self.health.get()
    }

    /// اعمال schema و بررسی اینکه جدول واقعا ساخته شده
    pub async fn initialize(&self) -> Result<()> {
        let pool = self.pool();
        sqlx::query(SCHEMA_SQL).execute(&pool).await?;
        self.verify_schema().await?;
        info!("Table 'urls' created/verified successfully");
        Ok(())
    }

    /// بررسی وجود جدول `urls` در `sqlite_master`
    pub async fn verify_schema(&self) -> Result<()> {
        let table = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'urls'",
        )
        .fetch_optional(&self.pool())
        .await?;

        match table {
            Some(_) => Ok(()),
            None => Err(AppError::StorageUnavailable(
                "table 'urls' is missing after initialization".to_string(),
            )),
        }
    }

    /// ساخت دوباره schema
    ///
    /// با `reinit_lock` فقط یه بازسازی همزمان اجرا میشه؛ بقیه صبر میکنن
    /// schema idempotent هست، پس اجرای بعدیشون چیزی رو تغییر نمیده.
    async fn reinitialize(&self) -> Result<()> {
        let _guard = self.reinit_lock.lock().await;
        self.health.transition(StoreHealth::Reinitializing);
        self.initialize().await
    }

    /// باز کردن دوباره فایل دیتابیس وقتی از روی دیسک پاک شده
    ///
    /// اتصال‌های قبلی هنوز روی inode پاک شده می‌نویسن و هیچ خطایی نمیدن،
    /// پس قبل از هر عملیات وجود فایل چک میشه.
    async fn ensure_file_present(&self, operation: &'static str) -> Result<()> {
        let Some(file) = self.file.as_deref() else {
            return Ok(());
        };
        if file.path.exists() {
            return Ok(());
        }

        warn!(
            operation,
            path = %file.path.display(),
            "Database file disappeared, reopening"
        );
        self.health.transition(StoreHealth::Degraded);

        match self.reopen(file).await {
            Ok(()) => {
                self.health.transition(StoreHealth::Healthy);
                Ok(())
            }
            Err(err) => {
                self.health.transition(StoreHealth::Fatal);
                error!(operation, error = %err, "Reopening the database file failed");
                Err(AppError::StorageUnavailable(err.to_string()))
            }
        }
    }

    async fn reopen(&self, file: &DatabaseFile) -> Result<()> {
        let _guard = self.reinit_lock.lock().await;

        // یه task دیگه زودتر باز کرده
        if file.path.exists() {
            return Ok(());
        }
        self.health.transition(StoreHealth::Reinitializing);

        // WAL قدیمی نباید روی فایل جدید replay بشه
        self.pool().close().await;
        for suffix in SIDECAR_SUFFIXES {
            let mut sidecar = file.path.clone().into_os_string();
            sidecar.push(suffix);
            match std::fs::remove_file(&sidecar) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        let fresh = open_pool(file.options.clone()).await?;
        self.pool.store(Arc::new(fresh));
        info!(path = %file.path.display(), "Database file recreated");

        self.initialize().await
    }

    /// اجرای یک عملیات با self-heal محدود
    ///
    /// # مفاهیم:
    /// - `F: FnMut(SqlitePool) -> Fut`: closure که هر بار با pool فعلی یه future جدید میسازه
    /// - اگه فایل دیتابیس نباشه: قبل از عملیات pool دوباره باز میشه
    /// - اگه خطای schema بیاد: یک بار reinitialize و یک بار retry
    ///
    /// # مثال
    /// ```rust,ignore
    /// let count = db.with_recovery("count", |pool| async move {
    ///     sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM urls")
    ///         .fetch_one(&pool)
    ///         .await
    /// }).await?;
    /// ```
    pub async fn with_recovery<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut(SqlitePool) -> Fut,
        Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        self.ensure_file_present(operation).await?;

        let err = match op(self.pool()).await {
            Ok(value) => {
                self.health.record_success();
                return Ok(value);
            }
            Err(err) if is_schema_error(&err) => err,
            Err(err) => return Err(err.into()),
        };

        warn!(operation, error = %err, "Storage schema missing or corrupted, reinitializing");
        self.health.transition(StoreHealth::Degraded);

        if let Err(init_err) = self.reinitialize().await {
            self.health.transition(StoreHealth::Fatal);
            error!(operation, error = %init_err, "Storage reinitialization failed");
            return Err(AppError::StorageUnavailable(init_err.to_string()));
        }

        match op(self.pool()).await {
            Ok(value) => {
                self.health.transition(StoreHealth::Healthy);
                Ok(value)
            }
            Err(err) if is_schema_error(&err) => {
                self.health.transition(StoreHealth::Fatal);
                error!(operation, error = %err, "Operation failed again after reinitialization");
                Err(AppError::StorageUnavailable(err.to_string()))
            }
            Err(err) => {
                // schema سالمه، خطا از جنس دیگه‌ایه
                self.health.transition(StoreHealth::Healthy);
                Err(err.into())
            }
        }
    }
}

/// pool فایلی با همون تنظیمات اتصال اول
async fn open_pool(options: SqliteConnectOptions) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// مسیر فایل از روی `sqlite://path?query` یا `sqlite:path`
///
/// برای دیتابیس `:memory:` چیزی برنمیگردونه
fn database_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
