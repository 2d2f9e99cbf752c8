//! # ماژول تنظیمات (Configuration)
//!
//! این ماژول مسئول خوندن و مدیریت تنظیمات برنامه هست.
//!
//! ## مفاهیم Rust:
//! - **Default Trait**: مقادیر پیش‌فرض
//! - **Serde**: سریالایز/دسریالایز
//! - **Builder Pattern**: ساخت تدریجی آبجکت

use std::env;
use serde::{Deserialize, Serialize};
use crate::error::{AppError, Result};

/// طول پیش‌فرض short code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// حداکثر تعداد تلاش برای پیدا کردن کد آزاد
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// تعداد دورهای اضافه تخصیص+insert وقتی insert با کد تکراری fail میشه
pub const DEFAULT_INSERT_RETRIES: u32 = 3;

/// بازه مجاز طول کد
const CODE_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=16;

/// سقف `INSERT_RETRIES`
pub const MAX_INSERT_RETRIES: u32 = 100;

/// تنظیمات اصلی برنامه
///
/// # مثال
/// ```rust
/// use url_shortener::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.code_length, 6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// آدرس هاست سرور
    pub host: String,

    /// پورت سرور
    pub port: u16,

    /// آدرس اتصال به دیتابیس
    pub database_url: String,

    /// طول short code
    pub code_length: usize,

    /// حداکثر تلاش generator قبل از اعلام `ExhaustedRetries`
    pub max_attempts: u32,

    /// دورهای اضافه وقتی insert با `DuplicateCode` رد میشه
    pub insert_retries: u32,

    /// استراتژی تولید کد
    pub code_strategy: CodeStrategyKind,

    /// محیط اجرا (development, production)
    pub environment: Environment,
}

/// نوع استراتژی تولید کد
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodeStrategyKind {
    /// انتخاب تصادفی یکنواخت از الفبای ۶۲ تایی
    #[default]
    Random,

    /// شمارنده ترتیبی که base62 میشه
    Sequential,
}

impl From<String> for CodeStrategyKind {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => CodeStrategyKind::Sequential,
            _ => CodeStrategyKind::Random,
        }
    }
}

/// محیط اجرای برنامه
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// محیط توسعه - لاگ خوانا
    #[default]
    Development,

    /// محیط تست
    Testing,

    /// محیط تولید - لاگ JSON
    Production,
}

impl Environment {
    /// آیا در محیط تولید هستیم؟
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// تبدیل String به Environment
impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: "sqlite://data/urls.db?mode=rwc".to_string(),
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            insert_retries: DEFAULT_INSERT_RETRIES,
            code_strategy: CodeStrategyKind::Random,
            environment: Environment::Development,
        }
    }
}

impl Config {
    /// ساخت تنظیمات از متغیرهای محیطی
    ///
    /// هر متغیری که نباشه یا parse نشه، مقدار پیش‌فرض میگیره.
    ///
    /// # Errors
    /// خطا برمیگردونه اگه تنظیمات نهایی معتبر نباشن
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let get_env = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        // helper برای parse کردن عدد
        fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        let config = Self {
            host: get_env("HOST", &defaults.host),
            port: parse_env("PORT", defaults.port),
            database_url: get_env("DATABASE_URL", &defaults.database_url),
            code_length: parse_env("CODE_LENGTH", defaults.code_length),
            max_attempts: parse_env("CODE_MAX_ATTEMPTS", defaults.max_attempts),
            insert_retries: parse_env("INSERT_RETRIES", defaults.insert_retries),
            code_strategy: get_env("CODE_STRATEGY", "random").into(),
            environment: get_env("ENVIRONMENT", "development").into(),
        };

        config.validate()?;
        Ok(config)
    }

    /// اعتبارسنجی تنظیمات
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::Config("PORT cannot be 0".to_string()));
        }

        if !CODE_LENGTH_RANGE.contains(&self.code_length) {
            return Err(AppError::Config(format!(
                "CODE_LENGTH must be between {} and {}",
                CODE_LENGTH_RANGE.start(),
                CODE_LENGTH_RANGE.end()
            )));
        }

        if self.max_attempts == 0 {
            return Err(AppError::Config(
                "CODE_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if self.insert_retries > MAX_INSERT_RETRIES {
            return Err(AppError::Config(format!(
                "INSERT_RETRIES must be at most {MAX_INSERT_RETRIES}"
            )));
        }

        Ok(())
    }

    /// آدرس کامل سرور
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =====================================
// Builder Pattern
// =====================================
/// ساخت Config با Builder Pattern
///
/// # مثال
/// ```rust
/// use url_shortener::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .port(8080)
///     .host("0.0.0.0")
///     .build();
/// assert_eq!(config.server_addr(), "0.0.0.0:8080");
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// ساخت builder جدید
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// تنظیم پورت
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// تنظیم هاست
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// تنظیم database_url
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    #[must_use]
    pub fn code_length(mut self, length: usize) -> Self {
        self.config.code_length = length;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn insert_retries(mut self, retries: u32) -> Self {
        self.config.insert_retries = retries;
        self
    }

    /// تنظیم استراتژی تولید کد
    #[must_use]
    pub fn code_strategy(mut self, kind: CodeStrategyKind) -> Self {
        self.config.code_strategy = kind;
        self
    }

    /// تنظیم محیط
    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    /// ساخت Config نهایی
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }

    /// ساخت Config با اعتبارسنجی
    ///
    /// # Errors
    /// خطا برمیگردونه اگه اعتبارسنجی fail بشه
    pub fn build_validated(self) -> Result<Config> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.code_length, 6);
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.code_strategy, CodeStrategyKind::Random);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .port(8080)
            .host("0.0.0.0")
            .code_strategy(CodeStrategyKind::Sequential)
            .build();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.code_strategy, CodeStrategyKind::Sequential);
    }

    #[test]
    fn test_strategy_from_string() {
        assert_eq!(CodeStrategyKind::from("SEQUENTIAL".to_string()), CodeStrategyKind::Sequential);
        assert_eq!(CodeStrategyKind::from("random".to_string()), CodeStrategyKind::Random);
        assert_eq!(CodeStrategyKind::from("whatever".to_string()), CodeStrategyKind::Random);
    }

    #[test]
    fn test_environment_from_string() {
        assert_eq!(Environment::from("PROD".to_string()), Environment::Production);
        assert_eq!(Environment::from("unknown".to_string()), Environment::Development);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(ConfigBuilder::new().port(0).build_validated().is_err());
        assert!(ConfigBuilder::new().code_length(2).build_validated().is_err());
        assert!(ConfigBuilder::new().code_length(64).build_validated().is_err());
        assert!(ConfigBuilder::new().max_attempts(0).build_validated().is_err());
        assert!(ConfigBuilder::new().insert_retries(0).build_validated().is_ok());
        assert!(ConfigBuilder::new()
            .insert_retries(MAX_INSERT_RETRIES)
            .build_validated()
            .is_ok());
    }

    #[test]
    fn test_validation_caps_insert_retries() {
        let err = ConfigBuilder::new()
            .insert_retries(u32::MAX)
            .build_validated()
            .unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("INSERT_RETRIES")));
    }
}
