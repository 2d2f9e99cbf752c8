//! # تولید کننده short code
//!
//! تخصیص کد احتمالاتیه، نه ترتیبی: با الفبای ۶۲ تایی و طول ۶،
//! حدود 5.68×10^10 کد داریم، پس برخورد نادره ولی غیرممکن نیست.
//!
//! ## مفاهیم Rust:
//! - **Trait Object**: `Arc<dyn CodeStrategy>` برای استراتژی قابل تعویض
//! - **Sum Type**: `Allocation` به جای برگردوندن بی‌صدای کد تکراری
//! - **Atomics**: شمارنده بدون قفل در `SequentialStrategy`

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tracing::{debug, instrument, warn};

use crate::{
    config::{CodeStrategyKind, Config},
    database::UrlStore,
    error::Result,
    utils,
};

// =====================================
// Strategy Trait
// =====================================
/// منبع کدهای کاندید
///
/// تنها قرارداد بیرونی یکتا بودنه؛ منبع تصادف مهم نیست.
pub trait CodeStrategy: Send + Sync + std::fmt::Debug {
    /// کاندید بعدی با طول داده شده
    fn next_code(&self, length: usize) -> String;

    /// اسم استراتژی برای لاگ
    fn name(&self) -> &'static str;
}

/// انتخاب یکنواخت هر کاراکتر از الفبای ۶۲ تایی
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl CodeStrategy for RandomStrategy {
    fn next_code(&self, length: usize) -> String {
        utils::generate_short_code_with_length(length)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// ضریب درهم‌سازی؛ فرده و بر ۳۱ بخش‌پذیر نیست، پس نسبت به 62^n اوله
const SCRAMBLE_MULTIPLIER: u128 = 2_654_435_761;

/// شمارنده ترتیبی که base62 میشه
///
/// شمارنده در یک ضریب اول نسبت به 62^n ضرب میشه تا کدهای پشت سر هم
/// شبیه هم نباشن. این نگاشت روی 62^n یک‌به‌یکه، پس داخل یه پروسه
/// تا وقتی فضای کد دور نزده تکرار نداریم.
#[derive(Debug, Default)]
pub struct SequentialStrategy {
    counter: AtomicU64,
}

impl SequentialStrategy {
    /// شروع از یه مقدار مشخص (مثلا تعداد رکوردهای موجود)
    #[must_use]
    pub fn starting_at(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }

    fn encode(value: u64, length: usize) -> String {
        let space = 62u128.pow(length as u32);
        let scrambled = (u128::from(value) * SCRAMBLE_MULTIPLIER) % space;
        format!("{:0>width$}", base62::encode(scrambled), width = length)
    }
}

impl CodeStrategy for SequentialStrategy {
    fn next_code(&self, length: usize) -> String {
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        Self::encode(value, length)
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

// =====================================
// Allocation Result
// =====================================
/// نتیجه تلاش برای پیدا کردن کد آزاد
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// کدی که موقع چک در store نبود
    Fresh(String),

    /// همه تلاش‌ها برخورد داشتن
    ExhaustedRetries {
        last_candidate: String,
        attempts: u32,
    },
}

// =====================================
// Code Generator
// =====================================
/// تولید کد + چک وجود در store
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    strategy: Arc<dyn CodeStrategy>,
    length: usize,
    max_attempts: u32,
}

impl CodeGenerator {
    #[must_use]
    pub fn new(strategy: Arc<dyn CodeStrategy>, length: usize, max_attempts: u32) -> Self {
        Self {
            strategy,
            length,
            max_attempts,
        }
    }

    /// ساخت از روی تنظیمات
    ///
    /// `sequence_offset` فقط برای استراتژی ترتیبی استفاده میشه
    #[must_use]
    pub fn from_config(config: &Config, sequence_offset: u64) -> Self {
        let strategy: Arc<dyn CodeStrategy> = match config.code_strategy {
            CodeStrategyKind::Random => Arc::new(RandomStrategy),
            CodeStrategyKind::Sequential => Arc::new(SequentialStrategy::starting_at(sequence_offset)),
        };

        Self::new(strategy, config.code_length, config.max_attempts)
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// پیدا کردن کدی که الان در store نیست
    ///
    /// # Errors
    /// فقط خطاهای store (بعد از self-heal) برمیگرده؛ تموم شدن تلاش‌ها
    /// خطا نیست و به شکل `Allocation::ExhaustedRetries` برمیگرده.
    #[instrument(skip(self, store), fields(strategy = self.strategy.name()))]
    pub async fn allocate(&self, store: &dyn UrlStore) -> Result<Allocation> {
        let mut last_candidate = String::new();

        for attempt in 1..=self.max_attempts {
            let code = self.strategy.next_code(self.length);

            if !store.exists(&code).await? {
                return Ok(Allocation::Fresh(code));
            }

            debug!(attempt, code = %code, "Short code collision");
            last_candidate = code;
        }

        warn!(attempts = self.max_attempts, "No free short code found");
        Ok(Allocation::ExhaustedRetries {
            last_candidate,
            attempts: self.max_attempts,
        })
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::MockUrlStore;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    /// استراتژی با کدهای از پیش تعیین شده، برای تست برخوردها
    #[derive(Debug)]
    pub(crate) struct ScriptedStrategy(Mutex<VecDeque<String>>);

    impl ScriptedStrategy {
        pub(crate) fn new(codes: &[&str]) -> Self {
            Self(Mutex::new(codes.iter().map(|c| c.to_string()).collect()))
        }
    }

    impl CodeStrategy for ScriptedStrategy {
        fn next_code(&self, _length: usize) -> String {
            self.0.lock().unwrap().pop_front().expect("script ran out of codes")
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[test]
    fn test_random_strategy_uses_alphabet() {
        let code = RandomStrategy.next_code(6);
        assert!(utils::is_short_code(&code, 6));
    }

    #[test]
    fn test_sequential_strategy_pads_to_length() {
        let strategy = SequentialStrategy::default();
        // صفر در هر ضریبی صفره
        assert_eq!(strategy.next_code(6), "000000");
        assert!(utils::is_short_code(&strategy.next_code(6), 6));
    }

    #[test]
    fn test_sequential_strategy_is_unique() {
        let strategy = SequentialStrategy::starting_at(1_000);
        let codes: HashSet<String> = (0..10_000).map(|_| strategy.next_code(6)).collect();
        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn test_sequential_strategy_wraps_within_code_space() {
        let strategy = SequentialStrategy::starting_at(u64::MAX - 2);
        for _ in 0..2 {
            assert!(utils::is_short_code(&strategy.next_code(4), 4));
        }
    }

    #[tokio::test]
    async fn test_allocate_returns_first_free_code() {
        let mut store = MockUrlStore::new();
        store
            .expect_exists()
            .times(3)
            .returning(|code| Ok(!code.starts_with("free")));

        let generator = CodeGenerator::new(
            Arc::new(ScriptedStrategy::new(&["taken1", "taken2", "free01"])),
            6,
            10,
        );

        let allocation = generator.allocate(&store).await.unwrap();
        assert_eq!(allocation, Allocation::Fresh("free01".to_string()));
    }

    #[tokio::test]
    async fn test_allocate_reports_exhaustion() {
        let mut store = MockUrlStore::new();
        store.expect_exists().times(10).returning(|_| Ok(true));

        let codes: Vec<String> = (0..10).map(|i| format!("busy{i:02}")).collect();
        let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
        let generator = CodeGenerator::new(Arc::new(ScriptedStrategy::new(&refs)), 6, 10);

        let allocation = generator.allocate(&store).await.unwrap();
        assert_eq!(
            allocation,
            Allocation::ExhaustedRetries {
                last_candidate: "busy09".to_string(),
                attempts: 10,
            }
        );
    }

    #[tokio::test]
    async fn test_allocate_propagates_store_errors() {
        let mut store = MockUrlStore::new();
        store.expect_exists().times(1).returning(|_| {
            Err(crate::error::AppError::StorageUnavailable("broken".to_string()))
        });

        let generator = CodeGenerator::new(Arc::new(RandomStrategy), 6, 10);
        assert!(generator.allocate(&store).await.is_err());
    }
}
