//! # ماشین حالت بازیابی (Self-Heal)
//!
//! ```text
//! Healthy ──schema error──> Degraded ──> Reinitializing ──retry ok──> Healthy
//!                                              └──init/retry fails──> Fatal
//! Fatal ──next successful operation──> Healthy
//! ```
//!
//! هر عملیات حداکثر یک بار از این چرخه رد میشه؛ حلقه بی‌نهایت نداریم.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{info, warn};

/// وضعیت فعلی ذخیره‌ساز
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StoreHealth {
    /// همه چیز عادیه
    Healthy = 0,

    /// یه عملیات با خطای schema برخورد کرد
    Degraded = 1,

    /// در حال ساخت دوباره schema
    Reinitializing = 2,

    /// بازیابی شکست خورد؛ عملیات بعدی دوباره تلاش میکنه
    Fatal = 3,
}

impl StoreHealth {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Healthy,
            1 => Self::Degraded,
            2 => Self::Reinitializing,
            _ => Self::Fatal,
        }
    }
}

impl std::fmt::Display for StoreHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Reinitializing => "reinitializing",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// نگهدارنده thread-safe وضعیت
///
/// # مفاهیم:
/// - `AtomicU8`: بدون قفل بین همه clone‌های `Database` share میشه
#[derive(Debug)]
pub struct HealthCell(AtomicU8);

impl Default for HealthCell {
    fn default() -> Self {
        Self(AtomicU8::new(StoreHealth::Healthy as u8))
    }
}

impl HealthCell {
    /// وضعیت فعلی
    #[must_use]
    pub fn get(&self) -> StoreHealth {
        StoreHealth::from_u8(self.0.load(Ordering::Acquire))
    }

    /// رفتن به وضعیت جدید؛ وضعیت قبلی رو برمیگردونه
    pub fn transition(&self, to: StoreHealth) -> StoreHealth {
        let from = StoreHealth::from_u8(self.0.swap(to as u8, Ordering::AcqRel));

        if from != to {
            match to {
                StoreHealth::Healthy => info!(%from, %to, "Store health changed"),
                _ => warn!(%from, %to, "Store health changed"),
            }
        }

        from
    }

    /// بعد از یه عملیات موفق صدا زده میشه
    ///
    /// فقط از `Fatal` به `Healthy` برمیگرده؛ وضعیت‌های میانی
    /// مال یه بازیابی در جریان هستن و دستشون نمیزنیم.
    pub fn record_success(&self) {
        let fatal = StoreHealth::Fatal as u8;
        let healthy = StoreHealth::Healthy as u8;

        if self
            .0
            .compare_exchange(fatal, healthy, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            info!("Store recovered from fatal state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_healthy() {
        assert_eq!(HealthCell::default().get(), StoreHealth::Healthy);
    }

    #[test]
    fn test_transition_returns_previous_state() {
        let cell = HealthCell::default();

        assert_eq!(cell.transition(StoreHealth::Degraded), StoreHealth::Healthy);
        assert_eq!(cell.transition(StoreHealth::Reinitializing), StoreHealth::Degraded);
        assert_eq!(cell.get(), StoreHealth::Reinitializing);
    }

    #[test]
    fn test_success_only_clears_fatal() {
        let cell = HealthCell::default();

        cell.transition(StoreHealth::Reinitializing);
        cell.record_success();
        assert_eq!(cell.get(), StoreHealth::Reinitializing);

        cell.transition(StoreHealth::Fatal);
        cell.record_success();
        assert_eq!(cell.get(), StoreHealth::Healthy);
    }

    #[test]
    fn test_display() {
        assert_eq!(StoreHealth::Fatal.to_string(), "fatal");
        assert_eq!(StoreHealth::Healthy.to_string(), "healthy");
    }
}
