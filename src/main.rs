//! # URL Shortener - نقطه ورود برنامه
//!
//! ## مفاهیم Rust در این فایل:
//! - `async fn main()`: تابع اصلی غیرهمزمان با tokio
//! - `?` operator: انتشار خطا به بالا

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use url_shortener::{
    api::create_router,
    config::{Config, Environment},
    database::Database,
    error::{AppError, Result},
    services::AppState,
};

/// نقطه ورود اصلی برنامه
///
/// # Errors
/// خطا برمیگردونه اگه:
/// - تنظیمات معتبر نباشن
/// - دیتابیس متصل نشه یا schema ساخته نشه
/// - سرور استارت نشه
#[tokio::main]
async fn main() -> Result<()> {
    // اگه فایل .env نباشه اوکیه
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.environment);

    info!(environment = ?config.environment, "🚀 Starting URL Shortener Service...");

    let database = Database::connect(&config.database_url).await?;
    info!("✅ Database connected successfully");

    let addr = config.server_addr();
    let state = AppState::build(database, config).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("🌐 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("👋 Server stopped");
    Ok(())
}

/// راه‌اندازی سیستم tracing برای لاگینگ
///
/// # مفاهیم:
/// - EnvFilter: فیلتر از `RUST_LOG`، وگرنه پیش‌فرض
/// - در production خروجی JSON، بقیه جاها فرمت خوانا
fn init_tracing(environment: Environment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("url_shortener=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if environment.is_production() {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .init();
    }
}

/// صبر برای Ctrl+C
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
