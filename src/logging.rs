use tracing::{debug, info, warn, error};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use crate::error::SimError;
use crate::performance::PerformanceReport;
use crate::types::Fill;

/// Initialize the logging system with appropriate filters and formatting
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    // Respect RUST_LOG, default to "info"
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    install(env_filter)
}

/// Initialize logging with an explicit level, e.g. from the config file
pub fn init_logging_with_level(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(level)?;
    install(env_filter)
}

fn install(env_filter: EnvFilter) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact()
        )
        .try_init()?;

    info!("Logging system initialized");
    Ok(())
}

/// Initialize logging with custom configuration for testing
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

/// Log a simulator error with appropriate severity level
pub fn log_sim_error(error: &SimError, context: Option<&str>) {
    let level = error.severity().to_tracing_level();
    let message = if let Some(ctx) = context {
        format!("{}: {}", ctx, error)
    } else {
        error.to_string()
    };

    match level {
        tracing::Level::INFO => info!("{}", message),
        tracing::Level::WARN => warn!("{}", message),
        _ => error!("{}", message),
    }
}

/// Log a fill against a strategy's quote
pub fn log_fill(strategy: &str, fill: &Fill) {
    debug!(
        strategy = strategy,
        step = fill.step,
        side = fill.side.as_str(),
        price = fill.price,
        "Quote filled"
    );
}

/// Log system startup information
pub fn log_startup(component: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            component = component,
            details = details,
            "Component started"
        );
    } else {
        info!(
            component = component,
            "Component started"
        );
    }
}

/// Log the end-of-run statistics for one strategy
pub fn log_run_summary(strategy: &str, fills: usize, report: &PerformanceReport) {
    info!(
        strategy = strategy,
        fills = fills,
        realized = report.realized,
        unrealized = report.unrealized,
        total_pnl = report.total(),
        sharpe = report.sharpe,
        sortino = report.sortino,
        max_drawdown = report.max_drawdown,
        "Strategy run complete"
    );
}
