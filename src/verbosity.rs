// Verbosity levels (0=quiet, 1=basic, 2=full) mapped onto tracing filters
use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity level
pub fn filter_for_level(level: u8) -> &'static str {
    match level {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(level: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for_level(level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(level >= 2)
        .try_init();

    if level > 0 {
        tracing::info!("📢 Verbosity level: {} (0=quiet, 1=basic, 2=full)", level);
    }
}
