use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes compact console logging.
///
/// The filter comes from `RUST_LOG` when set, otherwise from the passed
/// default level scoped to this crate. Safe to call more than once; later
/// calls are no-ops, so tests can initialize freely.
pub fn init(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), log_level)));

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
