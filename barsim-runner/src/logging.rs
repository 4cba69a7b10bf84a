use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise default `Barsim` logging.
///
/// Level defaults to `info` and can be overridden with `RUST_LOG`. Calling
/// this more than once is harmless: only the first subscriber is installed.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
