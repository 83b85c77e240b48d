use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 구조화된 로깅을 초기화합니다.
///
/// JSON lines on stdout, filtered by `RUST_LOG` (falls back to
/// `default_filter`). `log` records from actix and the request logger are
/// forwarded into the same subscriber.
pub fn init_telemetry(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    // A second call (e.g. from several integration tests) is a no-op.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init();
}
