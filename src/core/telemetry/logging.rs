use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    init_logging_with_default("info");
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `default_directive`.
pub fn init_logging_with_default(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt().with_env_filter(env_filter).with_target(true).try_init();
}
