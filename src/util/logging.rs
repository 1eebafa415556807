use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence; the
/// fallback keeps this binary and the HTTP trace layer at info while
/// silencing dependency chatter.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("careline=info,tower_http=info"));

    fmt().with_env_filter(env_filter).with_target(false).init();
}
