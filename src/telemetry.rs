use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

/// Initialize tracing-subscriber with a console layer writing to stderr.
///
/// stdout is reserved for command output (and the serve loop's responses), so
/// all diagnostics go to stderr. The filter is taken from `RUST_LOG`.
pub fn init_tracing_subscriber() {
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(console_layer)
        .init();
}
