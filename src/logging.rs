use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the console subscriber. `RUST_LOG` overrides the default
/// `fbref_harvest=info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fbref_harvest=info"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
        .try_init();
}
