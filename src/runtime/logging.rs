use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global fmt subscriber. `RUST_LOG` wins over `logging.filter`.
pub fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
