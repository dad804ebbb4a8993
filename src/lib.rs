pub mod config;
pub mod models;
pub mod pipeline;
pub mod pipeline_config;

pub use pipeline::{BatchOutcome, CancellationRegistry, DocumentError, DocumentProcessor, PipelineError};
pub use pipeline_config::{ConfigError, PipelineConfig};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG`, otherwise uses [`config::default_log_filter`]. Safe to
/// call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
