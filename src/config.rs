use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Folio";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "folio=debug"
    } else {
        "folio=info"
    }
}

/// Get the application data directory
/// ~/Folio/ on all platforms, falling back to the working directory when no
/// home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default destination for per-document analysis reports.
pub fn default_reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}
