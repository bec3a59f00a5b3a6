//! Logger setup on top of `env_logger`.

use log::{LevelFilter, SetLoggerError};

/// Initialize the global logger.
///
/// `RUST_LOG` is honored when no explicit level is given; otherwise only
/// warnings are shown. An explicit `level` wins over `RUST_LOG`.
pub fn init(level: Option<LevelFilter>) -> Result<(), SetLoggerError> {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);

    if let Some(level) = level {
        builder.filter_level(level);
    }
    // ureq logs every connection at debug; only keep its complaints.
    builder.filter_module("ureq", LevelFilter::Warn);
    builder.filter_module("rustls", LevelFilter::Warn);
    builder.format_timestamp_millis();

    builder.try_init()
}
