//! Logging initialization

use crate::config::EngineConfig;

/// Initialize `env_logger` with `level` as the default filter
///
/// `RUST_LOG` still overrides the default. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Initialize logging from the engine configuration, falling back to `info`
pub fn init_from_config(config: &EngineConfig) {
    let level = config.level_filter().unwrap_or(log::LevelFilter::Info);
    init(level);
    log::debug!("Logging initialized at {}", level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(log::LevelFilter::Debug);
        init_from_config(&EngineConfig::default().with_log_level("trace"));
        log::info!("still logging");
    }
}
