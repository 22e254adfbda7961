//! Structured logging

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Build the log filter from the configured level, falling back to `info`
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize JSON tracing output
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_tracing(config: &Config) -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(&config.service.log_level))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            environment = %config.service.environment,
            "Tracing initialized for service: {}",
            config.service.name
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        let config = Config::default();
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let filter = env_filter("deepdev_api=loud");
        assert_eq!(filter.to_string(), "info");
    }
}
