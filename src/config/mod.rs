pub mod log;
pub mod rates;
pub mod storage;
pub mod tracer;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use toml;

pub use log::LoggingConfig;
pub use rates::CurrencyConfig;
pub use rates::RatesConfig;
pub use storage::GraphConfig;
pub use storage::StorageRedisConfig;
pub use tracer::TracerConfig;

use crate::err_with_loc;
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage_redis: StorageRedisConfig,
    pub graph:         GraphConfig,
    pub rates:         RatesConfig,
    #[serde(default)]
    pub tracer:        TracerConfig,
    #[serde(default)]
    pub logging:       LoggingConfig,
}

impl Config {
    pub fn from_toml_str(config_str: &str) -> crate::Result<Self> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| err_with_loc!(ConfigError::ParseError(e.to_string())))?;
        config.tracer.validate().map_err(|e| err_with_loc!(e))?;
        Ok(config)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> crate::Result<Config> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| err_with_loc!(ConfigError::OpenFileError(format!("{}: {}", path.display(), e))))?;
    Config::from_toml_str(&config_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [storage_redis]
        host = "127.0.0.1"
        port = 6379
        pool_size = 8

        [graph]
        snapshot_path = "graph.json"

        [rates]
        dummy_rates = true

        [rates.currencies.btc]
        [rates.currencies.eth]
        unit_divisor = 1000000000000000000

        [tracer]
        max_depth = 5
        max_entity_addresses = 100
    "#;

    #[test]
    fn test_parse_sample_config() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.storage_redis.url(), "redis://127.0.0.1:6379");
        assert_eq!(config.tracer.max_depth, 5);
        assert_eq!(config.tracer.default_breadth, 16);
        assert_eq!(config.tracer.max_entity_addresses, Some(100));
        assert_eq!(config.rates.currencies["btc"].unit_divisor, 100_000_000);
        assert_eq!(config.rates.currencies["eth"].unit_divisor, 1_000_000_000_000_000_000);
        assert_eq!(config.rates.currency_names(), vec!["btc".to_string(), "eth".to_string()]);
        assert_eq!(config.logging.directory.as_deref(), Some(".logs"));
    }

    #[test]
    fn test_depth_above_hard_limit_is_rejected() {
        let config = SAMPLE.replace("max_depth = 5", "max_depth = 8");
        let err = Config::from_toml_str(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("exceeds the hard limit"));
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        for key in ["max_concurrent_requests", "relation_page_size", "max_relations_scan"] {
            let config = SAMPLE.replace("max_depth = 5", &format!("max_depth = 5\n        {} = 0", key));
            let err = Config::from_toml_str(&config).unwrap_err();
            assert!(format!("{:#}", err).contains(&format!("{} must be positive", key)), "{}", key);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/definitely/not/here/Config.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to open config file"));
    }
}
