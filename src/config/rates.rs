use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_RATE_REFRESH_INTERVAL_SECS;
use crate::constants::SATOSHI_UNIT_DIVISOR;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    // Development only: convert every height at a fixed rate
    #[serde(default)]
    pub dummy_rates:           bool,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    pub currencies:            HashMap<String, CurrencyConfig>,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_RATE_REFRESH_INTERVAL_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_unit_divisor")]
    pub unit_divisor: u64,
}

fn default_unit_divisor() -> u64 {
    SATOSHI_UNIT_DIVISOR
}

impl RatesConfig {
    /// Configured currencies in a stable order.
    pub fn currency_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.currencies.keys().cloned().collect();
        names.sort();
        names
    }
}
