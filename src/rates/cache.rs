use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub usd: f64,
    pub eur: f64,
}

/// All known exchange rates of one currency keyed by block height.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RateTable {
    pub last_height: u64,
    pub rates:       BTreeMap<u64, ExchangeRate>,
}

impl RateTable {
    pub fn new(last_height: u64) -> Self {
        Self {
            last_height,
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(
        mut self,
        height: u64,
        rate: ExchangeRate,
    ) -> Self {
        self.rates.insert(height, rate);
        self
    }

    pub fn get(
        &self,
        height: u64,
    ) -> Option<ExchangeRate> {
        self.rates.get(&height).copied()
    }
}

/// Shared cache of rate tables. Readers take a snapshot `Arc` of a whole currency table, and
/// `refresh` replaces that `Arc` in one write, so a reader never observes a partially loaded
/// table.
#[derive(Debug, Default)]
pub struct RateCache {
    tables: RwLock<HashMap<String, Arc<RateTable>>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(
        &self,
        currency: &str,
        table: RateTable,
    ) {
        let heights = table.rates.len();
        let last_height = table.last_height;
        let mut tables = self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        tables.insert(currency.to_string(), Arc::new(table));
        debug!("rate_table_refreshed::currency::{}::heights::{}::last_height::{}", currency, heights, last_height);
    }

    pub fn table(
        &self,
        currency: &str,
    ) -> Option<Arc<RateTable>> {
        let tables = self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        tables.get(currency).cloned()
    }

    pub fn rates_at(
        &self,
        currency: &str,
        height: u64,
    ) -> Option<ExchangeRate> {
        self.table(currency).and_then(|table| table.get(height))
    }

    pub fn last_height(
        &self,
        currency: &str,
    ) -> Option<u64> {
        self.table(currency).map(|table| table.last_height)
    }
}
