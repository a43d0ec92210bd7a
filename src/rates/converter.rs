use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::cache::ExchangeRate;
use super::cache::RateCache;
use crate::config::RatesConfig;
use crate::constants::DUMMY_EXCHANGE_RATE;
use crate::error::TraceError;
use crate::error::TraceResult;
use crate::model::MonetaryValue;

/// Converts native amounts into fiat using the rates cached for a block height.
#[derive(Debug, Clone)]
pub struct RateConverter {
    cache:         Arc<RateCache>,
    unit_divisors: HashMap<String, f64>,
    dummy_rates:   bool,
}

impl RateConverter {
    pub fn new(
        cache: Arc<RateCache>,
        config: &RatesConfig,
    ) -> Self {
        let unit_divisors = config
            .currencies
            .iter()
            .map(|(currency, settings)| (currency.clone(), settings.unit_divisor as f64))
            .collect();
        if config.dummy_rates {
            warn!("dummy_exchange_rates_enabled::not_for_production");
        }
        Self {
            cache,
            unit_divisors,
            dummy_rates: config.dummy_rates,
        }
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    pub fn supports(
        &self,
        currency: &str,
    ) -> bool {
        self.unit_divisors.contains_key(currency)
    }

    pub fn convert(
        &self,
        currency: &str,
        amount: i64,
        height: u64,
    ) -> TraceResult<MonetaryValue> {
        let unavailable = || TraceError::RatesUnavailable {
            currency: currency.to_string(),
            height,
        };
        let unit_divisor = *self.unit_divisors.get(currency).ok_or_else(unavailable)?;
        let rate = if self.dummy_rates {
            ExchangeRate {
                usd: DUMMY_EXCHANGE_RATE,
                eur: DUMMY_EXCHANGE_RATE,
            }
        } else {
            self.cache.rates_at(currency, height).ok_or_else(unavailable)?
        };
        Ok(MonetaryValue::convert(amount, unit_divisor, rate))
    }

    /// Convert at the most recent height known for `currency`.
    pub fn convert_latest(
        &self,
        currency: &str,
        amount: i64,
    ) -> TraceResult<MonetaryValue> {
        match self.cache.last_height(currency) {
            Some(height) => self.convert(currency, amount, height),
            None if self.dummy_rates => self.convert(currency, amount, 0),
            None => Err(TraceError::RatesUnavailable {
                currency: currency.to_string(),
                height: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::CurrencyConfig;
    use crate::rates::cache::RateTable;

    const EPSILON: f64 = 1e-9;

    fn rates_config(dummy_rates: bool) -> RatesConfig {
        let mut currencies = HashMap::new();
        currencies.insert("btc".to_string(), CurrencyConfig {
            unit_divisor: 100_000_000,
        });
        RatesConfig {
            dummy_rates,
            refresh_interval_secs: 0,
            currencies,
        }
    }

    fn converter(dummy_rates: bool) -> RateConverter {
        let cache = Arc::new(RateCache::new());
        cache.refresh(
            "btc",
            RateTable::new(20)
                .with_rate(10, ExchangeRate { usd: 20_000.0, eur: 18_000.0 })
                .with_rate(20, ExchangeRate { usd: 30_000.0, eur: 27_500.5 }),
        );
        RateConverter::new(cache, &rates_config(dummy_rates))
    }

    #[rstest]
    #[case(100_000_000, 10, 20_000.0, 18_000.0)]
    #[case(50_000_000, 10, 10_000.0, 9_000.0)]
    #[case(1, 20, 0.0003, 0.000275005)]
    #[case(0, 20, 0.0, 0.0)]
    #[case(-200_000_000, 20, -60_000.0, -55_001.0)]
    fn test_convert_at_height(
        #[case] amount: i64,
        #[case] height: u64,
        #[case] usd: f64,
        #[case] eur: f64,
    ) {
        let value = converter(false).convert("btc", amount, height).unwrap();
        assert_eq!(value.native_equivalent(), amount);
        assert!((value.usd - usd).abs() < EPSILON, "usd {} != {}", value.usd, usd);
        assert!((value.eur - eur).abs() < EPSILON, "eur {} != {}", value.eur, eur);
    }

    #[test]
    fn test_missing_height_is_rates_unavailable() {
        let err = converter(false).convert("btc", 1, 11).unwrap_err();
        assert_eq!(err, TraceError::RatesUnavailable {
            currency: "btc".to_string(),
            height: 11
        });
        assert!(matches!(
            converter(false).convert("doge", 1, 10),
            Err(TraceError::RatesUnavailable { .. })
        ));
    }

    #[test]
    fn test_convert_latest_uses_last_height() {
        let value = converter(false).convert_latest("btc", 100_000_000).unwrap();
        assert!((value.usd - 30_000.0).abs() < EPSILON);
    }

    #[test]
    fn test_dummy_rates_cover_every_height() {
        let value = converter(true).convert("btc", 200_000_000, 999).unwrap();
        assert!((value.usd - 1.0).abs() < EPSILON);
        assert!((value.eur - 1.0).abs() < EPSILON);
        assert_eq!(value.value, 200_000_000);
    }
}
