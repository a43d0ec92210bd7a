use serde::Deserialize;
use serde::Serialize;

use crate::rates::cache::ExchangeRate;

/// An amount in the currency's smallest unit together with its fiat equivalents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MonetaryValue {
    pub value: i64,
    pub usd:   f64,
    pub eur:   f64,
}

impl MonetaryValue {
    pub fn convert(
        value: i64,
        unit_divisor: f64,
        rate: ExchangeRate,
    ) -> Self {
        let native = value as f64 / unit_divisor;
        Self {
            value,
            usd: native * rate.usd,
            eur: native * rate.eur,
        }
    }

    /// The untouched native-unit figure.
    pub fn native_equivalent(&self) -> i64 {
        self.value
    }
}
