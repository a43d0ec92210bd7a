pub mod cache;
pub mod converter;

use async_trait::async_trait;
use tracing::info;
use tracing::warn;

pub use cache::ExchangeRate;
pub use cache::RateCache;
pub use cache::RateTable;
pub use converter::RateConverter;

use crate::error::TraceResult;

/// Backing store the rate cache is loaded from.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn load_rates(
        &self,
        currency: &str,
    ) -> TraceResult<Option<RateTable>>;
}

/// Load the current table of every currency into the cache. A currency whose table is missing
/// keeps whatever the cache held before. Returns the number of tables refreshed.
pub async fn refresh_rates(
    cache: &RateCache,
    source: &dyn RateSource,
    currencies: &[String],
) -> TraceResult<usize> {
    let mut refreshed = 0;
    for currency in currencies {
        match source.load_rates(currency).await? {
            Some(table) => {
                info!("exchange_rates_loaded::currency::{}::count::{}", currency, table.rates.len());
                cache.refresh(currency, table);
                refreshed += 1;
            },
            None => warn!("exchange_rates_missing::currency::{}", currency),
        }
    }
    Ok(refreshed)
}
