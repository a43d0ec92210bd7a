use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::Athar;
use crate::rates::refresh_rates;

impl Athar {
    /// Periodically reload every configured currency's rate table. Nothing is spawned with
    /// dummy rates or a zero interval.
    pub fn spawn_rate_refresher(
        &self,
        cancellation_token: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let interval_secs = self.config.rates.refresh_interval_secs;
        if self.config.rates.dummy_rates || interval_secs == 0 {
            debug!("rate_refresher::disabled");
            return None;
        }

        let cache = self.cache.clone();
        let kv = self.kv.clone();
        let currencies = self.config.rates.currency_names();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            // the first tick completes immediately and the initial load already ran
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match refresh_rates(&cache, kv.as_ref(), &currencies).await {
                            Ok(refreshed) => info!("rate_refresher::refreshed::currencies::{}", refreshed),
                            Err(e) => error!("rate_refresher::failed::{}", e),
                        }
                    },
                    _ = cancellation_token.cancelled() => {
                        debug!("rate_refresher::cancellation_received::ending_task");
                        break;
                    }
                }
            }
        }))
    }
}
