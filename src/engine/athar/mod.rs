pub mod args;
pub mod task;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;

pub use args::SearchArgs;

use crate::Result;
use crate::config::Config;
use crate::config::load_config;
use crate::err_with_loc;
use crate::error::EngineError;
use crate::error::TraceError;
use crate::rates::RateCache;
use crate::rates::RateConverter;
use crate::rates::refresh_rates;
use crate::search::SearchDocument;
use crate::search::SearchRequest;
use crate::search::Traversal;
use crate::search::assemble;
use crate::storage::in_memory::InMemoryGraphStore;
use crate::storage::redis::TraceKv;
use crate::storage::redis::make_redis_client;
use crate::tracing::setup_tracing;

pub const ENGINE_NAME: &str = "athar";

#[derive(Clone)]
pub struct Athar {
    pub config:    Config,
    pub cache:     Arc<RateCache>,
    pub kv:        Arc<TraceKv>,
    pub traversal: Arc<Traversal>,
}

impl Athar {
    pub async fn run(args: SearchArgs) -> Result<()> {
        dotenvy::dotenv().ok();

        let config = load_config(&args.config)?;
        let _tracing_guards = setup_tracing(ENGINE_NAME, &config.logging)?;
        info!("Starting Athar (أثر): The Tracer");

        let request = args.to_request(&config.tracer).map_err(|e| err_with_loc!(EngineError::SearchError(e)))?;

        debug!("initializing_redis_client");
        let kv = Arc::new(make_redis_client(ENGINE_NAME, &config.storage_redis).await?);

        let cache = Arc::new(RateCache::new());
        if config.rates.dummy_rates {
            info!("exchange_rates::dummy_rates::skipping_initial_load");
        } else {
            let loaded = refresh_rates(&cache, kv.as_ref(), &config.rates.currency_names())
                .await
                .map_err(|e| err_with_loc!(EngineError::SearchError(e)))?;
            info!("exchange_rates::initial_load::currencies::{}", loaded);
        }
        let converter = Arc::new(RateConverter::new(cache.clone(), &config.rates));

        let graph = Arc::new(InMemoryGraphStore::load_snapshot(&config.graph.snapshot_path)?);
        let traversal = Arc::new(Traversal::new(graph, kv.clone(), converter, config.tracer.clone()));

        let athar = Athar {
            config,
            cache,
            kv,
            traversal,
        };

        let cancellation_token = CancellationToken::new();
        let rate_refresher_handle = athar.spawn_rate_refresher(cancellation_token.clone());

        let document = athar.search(&request, args.timeout_secs, cancellation_token.clone()).await;

        cancellation_token.cancel();
        if let Some(handle) = rate_refresher_handle {
            if let Err(e) = handle.await {
                error!("rate_refresher::join_failed::{}", e);
            }
        }

        let document = document?;
        let json = serde_json::to_string_pretty(&document).map_err(|e| err_with_loc!(e))?;
        println!("{}", json);
        Ok(())
    }

    /// Run one search, cancelling it on Ctrl-C or after `timeout_secs`.
    pub async fn search(
        &self,
        request: &SearchRequest,
        timeout_secs: Option<u64>,
        cancellation_token: CancellationToken,
    ) -> Result<SearchDocument> {
        let search_token = cancellation_token.child_token();
        let timeout = async {
            match timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        let forest = tokio::select! {
            result = self.traversal.search(request, &search_token) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("search::received_ctrl_c::cancelling");
                search_token.cancel();
                Err(TraceError::Cancelled)
            },
            _ = timeout => {
                info!("search::timed_out::cancelling");
                search_token.cancel();
                Err(TraceError::Cancelled)
            },
        };

        match forest {
            Ok(forest) => Ok(assemble(&forest)),
            Err(e) => {
                error!("search_failed::{}", e);
                Err(err_with_loc!(EngineError::SearchError(e)))
            },
        }
    }
}
