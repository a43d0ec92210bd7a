use async_trait::async_trait;
use bb8::PooledConnection;
use bb8_redis::RedisConnectionManager;
use bb8_redis::redis;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::Result;
use crate::constants::LABELS_KEY_PREFIX;
use crate::constants::RATES_KEY_PREFIX;
use crate::err_with_loc;
use crate::error::RedisClientError;
use crate::error::TraceError;
use crate::error::TraceResult;
use crate::model::Label;
use crate::model::NodeId;
use crate::rates::RateSource;
use crate::rates::RateTable;
use crate::storage::LabelStore;
use crate::storage::redis::RedisPool;

pub fn rates_key(currency: &str) -> String { format!("{}:{}", RATES_KEY_PREFIX, currency) }

pub fn labels_key(
  currency: &str,
  id: &NodeId,
) -> String {
  format!("{}:{}:{}:{}", LABELS_KEY_PREFIX, currency, id.node_type(), id.id_string())
}

/// JSON values in Redis: rate tables per currency and label lists per node.
#[derive(Debug, Clone)]
pub struct TraceKv {
  pub pool: RedisPool,
}

impl TraceKv {
  pub fn new(pool: RedisPool) -> Self { Self { pool } }

  pub async fn get_connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
    self.pool.get().await.map_err(|e| {
      error!("failed_to_get_redis_connection: {}", e);
      err_with_loc!(RedisClientError::GetConnectionError(e))
    })
  }

  pub async fn get<T: DeserializeOwned + Send>(
    &self,
    key: &str,
  ) -> Result<Option<T>> {
    let mut conn = self.get_connection().await?;

    let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await.map_err(|e| {
      error!("redis_get_failed: {}", e);
      err_with_loc!(RedisClientError::RedisError(e))
    })?;

    match value {
      Some(json) => {
        serde_json::from_str::<T>(&json)
          .map_err(|e| {
            error!("redis_deserialize_failed::{}: {}", key, e);
            err_with_loc!(RedisClientError::DeserializeError(e))
          })
          .map(Some)
      },
      None => Ok(None),
    }
  }
}

fn unavailable(e: crate::error::Error) -> TraceError { TraceError::StoreUnavailable(format!("{:#}", e)) }

#[async_trait]
impl RateSource for TraceKv {
  async fn load_rates(
    &self,
    currency: &str,
  ) -> TraceResult<Option<RateTable>> {
    self.get::<RateTable>(&rates_key(currency)).await.map_err(unavailable)
  }
}

#[async_trait]
impl LabelStore for TraceKv {
  async fn labels_for(
    &self,
    currency: &str,
    id: &NodeId,
  ) -> TraceResult<Vec<Label>> {
    let labels = self.get::<Vec<Label>>(&labels_key(currency, id)).await.map_err(unavailable)?;
    Ok(labels.unwrap_or_default())
  }
}
