pub mod kv;

use std::sync::Arc;

use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use tracing::info;

use crate::config::StorageRedisConfig;
use crate::err_with_loc;
use crate::error::RedisClientError;

pub use kv::TraceKv;

pub type RedisPool = Arc<Pool<RedisConnectionManager>>;

pub async fn make_redis_client(
  engine_name: &str,
  config: &StorageRedisConfig,
) -> crate::Result<TraceKv> {
  let redis_url = config.url();
  let manager = RedisConnectionManager::new(redis_url.as_str())
    .map_err(|e| err_with_loc!(RedisClientError::CreateConnectionManagerError(e)))?;
  let pool = Pool::builder()
    .max_size(config.pool_size)
    .build(manager)
    .await
    .map_err(|e| err_with_loc!(RedisClientError::CreateConnectionManagerError(e)))?;
  info!("{}::redis_client::connection_established::{}", engine_name, redis_url);
  Ok(TraceKv::new(Arc::new(pool)))
}
