use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageRedisConfig {
    pub host:      String,
    pub port:      u16,
    pub pool_size: u32,
}

impl StorageRedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    // JSON snapshot loaded into the in-memory graph store
    pub snapshot_path: String,
}
