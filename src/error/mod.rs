pub mod config;
pub mod engine;
pub mod redis;
pub mod trace;

pub use anyhow::anyhow;
pub use anyhow::Context;
pub use anyhow::Error;
pub use anyhow::Result;
pub use config::ConfigError;
pub use engine::EngineError;
pub use redis::RedisClientError;
pub use trace::TraceError;
pub use trace::TraceResult;

// For consistent error handling with location info
#[macro_export]
macro_rules! err_with_loc {
    ($err:expr) => {
        anyhow::anyhow!($err).context(format!("at {}:{}", file!(), line!()))
    };
}
