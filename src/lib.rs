pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod model;
pub mod rates;
pub mod search;
pub mod storage;
pub mod tracing;


pub use error::Result;
