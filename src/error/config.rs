use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    OpenFileError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Invalid tracer settings: {0}")]
    InvalidTracer(String),

    #[error("Unknown currency in config: {0}")]
    UnknownCurrency(String),
}
