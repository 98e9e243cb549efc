use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinguaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation provider error: {0}")]
    Provider(String),

    #[error("Translation provider is not initialized")]
    ProviderUnavailable,

    #[error("Network is offline")]
    Offline,

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LinguaError>;
