use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot is missing the `{0}` collection")]
    MissingCollection(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
