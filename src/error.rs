use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error while opening file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Json error: {0}")]
    Json(#[from] json::Error),
    #[error("{key} has to be {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("Invalid {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}
