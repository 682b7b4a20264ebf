use thiserror::Error;

use crate::types::SourceNamespace;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("source not found: {namespace}/{source_id}")]
    SourceNotFound {
        source_id: String,
        namespace: SourceNamespace,
    },

    #[error("embedding failed: {0}")]
    Embed(String),

    #[error("chunk store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }

    pub fn embed(err: impl std::fmt::Display) -> Self {
        Self::Embed(err.to_string())
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
