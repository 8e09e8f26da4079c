use thiserror::Error;

/// Errors surfaced by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("document in collection '{collection}' does not match its schema: {source}")]
    Corrupt {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("documents and update payloads must be JSON objects")]
    NotAnObject,
}

pub type StoreResult<T> = Result<T, StoreError>;
