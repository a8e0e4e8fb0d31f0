//! Network errors

use thiserror::Error;

/// Failure reported by a connector for one subscription
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("connection closed ({code}): {reason}")]
    Closed { code: u16, reason: String },

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Failure while preparing a multipart upload
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to serialize operations: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("variables must be an object")]
    VariablesNotObject,
}
