//! Error taxonomy for the stream contract
//!
//! Connectivity failures are retried by the consumer loop; decode failures
//! skip the record but advance the cursor; publish failures surface to the
//! caller, which decides whether to retry; configuration failures are
//! reported before any loop starts.

use thiserror::Error;

/// Store-side failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unreachable: {reason}")]
    Unavailable { reason: String },

    #[error("Store closed")]
    Closed,
}

/// Envelope encoding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Payload serialization failed: {reason}")]
    Serialization { reason: String },
}

/// Envelope decoding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Record has no '{field}' field")]
    MissingData { field: &'static str },

    #[error("Malformed envelope: {reason}")]
    Malformed { reason: String },
}

/// Publish failures — the append either fully succeeded or nothing was written
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Top-level stream error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] StoreError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::MissingData { field: "data" };
        assert_eq!(err.to_string(), "Record has no 'data' field");
    }

    #[test]
    fn test_stream_error_from_store_error() {
        let store_err = StoreError::Unavailable {
            reason: "connection refused".to_string(),
        };
        let err: StreamError = store_err.into();
        assert!(matches!(err, StreamError::Connectivity(_)));
    }

    #[test]
    fn test_publish_error_from_encode_error() {
        let encode_err = EncodeError::Serialization {
            reason: "bad payload".to_string(),
        };
        let err: PublishError = encode_err.into();
        assert!(matches!(err, PublishError::Encode(_)));
    }
}
