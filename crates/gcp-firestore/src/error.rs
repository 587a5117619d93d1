use gcp_transport::TransportError;

/// Codec failures. Always fatal to the enclosing document or query; no
/// partially-decoded record is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unrecognized wire value: {0}")]
    UnknownWireVariant(#[source] serde_json::Error),
    #[error("integerValue is not a decimal 64-bit integer: {0:?}")]
    InvalidInteger(String),
    #[error("timestampValue is not RFC 3339: {0:?}")]
    InvalidTimestamp(String),
    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FirestoreError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type FirestoreResult<T> = Result<T, FirestoreError>;
