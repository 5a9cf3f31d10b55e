use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum BridgeError {
    #[error("channel closed")]
    Closed,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("internal error: {0}")]
    Internal(String),
}
