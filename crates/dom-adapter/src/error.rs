use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum DomError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
