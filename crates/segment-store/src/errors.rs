use thiserror::Error;

use adweave_core_types::WeaveError;

#[derive(Clone, Debug, Error)]
pub enum StoreErrKind {
    #[error("io failure: {0}")]
    IoFailed(String),
    #[error("serialize failure: {0}")]
    SerializeFailed(String),
}

#[derive(Clone, Debug, Error)]
#[error(transparent)]
pub struct StoreError(pub StoreErrKind);

impl StoreError {
    pub fn new(kind: StoreErrKind) -> Self {
        Self(kind)
    }

    pub fn kind(&self) -> &StoreErrKind {
        &self.0
    }
}

impl From<StoreErrKind> for StoreError {
    fn from(kind: StoreErrKind) -> Self {
        StoreError(kind)
    }
}

impl From<StoreError> for WeaveError {
    fn from(value: StoreError) -> Self {
        WeaveError::new(value.to_string())
    }
}
