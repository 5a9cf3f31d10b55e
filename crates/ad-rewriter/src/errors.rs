use thiserror::Error;

/// Failures on the rewrite path. None of these propagate to the host; they
/// exist so the apply adapter can log and count what it absorbed.
#[derive(Clone, Debug, Error)]
pub enum RewriteError {
    #[error("serialize failure: {0}")]
    Serialize(String),
    #[error("dom access failure: {0}")]
    Dom(String),
}
