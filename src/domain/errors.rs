use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Stored order is corrupt: {0}")]
    Corrupt(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
