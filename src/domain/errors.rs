use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Access denied")]
    Forbidden,
    #[error("Cart is empty")]
    CartEmpty,
    /// A unique constraint rejected the write; callers may retry with fresh keys.
    #[error("Duplicate key")]
    DuplicateKey,
    #[error("Internal error: {0}")]
    Internal(String),
}
