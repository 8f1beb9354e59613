use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid CardId: {0}")]
    InvalidCardId(String),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),
}
