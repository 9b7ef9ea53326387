use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate field id in catalog: {0}")]
    DuplicateFieldId(String),
    #[error("field id must not be empty")]
    EmptyFieldId,
    #[error("unknown field category: {0}")]
    UnknownCategory(String),
    #[error("unknown invoice direction: {0}")]
    UnknownDirection(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
