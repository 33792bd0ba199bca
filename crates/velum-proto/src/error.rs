//! Model errors.

use thiserror::Error;

/// Error produced when constructing model values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("empty domain name")]
    EmptyName,

    #[error("empty label in domain name")]
    EmptyLabel,

    #[error("label exceeds 63 octets: {0}")]
    LabelTooLong(String),

    #[error("domain name exceeds 253 octets ({0})")]
    NameTooLong(usize),

    #[error("invalid character in domain name: {0:?}")]
    InvalidCharacter(char),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;
