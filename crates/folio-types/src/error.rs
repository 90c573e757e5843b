use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed object identity: number {0} is below the minimum of 1")]
    MalformedIdentity(u32),

    #[error("invalid name {0:?}: names must start with '/'")]
    InvalidName(String),

    #[error("invalid date string: {0}")]
    InvalidDate(String),

    #[error("invalid rectangle: expected 4 numbers, got {0}")]
    InvalidRectangle(usize),

    #[error("invalid matrix: expected 6 numbers, got {0}")]
    InvalidMatrix(usize),
}
