use folio_schema::Kind;
use folio_types::{ObjectId, TypeError};

/// Errors from element store access, writing, and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// A stored value does not have the type an accessor demands.
    #[error("type mismatch for {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A reference was dereferenced but its target is not in the table.
    #[error("dangling reference to object {0}")]
    DanglingReference(ObjectId),

    /// A value cannot be promoted to the requested kind.
    #[error("cannot specialize {found} under {key} to {kind}")]
    IncompatibleKind {
        key: String,
        kind: Kind,
        found: &'static str,
    },

    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("parse error at byte {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for object operations.
pub type ObjectResult<T> = Result<T, ObjectError>;
