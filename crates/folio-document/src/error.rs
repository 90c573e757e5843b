use folio_filter::FilterError;
use folio_objects::ObjectError;
use folio_types::TypeError;
use folio_xref::XrefError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// Mutation or save attempted on a finalized document.
    #[error("document is finalized and can no longer be modified; call reset() first")]
    NotModifiable,

    #[error("cannot save a document without pages: {hint}")]
    EmptyDocument { hint: &'static str },

    #[error("trailer has no /Root catalog reference")]
    MissingRoot,

    #[error("value under {0} is not an indirect dictionary")]
    NotIndirect(&'static str),

    #[error("page tree is malformed: {0}")]
    MalformedPageTree(String),

    #[error("document was not constructed with an output stream; use save_to() instead")]
    NoOutputStream,

    #[error("malformed file at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("unsupported input: {0}")]
    Unsupported(&'static str),

    #[error("prepare hook {hook} failed: {reason}")]
    Hook { hook: String, reason: String },

    #[error("encryption preparation failed: {0}")]
    Encryption(String),

    #[error("invalid save options: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Xref(#[from] XrefError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;
