use folio_objects::ObjectError;
use folio_types::{ObjectId, TypeError};

#[derive(Debug, thiserror::Error)]
pub enum XrefError {
    /// A newly constructed object claims an identity that is already live.
    #[error("object {0} is already registered")]
    DuplicateRegistration(ObjectId),

    #[error("object {0} not found")]
    NotFound(ObjectId),

    /// Only arrays and dictionaries carry an identity of their own.
    #[error("cannot register a {0} as an indirect object")]
    NotComposite(&'static str),

    #[error("object {id} is a {found}, expected a dictionary")]
    NotDictionary { id: ObjectId, found: &'static str },

    #[error("object number space exhausted")]
    IdentitySpaceExhausted,

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

pub type XrefResult<T> = Result<T, XrefError>;
