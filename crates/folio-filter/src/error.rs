use folio_objects::ObjectError;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// No codec is registered under this name, or the codec is registered
    /// but the parameters ask for a variant it does not implement.
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    #[error("dictionary has no stream payload")]
    NoStream,

    #[error("malformed /Filter entry: found {0}")]
    MalformedFilterEntry(&'static str),

    #[error(transparent)]
    Object(#[from] ObjectError),
}

pub type FilterResult<T> = Result<T, FilterError>;
