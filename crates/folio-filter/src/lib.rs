//! Stream filter boundary for the Folio document engine.
//!
//! A stream dictionary owns one opaque payload, stored in the encoded form
//! its `/Filter` entry names. This crate provides the codec seam
//! ([`Filter`]), a name→codec [`FilterRegistry`], and the [`StreamFilters`]
//! operations that encode, decode, or view a payload.

pub mod codec;
pub mod error;
pub mod registry;
pub mod stream;

pub use codec::{AsciiHexFilter, Filter, FlateFilter};
pub use error::{FilterError, FilterResult};
pub use registry::FilterRegistry;
pub use stream::StreamFilters;
