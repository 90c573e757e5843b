//! Item algebra and element stores for the Folio document engine.
//!
//! An [`Item`] is any value that can appear in a document: a primitive, an
//! [`Array`], a [`Dictionary`] (optionally carrying a stream payload), or a
//! `Reference` to an indirect object in the document's object table.
//!
//! Element stores enforce one structural rule: an indirect composite is never
//! nested by value inside another composite. Storing one converts it to a
//! reference to its identity. Typed accessors dereference at most one
//! reference hop through a [`Resolve`] implementation, then coerce, default,
//! or report a type mismatch.
//!
//! The crate also carries the text [`writer`] and the [`parser`] for the
//! object syntax.

pub mod array;
mod coerce;
pub mod dictionary;
pub mod error;
pub mod item;
pub mod lexer;
pub mod parser;
pub mod resolve;
pub mod writer;

pub use array::Array;
pub use dictionary::Dictionary;
pub use error::{ObjectError, ObjectResult};
pub use item::Item;
pub use lexer::{Lexer, Token};
pub use parser::{parse_item, Parser};
pub use resolve::{deref, Detached, Resolve};
pub use writer::{to_bytes, write_indirect, write_item, Encrypt};
