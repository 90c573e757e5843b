//! Foundation types for the Folio document engine.
//!
//! This crate provides the identity and immutable primitive value types used
//! throughout Folio. Every other Folio crate depends on `folio-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`]: `(number, generation)` identity of an indirect object
//! - [`Name`]: name token, always carrying the leading `/`
//! - [`PdfString`]: raw byte string
//! - [`Date`]: second-resolution timestamp with UTC offset
//! - [`Rectangle`], [`Matrix`]: geometric payloads
//! - [`format_real`]: bounded-precision real formatting

pub mod date;
pub mod error;
pub mod geometry;
pub mod name;
pub mod object;
pub mod real;
pub mod string;

pub use date::Date;
pub use error::TypeError;
pub use geometry::{Matrix, Rectangle};
pub use name::Name;
pub use object::ObjectId;
pub use real::{format_real, REAL_SIGNIFICANT_DIGITS};
pub use string::PdfString;
