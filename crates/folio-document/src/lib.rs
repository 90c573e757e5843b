//! Document model and save pipeline for the Folio document engine.
//!
//! A [`Document`] owns an [`folio_xref::XrefTable`], a trailer dictionary and
//! a save lifecycle. Saving runs in two phases:
//!
//! - **Prepare**: specialize the trailer's catalog and page tree, copy
//!   inherited page attributes onto leaf pages, run registered
//!   [`PrepareForSave`] hooks and the [`SecurityHandler`], then compact and
//!   renumber the object table.
//! - **Write**: emit the header, every live object with its byte offset,
//!   the lookup section, the trailer and `startxref`.
//!
//! A saved document is finalized; [`Document::reset`] reopens it.
//! [`Document::open`] loads an existing file by scanning its body.

pub mod config;
pub mod document;
pub mod error;
pub mod hooks;
pub mod pages;
pub mod reader;
pub mod save;

pub use config::SaveOptions;
pub use document::{Document, DocumentState, Origin, PRODUCER};
pub use error::{DocumentError, DocumentResult};
pub use hooks::{PrepareContext, PrepareForSave, SecurityHandler};
pub use pages::a4;
pub use save::SaveReport;
