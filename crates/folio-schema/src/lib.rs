//! Schema/meta registry for Folio dictionaries.
//!
//! Every dictionary kind (catalog, page tree node, page, font, ...) declares
//! a static table of [`KeyDescriptor`]s. The registry turns those tables into
//! lookup maps on first use and caches them for the life of the process.
//!
//! The element stores consult the registry when a generically parsed value
//! has to be promoted to a specialized kind: the descriptor for the key says
//! which [`Kind`] to instantiate.
//!
//! # Concurrency
//!
//! Registries are built at most once per kind behind a [`std::sync::OnceLock`];
//! later reads are lock-free.

pub mod descriptor;
pub mod kind;
pub mod registry;
pub mod tables;
pub mod version;

pub use descriptor::{KeyDescriptor, KeyFlags, KeyType};
pub use kind::Kind;
pub use registry::{lookup, schema_for, SchemaRegistry};
pub use version::PdfVersion;
