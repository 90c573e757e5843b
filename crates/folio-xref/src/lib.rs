//! Cross-reference table for the Folio document engine.
//!
//! The [`XrefTable`] owns every indirect object of one document, keyed by
//! [`folio_types::ObjectId`]. It allocates identities, tolerates the gaps and
//! duplicates of imported files, computes the set of objects reachable from
//! a root, drops the rest, and renumbers survivors densely before a save.
//!
//! References that point at nothing are never followed into a panic: the
//! closure and renumber passes redirect them to a lazily registered
//! dead-object sentinel whose `/DeadObjectCount` records how many were
//! repaired.

pub mod closure;
pub mod diagnostics;
pub mod error;
pub mod renumber;
pub mod specialize;
pub mod table;

pub use diagnostics::{ImportOutcome, XrefDiagnostics};
pub use error::{XrefError, XrefResult};
pub use specialize::Slot;
pub use table::{XrefTable, DEFAULT_MAX_DEPTH};
