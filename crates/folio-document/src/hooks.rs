//! Collaborator seams run by the prepare phase of a save.

use folio_objects::{Dictionary, Encrypt, Item};
use folio_types::ObjectId;
use folio_xref::XrefTable;

use crate::config::SaveOptions;
use crate::error::{DocumentError, DocumentResult};

/// Mutable view of a document handed to prepare hooks.
///
/// No byte offsets exist yet; hooks may reshape the graph freely.
pub struct PrepareContext<'a> {
    pub table: &'a mut XrefTable,
    pub trailer: &'a mut Dictionary,
    pub options: &'a SaveOptions,
}

impl PrepareContext<'_> {
    /// Identity of the catalog.
    pub fn root(&self) -> DocumentResult<ObjectId> {
        self.trailer
            .get("/Root")
            .and_then(Item::as_reference)
            .ok_or(DocumentError::MissingRoot)
    }
}

/// A subsystem that normalizes its own state before the document is
/// written, e.g. an outline or font table.
pub trait PrepareForSave: Send {
    /// Short label used in logs and errors.
    fn name(&self) -> &str;

    fn prepare_for_save(&mut self, cx: &mut PrepareContext<'_>) -> DocumentResult<()>;
}

/// Encryption collaborator.
///
/// `prepare_encryption` runs last in the prepare phase. It typically
/// registers the encryption dictionary and points the trailer's `/Encrypt`
/// at it. `encrypt` is then applied to the strings and stream payload of
/// every written object except that dictionary.
pub trait SecurityHandler: Send {
    fn prepare_encryption(&mut self, cx: &mut PrepareContext<'_>) -> DocumentResult<()>;

    fn encrypt(&self, bytes: &[u8], id: ObjectId) -> Vec<u8>;
}

/// Adapts a [`SecurityHandler`] to the writer's [`Encrypt`] hook.
pub(crate) struct Cipher<'a>(pub &'a dyn SecurityHandler);

impl Encrypt for Cipher<'_> {
    fn encrypt(&self, bytes: &[u8], id: ObjectId) -> Vec<u8> {
        self.0.encrypt(bytes, id)
    }
}
