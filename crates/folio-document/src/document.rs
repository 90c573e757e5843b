use std::fmt;
use std::io::Write;

use folio_objects::{Array, Dictionary, Item};
use folio_schema::Kind;
use folio_types::{Date, ObjectId};
use folio_xref::{Slot, XrefTable};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SaveOptions;
use crate::error::{DocumentError, DocumentResult};
use crate::hooks::{PrepareForSave, SecurityHandler};

/// Value written to `/Producer` in the metadata of new documents.
pub const PRODUCER: &str = "Folio";

/// Save lifecycle. Preparing and Writing are only observable from inside a
/// save; a failure there returns the document to `Open`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DocumentState {
    Open,
    Preparing,
    Writing,
    Finalized,
}

/// Where the object identities of a document came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Origin {
    /// Built in memory; every identity was allocated by the table.
    Created,
    /// Read from a file; identities are the file's own.
    Imported,
}

/// One document: an object table, its trailer, and a save lifecycle.
pub struct Document {
    pub(crate) table: XrefTable,
    pub(crate) trailer: Dictionary,
    pub(crate) options: SaveOptions,
    pub(crate) state: DocumentState,
    pub(crate) origin: Origin,
    pub(crate) hooks: Vec<Box<dyn PrepareForSave>>,
    pub(crate) security: Option<Box<dyn SecurityHandler>>,
    pub(crate) output: Option<Box<dyn Write + Send>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("objects", &self.table.len())
            .field("state", &self.state)
            .field("origin", &self.origin)
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .field("encrypted", &self.security.is_some())
            .field("has_output", &self.output.is_some())
            .finish()
    }
}

impl Document {
    /// A new document: trailer, catalog, an empty page tree and an `/Info`
    /// dictionary carrying the producer and creation date.
    pub fn new() -> DocumentResult<Self> {
        let mut table = XrefTable::new();
        let mut trailer = Dictionary::of_kind(Kind::Trailer);

        let root = expect_indirect(
            table.specialized_direct_value(&mut trailer, "/Root", true)?,
            "/Root",
        )?;
        let pages = expect_indirect(table.specialized_value(root, "/Pages", true)?, "/Pages")?;
        if let Some(pages) = table.dictionary_mut(pages) {
            pages.set("/Kids", Array::new())?;
            pages.set_int("/Count", 0)?;
        }
        let info = expect_indirect(
            table.specialized_direct_value(&mut trailer, "/Info", true)?,
            "/Info",
        )?;
        if let Some(info) = table.dictionary_mut(info) {
            info.set_string("/Producer", PRODUCER)?;
            info.set_datetime("/CreationDate", Date::now())?;
        }
        debug!(root = %root, pages = %pages, info = %info, "created document");

        Ok(Self::from_parts(table, trailer, SaveOptions::default(), Origin::Created))
    }

    /// A new document that [`Document::save`] writes into `output`.
    pub fn for_stream(output: impl Write + Send + 'static) -> DocumentResult<Self> {
        let mut document = Self::new()?;
        document.output = Some(Box::new(output));
        Ok(document)
    }

    pub(crate) fn from_parts(
        table: XrefTable,
        trailer: Dictionary,
        options: SaveOptions,
        origin: Origin,
    ) -> Self {
        Self {
            table,
            trailer,
            options,
            state: DocumentState::Open,
            origin,
            hooks: Vec::new(),
            security: None,
            output: None,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SaveOptions) -> DocumentResult<()> {
        self.ensure_modifiable()?;
        self.options = options;
        Ok(())
    }

    pub fn table(&self) -> &XrefTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> DocumentResult<&mut XrefTable> {
        self.ensure_modifiable()?;
        Ok(&mut self.table)
    }

    pub fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> DocumentResult<&mut Dictionary> {
        self.ensure_modifiable()?;
        Ok(&mut self.trailer)
    }

    /// Identity of the catalog named by the trailer's `/Root`.
    pub fn root_id(&self) -> DocumentResult<ObjectId> {
        self.trailer
            .get("/Root")
            .and_then(Item::as_reference)
            .ok_or(DocumentError::MissingRoot)
    }

    pub fn catalog(&self) -> DocumentResult<&Dictionary> {
        self.table
            .dictionary(self.root_id()?)
            .ok_or(DocumentError::MissingRoot)
    }

    /// The metadata dictionary, if the trailer names one.
    pub fn info(&self) -> Option<&Dictionary> {
        match self.trailer.get("/Info")? {
            Item::Reference(id) => self.table.dictionary(*id),
            other => other.as_dictionary(),
        }
    }

    /// The metadata dictionary, created on first use.
    pub fn info_mut(&mut self) -> DocumentResult<&mut Dictionary> {
        self.ensure_modifiable()?;
        let slot = self
            .table
            .specialized_direct_value(&mut self.trailer, "/Info", true)?;
        let info = match slot {
            Some(Slot::Indirect(id)) => self.table.dictionary_mut(id),
            Some(Slot::Direct) => self.trailer.get_mut("/Info").and_then(Item::as_dictionary_mut),
            None => None,
        };
        info.ok_or(DocumentError::NotIndirect("/Info"))
    }

    /// Register a collaborator to run during the prepare phase of every
    /// save, after the page tree and before security.
    pub fn add_prepare_hook(&mut self, hook: Box<dyn PrepareForSave>) -> DocumentResult<()> {
        self.ensure_modifiable()?;
        debug!(hook = hook.name(), "registered prepare hook");
        self.hooks.push(hook);
        Ok(())
    }

    pub fn set_security_handler(&mut self, handler: Box<dyn SecurityHandler>) -> DocumentResult<()> {
        self.ensure_modifiable()?;
        self.security = Some(handler);
        Ok(())
    }

    /// Reopen a finalized document for modification.
    pub fn reset(&mut self) {
        if self.state == DocumentState::Finalized {
            info!("document reset after save");
        }
        self.state = DocumentState::Open;
    }

    pub(crate) fn ensure_modifiable(&self) -> DocumentResult<()> {
        match self.state {
            DocumentState::Finalized => Err(DocumentError::NotModifiable),
            _ => Ok(()),
        }
    }
}

fn expect_indirect(slot: Option<Slot>, key: &'static str) -> DocumentResult<ObjectId> {
    match slot {
        Some(Slot::Indirect(id)) => Ok(id),
        _ => Err(DocumentError::NotIndirect(key)),
    }
}

#[cfg(test)]
mod tests {
    use folio_objects::Detached;

    use super::*;

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn new_document_has_catalog_pages_and_info() {
        let document = Document::new().unwrap();
        let catalog = document.catalog().unwrap();
        assert_eq!(catalog.kind(), Kind::Catalog);
        assert_eq!(catalog.get("/Type").and_then(Item::as_name).unwrap(), "/Catalog");

        let pages = catalog.get("/Pages").and_then(Item::as_reference).unwrap();
        let pages = document.table().dictionary(pages).unwrap();
        assert_eq!(pages.kind(), Kind::Pages);
        assert_eq!(pages.get("/Count"), Some(&Item::Integer(0)));

        let info = document.info().unwrap();
        assert_eq!(info.kind(), Kind::Info);
        let producer = info.lookup_string("/Producer", &Detached).unwrap().unwrap();
        assert_eq!(producer.to_text(), PRODUCER);
        assert!(info.contains_key("/CreationDate"));

        assert_eq!(document.origin(), Origin::Created);
        assert_eq!(document.state(), DocumentState::Open);
        assert_eq!(document.table().len(), 3);
    }

    #[test]
    fn info_mut_edits_metadata() {
        let mut document = Document::new().unwrap();
        document.info_mut().unwrap().set_string("/Title", "Quarterly").unwrap();
        let title = document
            .info()
            .unwrap()
            .lookup_string("/Title", &Detached)
            .unwrap()
            .unwrap();
        assert_eq!(title.to_text(), "Quarterly");
    }

    #[test]
    fn info_mut_recreates_missing_info() {
        let mut document = Document::new().unwrap();
        document.trailer_mut().unwrap().remove("/Info");
        assert!(document.info().is_none());
        document.info_mut().unwrap().set_string("/Author", "ops").unwrap();
        assert_eq!(document.info().unwrap().kind(), Kind::Info);
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    #[test]
    fn finalized_document_rejects_mutation_until_reset() {
        let mut document = Document::new().unwrap();
        document.state = DocumentState::Finalized;
        assert!(matches!(document.table_mut(), Err(DocumentError::NotModifiable)));
        assert!(matches!(document.info_mut(), Err(DocumentError::NotModifiable)));
        assert!(matches!(
            document.set_options(SaveOptions::permissive()),
            Err(DocumentError::NotModifiable)
        ));

        document.reset();
        assert_eq!(document.state(), DocumentState::Open);
        assert!(document.table_mut().is_ok());
    }

    #[test]
    fn missing_root_is_reported() {
        let mut document = Document::new().unwrap();
        document.trailer_mut().unwrap().remove("/Root");
        assert!(matches!(document.root_id(), Err(DocumentError::MissingRoot)));
        assert!(matches!(document.catalog(), Err(DocumentError::MissingRoot)));
    }
}
