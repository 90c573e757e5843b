//! Save pipeline: prepare, write objects, write the lookup section and
//! trailer.
//!
//! The whole file is assembled in memory and handed to the output in one
//! `write_all`, so a failed save never leaves a trailer behind.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::path::Path;

use folio_filter::{FlateFilter, FilterRegistry, StreamFilters};
use folio_objects::{write_indirect, write_item, Array, Encrypt, Item};
use folio_schema::PdfVersion;
use folio_types::{Name, ObjectId, PdfString};
use folio_xref::{Slot, XrefTable};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document::{Document, DocumentState};
use crate::error::{DocumentError, DocumentResult};
use crate::hooks::{Cipher, PrepareContext};
use crate::pages::flatten_page_tree;

/// Second header line; bytes above 127 mark the file as binary.
const BINARY_MARKER: &[u8] = b"%\xE2\xE3\xCF\xD3\n";

/// Lookup row for object 0 and for unused numbers.
const FREE_ROW: &[u8] = b"0000000000 65535 f \n";

const EMPTY_HINT: &str = "add at least one page before saving";

const EMPTY_STREAM_HINT: &str = "a document created with Document::for_stream() starts without \
     pages; add pages before save(), or use Document::open() to load an existing file";

/// Summary of one completed save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub version: PdfVersion,
    pub objects_written: usize,
    /// Unreachable objects removed by compaction.
    pub objects_dropped: usize,
    /// Dangling references redirected to the dead-object sentinel so far.
    pub dangling_repaired: usize,
    pub bytes_written: usize,
    /// Byte offset of the `xref` keyword.
    pub xref_offset: usize,
    /// Hex form of the trailer `/ID` written by this save.
    pub file_id: Option<String>,
}

impl Document {
    /// Save into the output given to [`Document::for_stream`].
    pub fn save(&mut self) -> DocumentResult<SaveReport> {
        if self.output.is_none() {
            return Err(DocumentError::NoOutputStream);
        }
        let (bytes, report) = self.render()?;
        let written = match self.output.as_mut() {
            Some(output) => output.write_all(&bytes).and_then(|()| output.flush()),
            None => return Err(DocumentError::NoOutputStream),
        };
        self.commit(written, report)
    }

    /// Save into any writer. The document is finalized on success.
    pub fn save_to<W: Write + ?Sized>(&mut self, out: &mut W) -> DocumentResult<SaveReport> {
        let (bytes, report) = self.render()?;
        let written = out.write_all(&bytes).and_then(|()| out.flush());
        self.commit(written, report)
    }

    pub fn save_to_path(&mut self, path: impl AsRef<Path>) -> DocumentResult<SaveReport> {
        let (bytes, report) = self.render()?;
        let written = std::fs::write(path.as_ref(), &bytes);
        self.commit(written, report)
    }

    fn commit(&mut self, written: io::Result<()>, report: SaveReport) -> DocumentResult<SaveReport> {
        if let Err(err) = written {
            warn!(error = %err, "writing document failed; document left open");
            self.state = DocumentState::Open;
            return Err(err.into());
        }
        self.finalize(&report);
        Ok(report)
    }

    fn finalize(&mut self, report: &SaveReport) {
        self.state = DocumentState::Finalized;
        info!(
            objects = report.objects_written,
            dropped = report.objects_dropped,
            bytes = report.bytes_written,
            "saved document"
        );
    }

    /// Run the prepare and write phases, returning the file bytes.
    fn render(&mut self) -> DocumentResult<(Vec<u8>, SaveReport)> {
        self.ensure_modifiable()?;
        if self.page_count()? == 0 {
            let hint = if self.output.is_some() {
                EMPTY_STREAM_HINT
            } else {
                EMPTY_HINT
            };
            return Err(DocumentError::EmptyDocument { hint });
        }

        self.state = DocumentState::Preparing;
        debug!("preparing document for save");
        let (live, dropped) = match self.prepare() {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(error = %err, "prepare failed; document left open");
                self.state = DocumentState::Open;
                return Err(err);
            }
        };

        self.state = DocumentState::Writing;
        debug!(objects = live.len(), "writing document");
        self.write(&live, dropped).inspect_err(|_| {
            self.state = DocumentState::Open;
        })
    }

    /// Trailer, catalog, page tree, streams, hooks, security; then closure
    /// and, when enabled, compaction with renumbering. Returns the set of
    /// objects to write and how many were dropped.
    fn prepare(&mut self) -> DocumentResult<(BTreeSet<ObjectId>, usize)> {
        let options = self.options.clone();
        self.table.set_max_depth(options.max_traversal_depth);

        let mut cx = PrepareContext {
            table: &mut self.table,
            trailer: &mut self.trailer,
            options: &options,
        };
        let root = match cx.table.specialized_direct_value(cx.trailer, "/Root", false)? {
            Some(Slot::Indirect(id)) => id,
            _ => return Err(DocumentError::MissingRoot),
        };
        let pages = match cx.table.specialized_value(root, "/Pages", false)? {
            Some(Slot::Indirect(id)) => id,
            _ => {
                return Err(DocumentError::MalformedPageTree(
                    "catalog has no indirect /Pages".into(),
                ))
            }
        };
        flatten_page_tree(cx.table, pages)?;
        if options.compress_streams {
            compress_streams(cx.table)?;
        }
        for hook in &mut self.hooks {
            debug!(hook = hook.name(), "running prepare hook");
            hook.prepare_for_save(&mut cx)?;
        }
        if let Some(handler) = self.security.as_mut() {
            handler.prepare_encryption(&mut cx).map_err(|err| match err {
                DocumentError::Encryption(_) => err,
                other => DocumentError::Encryption(other.to_string()),
            })?;
        }

        self.drop_dangling_trailer_entries();
        let roots = self.trailer.references();
        if options.compact {
            let dropped = self.table.compact_from(roots)?;
            let mapping = self.table.renumber()?;
            self.trailer
                .rewrite_references(|id| mapping.get(&id).copied());
            Ok((self.table.ids().collect(), dropped))
        } else {
            Ok((self.table.closure_from(roots)?, 0))
        }
    }

    /// Trailer entries are outside the table, so nothing repairs their
    /// references; a dangling one is removed instead.
    fn drop_dangling_trailer_entries(&mut self) {
        let dangling: Vec<Name> = self
            .trailer
            .iter()
            .filter(|(_, value)| {
                value
                    .references()
                    .iter()
                    .any(|id| !self.table.contains(*id))
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in dangling {
            warn!(key = %key, "dropping trailer entry with dangling reference");
            self.trailer.remove(&key);
        }
    }

    fn write(
        &self,
        live: &BTreeSet<ObjectId>,
        objects_dropped: usize,
    ) -> DocumentResult<(Vec<u8>, SaveReport)> {
        let mut out = Vec::new();
        out.extend_from_slice(self.options.version.header().as_bytes());
        out.push(b'\n');
        out.extend_from_slice(BINARY_MARKER);

        let encrypt_dict = self.trailer.get("/Encrypt").and_then(Item::as_reference);
        let cipher = self.security.as_deref().map(Cipher);
        // One lookup row per number: only the newest live generation is kept.
        let mut newest: BTreeMap<u32, u16> = BTreeMap::new();
        for id in live {
            let generation = newest.entry(id.number()).or_insert(id.generation());
            *generation = (*generation).max(id.generation());
        }
        let mut offsets: BTreeMap<u32, (usize, u16)> = BTreeMap::new();
        for &id in live {
            if newest.get(&id.number()) != Some(&id.generation()) {
                warn!(id = %id, "skipping object superseded by a newer generation");
                continue;
            }
            let Some(item) = self.table.resolve(id) else {
                continue;
            };
            offsets.insert(id.number(), (out.len(), id.generation()));
            let encrypt = cipher
                .as_ref()
                .filter(|_| Some(id) != encrypt_dict)
                .map(|c| c as &dyn Encrypt);
            write_indirect(&mut out, id, item, encrypt);
        }

        let size = offsets.keys().next_back().map_or(0, |n| *n) + 1;
        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {size}\n").as_bytes());
        out.extend_from_slice(FREE_ROW);
        for number in 1..size {
            match offsets.get(&number) {
                Some((offset, generation)) => out
                    .extend_from_slice(format!("{offset:010} {generation:05} n \n").as_bytes()),
                None => out.extend_from_slice(FREE_ROW),
            }
        }

        let mut trailer = self.trailer.clone();
        trailer.set_int("/Size", i64::from(size))?;
        trailer.remove("/Prev");
        trailer.remove("/XRefStm");
        let file_id = if self.options.generate_id {
            let digest = blake3::hash(&out[..xref_offset]);
            let current = PdfString::from_bytes(&digest.as_bytes()[..16]);
            let permanent = trailer
                .get("/ID")
                .and_then(Item::as_array)
                .and_then(|ids| ids.get(0))
                .and_then(Item::as_string)
                .cloned()
                .unwrap_or_else(|| current.clone());
            let file_id = hex::encode(current.as_bytes());
            trailer.set("/ID", Array::from_items([permanent.into(), current.into()]))?;
            Some(file_id)
        } else {
            None
        };

        out.extend_from_slice(b"trailer\n");
        write_item(&mut out, &Item::Dictionary(trailer));
        out.extend_from_slice(format!("\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes());

        let report = SaveReport {
            version: self.options.version,
            objects_written: offsets.len(),
            objects_dropped,
            dangling_repaired: self.table.diagnostics().dangling_repaired,
            bytes_written: out.len(),
            xref_offset,
            file_id,
        };
        Ok((out, report))
    }
}

/// Apply `/FlateDecode` to every stream that carries no filter yet.
fn compress_streams(table: &mut XrefTable) -> DocumentResult<usize> {
    let registry = FilterRegistry::shared();
    let plain: Vec<ObjectId> = table
        .iter()
        .filter(|(_, item)| {
            item.as_dictionary()
                .is_some_and(|dict| dict.has_stream() && !dict.contains_key("/Filter"))
        })
        .map(|(id, _)| id)
        .collect();
    for &id in &plain {
        if let Some(dict) = table.dictionary_mut(id) {
            dict.apply_filter(FlateFilter::NAME, registry)?;
        }
    }
    debug!(streams = plain.len(), "compressed streams");
    Ok(plain.len())
}
