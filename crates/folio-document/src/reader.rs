//! Loading an existing file.
//!
//! The reader does not trust the lookup section. It scans the whole body
//! for `N G obj` headers, registers every object it can parse under its
//! file identity, and takes the last `trailer` dictionary in the file.
//! Anything that does not tokenize is skipped.

use std::collections::VecDeque;

use folio_objects::{Dictionary, Item, Parser, Token};
use folio_schema::{Kind, PdfVersion};
use folio_types::ObjectId;
use folio_xref::{ImportOutcome, XrefTable};
use tracing::{debug, info, warn};

use crate::config::SaveOptions;
use crate::document::{Document, Origin};
use crate::error::{DocumentError, DocumentResult};

const HEADER: &[u8] = b"%PDF-";

/// How far into the file the header may start.
const HEADER_WINDOW: usize = 1024;

fn find(data: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|at| from + at)
}

fn is_keyword(token: &Token, keyword: &str) -> bool {
    matches!(token, Token::Keyword(k) if k == keyword)
}

fn read_version(data: &[u8]) -> DocumentResult<PdfVersion> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let start = find(window, HEADER, 0).ok_or_else(|| DocumentError::Malformed {
        offset: 0,
        reason: "no %PDF- header in the first 1024 bytes".into(),
    })?;
    let text: String = data[start + HEADER.len()..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| char::from(b))
        .collect();
    Ok(PdfVersion::parse(&text).unwrap_or_else(|| {
        warn!(version = %text, "unrecognized header version; assuming default");
        PdfVersion::default()
    }))
}

/// Identity from the two tokens preceding `obj`.
fn header_identity(window: &VecDeque<(usize, Token)>) -> Option<ObjectId> {
    match (window.front(), window.get(1)) {
        (Some((_, Token::Integer(number))), Some((_, Token::Integer(generation)))) => {
            let number = u32::try_from(*number).ok()?;
            let generation = u16::try_from(*generation).ok()?;
            ObjectId::new(number, generation).ok().filter(ObjectId::is_some)
        }
        _ => None,
    }
}

/// Strip one end-of-line marker from the end of a payload.
fn trim_eol(payload: &[u8]) -> &[u8] {
    payload
        .strip_suffix(b"\r\n")
        .or_else(|| payload.strip_suffix(b"\n"))
        .or_else(|| payload.strip_suffix(b"\r"))
        .unwrap_or(payload)
}

/// Read the payload following a `stream` keyword into `dict` and leave the
/// parser after `endstream`.
fn read_stream(parser: &mut Parser<'_>, dict: &mut Dictionary, from: usize) -> DocumentResult<()> {
    let data = parser.data();
    let keyword = find(data, b"stream", from).ok_or_else(|| DocumentError::Malformed {
        offset: from,
        reason: "stream keyword vanished".into(),
    })?;
    let mut start = keyword + b"stream".len();
    if data.get(start) == Some(&b'\r') {
        start += 1;
    }
    if data.get(start) == Some(&b'\n') {
        start += 1;
    }

    // A direct /Length is trusted only when endstream follows it.
    let declared = dict
        .get("/Length")
        .and_then(Item::as_i64)
        .and_then(|len| usize::try_from(len).ok())
        .and_then(|len| start.checked_add(len))
        .filter(|&end| {
            data.get(end..).is_some_and(|rest| {
                let skip = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
                rest[skip..].starts_with(b"endstream")
            })
        });
    let (payload, endstream) = match declared {
        Some(end) => (&data[start..end], find(data, b"endstream", end)),
        None => match find(data, b"endstream", start) {
            Some(at) => (trim_eol(&data[start..at]), Some(at)),
            None => (&[][..], None),
        },
    };
    let endstream = endstream.ok_or_else(|| DocumentError::Malformed {
        offset: start,
        reason: "stream without endstream".into(),
    })?;
    if declared.is_none() {
        debug!(offset = start, "stream length recovered by scanning for endstream");
    }
    dict.attach_stream(payload.to_vec());
    parser.seek(endstream + b"endstream".len());
    Ok(())
}

/// Parse the body of one indirect object, positioned after `obj`.
fn read_object(parser: &mut Parser<'_>) -> DocumentResult<Item> {
    let mut item = parser.parse_item()?;
    let after = parser.position();
    match parser.next_token() {
        Ok(Some(token)) if is_keyword(&token, "stream") => {
            match &mut item {
                Item::Dictionary(dict) => read_stream(parser, dict, after)?,
                other => {
                    return Err(DocumentError::Malformed {
                        offset: after,
                        reason: format!("stream attached to {}", other.type_name()),
                    })
                }
            }
            let before_end = parser.position();
            match parser.next_token() {
                Ok(Some(token)) if is_keyword(&token, "endobj") => {}
                _ => parser.seek(before_end),
            }
        }
        Ok(Some(token)) if is_keyword(&token, "endobj") => {}
        _ => parser.seek(after),
    }
    Ok(item)
}

impl Document {
    /// Load a document from the bytes of a file.
    ///
    /// Objects keep their file identities; a repeated identity keeps its
    /// first occurrence. The last trailer in the file wins. Files whose
    /// lookup data lives only in cross-reference streams, and encrypted
    /// files, are reported as unsupported.
    pub fn open(data: &[u8]) -> DocumentResult<Self> {
        let version = read_version(data)?;
        let mut table = XrefTable::new();
        let mut trailer: Option<Dictionary> = None;
        let mut parser = Parser::new(data);
        let mut window: VecDeque<(usize, Token)> = VecDeque::with_capacity(2);
        let mut skipped = 0usize;

        loop {
            let at = parser.position();
            let token = match parser.next_token() {
                Ok(Some(token)) => token,
                Ok(None) => break,
                Err(err) => {
                    debug!(offset = at, error = %err, "skipping untokenizable byte");
                    skipped += 1;
                    window.clear();
                    parser.seek(at + 1);
                    continue;
                }
            };
            if is_keyword(&token, "obj") {
                let identity = header_identity(&window);
                window.clear();
                let Some(id) = identity else {
                    warn!(offset = at, "obj keyword without a valid identity");
                    continue;
                };
                let resume = parser.position();
                match read_object(&mut parser) {
                    Ok(item) => {
                        if table.register_imported(id, item)? == ImportOutcome::Registered {
                            debug!(id = %id, offset = at, "read object");
                        }
                    }
                    Err(err) => {
                        warn!(id = %id, offset = at, error = %err, "skipping unreadable object");
                        skipped += 1;
                        parser.seek(resume);
                    }
                }
            } else if is_keyword(&token, "trailer") {
                window.clear();
                match parser.parse_item() {
                    Ok(Item::Dictionary(dict)) => trailer = Some(dict),
                    Ok(other) => warn!(offset = at, found = other.type_name(), "trailer is not a dictionary"),
                    Err(err) => warn!(offset = at, error = %err, "unreadable trailer"),
                }
            } else {
                if window.len() == 2 {
                    window.pop_front();
                }
                window.push_back((at, token));
            }
        }

        let Some(trailer) = trailer else {
            let xref_stream = table.iter().any(|(_, item)| {
                item.as_dictionary()
                    .and_then(|dict| dict.get("/Type"))
                    .and_then(Item::as_name)
                    .is_some_and(|name| name == "/XRef")
            });
            if xref_stream {
                return Err(DocumentError::Unsupported("cross-reference streams"));
            }
            return Err(DocumentError::Malformed {
                offset: data.len(),
                reason: "no trailer dictionary".into(),
            });
        };
        if trailer.contains_key("/Encrypt") {
            return Err(DocumentError::Unsupported("encrypted input"));
        }
        let root = trailer.get("/Root").and_then(Item::as_reference);
        if !root.is_some_and(|root| table.contains(root)) {
            return Err(DocumentError::MissingRoot);
        }

        info!(
            objects = table.len(),
            duplicates = table.diagnostics().duplicates_ignored,
            skipped,
            version = %version.header(),
            "opened document"
        );
        let options = SaveOptions {
            version,
            ..SaveOptions::default()
        };
        Ok(Self::from_parts(
            table,
            trailer.into_kind(Kind::Trailer),
            options,
            Origin::Imported,
        ))
    }
}

#[cfg(test)]
mod tests {
    use folio_objects::Detached;
    use folio_types::Rectangle;

    use super::*;
    use crate::document::DocumentState;

    fn id(n: u32) -> ObjectId {
        ObjectId::new(n, 0).unwrap()
    }

    fn file(body: &str) -> Vec<u8> {
        format!("%PDF-1.4\n{body}").into_bytes()
    }

    const CATALOG: &str = "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n";

    // ---------------------------------------------------------------
    // Round trip
    // ---------------------------------------------------------------

    #[test]
    fn saved_document_reopens() {
        let mut original = Document::new().unwrap();
        original.add_page().unwrap();
        original.info_mut().unwrap().set_string("/Title", "Ledger").unwrap();
        let mut bytes = Vec::new();
        original.save_to(&mut bytes).unwrap();

        let reopened = Document::open(&bytes).unwrap();
        assert_eq!(reopened.origin(), Origin::Imported);
        assert_eq!(reopened.state(), DocumentState::Open);
        assert_eq!(reopened.options().version, PdfVersion::V1_7);
        assert_eq!(reopened.table().len(), original.table().len());
        assert_eq!(reopened.page_count().unwrap(), 1);
        assert_eq!(reopened.trailer().kind(), Kind::Trailer);
        let title = reopened
            .info()
            .unwrap()
            .lookup_string("/Title", &Detached)
            .unwrap()
            .unwrap();
        assert_eq!(title.to_text(), "Ledger");
    }

    #[test]
    fn reopened_document_saves_again_with_its_version() {
        let body = format!(
            "{CATALOG}2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
             3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n\
             trailer\n<< /Root 1 0 R /Size 4 >>\n"
        );
        let mut document = Document::open(&file(&body)).unwrap();
        document.add_page().unwrap();
        let mut out = Vec::new();
        document.save_to(&mut out).unwrap();
        assert!(out.starts_with(b"%PDF-1.4\n"));
        assert_eq!(document.page_count().unwrap(), 2);
    }

    // ---------------------------------------------------------------
    // Tolerated damage
    // ---------------------------------------------------------------

    #[test]
    fn duplicate_identity_keeps_first_occurrence() {
        let body = format!(
            "{CATALOG}2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
             3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n\
             3 0 obj\n<< /Type /Page /Rotate 90 >>\nendobj\n\
             trailer\n<< /Root 1 0 R >>\n"
        );
        let document = Document::open(&file(&body)).unwrap();
        assert_eq!(document.table().diagnostics().duplicates_ignored, 1);
        let page = document.table().dictionary(id(3)).unwrap();
        assert!(page.contains_key("/Parent"));
        assert!(!page.contains_key("/Rotate"));
    }

    #[test]
    fn stream_with_indirect_length_is_recovered() {
        let body = format!(
            "{CATALOG}4 0 obj\n<< /Length 5 0 R >>\nstream\nhello world\nendstream\nendobj\n\
             5 0 obj\n11\nendobj\n\
             trailer\n<< /Root 1 0 R >>\n"
        );
        let document = Document::open(&file(&body)).unwrap();
        let stream = document.table().dictionary(id(4)).unwrap();
        assert_eq!(stream.stream(), Some(&b"hello world"[..]));
        assert_eq!(stream.get("/Length"), Some(&Item::Integer(11)));
        assert_eq!(document.table().resolve(id(5)), Some(&Item::Integer(11)));
    }

    #[test]
    fn direct_length_covers_endstream_inside_payload() {
        let body = format!(
            "{CATALOG}4 0 obj\n<< /Length 15 >>\nstream\nab endstream cd\nendstream\nendobj\n\
             trailer\n<< /Root 1 0 R >>\n"
        );
        let document = Document::open(&file(&body)).unwrap();
        let stream = document.table().dictionary(id(4)).unwrap();
        assert_eq!(stream.stream(), Some(&b"ab endstream cd"[..]));
    }

    #[test]
    fn garbage_between_objects_is_skipped() {
        let body = format!(
            "{CATALOG}) ] >> 9 9 }} junk\n\
             2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n\
             trailer\n<< /Root 1 0 R >>\n"
        );
        let document = Document::open(&file(&body)).unwrap();
        assert!(document.table().contains(id(1)));
        assert!(document.table().contains(id(2)));
        assert_eq!(document.page_count().unwrap(), 0);
    }

    #[test]
    fn last_trailer_wins() {
        let body = format!(
            "{CATALOG}trailer\n<< /Root 9 0 R >>\n\
             2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n\
             trailer\n<< /Root 1 0 R >>\n"
        );
        let document = Document::open(&file(&body)).unwrap();
        assert_eq!(document.root_id().unwrap(), id(1));
    }

    // ---------------------------------------------------------------
    // Rejected input
    // ---------------------------------------------------------------

    #[test]
    fn missing_header_is_malformed() {
        let err = Document::open(CATALOG.as_bytes()).unwrap_err();
        assert!(matches!(err, DocumentError::Malformed { offset: 0, .. }));
    }

    #[test]
    fn missing_trailer_is_malformed() {
        let err = Document::open(&file(CATALOG)).unwrap_err();
        assert!(matches!(err, DocumentError::Malformed { .. }));
    }

    #[test]
    fn xref_stream_files_are_unsupported() {
        let body = format!(
            "{CATALOG}7 0 obj\n<< /Type /XRef /Size 8 /Root 1 0 R /Length 0 >>\nstream\n\nendstream\nendobj\n"
        );
        let err = Document::open(&file(&body)).unwrap_err();
        assert!(matches!(err, DocumentError::Unsupported("cross-reference streams")));
    }

    #[test]
    fn encrypted_files_are_unsupported() {
        let body = format!(
            "{CATALOG}8 0 obj\n<< /Filter /Standard >>\nendobj\n\
             trailer\n<< /Root 1 0 R /Encrypt 8 0 R >>\n"
        );
        let err = Document::open(&file(&body)).unwrap_err();
        assert!(matches!(err, DocumentError::Unsupported("encrypted input")));
    }

    #[test]
    fn trailer_must_name_a_live_root() {
        let body = format!("{CATALOG}trailer\n<< /Root 6 0 R >>\n");
        let err = Document::open(&file(&body)).unwrap_err();
        assert!(matches!(err, DocumentError::MissingRoot));
    }

    // ---------------------------------------------------------------
    // Inheritance
    // ---------------------------------------------------------------

    #[test]
    fn inherited_media_box_is_flattened_on_save() {
        let body = format!(
            "{CATALOG}2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 612 792] >>\nendobj\n\
             3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n\
             trailer\n<< /Root 1 0 R >>\n"
        );
        let mut document = Document::open(&file(&body)).unwrap();
        let page = document.page_ids().unwrap()[0];
        assert!(!document.table().dictionary(page).unwrap().contains_key("/MediaBox"));

        document.save_to(&mut Vec::new()).unwrap();
        let page = document.page_ids().unwrap()[0];
        let page = document.table().dictionary(page).unwrap();
        assert_eq!(page.kind(), Kind::Page);
        assert_eq!(
            page.lookup_rectangle("/MediaBox", &Detached).unwrap(),
            Some(Rectangle::new(0.0, 0.0, 612.0, 792.0))
        );
    }
}
