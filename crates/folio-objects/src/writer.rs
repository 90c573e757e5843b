//! Text serialization of items and indirect objects.
//!
//! Nested values are emitted with an explicit frame stack, so arbitrarily
//! deep structures never grow the call stack.

use std::borrow::Cow;

use folio_types::{format_real, Name, ObjectId};

use crate::dictionary::Dictionary;
use crate::item::Item;
use crate::lexer::is_delimiter;

/// Encryption hook applied to the strings and stream payload of one
/// indirect object.
pub trait Encrypt {
    fn encrypt(&self, bytes: &[u8], id: ObjectId) -> Vec<u8>;
}

enum Frame<'a> {
    Item(&'a Item),
    Key(&'a Name),
    Text(&'static str),
}

/// Append the text form of `item` to `out`.
pub fn write_item(out: &mut Vec<u8>, item: &Item) {
    emit(out, item, None);
}

/// The text form of `item`.
pub fn to_bytes(item: &Item) -> Vec<u8> {
    let mut out = Vec::new();
    write_item(&mut out, item);
    out
}

/// Append `N G obj … endobj` for an indirect object, including its stream
/// payload. With `encrypt`, strings and the payload are encrypted under
/// `id` and `/Length` reflects the encrypted payload.
pub fn write_indirect(out: &mut Vec<u8>, id: ObjectId, item: &Item, encrypt: Option<&dyn Encrypt>) {
    out.extend_from_slice(format!("{} {} obj\n", id.number(), id.generation()).as_bytes());
    let cipher = encrypt.map(|e| (e, id));
    match item {
        Item::Dictionary(dict) if dict.has_stream() => write_stream(out, dict, cipher),
        other => emit(out, other, cipher),
    }
    out.extend_from_slice(b"\nendobj\n");
}

fn write_stream(out: &mut Vec<u8>, dict: &Dictionary, cipher: Option<(&dyn Encrypt, ObjectId)>) {
    let raw = dict.stream().unwrap_or_default();
    let payload: Cow<'_, [u8]> = match cipher {
        Some((encrypt, id)) => Cow::Owned(encrypt.encrypt(raw, id)),
        None => Cow::Borrowed(raw),
    };
    if payload.len() == raw.len() {
        emit(out, &Item::Dictionary(dict.clone_header()), cipher);
    } else {
        let mut header = dict.clone_header();
        header.insert(Name::from_static("/Length"), payload.len());
        emit(out, &Item::Dictionary(header), cipher);
    }
    out.extend_from_slice(b"\nstream\n");
    out.extend_from_slice(&payload);
    out.extend_from_slice(b"\nendstream");
}

impl Dictionary {
    /// A copy of the entries without the stream payload.
    fn clone_header(&self) -> Dictionary {
        let mut header = Dictionary::from_entries(self.iter().map(|(k, v)| (k.clone(), v.clone())));
        header.assign_id(self.id());
        header.into_kind(self.kind())
    }
}

fn emit(out: &mut Vec<u8>, root: &Item, cipher: Option<(&dyn Encrypt, ObjectId)>) {
    let mut stack = vec![Frame::Item(root)];
    while let Some(frame) = stack.pop() {
        let item = match frame {
            Frame::Text(text) => {
                out.extend_from_slice(text.as_bytes());
                continue;
            }
            Frame::Key(name) => {
                write_name(out, name);
                continue;
            }
            Frame::Item(item) => item,
        };
        match item {
            Item::Null => out.extend_from_slice(b"null"),
            Item::Boolean(true) => out.extend_from_slice(b"true"),
            Item::Boolean(false) => out.extend_from_slice(b"false"),
            Item::Integer(i) => out.extend_from_slice(i.to_string().as_bytes()),
            Item::Real(r) => out.extend_from_slice(format_real(*r).as_bytes()),
            Item::String(s) => write_string(out, s.as_bytes(), cipher),
            Item::Date(d) => write_string(out, d.to_pdf_string().as_bytes(), cipher),
            Item::Name(n) => write_name(out, n),
            Item::Literal(text) => out.extend_from_slice(text.as_bytes()),
            Item::Rectangle(r) => {
                let [x1, y1, x2, y2] = r.to_array().map(format_real);
                out.extend_from_slice(format!("[{x1} {y1} {x2} {y2}]").as_bytes());
            }
            Item::Reference(id) => {
                out.extend_from_slice(format!("{} {} R", id.number(), id.generation()).as_bytes())
            }
            Item::Array(array) => {
                out.push(b'[');
                stack.push(Frame::Text(" ]"));
                for value in array.iter().rev() {
                    stack.push(Frame::Item(value));
                    stack.push(Frame::Text(" "));
                }
            }
            Item::Dictionary(dict) => {
                out.extend_from_slice(b"<<");
                stack.push(Frame::Text(" >>"));
                for (key, value) in dict.iter().rev() {
                    stack.push(Frame::Item(value));
                    stack.push(Frame::Text(" "));
                    stack.push(Frame::Key(key));
                    stack.push(Frame::Text(" "));
                }
            }
        }
    }
}

fn write_name(out: &mut Vec<u8>, name: &Name) {
    out.push(b'/');
    for &b in name.bare() {
        if b.is_ascii_graphic() && !is_delimiter(b) && b != b'#' {
            out.push(b);
        } else {
            out.extend_from_slice(format!("#{b:02X}").as_bytes());
        }
    }
}

fn write_string(out: &mut Vec<u8>, bytes: &[u8], cipher: Option<(&dyn Encrypt, ObjectId)>) {
    let bytes: Cow<'_, [u8]> = match cipher {
        Some((encrypt, id)) => Cow::Owned(encrypt.encrypt(bytes, id)),
        None => Cow::Borrowed(bytes),
    };
    out.push(b'(');
    for &b in bytes.iter() {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            0x20..=0x7E => out.push(b),
            _ => out.extend_from_slice(format!("\\{b:03o}").as_bytes()),
        }
    }
    out.push(b')');
}
