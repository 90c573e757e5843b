//! Item parser built on [`Lexer`].
//!
//! Nested arrays and dictionaries are assembled on an explicit stack of open
//! containers, mirroring the writer.

use std::collections::VecDeque;

use folio_types::{Name, ObjectId, PdfString};

use crate::array::Array;
use crate::dictionary::Dictionary;
use crate::error::{ObjectError, ObjectResult};
use crate::item::Item;
use crate::lexer::{Lexer, Token};

enum Open {
    Array(Vec<Item>),
    Dictionary {
        entries: Vec<(Name, Item)>,
        key: Option<Name>,
    },
}

/// Parse the first item in `data`.
pub fn parse_item(data: &[u8]) -> ObjectResult<Item> {
    Parser::new(data).parse_item()
}

/// Token stream with the two-token lookahead needed for `N G R`.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    pending: VecDeque<(usize, Token)>,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            pending: VecDeque::new(),
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.lexer.data()
    }

    /// Offset of the next unconsumed token.
    pub fn position(&self) -> usize {
        self.pending
            .front()
            .map_or(self.lexer.position(), |(offset, _)| *offset)
    }

    /// Jump to `pos`, discarding any lookahead.
    pub fn seek(&mut self, pos: usize) {
        self.pending.clear();
        self.lexer.seek(pos);
    }

    pub fn next_token(&mut self) -> ObjectResult<Option<Token>> {
        if let Some((_, token)) = self.pending.pop_front() {
            return Ok(Some(token));
        }
        self.lexer.next_token()
    }

    /// Buffer up to `n` tokens. Lookahead stops quietly at end of input or
    /// at bytes that do not tokenize.
    fn fill(&mut self, n: usize) {
        while self.pending.len() < n {
            self.lexer.skip_whitespace();
            let start = self.lexer.position();
            match self.lexer.next_token() {
                Ok(Some(token)) => self.pending.push_back((start, token)),
                Ok(None) | Err(_) => {
                    self.lexer.seek(start);
                    break;
                }
            }
        }
    }

    fn error(offset: usize, reason: impl Into<String>) -> ObjectError {
        ObjectError::Parse {
            offset,
            reason: reason.into(),
        }
    }

    fn integer_or_reference(&mut self, number: i64, offset: usize) -> ObjectResult<Item> {
        self.fill(2);
        let generation = match (self.pending.front(), self.pending.get(1)) {
            (Some((_, Token::Integer(generation))), Some((_, Token::Keyword(r)))) if r == "R" => {
                *generation
            }
            _ => return Ok(Item::Integer(number)),
        };
        self.pending.drain(..2);
        let number = u32::try_from(number)
            .map_err(|_| Self::error(offset, format!("object number {number} out of range")))?;
        let generation = u16::try_from(generation)
            .map_err(|_| Self::error(offset, format!("generation {generation} out of range")))?;
        Ok(Item::Reference(ObjectId::new(number, generation)?))
    }

    /// Parse one complete item.
    pub fn parse_item(&mut self) -> ObjectResult<Item> {
        let mut stack: Vec<Open> = Vec::new();
        loop {
            let offset = self.position();
            let token = self
                .next_token()?
                .ok_or_else(|| Self::error(offset, "unexpected end of input"))?;
            let value = match token {
                Token::DictStart => {
                    stack.push(Open::Dictionary {
                        entries: Vec::new(),
                        key: None,
                    });
                    continue;
                }
                Token::ArrayStart => {
                    stack.push(Open::Array(Vec::new()));
                    continue;
                }
                Token::DictEnd => match stack.pop() {
                    // A trailing key without a value reads as null, i.e. absent.
                    Some(Open::Dictionary { entries, .. }) => {
                        Item::Dictionary(Dictionary::from_entries(entries))
                    }
                    _ => return Err(Self::error(offset, "unbalanced '>>'")),
                },
                Token::ArrayEnd => match stack.pop() {
                    Some(Open::Array(items)) => Item::Array(Array::from_items(items)),
                    _ => return Err(Self::error(offset, "unbalanced ']'")),
                },
                Token::Integer(number) => self.integer_or_reference(number, offset)?,
                Token::Real(value) => Item::Real(value),
                Token::String(bytes) => Item::String(PdfString::from_bytes(bytes)),
                Token::Name(name) => Item::Name(name),
                Token::Keyword(word) => match word.as_str() {
                    "true" => Item::Boolean(true),
                    "false" => Item::Boolean(false),
                    "null" => Item::Null,
                    other => {
                        return Err(Self::error(offset, format!("unexpected keyword {other:?}")))
                    }
                },
            };

            match stack.last_mut() {
                None => return Ok(value),
                Some(Open::Array(items)) => items.push(value),
                Some(Open::Dictionary { entries, key }) => match key.take() {
                    Some(name) => entries.push((name, value)),
                    None => match value {
                        Item::Name(name) => *key = Some(name),
                        other => {
                            return Err(Self::error(
                                offset,
                                format!("dictionary key must be a name, found {}", other.type_name()),
                            ))
                        }
                    },
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use folio_types::Date;

    use super::*;
    use crate::resolve::Detached;
    use crate::writer::to_bytes;

    fn id(n: u32, g: u16) -> ObjectId {
        ObjectId::new(n, g).unwrap()
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    #[test]
    fn scalars() {
        assert_eq!(parse_item(b"42").unwrap(), Item::Integer(42));
        assert_eq!(parse_item(b" -1.5 ").unwrap(), Item::Real(-1.5));
        assert_eq!(parse_item(b"true").unwrap(), Item::Boolean(true));
        assert_eq!(parse_item(b"null").unwrap(), Item::Null);
        assert_eq!(
            parse_item(b"(hi)").unwrap(),
            Item::String(PdfString::from("hi"))
        );
    }

    #[test]
    fn references_need_the_r_keyword() {
        assert_eq!(parse_item(b"12 3 R").unwrap(), Item::Reference(id(12, 3)));
        let array = parse_item(b"[1 2 3]").unwrap();
        assert_eq!(array.as_array().unwrap().len(), 3);
        let array = parse_item(b"[1 0 R 2]").unwrap();
        let array = array.as_array().unwrap();
        assert_eq!(array.get(0), Some(&Item::Reference(id(1, 0))));
        assert_eq!(array.get(1), Some(&Item::Integer(2)));
    }

    #[test]
    fn zero_object_number_is_rejected() {
        assert!(matches!(parse_item(b"0 0 R"), Err(ObjectError::Type(_))));
    }

    #[test]
    fn nested_dictionary() {
        let item = parse_item(b"<< /Type /Page /Kids [ 4 0 R ] /Res << /F /F1 >> >>").unwrap();
        let dict = item.as_dictionary().unwrap();
        assert_eq!(dict.get("/Type").and_then(Item::as_name).unwrap(), "/Page");
        let res = dict.get("/Res").and_then(Item::as_dictionary).unwrap();
        assert!(res.contains_key("/F"));
    }

    #[test]
    fn written_items_parse_back() {
        let source = b"<< /A [ 1 2.5 (x\\)y) /N#20ame ] /B << /C true >> /D 7 0 R /E null >>";
        let item = parse_item(source).unwrap();
        let rewritten = to_bytes(&item);
        assert_eq!(parse_item(&rewritten).unwrap(), item);
    }

    #[test]
    fn non_utf8_name_bytes_survive_writing() {
        let item = parse_item(b"/F#E9").unwrap();
        let name = item.as_name().unwrap();
        assert_eq!(name.as_bytes(), &[b'/', b'F', 0xE9]);
        assert_eq!(to_bytes(&item), b"/F#E9");
    }

    #[test]
    fn deep_nesting_parses_without_recursion() {
        let mut text = "[".repeat(1_000);
        text.push_str(&"]".repeat(1_000));
        let item = parse_item(text.as_bytes()).unwrap();
        let mut depth = 0;
        let mut current = &item;
        while let Item::Array(array) = current {
            depth += 1;
            match array.get(0) {
                Some(next) => current = next,
                None => break,
            }
        }
        assert_eq!(depth, 1_000);
    }

    // ------------------------------------------------------------------
    // Errors and positioning
    // ------------------------------------------------------------------

    #[test]
    fn non_name_key_is_an_error() {
        assert!(matches!(
            parse_item(b"<< 1 2 >>"),
            Err(ObjectError::Parse { .. })
        ));
    }

    #[test]
    fn unbalanced_close_is_an_error() {
        assert!(parse_item(b"]").is_err());
        assert!(parse_item(b"[ 1 >>").is_err());
        assert!(parse_item(b"[ 1").is_err());
    }

    #[test]
    fn lookahead_is_returned_to_the_stream() {
        let mut parser = Parser::new(b"5 endobj");
        assert_eq!(parser.parse_item().unwrap(), Item::Integer(5));
        assert_eq!(parser.position(), 2);
        assert_eq!(
            parser.next_token().unwrap(),
            Some(Token::Keyword("endobj".into()))
        );
    }

    #[test]
    fn position_after_dictionary_points_at_stream_keyword() {
        let data = b"<< /Length 3 >>\nstream\nabc";
        let mut parser = Parser::new(data);
        parser.parse_item().unwrap();
        assert_eq!(
            parser.next_token().unwrap(),
            Some(Token::Keyword("stream".into()))
        );
        assert_eq!(&data[parser.position()..], b"\nabc");
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    proptest! {
        #[test]
        fn any_string_survives_writing(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let item = Item::String(PdfString::from_bytes(bytes.clone()));
            let parsed = parse_item(&to_bytes(&item)).unwrap();
            prop_assert_eq!(parsed.as_string().map(PdfString::as_bytes), Some(&bytes[..]));
        }

        #[test]
        fn any_name_survives_writing(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let mut raw = vec![b'/'];
            raw.extend_from_slice(&bytes);
            let name = Name::new(raw.clone()).unwrap();
            let parsed = parse_item(&to_bytes(&Item::Name(name))).unwrap();
            prop_assert_eq!(parsed.as_name().map(Name::as_bytes), Some(&raw[..]));
        }

        #[test]
        fn primitives_read_back_through_typed_accessors(
            flag in any::<bool>(),
            integer in any::<i64>(),
            mantissa in -999_999i32..=999_999,
            scale in 0u32..=3,
            name in "/[A-Za-z0-9#() ]{0,12}",
            (year, month, day) in (1000i32..=9999, 1u32..=12, 1u32..=28),
            (hour, minute, second) in (0u32..24, 0u32..60, 0u32..60),
            offset_minutes in -(11 * 60)..=(11 * 60i32),
        ) {
            let real = f64::from(mantissa) / 10f64.powi(scale as i32);
            let sign = if offset_minutes < 0 { '-' } else { '+' };
            let offset = offset_minutes.unsigned_abs();
            let date = Date::parse(&format!(
                "D:{year:04}{month:02}{day:02}{hour:02}{minute:02}{second:02}{sign}{:02}'{:02}'",
                offset / 60,
                offset % 60
            ))
            .unwrap();

            let mut dict = Dictionary::new();
            dict.set("/B", flag).unwrap();
            dict.set("/I", integer).unwrap();
            dict.set("/R", real).unwrap();
            dict.set_name("/N", &name).unwrap();
            dict.set("/D", date).unwrap();

            let parsed = parse_item(&to_bytes(&Item::from(dict))).unwrap();
            let parsed = parsed.as_dictionary().unwrap();
            prop_assert_eq!(parsed.lookup_bool("/B", &Detached).unwrap(), Some(flag));
            prop_assert_eq!(parsed.lookup_int("/I", &Detached).unwrap(), Some(integer));
            prop_assert_eq!(parsed.lookup_real("/R", &Detached).unwrap(), Some(real));
            prop_assert_eq!(
                parsed.lookup_name("/N", &Detached).unwrap(),
                Some(Name::new(name.as_str()).unwrap())
            );
            prop_assert_eq!(parsed.lookup_datetime("/D", &Detached).unwrap(), Some(date));
        }

        #[test]
        fn deep_nesting_parses_back(depth in 1usize..200, leaf in any::<i64>()) {
            let mut item = Item::Integer(leaf);
            for _ in 0..depth {
                item = Item::Array(Array::from_items([item]));
            }
            prop_assert_eq!(parse_item(&to_bytes(&item)).unwrap(), item);
        }
    }
}
