//! Byte-level tokenizer for the object syntax.

use folio_types::Name;

use crate::error::{ObjectError, ObjectResult};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Integer(i64),
    Real(f64),
    Name(Name),
    /// Literal or hex string, already unescaped.
    String(Vec<u8>),
    DictStart,
    DictEnd,
    ArrayStart,
    ArrayEnd,
    /// Bare word: `true`, `null`, `R`, `obj`, `stream`, `trailer`, …
    Keyword(String),
}

pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, 0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

pub(crate) fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// Cursor over a byte buffer yielding [`Token`]s.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    fn error(&self, reason: impl Into<String>) -> ObjectError {
        ObjectError::Parse {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Skip whitespace and `%` comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> ObjectResult<Option<Token>> {
        self.skip_whitespace();
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        let token = match b {
            b'/' => {
                self.pos += 1;
                self.name()?
            }
            b'(' => {
                self.pos += 1;
                Token::String(self.literal_string()?)
            }
            b'<' if self.data.get(self.pos + 1) == Some(&b'<') => {
                self.pos += 2;
                Token::DictStart
            }
            b'<' => {
                self.pos += 1;
                Token::String(self.hex_string()?)
            }
            b'>' if self.data.get(self.pos + 1) == Some(&b'>') => {
                self.pos += 2;
                Token::DictEnd
            }
            b'[' => {
                self.pos += 1;
                Token::ArrayStart
            }
            b']' => {
                self.pos += 1;
                Token::ArrayEnd
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.number()?,
            b if is_regular(b) => {
                let word = self.regular_run();
                Token::Keyword(String::from_utf8_lossy(word).into_owned())
            }
            other => return Err(self.error(format!("unexpected byte 0x{other:02X}"))),
        };
        Ok(Some(token))
    }

    fn regular_run(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        &self.data[start..self.pos]
    }

    fn number(&mut self) -> ObjectResult<Token> {
        let run = self.regular_run();
        let text = std::str::from_utf8(run).map_err(|_| self.error("non-ascii number"))?;
        if !text.contains('.') {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Token::Integer(value));
            }
        }
        text.parse::<f64>()
            .map(Token::Real)
            .map_err(|_| self.error(format!("malformed number {text:?}")))
    }

    fn name(&mut self) -> ObjectResult<Token> {
        let run = self.regular_run();
        let mut decoded = Vec::with_capacity(run.len() + 1);
        decoded.push(b'/');
        let mut i = 0;
        while i < run.len() {
            if run[i] == b'#' {
                if let Some(byte) = run
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                {
                    decoded.push(byte);
                    i += 3;
                    continue;
                }
            }
            decoded.push(run[i]);
            i += 1;
        }
        Ok(Token::Name(Name::new(decoded)?))
    }

    fn literal_string(&mut self) -> ObjectResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut depth = 1usize;
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated string"));
            };
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out)?,
                _ => out.push(b),
            }
        }
    }

    fn escape(&mut self, out: &mut Vec<u8>) -> ObjectResult<()> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;
        match b {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            // Line continuation.
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn hex_string(&mut self) -> ObjectResult<Vec<u8>> {
        let mut digits = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated hex string"));
            };
            self.pos += 1;
            match b {
                b'>' => break,
                b if is_whitespace(b) => {}
                b if b.is_ascii_hexdigit() => digits.push(b),
                other => return Err(self.error(format!("invalid hex digit 0x{other:02X}"))),
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(b'0');
        }
        Ok(digits
            .chunks_exact(2)
            .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
            .collect())
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
