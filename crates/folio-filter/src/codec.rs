//! Built-in codecs.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{FilterError, FilterResult};

/// A named stream codec.
pub trait Filter: Send + Sync {
    /// The `/Filter` name, e.g. `/FlateDecode`.
    fn name(&self) -> &'static str;

    fn encode(&self, data: &[u8]) -> FilterResult<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> FilterResult<Vec<u8>>;
}

/// `/FlateDecode`: zlib deflate.
#[derive(Clone, Copy, Debug)]
pub struct FlateFilter {
    level: Compression,
}

impl FlateFilter {
    pub const NAME: &'static str = "/FlateDecode";

    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for FlateFilter {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Filter for FlateFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn encode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(data)
            .map_err(|e| FilterError::CompressionFailed(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| FilterError::CompressionFailed(e.to_string()))
    }

    fn decode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| FilterError::DecompressionFailed(e.to_string()))?;
        Ok(out)
    }
}

/// `/ASCIIHexDecode`: upper-case hex digits terminated by `>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiHexFilter;

impl AsciiHexFilter {
    pub const NAME: &'static str = "/ASCIIHexDecode";
}

impl Filter for AsciiHexFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn encode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        let mut out = hex::encode_upper(data).into_bytes();
        out.push(b'>');
        Ok(out)
    }

    /// Whitespace is ignored, `>` ends the data, and an odd trailing digit is
    /// read as if followed by `0`.
    fn decode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        let mut digits: Vec<u8> = data
            .iter()
            .copied()
            .take_while(|&b| b != b'>')
            .filter(|b| !b.is_ascii_whitespace() && *b != 0)
            .collect();
        if digits.len() % 2 == 1 {
            digits.push(b'0');
        }
        hex::decode(&digits).map_err(|e| FilterError::InvalidHex(e.to_string()))
    }
}
