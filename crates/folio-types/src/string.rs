use std::fmt;

use serde::{Deserialize, Serialize};

/// A byte string.
///
/// Strings in the file format are byte sequences; the text interpretation is
/// left to [`PdfString::to_text`], which understands UTF-16BE with a byte
/// order mark and falls back to Latin-1.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PdfString(Vec<u8>);

impl PdfString {
    /// Wrap raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Encode text. ASCII-only text is stored as-is, anything else as
    /// UTF-16BE with a byte order mark.
    pub fn from_text(text: &str) -> Self {
        if text.is_ascii() {
            return Self(text.as_bytes().to_vec());
        }
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode to text.
    pub fn to_text(&self) -> String {
        if self.0.starts_with(&[0xFE, 0xFF]) {
            let units: Vec<u16> = self.0[2..]
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            return String::from_utf16_lossy(&units);
        }
        self.0.iter().map(|&b| b as char).collect()
    }
}

impl fmt::Debug for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdfString({:?})", self.to_text())
    }
}

impl From<&str> for PdfString {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_roundtrip() {
        let s = PdfString::from_text("Hello");
        assert_eq!(s.as_bytes(), b"Hello");
        assert_eq!(s.to_text(), "Hello");
    }

    #[test]
    fn unicode_text_uses_utf16_bom() {
        let s = PdfString::from_text("Grüße ✓");
        assert_eq!(&s.as_bytes()[..2], &[0xFE, 0xFF]);
        assert_eq!(s.to_text(), "Grüße ✓");
    }

    #[test]
    fn latin1_fallback() {
        let s = PdfString::from_bytes(vec![0x41, 0xE9]);
        assert_eq!(s.to_text(), "Aé");
    }
}
