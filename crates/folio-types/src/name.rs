//! Name tokens.
//!
//! A name always carries its leading `/` sentinel; constructing one without it
//! is a caller error. Bytes stored here are the decoded form: `#xx` escapes
//! are resolved by the parser and re-applied by the writer. Names are byte
//! strings, so a decoded `#E9` stays the single byte `0xE9`.

use std::borrow::{Borrow, Cow};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A name token such as `/Type` or `/MediaBox`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name(Vec<u8>);

impl Name {
    /// Create a name, rejecting bytes without the leading `/`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TypeError> {
        let bytes = bytes.into();
        if bytes.first() != Some(&b'/') {
            return Err(TypeError::InvalidName(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        Ok(Self(bytes))
    }

    /// Name from a literal known to carry the leading `/`.
    ///
    /// # Panics
    ///
    /// Panics if `text` does not start with `/`.
    pub fn from_static(text: &'static str) -> Self {
        assert!(text.starts_with('/'), "name literal {text:?} lacks the leading slash");
        Self(text.as_bytes().to_vec())
    }

    /// Full byte string including the leading `/`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Bytes without the leading `/`.
    pub fn bare(&self) -> &[u8] {
        &self.0[1..]
    }

    /// Text form for messages and registry lookups; invalid UTF-8 is replaced.
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.to_text())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Borrow<[u8]> for Name {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Name {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&str> for Name {
    type Error = TypeError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_leading_slash() {
        assert!(Name::new("/Type").is_ok());
        assert_eq!(
            Name::new("Type").unwrap_err(),
            TypeError::InvalidName("Type".into())
        );
        assert!(Name::new(Vec::new()).is_err());
    }

    #[test]
    fn bare_strips_sentinel() {
        let name = Name::new("/MediaBox").unwrap();
        assert_eq!(name.bare(), b"MediaBox");
        assert_eq!(name.as_bytes(), b"/MediaBox");
    }

    #[test]
    fn empty_name_is_legal() {
        let name = Name::new("/").unwrap();
        assert!(name.bare().is_empty());
    }

    #[test]
    fn compares_with_str() {
        let name = Name::new("/Page").unwrap();
        assert_eq!(name, "/Page");
    }

    #[test]
    fn keeps_non_utf8_bytes() {
        let name = Name::new(vec![b'/', b'F', 0xE9]).unwrap();
        assert_eq!(name.bare(), &[b'F', 0xE9]);
        assert_ne!(name, Name::new("/F\u{FFFD}").unwrap());
        assert_eq!(name.to_text(), "/F\u{FFFD}");
    }
}
