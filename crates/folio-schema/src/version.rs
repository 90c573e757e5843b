use std::fmt;

use serde::{Deserialize, Serialize};

/// File format version, used both for the header marker and for the
/// "introduced in" metadata of schema keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PdfVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
    #[serde(rename = "1.2")]
    V1_2,
    #[serde(rename = "1.3")]
    V1_3,
    #[serde(rename = "1.4")]
    V1_4,
    #[serde(rename = "1.5")]
    V1_5,
    #[serde(rename = "1.6")]
    V1_6,
    #[serde(rename = "1.7")]
    V1_7,
    #[serde(rename = "2.0")]
    V2_0,
}

impl PdfVersion {
    /// `(major, minor)` pair.
    pub const fn parts(&self) -> (u8, u8) {
        match self {
            Self::V1_0 => (1, 0),
            Self::V1_1 => (1, 1),
            Self::V1_2 => (1, 2),
            Self::V1_3 => (1, 3),
            Self::V1_4 => (1, 4),
            Self::V1_5 => (1, 5),
            Self::V1_6 => (1, 6),
            Self::V1_7 => (1, 7),
            Self::V2_0 => (2, 0),
        }
    }

    /// Parse `"1.7"`-style text.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "1.0" => Some(Self::V1_0),
            "1.1" => Some(Self::V1_1),
            "1.2" => Some(Self::V1_2),
            "1.3" => Some(Self::V1_3),
            "1.4" => Some(Self::V1_4),
            "1.5" => Some(Self::V1_5),
            "1.6" => Some(Self::V1_6),
            "1.7" => Some(Self::V1_7),
            "2.0" => Some(Self::V2_0),
            _ => None,
        }
    }

    /// The header line, e.g. `%PDF-1.7`.
    pub fn header(&self) -> String {
        format!("%PDF-{self}")
    }
}

impl Default for PdfVersion {
    fn default() -> Self {
        Self::V1_7
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.parts();
        write!(f, "{major}.{minor}")
    }
}
