use folio_schema::PdfVersion;
use folio_xref::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

use crate::error::DocumentResult;

/// Configuration for the save pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Version written in the header marker.
    pub version: PdfVersion,
    /// Drop unreachable objects and renumber the survivors densely.
    pub compact: bool,
    /// Apply `/FlateDecode` to unfiltered streams while preparing.
    pub compress_streams: bool,
    /// Emit a trailer `/ID` derived from a BLAKE3 digest of the body.
    pub generate_id: bool,
    /// Depth at which closure traversal defers nodes to a later pass.
    pub max_traversal_depth: usize,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            version: PdfVersion::default(),
            compact: true,
            compress_streams: false,
            generate_id: true,
            max_traversal_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SaveOptions {
    /// Write the object graph as it stands: no compaction, no `/ID`, no
    /// compression.
    pub fn permissive() -> Self {
        Self {
            compact: false,
            compress_streams: false,
            generate_id: false,
            ..Default::default()
        }
    }

    /// Load options from TOML. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> DocumentResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = SaveOptions::default();
        assert_eq!(options.version, PdfVersion::V1_7);
        assert!(options.compact);
        assert!(!options.compress_streams);
        assert!(options.generate_id);
        assert_eq!(options.max_traversal_depth, 100);
    }

    #[test]
    fn permissive_turns_everything_off() {
        let options = SaveOptions::permissive();
        assert!(!options.compact);
        assert!(!options.generate_id);
        assert_eq!(options.version, PdfVersion::V1_7);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let options = SaveOptions::from_toml_str(
            r#"
            version = "1.4"
            compress_streams = true
            "#,
        )
        .unwrap();
        assert_eq!(options.version, PdfVersion::V1_4);
        assert!(options.compress_streams);
        assert!(options.compact);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = SaveOptions::from_toml_str("compact = \"sometimes\"").unwrap_err();
        assert!(matches!(err, crate::error::DocumentError::Config(_)));
    }
}
