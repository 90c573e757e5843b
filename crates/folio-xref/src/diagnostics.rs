use serde::{Deserialize, Serialize};

/// Counters for tolerated corruption, exposed to tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XrefDiagnostics {
    /// Imported objects dropped because their identity was already taken.
    pub duplicates_ignored: usize,
    /// References redirected to the dead-object sentinel.
    pub dangling_repaired: usize,
    /// Objects whose traversal was postponed to a later closure pass.
    pub deferred_visits: usize,
}

/// Result of registering an object recovered from an existing file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    Registered,
    /// The identity was already live; the first occurrence was kept.
    DuplicateIgnored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_export_as_json() {
        let diagnostics = XrefDiagnostics {
            duplicates_ignored: 2,
            dangling_repaired: 5,
            deferred_visits: 0,
        };
        let json = serde_json::to_value(diagnostics).unwrap();
        assert_eq!(json["dangling_repaired"], 5);
        let back: XrefDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back, diagnostics);
    }
}
