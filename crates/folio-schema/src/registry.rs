use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::descriptor::KeyDescriptor;
use crate::kind::Kind;
use crate::tables::declared_keys;

/// Lookup table for the keys of one dictionary kind.
#[derive(Debug)]
pub struct SchemaRegistry {
    kind: Kind,
    keys: HashMap<&'static str, KeyDescriptor>,
}

impl SchemaRegistry {
    /// Build a registry by walking the kind's declared key table.
    pub fn build(kind: Kind) -> Self {
        let keys = declared_keys(kind)
            .iter()
            .map(|descriptor| (descriptor.key, *descriptor))
            .collect::<HashMap<_, _>>();
        debug!(kind = %kind, keys = keys.len(), "built schema registry");
        Self { kind, keys }
    }

    /// The kind this registry describes.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn lookup(&self, key: &str) -> Option<&KeyDescriptor> {
        self.keys.get(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All descriptors, sorted by key for deterministic iteration.
    pub fn descriptors(&self) -> Vec<&KeyDescriptor> {
        let mut all: Vec<&KeyDescriptor> = self.keys.values().collect();
        all.sort_by_key(|d| d.key);
        all
    }

    /// Keys flagged as required, sorted.
    pub fn required_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .keys
            .values()
            .filter(|d| d.is_required())
            .map(|d| d.key)
            .collect();
        keys.sort_unstable();
        keys
    }
}

static REGISTRIES: [OnceLock<SchemaRegistry>; Kind::COUNT] =
    [const { OnceLock::new() }; Kind::COUNT];

/// The process-wide registry for `kind`, built on first use.
///
/// Safe to call concurrently: the first caller for a kind builds the table,
/// everyone else reads the published value.
pub fn schema_for(kind: Kind) -> &'static SchemaRegistry {
    REGISTRIES[kind.index()].get_or_init(|| SchemaRegistry::build(kind))
}

/// Shorthand for `schema_for(kind).lookup(key)`.
pub fn lookup(kind: Kind, key: &str) -> Option<&'static KeyDescriptor> {
    schema_for(kind).lookup(key)
}
