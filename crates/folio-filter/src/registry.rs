use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::codec::{AsciiHexFilter, Filter, FlateFilter};
use crate::error::{FilterError, FilterResult};

/// Name→codec lookup.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<&'static str, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// A registry with no codecs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with `/FlateDecode` and `/ASCIIHexDecode`.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(FlateFilter::default());
        registry.register(AsciiHexFilter);
        registry
    }

    /// The process-wide standard registry.
    pub fn shared() -> &'static FilterRegistry {
        static SHARED: OnceLock<FilterRegistry> = OnceLock::new();
        SHARED.get_or_init(Self::standard)
    }

    /// Add or replace the codec for `filter.name()`.
    pub fn register(&mut self, filter: impl Filter + 'static) {
        debug!(filter = filter.name(), "registered stream filter");
        self.filters.insert(filter.name(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> FilterResult<&dyn Filter> {
        self.filters
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FilterError::UnsupportedFilter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Sorted codec names.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.filters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn encode(&self, name: &str, data: &[u8]) -> FilterResult<Vec<u8>> {
        self.get(name)?.encode(data)
    }

    pub fn decode(&self, name: &str, data: &[u8]) -> FilterResult<Vec<u8>> {
        self.get(name)?.decode(data)
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}
