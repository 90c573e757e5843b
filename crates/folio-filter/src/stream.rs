//! Filter operations on stream dictionaries.
//!
//! The stored payload is always the encoded form named by `/Filter`. Reading
//! the decoded view never changes it; only [`StreamFilters::apply_filter`]
//! and [`StreamFilters::try_remove_filter`] do.

use folio_objects::{Array, Dictionary, Item, ObjectError};
use folio_types::Name;
use tracing::debug;

use crate::error::{FilterError, FilterResult};
use crate::registry::FilterRegistry;

pub trait StreamFilters {
    /// Filter names in decoding order. Empty when no `/Filter` is set.
    fn filter_chain(&self) -> FilterResult<Vec<Name>>;

    /// Encode the payload with `name` and record it as the first filter of
    /// the chain.
    fn apply_filter(&mut self, name: &str, registry: &FilterRegistry) -> FilterResult<()>;

    /// Decode the whole chain and store the plain payload. Returns `false`,
    /// leaving everything untouched, when any filter cannot be decoded.
    fn try_remove_filter(&mut self, registry: &FilterRegistry) -> bool;

    /// The plain payload, without touching the stored bytes.
    fn decoded_bytes(&self, registry: &FilterRegistry) -> FilterResult<Vec<u8>>;
}

impl StreamFilters for Dictionary {
    fn filter_chain(&self) -> FilterResult<Vec<Name>> {
        match self.get("/Filter") {
            None | Some(Item::Null) => Ok(Vec::new()),
            Some(Item::Name(name)) => Ok(vec![name.clone()]),
            Some(Item::Array(names)) => names
                .iter()
                .map(|item| {
                    item.as_name()
                        .cloned()
                        .ok_or(FilterError::MalformedFilterEntry(item.type_name()))
                })
                .collect(),
            Some(other) => Err(FilterError::MalformedFilterEntry(other.type_name())),
        }
    }

    fn apply_filter(&mut self, name: &str, registry: &FilterRegistry) -> FilterResult<()> {
        let filter = registry.get(name)?;
        let encoded = filter.encode(self.stream().ok_or(FilterError::NoStream)?)?;

        let mut chain = self.filter_chain()?;
        chain.insert(0, Name::new(filter.name()).map_err(ObjectError::from)?);

        if let Some(parms) = self.remove("/DecodeParms") {
            let realigned = match parms {
                Item::Array(mut parms) => {
                    parms.insert(0, Item::Null)?;
                    parms
                }
                single => Array::from_items([Item::Null, single]),
            };
            self.set("/DecodeParms", realigned)?;
        }

        let filter_entry = if chain.len() == 1 {
            Item::Name(chain.remove(0))
        } else {
            Item::Array(Array::from_items(chain.into_iter().map(Item::Name)))
        };
        self.set("/Filter", filter_entry)?;

        let before = self.stream().map_or(0, <[u8]>::len);
        debug!(filter = name, before, after = encoded.len(), "applied stream filter");
        self.attach_stream(encoded);
        Ok(())
    }

    fn try_remove_filter(&mut self, registry: &FilterRegistry) -> bool {
        match self.decoded_bytes(registry) {
            Ok(plain) => {
                self.remove("/Filter");
                self.remove("/DecodeParms");
                self.attach_stream(plain);
                true
            }
            Err(err) => {
                debug!(error = %err, "stream filter left in place");
                false
            }
        }
    }

    fn decoded_bytes(&self, registry: &FilterRegistry) -> FilterResult<Vec<u8>> {
        let mut data = self.stream().ok_or(FilterError::NoStream)?.to_vec();
        for (index, name) in self.filter_chain()?.iter().enumerate() {
            if let Some(predictor) = predictor(self, index) {
                return Err(FilterError::UnsupportedFilter(format!(
                    "{name} with /Predictor {predictor}"
                )));
            }
            data = registry.decode(&name.to_text(), &data)?;
        }
        Ok(data)
    }
}

/// A `/Predictor` above 1 in the decode parameters of filter `index`.
fn predictor(dict: &Dictionary, index: usize) -> Option<i64> {
    let parms = match dict.get("/DecodeParms")? {
        Item::Dictionary(parms) if index == 0 => parms,
        Item::Array(all) => all.get(index)?.as_dictionary()?,
        _ => return None,
    };
    parms
        .get("/Predictor")
        .and_then(Item::as_i64)
        .filter(|&p| p > 1)
}
