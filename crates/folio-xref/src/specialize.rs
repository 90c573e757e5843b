//! Schema-driven promotion of generic values.
//!
//! The table maps identities to [`Item`] variants, so promoting an indirect
//! value is a table update: the entry is taken out, re-tagged with its new
//! kind and put back under the same identity. The element storage moves
//! with it; nothing is copied.

use folio_objects::{Array, Dictionary, Item, ObjectError};
use folio_schema::{lookup, KeyDescriptor, Kind};
use folio_types::ObjectId;
use tracing::debug;

use crate::error::{XrefError, XrefResult};
use crate::table::XrefTable;

/// Where a specialized value lives after [`XrefTable::specialized_value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// An entry of the table, referenced from the owner.
    Indirect(ObjectId),
    /// Stored by value inside the owner.
    Direct,
}

impl XrefTable {
    /// Promote the entry `id` to `kind`.
    ///
    /// A generic value moves to any kind of the same shape. Promoting to
    /// the kind it already has is a no-op. Any other change fails with
    /// [`ObjectError::IncompatibleKind`] and leaves the entry as it was.
    pub fn specialize(&mut self, id: ObjectId, kind: Kind) -> XrefResult<()> {
        let item = self.objects.remove(&id).ok_or(XrefError::NotFound(id))?;
        let before = item.kind();
        match item.specialize("", kind) {
            Ok(item) => {
                if before != Some(kind) {
                    debug!(id = %id, ?kind, "specialized object");
                }
                self.objects.insert(id, item);
                Ok(())
            }
            Err((item, err)) => {
                self.objects.insert(id, item);
                Err(err.into())
            }
        }
    }

    /// Fetch the composite under `key` of the dictionary entry `owner`,
    /// promoted to the kind its schema declares.
    ///
    /// With `create`, an absent value is constructed: registered and stored
    /// as a reference when the schema requires an indirect value, stored
    /// by value otherwise. Returns `None` when the value is absent and not
    /// created, or when the schema declares a non-composite type.
    pub fn specialized_value(
        &mut self,
        owner: ObjectId,
        key: &str,
        create: bool,
    ) -> XrefResult<Option<Slot>> {
        let mut item = self.objects.remove(&owner).ok_or(XrefError::NotFound(owner))?;
        let result = match item.as_dictionary_mut() {
            Some(dict) => self.specialized_direct_value(dict, key, create),
            None => Err(XrefError::NotDictionary {
                id: owner,
                found: item.type_name(),
            }),
        };
        self.objects.insert(owner, item);
        result
    }

    /// [`XrefTable::specialized_value`] for an owner that is not itself an
    /// entry of the table, such as the trailer.
    pub fn specialized_direct_value(
        &mut self,
        owner: &mut Dictionary,
        key: &str,
        create: bool,
    ) -> XrefResult<Option<Slot>> {
        let descriptor = lookup(owner.kind(), key);
        let target = match descriptor {
            Some(descriptor) => match descriptor.resolved_type() {
                Some(kind) => Some(kind),
                None if descriptor.key_type.is_union() => None,
                None => return Ok(None),
            },
            None => None,
        };

        match owner.get(key) {
            None | Some(Item::Null) => {}
            Some(Item::Reference(id)) => {
                let id = *id;
                if id == owner.id() {
                    if let Some(kind) = target {
                        promote_in_place(owner, key, kind)?;
                    }
                    return Ok(Some(Slot::Indirect(id)));
                }
                if !self.contains(id) {
                    return Err(ObjectError::DanglingReference(id).into());
                }
                if let Some(kind) = target {
                    self.specialize(id, kind)?;
                }
                return Ok(Some(Slot::Indirect(id)));
            }
            Some(_) => {
                if let Some(kind) = target {
                    owner.specialize_direct(key, kind)?;
                }
                return Ok(Some(Slot::Direct));
            }
        }

        if !create || descriptor.is_some_and(|d| d.key_type.is_union()) {
            return Ok(None);
        }
        let kind = target.unwrap_or(Kind::Dictionary);
        let value = construct(kind);
        if descriptor.is_some_and(KeyDescriptor::must_be_indirect) {
            let id = self.register(value)?;
            owner.set(key, id)?;
            debug!(id = %id, key, ?kind, "created indirect value");
            Ok(Some(Slot::Indirect(id)))
        } else {
            owner.set(key, value)?;
            Ok(Some(Slot::Direct))
        }
    }
}

/// A fresh, empty composite of `kind`.
fn construct(kind: Kind) -> Item {
    if kind.is_array() {
        return Array::of_kind(kind).into();
    }
    let mut dict = Dictionary::of_kind(kind);
    if kind == Kind::Stream {
        dict.attach_stream(Vec::new());
    }
    dict.into()
}

/// A value that references its own holder is promoted where it stands.
fn promote_in_place(owner: &mut Dictionary, key: &str, kind: Kind) -> XrefResult<()> {
    let item = Item::Dictionary(std::mem::take(owner));
    let (item, result) = match item.specialize(key, kind) {
        Ok(item) => (item, Ok(())),
        Err((item, err)) => (item, Err(err.into())),
    };
    if let Item::Dictionary(dict) = item {
        *owner = dict;
    }
    result
}
