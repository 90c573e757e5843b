use folio_types::ObjectId;

use crate::error::{ObjectError, ObjectResult};
use crate::item::Item;

/// Read access to the indirect objects of a document.
///
/// Typed accessors follow at most one reference hop through this trait.
pub trait Resolve {
    fn resolve(&self, id: ObjectId) -> Option<&Item>;
}

/// Resolver for values that are not attached to any table.
///
/// Every lookup misses, so dereferencing through it reports a dangling
/// reference.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl Resolve for Detached {
    fn resolve(&self, _id: ObjectId) -> Option<&Item> {
        None
    }
}

/// Follow `item` one hop if it is a reference.
pub fn deref<'a>(item: &'a Item, resolver: &'a dyn Resolve) -> ObjectResult<&'a Item> {
    match item {
        Item::Reference(id) => resolver
            .resolve(*id)
            .ok_or(ObjectError::DanglingReference(*id)),
        other => Ok(other),
    }
}
