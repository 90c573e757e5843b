use folio_schema::Kind;
use folio_types::{Name, ObjectId};

use crate::coerce::{self, coerce};
use crate::error::{ObjectError, ObjectResult};
use crate::item::Item;
use crate::resolve::Resolve;

/// Index→value element store.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    id: ObjectId,
    kind: Kind,
    elements: Vec<Item>,
}

impl Default for Array {
    fn default() -> Self {
        Self {
            id: ObjectId::NONE,
            kind: Kind::Array,
            elements: Vec::new(),
        }
    }
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty array tagged with `kind`.
    pub fn of_kind(kind: Kind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Build from values, normalizing indirect composites to references.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            elements: items.into_iter().map(Item::into_element).collect(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Set the identity. Called by the object table on registration and
    /// renumbering.
    pub fn assign_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn into_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.elements.get_mut(index)
    }

    pub fn push(&mut self, value: impl Into<Item>) {
        self.elements.push(value.into().into_element());
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Item>) -> ObjectResult<()> {
        if index > self.elements.len() {
            return Err(self.out_of_bounds(index));
        }
        self.elements.insert(index, value.into().into_element());
        Ok(())
    }

    /// Replace the value at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: impl Into<Item>) -> ObjectResult<Item> {
        let err = self.out_of_bounds(index);
        let slot = self.elements.get_mut(index).ok_or(err)?;
        Ok(std::mem::replace(slot, value.into().into_element()))
    }

    pub fn remove(&mut self, index: usize) -> ObjectResult<Item> {
        if index >= self.elements.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.elements.remove(index))
    }

    /// Remove every element equal to `value`. Returns how many were removed.
    pub fn remove_value(&mut self, value: &Item) -> usize {
        let before = self.elements.len();
        self.elements.retain(|item| item != value);
        before - self.elements.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.elements.iter()
    }

    /// Mutable access to the stored values.
    ///
    /// Values written through this iterator bypass reference normalization.
    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, Item> {
        self.elements.iter_mut()
    }

    fn out_of_bounds(&self, index: usize) -> ObjectError {
        ObjectError::IndexOutOfBounds {
            index,
            len: self.elements.len(),
        }
    }

    // ------------------------------------------------------------------
    // Indexed typed getters
    // ------------------------------------------------------------------

    fn at<T>(
        &self,
        index: usize,
        resolver: &dyn Resolve,
        expected: &'static str,
        convert: impl FnOnce(&Item) -> Option<T>,
    ) -> ObjectResult<Option<T>> {
        let item = self.elements.get(index).ok_or(self.out_of_bounds(index))?;
        coerce(&format!("[{index}]"), item, resolver, expected, convert)
    }

    pub fn int_at(&self, index: usize, resolver: &dyn Resolve) -> ObjectResult<Option<i64>> {
        self.at(index, resolver, "integer", coerce::to_int)
    }

    pub fn real_at(&self, index: usize, resolver: &dyn Resolve) -> ObjectResult<Option<f64>> {
        self.at(index, resolver, "real", coerce::to_real)
    }

    pub fn name_at(&self, index: usize, resolver: &dyn Resolve) -> ObjectResult<Option<Name>> {
        self.at(index, resolver, "name", coerce::to_name)
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::resolve::Detached;

    fn id(n: u32) -> ObjectId {
        ObjectId::new(n, 0).unwrap()
    }

    #[test]
    fn push_normalizes_indirect_values() {
        let mut dict = Dictionary::new();
        dict.assign_id(id(5));
        let mut array = Array::new();
        array.push(dict);
        array.push(Dictionary::new());
        assert_eq!(array.get(0), Some(&Item::Reference(id(5))));
        assert!(matches!(array.get(1), Some(Item::Dictionary(_))));
    }

    #[test]
    fn bounds_are_checked() {
        let mut array = Array::from_items([Item::Integer(1)]);
        assert!(matches!(
            array.remove(3),
            Err(ObjectError::IndexOutOfBounds { index: 3, len: 1 })
        ));
        assert!(array.insert(2, 0).is_err());
        array.insert(1, 2).unwrap();
        assert_eq!(array.set(0, 9).unwrap(), Item::Integer(1));
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn typed_getters_coerce() {
        let name = Name::new("/F1").unwrap();
        let array = Array::from_items([Item::Integer(3), Item::Name(name.clone()), Item::Null]);
        assert_eq!(array.int_at(0, &Detached).unwrap(), Some(3));
        assert_eq!(array.real_at(0, &Detached).unwrap(), Some(3.0));
        assert_eq!(array.name_at(1, &Detached).unwrap(), Some(name));
        assert_eq!(array.int_at(2, &Detached).unwrap(), None);
        assert!(matches!(
            array.int_at(1, &Detached),
            Err(ObjectError::TypeMismatch { found: "name", .. })
        ));
    }

    #[test]
    fn remove_value_drops_all_matches() {
        let mut array = Array::from_items([Item::Reference(id(1)), Item::Reference(id(2)), Item::Reference(id(1))]);
        assert_eq!(array.remove_value(&Item::Reference(id(1))), 2);
        assert_eq!(array.len(), 1);
    }
}
