//! The identity → object map.

use std::collections::BTreeMap;

use folio_objects::{Array, Dictionary, Item, Resolve};
use folio_schema::Kind;
use folio_types::{ObjectId, TypeError};
use tracing::{debug, warn};

use crate::diagnostics::{ImportOutcome, XrefDiagnostics};
use crate::error::{XrefError, XrefResult};

/// Default cap on traversal depth before nodes are deferred to a later pass.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Owner of every indirect object of one document.
///
/// # Invariants
///
/// - No two entries share an identity.
/// - A composite entry carries the identity it is keyed by.
/// - Freshly allocated numbers are above every number ever registered.
#[derive(Clone, Debug)]
pub struct XrefTable {
    pub(crate) objects: BTreeMap<ObjectId, Item>,
    pub(crate) next_number: u32,
    pub(crate) dead_object: Option<ObjectId>,
    pub(crate) diagnostics: XrefDiagnostics,
    pub(crate) max_depth: usize,
}

impl Default for XrefTable {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_number: 1,
            dead_object: None,
            diagnostics: XrefDiagnostics::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XrefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose closure traversal defers nodes deeper than `max_depth`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
            ..Self::default()
        }
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Live identities in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Item)> {
        self.objects.iter().map(|(id, item)| (*id, item))
    }

    /// Highest live object number, or 0 for an empty table.
    pub fn max_number(&self) -> u32 {
        self.objects.keys().next_back().map_or(0, ObjectId::number)
    }

    pub fn diagnostics(&self) -> &XrefDiagnostics {
        &self.diagnostics
    }

    /// The dead-object sentinel, once a dangling reference has been repaired.
    pub fn dead_object(&self) -> Option<ObjectId> {
        self.dead_object
    }

    // ---------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------

    /// A fresh identity: the next object number, generation 0.
    pub fn allocate_identity(&mut self) -> XrefResult<ObjectId> {
        let number = self.next_number;
        self.next_number = number
            .checked_add(1)
            .ok_or(XrefError::IdentitySpaceExhausted)?;
        Ok(ObjectId::new(number, 0)?)
    }

    fn reserve(&mut self, id: ObjectId) {
        if id.number() >= self.next_number {
            self.next_number = id.number().saturating_add(1);
        }
    }

    /// Register a newly constructed array or dictionary.
    ///
    /// A value without identity receives a fresh one. A value that already
    /// carries an identity keeps it, which must not be live yet.
    pub fn register(&mut self, value: impl Into<Item>) -> XrefResult<ObjectId> {
        let mut item = value.into();
        if item.kind().is_none() {
            return Err(XrefError::NotComposite(item.type_name()));
        }
        let mut id = item.object_id();
        if id.is_none() {
            id = self.allocate_identity()?;
            assign_id(&mut item, id);
        } else if self.objects.contains_key(&id) {
            return Err(XrefError::DuplicateRegistration(id));
        } else {
            self.reserve(id);
        }
        debug!(id = %id, kind = ?item.kind(), "registered object");
        self.objects.insert(id, item);
        Ok(id)
    }

    /// Register an object recovered from a file under its file identity.
    ///
    /// Any item may be indirect in a file. When the identity is already
    /// live the first occurrence wins and the duplicate is counted.
    pub fn register_imported(&mut self, id: ObjectId, mut item: Item) -> XrefResult<ImportOutcome> {
        if id.is_none() {
            return Err(TypeError::MalformedIdentity(0).into());
        }
        if self.objects.contains_key(&id) {
            self.diagnostics.duplicates_ignored += 1;
            warn!(id = %id, "duplicate object in imported file ignored");
            return Ok(ImportOutcome::DuplicateIgnored);
        }
        assign_id(&mut item, id);
        self.reserve(id);
        self.objects.insert(id, item);
        Ok(ImportOutcome::Registered)
    }

    /// Remove an entry. References to it become dangling.
    pub fn remove(&mut self, id: ObjectId) -> Option<Item> {
        if self.dead_object == Some(id) {
            self.dead_object = None;
        }
        self.objects.remove(&id)
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    pub fn resolve(&self, id: ObjectId) -> Option<&Item> {
        self.objects.get(&id)
    }

    pub fn resolve_mut(&mut self, id: ObjectId) -> Option<&mut Item> {
        self.objects.get_mut(&id)
    }

    pub fn dictionary(&self, id: ObjectId) -> Option<&Dictionary> {
        self.resolve(id).and_then(Item::as_dictionary)
    }

    pub fn dictionary_mut(&mut self, id: ObjectId) -> Option<&mut Dictionary> {
        self.resolve_mut(id).and_then(Item::as_dictionary_mut)
    }

    pub fn array(&self, id: ObjectId) -> Option<&Array> {
        self.resolve(id).and_then(Item::as_array)
    }

    pub fn array_mut(&mut self, id: ObjectId) -> Option<&mut Array> {
        self.resolve_mut(id).and_then(Item::as_array_mut)
    }

    /// Run `f` on the dictionary `id` with the rest of the table available
    /// as resolver, so typed accessors can follow references.
    ///
    /// The dictionary is detached from the table while `f` runs; a reference
    /// to itself reads as dangling.
    pub fn with_dictionary_mut<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut Dictionary, &dyn Resolve) -> R,
    ) -> XrefResult<R> {
        let mut item = self.objects.remove(&id).ok_or(XrefError::NotFound(id))?;
        let result = match item.as_dictionary_mut() {
            Some(dict) => Ok(f(dict, &*self)),
            None => Err(XrefError::NotDictionary {
                id,
                found: item.type_name(),
            }),
        };
        self.objects.insert(id, item);
        result
    }

    // ---------------------------------------------------------------
    // Dead-object sentinel
    // ---------------------------------------------------------------

    /// The sentinel identity, registering the sentinel on first use.
    pub(crate) fn ensure_dead_object(&mut self) -> XrefResult<ObjectId> {
        if let Some(id) = self.dead_object.filter(|id| self.objects.contains_key(id)) {
            return Ok(id);
        }
        let mut sentinel = Dictionary::of_kind(Kind::DeadObject);
        sentinel.set_int("/DeadObjectCount", 0)?;
        let id = self.register(sentinel)?;
        self.dead_object = Some(id);
        debug!(id = %id, "registered dead-object sentinel");
        Ok(id)
    }

    /// Add `count` repaired references to the sentinel's counter.
    pub(crate) fn record_repairs(&mut self, count: usize) -> XrefResult<()> {
        if count == 0 {
            return Ok(());
        }
        let id = self.ensure_dead_object()?;
        self.diagnostics.dangling_repaired += count;
        if let Some(sentinel) = self.dictionary_mut(id) {
            let current = sentinel
                .get("/DeadObjectCount")
                .and_then(Item::as_i64)
                .unwrap_or(0);
            let added = i64::try_from(count).unwrap_or(i64::MAX);
            sentinel.set_int("/DeadObjectCount", current.saturating_add(added))?;
        }
        Ok(())
    }

    /// Current value of the sentinel's counter; 0 before any repair.
    pub fn dead_object_count(&self) -> i64 {
        self.dead_object
            .and_then(|id| self.dictionary(id))
            .and_then(|d| d.get("/DeadObjectCount"))
            .and_then(Item::as_i64)
            .unwrap_or(0)
    }
}

impl Resolve for XrefTable {
    fn resolve(&self, id: ObjectId) -> Option<&Item> {
        self.objects.get(&id)
    }
}

pub(crate) fn assign_id(item: &mut Item, id: ObjectId) {
    match item {
        Item::Dictionary(d) => d.assign_id(id),
        Item::Array(a) => a.assign_id(id),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u32) -> ObjectId {
        ObjectId::new(n, 0).unwrap()
    }

    // ---------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------

    #[test]
    fn allocation_is_monotonic() {
        let mut table = XrefTable::new();
        assert_eq!(table.allocate_identity().unwrap(), id(1));
        assert_eq!(table.allocate_identity().unwrap(), id(2));
    }

    #[test]
    fn register_assigns_identity() {
        let mut table = XrefTable::new();
        let a = table.register(Dictionary::new()).unwrap();
        let b = table.register(Array::new()).unwrap();
        assert_eq!((a, b), (id(1), id(2)));
        assert_eq!(table.resolve(a).unwrap().object_id(), a);
    }

    #[test]
    fn register_rejects_primitives() {
        let mut table = XrefTable::new();
        assert!(matches!(
            table.register(Item::Integer(3)),
            Err(XrefError::NotComposite("integer"))
        ));
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut table = XrefTable::new();
        let mut dict = Dictionary::new();
        dict.assign_id(id(7));
        table.register(dict.clone()).unwrap();
        assert!(matches!(
            table.register(dict),
            Err(XrefError::DuplicateRegistration(dup)) if dup == id(7)
        ));
        // Fresh numbers continue above the preset identity.
        assert_eq!(table.allocate_identity().unwrap(), id(8));
    }

    #[test]
    fn imported_duplicates_keep_first() {
        let mut table = XrefTable::new();
        let outcome = table.register_imported(id(3), Item::Integer(1)).unwrap();
        assert_eq!(outcome, ImportOutcome::Registered);
        let outcome = table.register_imported(id(3), Item::Integer(2)).unwrap();
        assert_eq!(outcome, ImportOutcome::DuplicateIgnored);
        assert_eq!(table.resolve(id(3)), Some(&Item::Integer(1)));
        assert_eq!(table.diagnostics().duplicates_ignored, 1);
    }

    #[test]
    fn imported_composites_take_file_identity() {
        let mut table = XrefTable::new();
        table
            .register_imported(id(12), Item::Dictionary(Dictionary::new()))
            .unwrap();
        assert_eq!(table.dictionary(id(12)).unwrap().id(), id(12));
        assert_eq!(table.max_number(), 12);
    }

    // ---------------------------------------------------------------
    // Access
    // ---------------------------------------------------------------

    #[test]
    fn with_dictionary_mut_resolves_through_table() {
        let mut table = XrefTable::new();
        let count = table.register_imported(id(1), Item::Integer(4)).unwrap();
        assert_eq!(count, ImportOutcome::Registered);
        let mut pages = Dictionary::of_kind(Kind::Pages);
        pages.set("/Count", id(1)).unwrap();
        let pages = table.register(pages).unwrap();

        let n = table
            .with_dictionary_mut(pages, |dict, resolver| dict.get_int("/Count", false, resolver))
            .unwrap()
            .unwrap();
        assert_eq!(n, 4);
        assert!(table.contains(pages));
    }

    #[test]
    fn stored_indirect_value_resolves_to_the_registered_object() {
        let mut table = XrefTable::new();
        let mut font = Dictionary::of_kind(Kind::Font);
        font.set_name("/BaseFont", "/Helvetica").unwrap();
        let font = table.register(font).unwrap();

        let mut resources = Dictionary::of_kind(Kind::Resources);
        resources
            .set("/F1", table.dictionary(font).unwrap().clone())
            .unwrap();
        assert_eq!(resources.get("/F1"), Some(&Item::Reference(font)));

        let stored = resources.get("/F1").unwrap();
        let resolved = folio_objects::deref(stored, &table).unwrap();
        assert_eq!(Some(resolved), table.resolve(font));
        let resolved = resolved.as_dictionary().unwrap();
        assert_eq!(resolved.id(), font);
        assert_eq!(resolved.kind(), Kind::Font);
        assert_eq!(
            resolved.lookup_name("/BaseFont", &table).unwrap().unwrap(),
            "/Helvetica"
        );
    }

    #[test]
    fn with_dictionary_mut_on_array_fails_and_keeps_entry() {
        let mut table = XrefTable::new();
        let array = table.register(Array::new()).unwrap();
        let err = table.with_dictionary_mut(array, |_, _| ()).unwrap_err();
        assert!(matches!(err, XrefError::NotDictionary { found: "array", .. }));
        assert!(table.contains(array));
    }

    #[test]
    fn sentinel_counts_repairs() {
        let mut table = XrefTable::new();
        assert_eq!(table.dead_object_count(), 0);
        table.record_repairs(2).unwrap();
        table.record_repairs(1).unwrap();
        assert_eq!(table.dead_object_count(), 3);
        let sentinel = table.dictionary(table.dead_object().unwrap()).unwrap();
        assert_eq!(sentinel.kind(), Kind::DeadObject);
    }

    proptest! {
        // Every successful registration yields a distinct live identity.
        #[test]
        fn identities_stay_unique(ops in proptest::collection::vec((any::<bool>(), 1u32..40), 1..60)) {
            let mut table = XrefTable::new();
            let mut registered = 0usize;
            for (fresh, number) in ops {
                if fresh {
                    table.register(Dictionary::new()).unwrap();
                    registered += 1;
                } else if table.register_imported(id(number), Item::Null).unwrap()
                    == ImportOutcome::Registered
                {
                    registered += 1;
                }
            }
            prop_assert_eq!(table.len(), registered);
            let ids: Vec<_> = table.ids().collect();
            let mut deduped = ids.clone();
            deduped.dedup();
            prop_assert_eq!(ids, deduped);
        }
    }
}
