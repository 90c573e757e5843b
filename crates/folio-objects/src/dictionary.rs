use std::collections::BTreeMap;

use folio_schema::Kind;
use folio_types::{Date, Matrix, Name, ObjectId, PdfString, Rectangle};
use tracing::debug;

use crate::array::Array;
use crate::coerce::{self, coerce};
use crate::error::ObjectResult;
use crate::item::Item;
use crate::resolve::Resolve;

/// Key→value element store, optionally carrying a stream payload.
///
/// Keys are kept sorted so serialization is deterministic. Values that are
/// indirect composites are stored as references to their identity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    id: ObjectId,
    kind: Kind,
    elements: BTreeMap<Name, Item>,
    stream: Option<Vec<u8>>,
}

impl Dictionary {
    /// An empty generic dictionary with no identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty dictionary of `kind`, with `/Type` set when the kind has a
    /// type name.
    pub fn of_kind(kind: Kind) -> Self {
        let mut dict = Self {
            kind,
            ..Self::default()
        };
        if let Some(type_name) = kind.type_name() {
            dict.elements
                .insert(Name::from_static("/Type"), Item::Name(Name::from_static(type_name)));
        }
        dict
    }

    /// Build from parsed entries without touching identities.
    pub fn from_entries(entries: impl IntoIterator<Item = (Name, Item)>) -> Self {
        Self {
            elements: entries
                .into_iter()
                .map(|(k, v)| (k, v.into_element()))
                .collect(),
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

    /// Same identity, contents and stream, tagged with `kind`.
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

    pub fn contains_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.elements.contains_key(key.as_ref())
    }

    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Item> {
        self.elements.get(key.as_ref())
    }

    pub fn get_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<&mut Item> {
        self.elements.get_mut(key.as_ref())
    }

    /// Store `value` under `key`, returning the previous value.
    ///
    /// An indirect composite is stored as a reference to its identity.
    pub fn set(&mut self, key: &str, value: impl Into<Item>) -> ObjectResult<Option<Item>> {
        let key = Name::new(key)?;
        Ok(self.insert(key, value))
    }

    /// [`Dictionary::set`] with an already-validated key.
    pub fn insert(&mut self, key: Name, value: impl Into<Item>) -> Option<Item> {
        self.elements.insert(key, value.into().into_element())
    }

    pub fn remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<Item> {
        self.elements.remove(key.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.elements.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Item> {
        self.elements.values()
    }

    /// Mutable access to the stored values.
    ///
    /// Values written through this iterator bypass reference normalization.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.elements.values_mut()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Name, &Item)> {
        self.elements.iter()
    }

    // ------------------------------------------------------------------
    // Stream payload
    // ------------------------------------------------------------------

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// The raw payload as stored, i.e. still encoded by any `/Filter`.
    pub fn stream(&self) -> Option<&[u8]> {
        self.stream.as_deref()
    }

    /// Attach (or replace) the payload and record its `/Length`.
    pub fn attach_stream(&mut self, bytes: Vec<u8>) {
        self.elements
            .insert(Name::from_static("/Length"), Item::from(bytes.len()));
        self.stream = Some(bytes);
    }

    /// Detach the payload, leaving the dictionary entries in place.
    pub fn take_stream(&mut self) -> Option<Vec<u8>> {
        self.stream.take()
    }

    /// References held by the values of this dictionary.
    pub fn references(&self) -> Vec<ObjectId> {
        self.elements.values().flat_map(Item::references).collect()
    }

    /// Remap the references held by the values of this dictionary.
    pub fn rewrite_references(&mut self, mut map: impl FnMut(ObjectId) -> Option<ObjectId>) {
        for value in self.elements.values_mut() {
            value.rewrite_references(&mut map);
        }
    }

    // ------------------------------------------------------------------
    // Typed read access
    // ------------------------------------------------------------------

    fn lookup_as<T>(
        &self,
        key: &str,
        resolver: &dyn Resolve,
        expected: &'static str,
        convert: impl FnOnce(&Item) -> Option<T>,
    ) -> ObjectResult<Option<T>> {
        match self.elements.get(key.as_bytes()) {
            None => Ok(None),
            Some(item) => coerce(key, item, resolver, expected, convert),
        }
    }

    pub fn lookup_bool(&self, key: &str, resolver: &dyn Resolve) -> ObjectResult<Option<bool>> {
        self.lookup_as(key, resolver, "boolean", coerce::to_bool)
    }

    pub fn lookup_int(&self, key: &str, resolver: &dyn Resolve) -> ObjectResult<Option<i64>> {
        self.lookup_as(key, resolver, "integer", coerce::to_int)
    }

    /// Integers satisfy this accessor; reals never satisfy `lookup_int`.
    pub fn lookup_real(&self, key: &str, resolver: &dyn Resolve) -> ObjectResult<Option<f64>> {
        self.lookup_as(key, resolver, "real", coerce::to_real)
    }

    pub fn lookup_string(
        &self,
        key: &str,
        resolver: &dyn Resolve,
    ) -> ObjectResult<Option<PdfString>> {
        self.lookup_as(key, resolver, "string", coerce::to_string)
    }

    pub fn lookup_name(&self, key: &str, resolver: &dyn Resolve) -> ObjectResult<Option<Name>> {
        self.lookup_as(key, resolver, "name", coerce::to_name)
    }

    pub fn lookup_rectangle(
        &self,
        key: &str,
        resolver: &dyn Resolve,
    ) -> ObjectResult<Option<Rectangle>> {
        self.lookup_as(key, resolver, "rectangle", coerce::to_rectangle)
    }

    pub fn lookup_matrix(&self, key: &str, resolver: &dyn Resolve) -> ObjectResult<Option<Matrix>> {
        self.lookup_as(key, resolver, "matrix", coerce::to_matrix)
    }

    pub fn lookup_datetime(&self, key: &str, resolver: &dyn Resolve) -> ObjectResult<Option<Date>> {
        self.lookup_as(key, resolver, "date", coerce::to_date)
    }

    // ------------------------------------------------------------------
    // Typed accessors with defaults
    //
    // Absent (or null) keys yield the type's zero value. With `create` the
    // zero value is also stored, so a later save writes it out.
    // ------------------------------------------------------------------

    fn or_default<T: Clone + Into<Item>>(
        &mut self,
        key: &str,
        found: Option<T>,
        create: bool,
        default: T,
    ) -> ObjectResult<T> {
        match found {
            Some(value) => Ok(value),
            None => {
                if create {
                    self.set(key, default.clone())?;
                }
                Ok(default)
            }
        }
    }

    pub fn get_bool(&mut self, key: &str, create: bool, resolver: &dyn Resolve) -> ObjectResult<bool> {
        let found = self.lookup_bool(key, resolver)?;
        self.or_default(key, found, create, false)
    }

    pub fn get_int(&mut self, key: &str, create: bool, resolver: &dyn Resolve) -> ObjectResult<i64> {
        let found = self.lookup_int(key, resolver)?;
        self.or_default(key, found, create, 0)
    }

    pub fn get_real(&mut self, key: &str, create: bool, resolver: &dyn Resolve) -> ObjectResult<f64> {
        let found = self.lookup_real(key, resolver)?;
        self.or_default(key, found, create, 0.0)
    }

    pub fn get_string(
        &mut self,
        key: &str,
        create: bool,
        resolver: &dyn Resolve,
    ) -> ObjectResult<PdfString> {
        let found = self.lookup_string(key, resolver)?;
        self.or_default(key, found, create, PdfString::default())
    }

    /// Names have no meaningful zero value: an absent key reads as `None`
    /// and `create` is ignored.
    pub fn get_name(
        &mut self,
        key: &str,
        _create: bool,
        resolver: &dyn Resolve,
    ) -> ObjectResult<Option<Name>> {
        self.lookup_name(key, resolver)
    }

    pub fn get_rectangle(
        &mut self,
        key: &str,
        create: bool,
        resolver: &dyn Resolve,
    ) -> ObjectResult<Rectangle> {
        let found = self.lookup_rectangle(key, resolver)?;
        self.or_default(key, found, create, Rectangle::default())
    }

    pub fn get_matrix(
        &mut self,
        key: &str,
        create: bool,
        resolver: &dyn Resolve,
    ) -> ObjectResult<Matrix> {
        match self.lookup_matrix(key, resolver)? {
            Some(matrix) => Ok(matrix),
            None => {
                if create {
                    self.set_matrix(key, Matrix::IDENTITY)?;
                }
                Ok(Matrix::IDENTITY)
            }
        }
    }

    pub fn get_datetime(
        &mut self,
        key: &str,
        create: bool,
        resolver: &dyn Resolve,
    ) -> ObjectResult<Date> {
        let found = self.lookup_datetime(key, resolver)?;
        self.or_default(key, found, create, Date::epoch())
    }

    // ------------------------------------------------------------------
    // Typed setters
    // ------------------------------------------------------------------

    pub fn set_bool(&mut self, key: &str, value: bool) -> ObjectResult<()> {
        self.set(key, value).map(drop)
    }

    pub fn set_int(&mut self, key: &str, value: i64) -> ObjectResult<()> {
        self.set(key, value).map(drop)
    }

    pub fn set_real(&mut self, key: &str, value: f64) -> ObjectResult<()> {
        self.set(key, value).map(drop)
    }

    /// Store text as a string, UTF-16BE encoded when it is not ASCII.
    pub fn set_string(&mut self, key: &str, text: &str) -> ObjectResult<()> {
        self.set(key, PdfString::from_text(text)).map(drop)
    }

    pub fn set_name(&mut self, key: &str, name: &str) -> ObjectResult<()> {
        let name = Name::new(name)?;
        self.set(key, name).map(drop)
    }

    pub fn set_rectangle(&mut self, key: &str, value: Rectangle) -> ObjectResult<()> {
        self.set(key, value).map(drop)
    }

    pub fn set_matrix(&mut self, key: &str, value: Matrix) -> ObjectResult<()> {
        let array = Array::from_items(value.to_array().into_iter().map(Item::Real));
        self.set(key, array).map(drop)
    }

    pub fn set_datetime(&mut self, key: &str, value: Date) -> ObjectResult<()> {
        self.set(key, value).map(drop)
    }

    // ------------------------------------------------------------------
    // Specialization of direct values
    // ------------------------------------------------------------------

    /// Promote the direct composite under `key` to `kind` in place.
    ///
    /// Returns `false` when the key is absent or holds a reference (the
    /// target then lives in the object table).
    pub fn specialize_direct(&mut self, key: &str, kind: Kind) -> ObjectResult<bool> {
        let Some(slot) = self.elements.get_mut(key.as_bytes()) else {
            return Ok(false);
        };
        if matches!(slot, Item::Reference(_)) {
            return Ok(false);
        }
        let value = std::mem::replace(slot, Item::Null);
        match value.specialize(key, kind) {
            Ok(value) => {
                *slot = value;
                debug!(key, %kind, "specialized direct value");
                Ok(true)
            }
            Err((value, err)) => {
                *slot = value;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectError;
    use crate::resolve::Detached;

    struct One(ObjectId, Item);

    impl Resolve for One {
        fn resolve(&self, id: ObjectId) -> Option<&Item> {
            (id == self.0).then_some(&self.1)
        }
    }

    fn id(n: u32) -> ObjectId {
        ObjectId::new(n, 0).unwrap()
    }

    // ------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------

    #[test]
    fn set_rejects_key_without_slash() {
        let mut dict = Dictionary::new();
        assert!(dict.set("Type", 1).is_err());
    }

    #[test]
    fn indirect_values_are_stored_as_references() {
        let mut page = Dictionary::of_kind(Kind::Page);
        page.assign_id(id(9));
        let mut parent = Dictionary::new();
        parent.set("/Kid", page).unwrap();
        assert_eq!(parent.get("/Kid"), Some(&Item::Reference(id(9))));
    }

    #[test]
    fn of_kind_sets_type_name() {
        let dict = Dictionary::of_kind(Kind::Catalog);
        assert_eq!(
            dict.get("/Type").and_then(Item::as_name).map(Name::as_bytes),
            Some(&b"/Catalog"[..])
        );
        assert!(Dictionary::of_kind(Kind::Resources).is_empty());
    }

    #[test]
    fn attach_stream_records_length() {
        let mut dict = Dictionary::new();
        dict.attach_stream(b"hello".to_vec());
        assert_eq!(dict.get("/Length"), Some(&Item::Integer(5)));
        assert_eq!(dict.stream(), Some(&b"hello"[..]));
        assert_eq!(Item::from(dict).type_name(), "stream");
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[test]
    fn absent_key_yields_zero_without_storing() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.get_int("/Count", false, &Detached).unwrap(), 0);
        assert!(!dict.contains_key("/Count"));
    }

    #[test]
    fn absent_key_with_create_materializes_default() {
        let mut dict = Dictionary::new();
        assert!(!dict.get_bool("/Open", true, &Detached).unwrap());
        assert_eq!(dict.get("/Open"), Some(&Item::Boolean(false)));
        assert_eq!(dict.get_matrix("/Matrix", true, &Detached).unwrap(), Matrix::IDENTITY);
        assert_eq!(
            dict.lookup_matrix("/Matrix", &Detached).unwrap(),
            Some(Matrix::IDENTITY)
        );
    }

    #[test]
    fn name_accessor_ignores_create() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.get_name("/Subtype", true, &Detached).unwrap(), None);
        assert!(dict.is_empty());
    }

    #[test]
    fn integer_widens_to_real() {
        let mut dict = Dictionary::new();
        dict.set_int("/W", 3).unwrap();
        assert_eq!(dict.get_real("/W", false, &Detached).unwrap(), 3.0);
    }

    #[test]
    fn real_does_not_truncate_to_integer() {
        let mut dict = Dictionary::new();
        dict.set_real("/W", 3.5).unwrap();
        let err = dict.get_int("/W", false, &Detached).unwrap_err();
        assert!(matches!(
            err,
            ObjectError::TypeMismatch { expected: "integer", found: "real", .. }
        ));
    }

    #[test]
    fn accessor_follows_one_reference_hop() {
        let resolver = One(id(3), Item::Integer(42));
        let mut dict = Dictionary::new();
        dict.set("/Count", id(3)).unwrap();
        assert_eq!(dict.get_int("/Count", false, &resolver).unwrap(), 42);
    }

    #[test]
    fn accessor_does_not_follow_two_hops() {
        let resolver = One(id(3), Item::Reference(id(4)));
        let mut dict = Dictionary::new();
        dict.set("/Count", id(3)).unwrap();
        let err = dict.get_int("/Count", false, &resolver).unwrap_err();
        assert!(matches!(err, ObjectError::TypeMismatch { found: "reference", .. }));
    }

    #[test]
    fn dangling_reference_is_reported() {
        let mut dict = Dictionary::new();
        dict.set("/Count", id(8)).unwrap();
        let err = dict.get_int("/Count", false, &Detached).unwrap_err();
        assert!(matches!(err, ObjectError::DanglingReference(missing) if missing == id(8)));
    }

    #[test]
    fn rectangle_from_number_array_is_normalized() {
        let mut dict = Dictionary::new();
        let array = Array::from_items([Item::Integer(10), Item::Real(20.0), Item::Integer(0), Item::Integer(5)]);
        dict.set("/MediaBox", array).unwrap();
        let rect = dict.get_rectangle("/MediaBox", false, &Detached).unwrap();
        assert_eq!(rect.to_array(), [0.0, 5.0, 10.0, 20.0]);
    }

    #[test]
    fn datetime_round_trips_through_string() {
        let mut dict = Dictionary::new();
        dict.set("/ModDate", PdfString::from("D:20240102030405Z")).unwrap();
        let date = dict.get_datetime("/ModDate", false, &Detached).unwrap();
        assert_eq!(date.to_pdf_string(), "D:20240102030405Z");
    }

    #[test]
    fn string_setter_encodes_unicode() {
        let mut dict = Dictionary::new();
        dict.set_string("/Title", "Größe").unwrap();
        let text = dict.get_string("/Title", false, &Detached).unwrap().to_text();
        assert_eq!(text, "Größe");
    }

    // ------------------------------------------------------------------
    // Specialization
    // ------------------------------------------------------------------

    #[test]
    fn specialize_direct_keeps_contents() {
        let mut inner = Dictionary::new();
        inner.set_name("/Font", "/F1").unwrap();
        let mut page = Dictionary::of_kind(Kind::Page);
        page.set("/Resources", inner).unwrap();

        assert!(page.specialize_direct("/Resources", Kind::Resources).unwrap());
        let resources = page.get("/Resources").and_then(Item::as_dictionary).unwrap();
        assert_eq!(resources.kind(), Kind::Resources);
        assert!(resources.contains_key("/Font"));

        // Second promotion is a no-op.
        assert!(page.specialize_direct("/Resources", Kind::Resources).unwrap());
    }

    #[test]
    fn specialize_direct_skips_references() {
        let mut dict = Dictionary::new();
        dict.set("/Pages", id(2)).unwrap();
        assert!(!dict.specialize_direct("/Pages", Kind::Pages).unwrap());
    }

    #[test]
    fn specialized_value_cannot_change_kind() {
        let mut dict = Dictionary::new();
        dict.set("/X", Dictionary::of_kind(Kind::Font)).unwrap();
        let err = dict.specialize_direct("/X", Kind::Page).unwrap_err();
        assert!(matches!(err, ObjectError::IncompatibleKind { kind: Kind::Page, .. }));
        let kept = dict.get("/X").and_then(Item::as_dictionary).unwrap();
        assert_eq!(kept.kind(), Kind::Font);
    }

    #[test]
    fn primitive_cannot_be_specialized() {
        let mut dict = Dictionary::new();
        dict.set_int("/X", 1).unwrap();
        assert!(dict.specialize_direct("/X", Kind::Resources).is_err());
        assert_eq!(dict.get("/X"), Some(&Item::Integer(1)));
    }
}
