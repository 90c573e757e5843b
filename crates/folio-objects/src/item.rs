use folio_schema::Kind;
use folio_types::{Date, Name, ObjectId, PdfString, Rectangle};

use crate::array::Array;
use crate::dictionary::Dictionary;
use crate::error::ObjectError;

/// A value as it lives inside a dictionary, an array, or the object table.
///
/// Composite values (`Array`, `Dictionary`) carry their own identity. One
/// with a non-null identity is an indirect object and is never nested by
/// value inside another composite: storing it anywhere turns it into a
/// `Reference` to its identity.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(Name),
    Date(Date),
    /// Raw token text written verbatim, e.g. an operator or `true` spelled
    /// by hand.
    Literal(String),
    Rectangle(Rectangle),
    Array(Array),
    Dictionary(Dictionary),
    Reference(ObjectId),
}

impl Item {
    /// Short lower-case name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Item::Null => "null",
            Item::Boolean(_) => "boolean",
            Item::Integer(_) => "integer",
            Item::Real(_) => "real",
            Item::String(_) => "string",
            Item::Name(_) => "name",
            Item::Date(_) => "date",
            Item::Literal(_) => "literal",
            Item::Rectangle(_) => "rectangle",
            Item::Array(_) => "array",
            Item::Dictionary(d) if d.has_stream() => "stream",
            Item::Dictionary(_) => "dictionary",
            Item::Reference(_) => "reference",
        }
    }

    /// Identity of a composite value; `ObjectId::NONE` for everything else.
    pub fn object_id(&self) -> ObjectId {
        match self {
            Item::Array(a) => a.id(),
            Item::Dictionary(d) => d.id(),
            _ => ObjectId::NONE,
        }
    }

    /// Kind of a composite value.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Item::Array(a) => Some(a.kind()),
            Item::Dictionary(d) => Some(d.kind()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Item::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Item::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers widen to reals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Item::Integer(i) => Some(*i as f64),
            Item::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Item::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            Item::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Item::Reference(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Item::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Item::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Item::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Item::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// The form this value takes when stored inside a composite: indirect
    /// composites collapse to a reference.
    pub(crate) fn into_element(self) -> Item {
        let id = self.object_id();
        if id.is_some() {
            Item::Reference(id)
        } else {
            self
        }
    }

    /// Promote a composite to `kind`, keeping identity and contents.
    ///
    /// A value already of `kind` is returned untouched. Generic values may
    /// take any kind of the same shape; a specialized value cannot change
    /// kind. On failure the value is handed back with the error.
    pub fn specialize(self, key: &str, kind: Kind) -> Result<Item, (Item, ObjectError)> {
        let incompatible = |item: &Item| ObjectError::IncompatibleKind {
            key: key.to_string(),
            kind,
            found: item.type_name(),
        };
        let current = match self.kind() {
            Some(current) => current,
            None => {
                let err = incompatible(&self);
                return Err((self, err));
            }
        };
        if current == kind {
            return Ok(self);
        }
        if !current.is_generic() || current != kind.generic() {
            let err = incompatible(&self);
            return Err((self, err));
        }
        Ok(match self {
            Item::Dictionary(d) => Item::Dictionary(d.into_kind(kind)),
            Item::Array(a) => Item::Array(a.into_kind(kind)),
            other => other,
        })
    }

    /// Visit every reference reachable from this value without crossing
    /// into other indirect objects.
    pub fn references(&self) -> Vec<ObjectId> {
        let mut found = Vec::new();
        let mut stack: Vec<&Item> = vec![self];
        while let Some(item) = stack.pop() {
            match item {
                Item::Reference(id) => found.push(*id),
                Item::Array(a) => stack.extend(a.iter()),
                Item::Dictionary(d) => stack.extend(d.values()),
                _ => {}
            }
        }
        found
    }

    /// Rewrite every reference reachable from this value in place.
    ///
    /// `map` returns the replacement identity, or `None` to leave the
    /// reference as it is.
    pub fn rewrite_references(&mut self, mut map: impl FnMut(ObjectId) -> Option<ObjectId>) {
        let mut stack: Vec<&mut Item> = vec![self];
        while let Some(item) = stack.pop() {
            match item {
                Item::Reference(id) => {
                    if let Some(new_id) = map(*id) {
                        *id = new_id;
                    }
                }
                Item::Array(a) => stack.extend(a.values_mut()),
                Item::Dictionary(d) => stack.extend(d.values_mut()),
                _ => {}
            }
        }
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Item::Boolean(value)
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Item::Integer(value)
    }
}

impl From<i32> for Item {
    fn from(value: i32) -> Self {
        Item::Integer(value.into())
    }
}

impl From<u32> for Item {
    fn from(value: u32) -> Self {
        Item::Integer(value.into())
    }
}

impl From<usize> for Item {
    fn from(value: usize) -> Self {
        Item::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Item::Real(value)
    }
}

impl From<Name> for Item {
    fn from(value: Name) -> Self {
        Item::Name(value)
    }
}

impl From<PdfString> for Item {
    fn from(value: PdfString) -> Self {
        Item::String(value)
    }
}

impl From<Date> for Item {
    fn from(value: Date) -> Self {
        Item::Date(value)
    }
}

impl From<Rectangle> for Item {
    fn from(value: Rectangle) -> Self {
        Item::Rectangle(value)
    }
}

impl From<Array> for Item {
    fn from(value: Array) -> Self {
        Item::Array(value)
    }
}

impl From<Dictionary> for Item {
    fn from(value: Dictionary) -> Self {
        Item::Dictionary(value)
    }
}

impl From<ObjectId> for Item {
    fn from(value: ObjectId) -> Self {
        Item::Reference(value)
    }
}
