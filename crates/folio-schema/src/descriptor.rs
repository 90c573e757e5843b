use serde::Serialize;

use crate::kind::Kind;
use crate::version::PdfVersion;

/// Abstract value type a key expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum KeyType {
    Name,
    String,
    Boolean,
    Integer,
    Real,
    Date,
    Rectangle,
    Array,
    Dictionary,
    Stream,
    NameOrArray,
    NameOrDictionary,
    ArrayOrDictionary,
    StreamOrArray,
    Any,
}

impl KeyType {
    /// `true` for types that admit more than one shape.
    pub const fn is_union(self) -> bool {
        matches!(
            self,
            KeyType::NameOrArray
                | KeyType::NameOrDictionary
                | KeyType::ArrayOrDictionary
                | KeyType::StreamOrArray
                | KeyType::Any
        )
    }
}

/// Key requirement flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct KeyFlags(u8);

impl KeyFlags {
    pub const OPTIONAL: KeyFlags = KeyFlags(0);
    pub const REQUIRED: KeyFlags = KeyFlags(1);
    /// Value may be inherited from an ancestor in the page tree.
    pub const INHERITABLE: KeyFlags = KeyFlags(1 << 1);
    /// Value must be stored as an indirect object.
    pub const INDIRECT: KeyFlags = KeyFlags(1 << 2);

    pub const fn union(self, other: KeyFlags) -> KeyFlags {
        KeyFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: KeyFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Metadata for one key of one dictionary kind.
///
/// Descriptors are built in `const` tables with the chained constructors:
///
/// ```
/// use folio_schema::{Kind, KeyDescriptor, KeyType, PdfVersion};
///
/// const PAGES: KeyDescriptor = KeyDescriptor::new("/Pages", KeyType::Dictionary)
///     .required()
///     .indirect()
///     .of_kind(Kind::Pages);
/// assert_eq!(PAGES.resolved_type(), Some(Kind::Pages));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct KeyDescriptor {
    pub key: &'static str,
    pub key_type: KeyType,
    pub flags: KeyFlags,
    /// First format version that defines the key.
    pub version: PdfVersion,
    /// Constant value the key must carry, e.g. `/Catalog` for `/Type`.
    pub fixed_value: Option<&'static str>,
    /// Concrete kind to instantiate instead of the generic container.
    pub kind: Option<Kind>,
}

impl KeyDescriptor {
    pub const fn new(key: &'static str, key_type: KeyType) -> Self {
        Self {
            key,
            key_type,
            flags: KeyFlags::OPTIONAL,
            version: PdfVersion::V1_0,
            fixed_value: None,
            kind: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.flags = self.flags.union(KeyFlags::REQUIRED);
        self
    }

    pub const fn inheritable(mut self) -> Self {
        self.flags = self.flags.union(KeyFlags::INHERITABLE);
        self
    }

    pub const fn indirect(mut self) -> Self {
        self.flags = self.flags.union(KeyFlags::INDIRECT);
        self
    }

    pub const fn since(mut self, version: PdfVersion) -> Self {
        self.version = version;
        self
    }

    pub const fn fixed(mut self, value: &'static str) -> Self {
        self.fixed_value = Some(value);
        self
    }

    pub const fn of_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn is_required(&self) -> bool {
        self.flags.contains(KeyFlags::REQUIRED)
    }

    pub fn is_inheritable(&self) -> bool {
        self.flags.contains(KeyFlags::INHERITABLE)
    }

    pub fn must_be_indirect(&self) -> bool {
        self.flags.contains(KeyFlags::INDIRECT)
    }

    /// The concrete kind to instantiate for this key's value.
    ///
    /// Union types return `None` on purpose: the caller has to decide from
    /// the value actually stored. Primitive types also return `None`.
    pub fn resolved_type(&self) -> Option<Kind> {
        if self.key_type.is_union() {
            return None;
        }
        match (self.key_type, self.kind) {
            (KeyType::Dictionary | KeyType::Array | KeyType::Stream, Some(kind)) => Some(kind),
            (KeyType::Dictionary, None) => Some(Kind::Dictionary),
            (KeyType::Array, None) => Some(Kind::Array),
            (KeyType::Stream, None) => Some(Kind::Stream),
            _ => None,
        }
    }
}
