use std::fmt;

use serde::{Deserialize, Serialize};

/// The concrete kind of a dictionary or array.
///
/// `Dictionary` and `Array` are the generic kinds every parsed value starts
/// as. The rest are specialized kinds a generic value is promoted to when it
/// is first reached through a key whose schema names that kind.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Kind {
    #[default]
    Dictionary,
    Array,
    Trailer,
    Catalog,
    Pages,
    Page,
    Resources,
    Info,
    Outlines,
    OutlineItem,
    Font,
    Encrypt,
    Annotation,
    ViewerPreferences,
    Stream,
    DeadObject,
    AnnotationArray,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 17] = [
        Kind::Dictionary,
        Kind::Array,
        Kind::Trailer,
        Kind::Catalog,
        Kind::Pages,
        Kind::Page,
        Kind::Resources,
        Kind::Info,
        Kind::Outlines,
        Kind::OutlineItem,
        Kind::Font,
        Kind::Encrypt,
        Kind::Annotation,
        Kind::ViewerPreferences,
        Kind::Stream,
        Kind::DeadObject,
        Kind::AnnotationArray,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Dense index, usable for per-kind tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `true` for kinds backed by an array rather than a dictionary.
    pub const fn is_array(self) -> bool {
        matches!(self, Kind::Array | Kind::AnnotationArray)
    }

    /// `true` for the two generic kinds.
    pub const fn is_generic(self) -> bool {
        matches!(self, Kind::Dictionary | Kind::Array)
    }

    /// The generic kind this kind specializes.
    pub const fn generic(self) -> Kind {
        if self.is_array() {
            Kind::Array
        } else {
            Kind::Dictionary
        }
    }

    /// The `/Type` value carried by dictionaries of this kind, if any.
    pub const fn type_name(self) -> Option<&'static str> {
        match self {
            Kind::Catalog => Some("/Catalog"),
            Kind::Pages => Some("/Pages"),
            Kind::Page => Some("/Page"),
            Kind::Outlines => Some("/Outlines"),
            Kind::Font => Some("/Font"),
            Kind::Annotation => Some("/Annot"),
            _ => None,
        }
    }

    /// Reverse of [`Kind::type_name`].
    pub fn from_type_name(name: &str) -> Option<Kind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_name() == Some(name))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, kind) in Kind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn generic_of_specialized() {
        assert_eq!(Kind::Catalog.generic(), Kind::Dictionary);
        assert_eq!(Kind::AnnotationArray.generic(), Kind::Array);
        assert!(Kind::Array.is_generic());
        assert!(!Kind::Page.is_generic());
    }

    #[test]
    fn default_is_the_generic_dictionary() {
        assert_eq!(Kind::default(), Kind::Dictionary);
    }

    #[test]
    fn type_names_roundtrip() {
        assert_eq!(Kind::from_type_name("/Catalog"), Some(Kind::Catalog));
        assert_eq!(Kind::from_type_name("/Annot"), Some(Kind::Annotation));
        assert_eq!(Kind::from_type_name("/XObject"), None);
    }
}
