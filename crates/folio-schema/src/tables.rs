//! Static key tables, one per dictionary kind.

use crate::descriptor::{KeyDescriptor as K, KeyType as T};
use crate::kind::Kind;
use crate::version::PdfVersion as V;

pub const TRAILER_KEYS: &[K] = &[
    K::new("/Size", T::Integer).required(),
    K::new("/Prev", T::Integer),
    K::new("/Root", T::Dictionary).required().indirect().of_kind(Kind::Catalog),
    K::new("/Encrypt", T::Dictionary).since(V::V1_1).of_kind(Kind::Encrypt),
    K::new("/Info", T::Dictionary).indirect().of_kind(Kind::Info),
    K::new("/ID", T::Array).since(V::V1_1),
];

pub const CATALOG_KEYS: &[K] = &[
    K::new("/Type", T::Name).required().fixed("/Catalog"),
    K::new("/Version", T::Name).since(V::V1_4),
    K::new("/Pages", T::Dictionary).required().indirect().of_kind(Kind::Pages),
    K::new("/PageLabels", T::Dictionary).since(V::V1_3),
    K::new("/Names", T::Dictionary).since(V::V1_2),
    K::new("/Dests", T::Dictionary).since(V::V1_1).indirect(),
    K::new("/ViewerPreferences", T::Dictionary).since(V::V1_2).of_kind(Kind::ViewerPreferences),
    K::new("/PageLayout", T::Name),
    K::new("/PageMode", T::Name),
    K::new("/Outlines", T::Dictionary).indirect().of_kind(Kind::Outlines),
    K::new("/OpenAction", T::ArrayOrDictionary).since(V::V1_1),
    K::new("/AcroForm", T::Dictionary).since(V::V1_2),
    K::new("/Metadata", T::Stream).since(V::V1_4).indirect(),
    K::new("/Lang", T::String).since(V::V1_4),
];

/// Attributes a page inherits from its ancestors when it does not set them.
pub const INHERITABLE_PAGE_KEYS: &[&str] = &["/Resources", "/MediaBox", "/CropBox", "/Rotate"];

pub const PAGES_KEYS: &[K] = &[
    K::new("/Type", T::Name).required().fixed("/Pages"),
    K::new("/Parent", T::Dictionary).indirect().of_kind(Kind::Pages),
    K::new("/Kids", T::Array).required(),
    K::new("/Count", T::Integer).required(),
    K::new("/Resources", T::Dictionary).inheritable().of_kind(Kind::Resources),
    K::new("/MediaBox", T::Rectangle).inheritable(),
    K::new("/CropBox", T::Rectangle).inheritable(),
    K::new("/Rotate", T::Integer).inheritable(),
];

pub const PAGE_KEYS: &[K] = &[
    K::new("/Type", T::Name).required().fixed("/Page"),
    K::new("/Parent", T::Dictionary).required().indirect().of_kind(Kind::Pages),
    K::new("/LastModified", T::Date).since(V::V1_3),
    K::new("/Resources", T::Dictionary).required().inheritable().of_kind(Kind::Resources),
    K::new("/MediaBox", T::Rectangle).required().inheritable(),
    K::new("/CropBox", T::Rectangle).inheritable(),
    K::new("/BleedBox", T::Rectangle).since(V::V1_3),
    K::new("/TrimBox", T::Rectangle).since(V::V1_3),
    K::new("/ArtBox", T::Rectangle).since(V::V1_3),
    K::new("/Contents", T::StreamOrArray),
    K::new("/Rotate", T::Integer).inheritable(),
    K::new("/Annots", T::Array).of_kind(Kind::AnnotationArray),
    K::new("/UserUnit", T::Real).since(V::V1_6),
];

pub const RESOURCES_KEYS: &[K] = &[
    K::new("/ExtGState", T::Dictionary),
    K::new("/ColorSpace", T::Dictionary),
    K::new("/Pattern", T::Dictionary),
    K::new("/Shading", T::Dictionary).since(V::V1_3),
    K::new("/XObject", T::Dictionary),
    K::new("/Font", T::Dictionary),
    K::new("/ProcSet", T::Array),
    K::new("/Properties", T::Dictionary).since(V::V1_2),
];

pub const INFO_KEYS: &[K] = &[
    K::new("/Title", T::String).since(V::V1_1),
    K::new("/Author", T::String),
    K::new("/Subject", T::String).since(V::V1_1),
    K::new("/Keywords", T::String).since(V::V1_1),
    K::new("/Creator", T::String),
    K::new("/Producer", T::String),
    K::new("/CreationDate", T::Date),
    K::new("/ModDate", T::Date).since(V::V1_1),
    K::new("/Trapped", T::Name).since(V::V1_3),
];

pub const OUTLINES_KEYS: &[K] = &[
    K::new("/Type", T::Name).fixed("/Outlines"),
    K::new("/First", T::Dictionary).indirect().of_kind(Kind::OutlineItem),
    K::new("/Last", T::Dictionary).indirect().of_kind(Kind::OutlineItem),
    K::new("/Count", T::Integer),
];

pub const OUTLINE_ITEM_KEYS: &[K] = &[
    K::new("/Title", T::String).required(),
    K::new("/Parent", T::Dictionary).required().indirect(),
    K::new("/Prev", T::Dictionary).indirect().of_kind(Kind::OutlineItem),
    K::new("/Next", T::Dictionary).indirect().of_kind(Kind::OutlineItem),
    K::new("/First", T::Dictionary).indirect().of_kind(Kind::OutlineItem),
    K::new("/Last", T::Dictionary).indirect().of_kind(Kind::OutlineItem),
    K::new("/Count", T::Integer),
    K::new("/Dest", T::NameOrArray),
    K::new("/A", T::Dictionary).since(V::V1_1),
];

pub const FONT_KEYS: &[K] = &[
    K::new("/Type", T::Name).required().fixed("/Font"),
    K::new("/Subtype", T::Name).required(),
    K::new("/BaseFont", T::Name).required(),
    K::new("/FirstChar", T::Integer),
    K::new("/LastChar", T::Integer),
    K::new("/Widths", T::Array).indirect(),
    K::new("/FontDescriptor", T::Dictionary).indirect(),
    K::new("/Encoding", T::NameOrDictionary),
    K::new("/ToUnicode", T::Stream).since(V::V1_2).indirect(),
];

pub const ENCRYPT_KEYS: &[K] = &[
    K::new("/Filter", T::Name).required(),
    K::new("/SubFilter", T::Name).since(V::V1_3),
    K::new("/V", T::Integer),
    K::new("/Length", T::Integer).since(V::V1_4),
    K::new("/R", T::Integer),
    K::new("/O", T::String),
    K::new("/U", T::String),
    K::new("/P", T::Integer),
];

pub const ANNOTATION_KEYS: &[K] = &[
    K::new("/Type", T::Name).fixed("/Annot"),
    K::new("/Subtype", T::Name).required(),
    K::new("/Rect", T::Rectangle).required(),
    K::new("/Contents", T::String),
    K::new("/P", T::Dictionary).since(V::V1_3).indirect().of_kind(Kind::Page),
    K::new("/NM", T::String).since(V::V1_4),
    K::new("/M", T::Date).since(V::V1_1),
    K::new("/F", T::Integer).since(V::V1_1),
    K::new("/Border", T::Array),
];

pub const VIEWER_PREFERENCES_KEYS: &[K] = &[
    K::new("/HideToolbar", T::Boolean),
    K::new("/HideMenubar", T::Boolean),
    K::new("/HideWindowUI", T::Boolean),
    K::new("/FitWindow", T::Boolean),
    K::new("/CenterWindow", T::Boolean),
    K::new("/DisplayDocTitle", T::Boolean).since(V::V1_4),
    K::new("/Direction", T::Name).since(V::V1_3),
];

pub const STREAM_KEYS: &[K] = &[
    K::new("/Length", T::Integer).required(),
    K::new("/Filter", T::NameOrArray),
    K::new("/DecodeParms", T::ArrayOrDictionary),
    K::new("/DL", T::Integer).since(V::V1_5),
];

pub const DEAD_OBJECT_KEYS: &[K] = &[K::new("/DeadObjectCount", T::Integer).required()];

/// The declared key table for a kind. Generic kinds declare no keys.
pub fn declared_keys(kind: Kind) -> &'static [K] {
    match kind {
        Kind::Dictionary | Kind::Array | Kind::AnnotationArray => &[],
        Kind::Trailer => TRAILER_KEYS,
        Kind::Catalog => CATALOG_KEYS,
        Kind::Pages => PAGES_KEYS,
        Kind::Page => PAGE_KEYS,
        Kind::Resources => RESOURCES_KEYS,
        Kind::Info => INFO_KEYS,
        Kind::Outlines => OUTLINES_KEYS,
        Kind::OutlineItem => OUTLINE_ITEM_KEYS,
        Kind::Font => FONT_KEYS,
        Kind::Encrypt => ENCRYPT_KEYS,
        Kind::Annotation => ANNOTATION_KEYS,
        Kind::ViewerPreferences => VIEWER_PREFERENCES_KEYS,
        Kind::Stream => STREAM_KEYS,
        Kind::DeadObject => DEAD_OBJECT_KEYS,
    }
}
