//! One-hop coercions shared by the dictionary and array accessors.

use folio_types::{Date, Matrix, Name, PdfString, Rectangle};

use crate::error::{ObjectError, ObjectResult};
use crate::item::Item;
use crate::resolve::{deref, Resolve};

/// Dereference `item` once and convert it with `convert`.
///
/// `Ok(None)` means the value is null, which reads the same as an absent
/// key. A value of the wrong shape is a type mismatch.
pub(crate) fn coerce<T>(
    key: &str,
    item: &Item,
    resolver: &dyn Resolve,
    expected: &'static str,
    convert: impl FnOnce(&Item) -> Option<T>,
) -> ObjectResult<Option<T>> {
    let item = deref(item, resolver)?;
    if item.is_null() {
        return Ok(None);
    }
    convert(item)
        .map(Some)
        .ok_or_else(|| ObjectError::TypeMismatch {
            key: key.to_string(),
            expected,
            found: item.type_name(),
        })
}

pub(crate) fn to_bool(item: &Item) -> Option<bool> {
    item.as_bool()
}

pub(crate) fn to_int(item: &Item) -> Option<i64> {
    item.as_i64()
}

pub(crate) fn to_real(item: &Item) -> Option<f64> {
    item.as_f64()
}

pub(crate) fn to_string(item: &Item) -> Option<PdfString> {
    match item {
        Item::String(s) => Some(s.clone()),
        Item::Date(d) => Some(PdfString::from(d.to_pdf_string().as_str())),
        _ => None,
    }
}

pub(crate) fn to_name(item: &Item) -> Option<Name> {
    item.as_name().cloned()
}

fn numbers(item: &Item) -> Option<Vec<f64>> {
    item.as_array()?.iter().map(Item::as_f64).collect()
}

pub(crate) fn to_rectangle(item: &Item) -> Option<Rectangle> {
    match item {
        Item::Rectangle(r) => Some(*r),
        Item::Array(_) => Rectangle::from_slice(&numbers(item)?).ok(),
        _ => None,
    }
}

pub(crate) fn to_matrix(item: &Item) -> Option<Matrix> {
    Matrix::from_slice(&numbers(item)?).ok()
}

pub(crate) fn to_date(item: &Item) -> Option<Date> {
    match item {
        Item::Date(d) => Some(*d),
        Item::String(s) => Date::parse(&s.to_text()).ok(),
        _ => None,
    }
}
