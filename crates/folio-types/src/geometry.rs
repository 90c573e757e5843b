//! Geometric payloads carried as item data.
//!
//! These are plain values; the engine never does geometry with them beyond
//! normalizing rectangle corners.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An axis-aligned rectangle given by two corners, normalized so that
/// `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    /// Create a rectangle from any two opposite corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Build from exactly four numbers in `[x1 y1 x2 y2]` order.
    pub fn from_slice(values: &[f64]) -> Result<Self, TypeError> {
        match values {
            [x1, y1, x2, y2] => Ok(Self::new(*x1, *y1, *x2, *y2)),
            _ => Err(TypeError::InvalidRectangle(values.len())),
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// The four coordinates in file order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// `true` for the all-zero rectangle.
    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 && self.height() == 0.0
    }
}

/// A 2D affine transform `[a b c d e f]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Build from exactly six numbers.
    pub fn from_slice(values: &[f64]) -> Result<Self, TypeError> {
        match values {
            [a, b, c, d, e, f] => Ok(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => Err(TypeError::InvalidMatrix(values.len())),
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_is_normalized() {
        let r = Rectangle::new(100.0, 200.0, 0.0, 50.0);
        assert_eq!(r.to_array(), [0.0, 50.0, 100.0, 200.0]);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 150.0);
    }

    #[test]
    fn rectangle_from_slice_checks_length() {
        assert!(Rectangle::from_slice(&[0.0, 0.0, 612.0, 792.0]).is_ok());
        assert_eq!(
            Rectangle::from_slice(&[1.0, 2.0]).unwrap_err(),
            TypeError::InvalidRectangle(2)
        );
    }

    #[test]
    fn matrix_default_is_identity() {
        assert!(Matrix::default().is_identity());
        assert!(Matrix::from_slice(&[1.0; 5]).is_err());
        let m = Matrix::from_slice(&[2.0, 0.0, 0.0, 2.0, 10.0, 20.0]).unwrap();
        assert!(!m.is_identity());
        assert_eq!(m.to_array()[4], 10.0);
    }
}
