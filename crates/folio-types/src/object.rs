use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of an indirect object: `(number, generation)`.
///
/// Equality and ordering are structural (number first, then generation).
/// The pair is the primary key of the cross-reference table. An identity with
/// `number == 0` means "not registered yet" and is only ever produced by
/// [`ObjectId::NONE`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    /// The "no identity" value carried by unregistered composites.
    pub const NONE: ObjectId = ObjectId {
        number: 0,
        generation: 0,
    };

    /// Create an identity, rejecting object numbers below 1.
    pub fn new(number: u32, generation: u16) -> Result<Self, TypeError> {
        if number == 0 {
            return Err(TypeError::MalformedIdentity(number));
        }
        Ok(Self { number, generation })
    }

    /// The object number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The generation number.
    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// Returns `true` if this is [`ObjectId::NONE`].
    pub fn is_none(&self) -> bool {
        self.number == 0
    }

    /// Returns `true` if this identity has been assigned.
    pub fn is_some(&self) -> bool {
        self.number != 0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({} {})", self.number, self.generation)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.generation)
    }
}

impl TryFrom<(u32, u16)> for ObjectId {
    type Error = TypeError;

    fn try_from((number, generation): (u32, u16)) -> Result<Self, Self::Error> {
        Self::new(number, generation)
    }
}
