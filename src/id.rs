//! Object identifiers and entity type masks.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Opaque 64-bit object identifier.
///
/// Id `0` is reserved for the scenario itself. Entity ids are handed out by the
/// store from a monotonically increasing counter and are never reused.
///
/// # Examples
///
/// ```
/// use simstore::ObjectId;
///
/// assert!(ObjectId::SCENARIO.is_scenario());
/// assert_eq!(ObjectId::new(5).get(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The scenario-level id.
    pub const SCENARIO: Self = Self(0);

    /// Wraps a raw id value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns true for the scenario id (`0`).
    #[must_use]
    pub const fn is_scenario(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ObjectId> for u64 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

bitflags! {
    /// Entity type, usable both as a single type and as a selection mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectType: u32 {
        const PLATFORM = 0x01;
        const BEAM = 0x02;
        const GATE = 0x04;
        const LASER = 0x08;
        const PROJECTOR = 0x10;
        const LOB_GROUP = 0x20;
        const CUSTOM_RENDERING = 0x40;
        const ALL = Self::PLATFORM.bits()
            | Self::BEAM.bits()
            | Self::GATE.bits()
            | Self::LASER.bits()
            | Self::PROJECTOR.bits()
            | Self::LOB_GROUP.bits()
            | Self::CUSTOM_RENDERING.bits();
    }
}

impl ObjectType {
    /// No entity type; returned for unknown ids.
    pub const NONE: Self = Self::empty();

    /// Returns true if this is no type at all.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.is_empty()
    }
}

/// Monotonic id source. Never yields `0`.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub(crate) fn next_id(&mut self) -> ObjectId {
        self.last += 1;
        ObjectId(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_monotonic_and_skips_scenario() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, ObjectId::new(1));
        assert!(b > a);
        assert!(!a.is_scenario());
    }

    #[test]
    fn object_type_masks() {
        assert!(ObjectType::ALL.contains(ObjectType::LOB_GROUP));
        assert!(ObjectType::NONE.is_none());
        let mask = ObjectType::PLATFORM | ObjectType::BEAM;
        assert!(mask.intersects(ObjectType::BEAM));
        assert!(!mask.intersects(ObjectType::GATE));
    }

    #[test]
    fn object_id_serializes_transparently() {
        let json = serde_json::to_string(&ObjectId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
