//! Integer coordinate records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse an axis letter (case-sensitive, as written in scripts)
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Column index of the axis in a record
    pub fn index(&self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// A fully resolved device position
///
/// Records are produced in device execution order; every axis is always
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CoordinateRecord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl CoordinateRecord {
    /// Create a new record
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Value of one axis
    pub fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Return a copy with a different Z value
    pub fn with_z(self, z: i64) -> Self {
        Self { z, ..self }
    }
}

impl fmt::Display for CoordinateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i64, i64, i64)> for CoordinateRecord {
    fn from((x, y, z): (i64, i64, i64)) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_letters() {
        assert_eq!(Axis::from_letter('X'), Some(Axis::X));
        assert_eq!(Axis::from_letter('Z'), Some(Axis::Z));
        assert_eq!(Axis::from_letter('x'), None);
        assert_eq!(Axis::from_letter('F'), None);
        assert_eq!(Axis::Y.index(), 1);
    }

    #[test]
    fn test_record_accessors() {
        let rec = CoordinateRecord::from((3, 4, 5));
        assert_eq!(rec.get(Axis::X), 3);
        assert_eq!(rec.get(Axis::Z), 5);
        assert_eq!(rec.with_z(3), CoordinateRecord::new(3, 4, 3));
        assert_eq!(rec.to_string(), "(3, 4, 5)");
    }
}
