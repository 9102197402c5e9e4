//! Strokes and motion commands in physical units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in physical (device) units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The two tool heights used while drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenHeights {
    /// Height while drawing (pen touches the paper)
    pub down: f64,
    /// Height while travelling between strokes
    pub up: f64,
}

impl Default for PenHeights {
    fn default() -> Self {
        Self { down: 0.0, up: 5.0 }
    }
}

/// One straight pen stroke produced by the vectorizer
///
/// The stroke runs from `start` to `end` at `pen_down`; reaching `start`
/// happens at `pen_up`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSegment {
    pub start: Point2,
    pub end: Point2,
    pub pen_up: f64,
    pub pen_down: f64,
}

impl MotionSegment {
    /// Create a stroke between two points with the given pen heights
    pub fn new(start: Point2, end: Point2, pen: PenHeights) -> Self {
        Self {
            start,
            end,
            pen_up: pen.up,
            pen_down: pen.down,
        }
    }

    /// Length of the drawn stroke
    pub fn length(&self) -> f64 {
        (self.end.x - self.start.x).hypot(self.end.y - self.start.y)
    }
}

/// Motion kind of a script line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// Non-drawing move (G0)
    Travel,
    /// Drawing move (G1)
    Draw,
}

impl MotionKind {
    /// The G-code word for this motion
    pub fn code(&self) -> &'static str {
        match self {
            Self::Travel => "G0",
            Self::Draw => "G1",
        }
    }
}

/// One line of a motion script, held in memory
///
/// Axes that are `None` are omitted from the rendered line and inherit their
/// previous value when the script is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    pub kind: MotionKind,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl MotionCommand {
    /// Move to a full XYZ position
    pub fn to_xyz(kind: MotionKind, x: f64, y: f64, z: f64) -> Self {
        Self {
            kind,
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Change only the Z axis
    pub fn to_z(kind: MotionKind, z: f64) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            z: Some(z),
        }
    }

    /// Whether the command names at least one axis
    pub fn has_axes(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.code())?;
        if let Some(x) = self.x {
            write!(f, " X{:.2}", x)?;
        }
        if let Some(y) = self.y {
            write!(f, " Y{:.2}", y)?;
        }
        if let Some(z) = self.z {
            write!(f, " Z{:.2}", z)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = MotionCommand::to_xyz(MotionKind::Travel, 0.0, 76.5, 5.0);
        assert_eq!(cmd.to_string(), "G0 X0.00 Y76.50 Z5.00");

        let cmd = MotionCommand::to_z(MotionKind::Travel, 5.0);
        assert_eq!(cmd.to_string(), "G0 Z5.00");

        let cmd = MotionCommand::to_xyz(MotionKind::Draw, 1.25, -3.0, 0.0);
        assert_eq!(cmd.to_string(), "G1 X1.25 Y-3.00 Z0.00");
    }

    #[test]
    fn test_segment_length() {
        let seg = MotionSegment::new(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 4.0),
            PenHeights::default(),
        );
        assert_eq!(seg.length(), 5.0);
        assert_eq!(seg.pen_up, 5.0);
        assert_eq!(seg.pen_down, 0.0);
    }
}
