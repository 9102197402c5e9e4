//! Motion Script Writer
//!
//! Serializes pen strokes into a G-code motion script: a fixed preamble, an
//! initial pen-up move to the origin, four lines per stroke (lift, travel,
//! lower, draw) and a final pen-up return to the origin.

use crate::error::CamToolResult;
use inkbot_core::{MotionCommand, MotionKind, MotionSegment, PenHeights};
use std::path::Path;

/// Directive lines written before any motion
pub const PREAMBLE: [&str; 2] = ["G21 ; Set units to mm", "G90 ; Absolute positioning"];

/// Round a value to the precision motion lines are rendered with
///
/// Keeping in-memory commands at the rendered precision makes decoding the
/// commands and decoding their rendered text produce the same records.
pub fn to_script_precision(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// A complete motion script held in memory
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionScript {
    commands: Vec<MotionCommand>,
}

impl MotionScript {
    /// Motion commands in execution order (preamble excluded)
    pub fn commands(&self) -> &[MotionCommand] {
        &self.commands
    }

    /// Number of motion commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the script has no motion commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Rendered text lines, preamble first
    pub fn lines(&self) -> Vec<String> {
        PREAMBLE
            .iter()
            .map(|line| line.to_string())
            .chain(self.commands.iter().map(|cmd| cmd.to_string()))
            .collect()
    }

    /// Render the script as newline-terminated text
    pub fn to_gcode(&self) -> String {
        let mut gcode = String::new();
        for line in self.lines() {
            gcode.push_str(&line);
            gcode.push('\n');
        }
        gcode
    }

    /// Write the rendered script to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CamToolResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_gcode())?;
        tracing::info!("Motion script saved to {}", path.display());
        Ok(())
    }
}

/// Builds motion scripts from strokes
#[derive(Debug, Clone)]
pub struct MotionScriptWriter {
    pen: PenHeights,
}

impl MotionScriptWriter {
    /// Create a writer using the given pen heights for the origin moves
    pub fn new(pen: PenHeights) -> Self {
        Self { pen }
    }

    /// Serialize strokes into a motion script
    pub fn write(&self, segments: &[MotionSegment]) -> MotionScript {
        let up = to_script_precision(self.pen.up);
        let mut commands = Vec::with_capacity(segments.len() * 4 + 2);

        commands.push(MotionCommand::to_xyz(MotionKind::Travel, 0.0, 0.0, up));

        for segment in segments {
            let seg_up = to_script_precision(segment.pen_up);
            let seg_down = to_script_precision(segment.pen_down);
            let (sx, sy) = (
                to_script_precision(segment.start.x),
                to_script_precision(segment.start.y),
            );
            let (ex, ey) = (
                to_script_precision(segment.end.x),
                to_script_precision(segment.end.y),
            );

            commands.push(MotionCommand::to_z(MotionKind::Travel, seg_up));
            commands.push(MotionCommand::to_xyz(MotionKind::Travel, sx, sy, seg_up));
            commands.push(MotionCommand::to_xyz(MotionKind::Travel, sx, sy, seg_down));
            commands.push(MotionCommand::to_xyz(MotionKind::Draw, ex, ey, seg_down));
        }

        commands.push(MotionCommand::to_xyz(MotionKind::Travel, 0.0, 0.0, up));

        tracing::debug!(
            "Wrote motion script: {} segments, {} commands",
            segments.len(),
            commands.len()
        );
        MotionScript { commands }
    }
}
