//! Motion script parser with axis carry-forward
//!
//! Every line that names at least one of X, Y or Z becomes one coordinate
//! record. Axes missing from a line take the last resolved value for that
//! axis, so a `G0 Z5` line still yields a complete XYZ record.

use inkbot_core::{Axis, CoordinateRecord, MotionCommand, Result};
use regex::Regex;
use std::path::Path;

use crate::table::CoordinateTable;

/// Last resolved position during one parse pass
///
/// Starts at the origin. Values are the rounded integers already emitted,
/// not the raw script values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisState {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl AxisState {
    /// Create a state at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the axes that are present and return the resolved record
    pub fn resolve(&mut self, x: Option<i64>, y: Option<i64>, z: Option<i64>) -> CoordinateRecord {
        self.x = x.unwrap_or(self.x);
        self.y = y.unwrap_or(self.y);
        self.z = z.unwrap_or(self.z);
        CoordinateRecord::new(self.x, self.y, self.z)
    }
}

/// Round a script value the way the coordinate decoder does (ties to even)
pub fn round_coordinate(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Stateful motion script parser
///
/// One parser instance is one parse pass; create a new parser (or call
/// [`CommandParser::reset`]) before decoding another script.
pub struct CommandParser {
    state: AxisState,
    line_number: u32,
}

impl CommandParser {
    /// Create a new parser at the origin
    pub fn new() -> Self {
        Self {
            state: AxisState::new(),
            line_number: 0,
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandParser {
    /// Parse one script line
    ///
    /// Returns `None` for lines without any axis word (directives, comments,
    /// blank lines).
    pub fn parse_line(&mut self, line: &str) -> Option<CoordinateRecord> {
        self.line_number += 1;
        let cleaned = remove_comments(line);

        let mut values: [Option<i64>; 3] = [None; 3];
        let mut found = false;
        for caps in axis_regex().captures_iter(&cleaned) {
            let Some(axis) = caps[1].chars().next().and_then(Axis::from_letter) else {
                continue;
            };
            let Ok(value) = caps[2].parse::<f64>() else {
                continue;
            };
            values[axis.index()] = Some(round_coordinate(value));
            found = true;
        }

        if !found {
            return None;
        }

        let record = self.state.resolve(values[0], values[1], values[2]);
        tracing::trace!("line {}: {} -> {}", self.line_number, line.trim(), record);
        Some(record)
    }

    /// Resolve an in-memory motion command with the same carry-forward rule
    pub fn apply_command(&mut self, command: &MotionCommand) -> Option<CoordinateRecord> {
        self.line_number += 1;
        if !command.has_axes() {
            return None;
        }
        Some(self.state.resolve(
            command.x.map(round_coordinate),
            command.y.map(round_coordinate),
            command.z.map(round_coordinate),
        ))
    }

    /// Parse all lines of a script
    pub fn parse_lines<'a, I>(&mut self, lines: I) -> CoordinateTable
    where
        I: IntoIterator<Item = &'a str>,
    {
        let records = lines
            .into_iter()
            .filter_map(|line| self.parse_line(line))
            .collect();
        CoordinateTable::new(records)
    }

    /// Parse script text
    pub fn parse_str(&mut self, text: &str) -> CoordinateTable {
        self.parse_lines(text.lines())
    }

    /// Resolve a sequence of in-memory commands
    pub fn resolve_commands(&mut self, commands: &[MotionCommand]) -> CoordinateTable {
        let records = commands
            .iter()
            .filter_map(|cmd| self.apply_command(cmd))
            .collect();
        CoordinateTable::new(records)
    }

    /// Read and parse a script file
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<CoordinateTable> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let table = self.parse_str(&text);
        tracing::debug!(
            "Parsed {} records from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Current axis state
    pub fn state(&self) -> AxisState {
        self.state
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Return to the origin for a new parse pass
    pub fn reset(&mut self) {
        self.state = AxisState::new();
        self.line_number = 0;
    }
}

/// Remove comments from a G-Code line
fn remove_comments(line: &str) -> String {
    static COMMENT_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"));
    regex.replace(line, "").to_string()
}

fn axis_regex() -> &'static Regex {
    static AXIS_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    AXIS_REGEX.get_or_init(|| {
        Regex::new(r"([XYZ])([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkbot_core::MotionKind;

    #[test]
    fn test_full_line() {
        let mut parser = CommandParser::new();
        let rec = parser.parse_line("G0 X12.30 Y76.50 Z5.00").unwrap();
        assert_eq!(rec, CoordinateRecord::new(12, 76, 5));
    }

    #[test]
    fn test_directives_produce_nothing() {
        let mut parser = CommandParser::new();
        assert!(parser.parse_line("G21 ; Set units to mm").is_none());
        assert!(parser.parse_line("G90 ; Absolute positioning").is_none());
        assert!(parser.parse_line("").is_none());
        assert!(parser.parse_line("M5").is_none());
        assert_eq!(parser.line_number(), 4);
    }

    #[test]
    fn test_axes_in_any_order() {
        let mut parser = CommandParser::new();
        let rec = parser.parse_line("G1 Z-2 X+3.6 Y.4").unwrap();
        assert_eq!(rec, CoordinateRecord::new(4, 0, -2));
    }

    #[test]
    fn test_comment_tokens_are_ignored() {
        let mut parser = CommandParser::new();
        let rec = parser.parse_line("G0 X1 (park at Y99)").unwrap();
        assert_eq!(rec, CoordinateRecord::new(1, 0, 0));
    }

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(round_coordinate(2.5), 2);
        assert_eq!(round_coordinate(3.5), 4);
        assert_eq!(round_coordinate(-0.5), 0);
        assert_eq!(round_coordinate(76.51), 77);
        assert_eq!(round_coordinate(-1.49), -1);
    }

    #[test]
    fn test_commands_match_text() {
        let commands = vec![
            MotionCommand::to_xyz(MotionKind::Travel, 0.0, 0.0, 5.0),
            MotionCommand::to_z(MotionKind::Travel, 0.0),
            MotionCommand::to_xyz(MotionKind::Draw, 10.5, 3.25, 0.0),
        ];
        let text: Vec<String> = commands.iter().map(|c| c.to_string()).collect();

        let from_commands = CommandParser::new().resolve_commands(&commands);
        let from_text = CommandParser::new().parse_lines(text.iter().map(String::as_str));
        assert_eq!(from_commands, from_text);
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let mut parser = CommandParser::new();
        parser.parse_line("G0 X5 Y5 Z5");
        parser.reset();
        assert_eq!(parser.state(), AxisState::new());
        assert_eq!(
            parser.parse_line("G0 Z1"),
            Some(CoordinateRecord::new(0, 0, 1))
        );
    }
}
