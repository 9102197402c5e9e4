//! Coordinate table and its comma-separated file format
//!
//! ```text
//! X,Y,Z
//! 0,0,5
//! 0,76,5
//! ```

use inkbot_core::{CoordinateRecord, GcodeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field separator of the coordinate file
pub const FIELD_SEPARATOR: char = ',';

/// Header row of a coordinate table
///
/// Kept verbatim through deduplication; the default is `X,Y,Z`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateHeader {
    pub columns: Vec<String>,
}

impl Default for CoordinateHeader {
    fn default() -> Self {
        Self {
            columns: vec!["X".to_string(), "Y".to_string(), "Z".to_string()],
        }
    }
}

impl CoordinateHeader {
    /// Render as a file row
    pub fn to_row(&self) -> String {
        self.columns.join(&FIELD_SEPARATOR.to_string())
    }
}

/// Header plus ordered coordinate records
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoordinateTable {
    pub header: CoordinateHeader,
    pub records: Vec<CoordinateRecord>,
}

impl CoordinateTable {
    /// Create a table with the default header
    pub fn new(records: Vec<CoordinateRecord>) -> Self {
        Self {
            header: CoordinateHeader::default(),
            records,
        }
    }

    /// Number of records (header excluded)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record, if any
    pub fn first(&self) -> Option<&CoordinateRecord> {
        self.records.first()
    }

    /// Last record, if any
    pub fn last(&self) -> Option<&CoordinateRecord> {
        self.records.last()
    }

    /// Render in the coordinate file format
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(16 * (self.records.len() + 1));
        out.push_str(&self.header.to_row());
        out.push('\n');
        for rec in &self.records {
            out.push_str(&format!("{},{},{}\n", rec.x, rec.y, rec.z));
        }
        out
    }

    /// Parse the coordinate file format
    ///
    /// The first non-blank line is the header. Rows with fewer than three
    /// fields are skipped; a non-integer field is an error.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i as u32 + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let Some((_, header_row)) = lines.next() else {
            return Err(GcodeError::EmptyFile {
                reason: "coordinate file has no header row".to_string(),
            }
            .into());
        };
        let header = CoordinateHeader {
            columns: header_row
                .split(FIELD_SEPARATOR)
                .map(|c| c.trim().to_string())
                .collect(),
        };

        let mut records = Vec::new();
        for (line_number, line) in lines {
            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
            if fields.len() < 3 {
                tracing::debug!("Skipping short row {}: {}", line_number, line);
                continue;
            }
            let parse = |field: &str| {
                field.parse::<i64>().map_err(|e| GcodeError::InvalidSyntax {
                    line_number,
                    reason: format!("'{}' is not an integer: {}", field, e),
                })
            };
            records.push(CoordinateRecord::new(
                parse(fields[0])?,
                parse(fields[1])?,
                parse(fields[2])?,
            ));
        }

        Ok(Self { header, records })
    }

    /// Write the table to a coordinate file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_csv())?;
        tracing::info!(
            "Coordinate file saved to {} ({} records)",
            path.display(),
            self.records.len()
        );
        Ok(())
    }

    /// Read a coordinate file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_csv(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_csv() {
        let table = CoordinateTable::new(vec![
            CoordinateRecord::new(0, 0, 5),
            CoordinateRecord::new(-3, 76, 0),
        ]);
        assert_eq!(table.to_csv(), "X,Y,Z\n0,0,5\n-3,76,0\n");
    }

    #[test]
    fn test_from_csv_skips_short_rows_and_crlf() {
        let table = CoordinateTable::from_csv("X,Y,Z\r\n1,2,3\r\n4,5\r\n\r\n6,7,8\r\n").unwrap();
        assert_eq!(table.header, CoordinateHeader::default());
        assert_eq!(
            table.records,
            vec![CoordinateRecord::new(1, 2, 3), CoordinateRecord::new(6, 7, 8)]
        );
    }

    #[test]
    fn test_from_csv_rejects_non_integer() {
        let err = CoordinateTable::from_csv("X,Y,Z\n1,2,3\n1.5,2,3\n").unwrap_err();
        match err {
            inkbot_core::Error::Gcode(GcodeError::InvalidSyntax { line_number, .. }) => {
                assert_eq!(line_number, 3)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_csv_empty() {
        assert!(CoordinateTable::from_csv("\n\n").is_err());
    }

    #[test]
    fn test_custom_header_is_kept() {
        let table = CoordinateTable::from_csv("x,y,z\n1,1,1\n").unwrap();
        assert_eq!(table.header.to_row(), "x,y,z");
        assert!(table.to_csv().starts_with("x,y,z\n"));
    }
}
