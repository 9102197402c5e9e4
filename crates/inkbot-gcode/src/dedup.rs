//! Coordinate Deduplicator
//!
//! Collapses runs of identical consecutive records into one record. Records
//! that repeat a non-adjacent earlier record are kept, and the header is
//! always carried over untouched.

use inkbot_core::CoordinateRecord;

use crate::table::CoordinateTable;

/// Consecutive-duplicate removal for coordinate streams
#[derive(Debug)]
pub struct CoordinateDeduplicator;

impl CoordinateDeduplicator {
    /// Remove immediately repeated records, preserving order
    pub fn dedup_records(records: &[CoordinateRecord]) -> Vec<CoordinateRecord> {
        let mut result: Vec<CoordinateRecord> = Vec::with_capacity(records.len());
        for rec in records {
            if result.last() != Some(rec) {
                result.push(*rec);
            }
        }
        result
    }

    /// Deduplicate a table, keeping its header
    pub fn dedup(table: &CoordinateTable) -> CoordinateTable {
        let records = Self::dedup_records(&table.records);
        tracing::debug!(
            "Deduplicated {} records down to {}",
            table.records.len(),
            records.len()
        );
        CoordinateTable {
            header: table.header.clone(),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(x: i64, y: i64, z: i64) -> CoordinateRecord {
        CoordinateRecord::new(x, y, z)
    }

    #[test]
    fn test_consecutive_duplicates_collapse() {
        let input = vec![rec(0, 0, 5), rec(0, 0, 5), rec(1, 0, 5), rec(1, 0, 5), rec(1, 0, 5)];
        assert_eq!(
            CoordinateDeduplicator::dedup_records(&input),
            vec![rec(0, 0, 5), rec(1, 0, 5)]
        );
    }

    #[test]
    fn test_non_adjacent_duplicates_are_kept() {
        let input = vec![rec(0, 0, 5), rec(3, 3, 0), rec(0, 0, 5)];
        assert_eq!(CoordinateDeduplicator::dedup_records(&input), input);
    }

    #[test]
    fn test_header_survives_empty_table() {
        let table = CoordinateTable::default();
        let out = CoordinateDeduplicator::dedup(&table);
        assert_eq!(out.header, table.header);
        assert!(out.records.is_empty());
    }
}
