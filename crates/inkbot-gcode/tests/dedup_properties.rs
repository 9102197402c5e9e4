use inkbot_core::CoordinateRecord;
use inkbot_gcode::{CoordinateDeduplicator, CoordinateTable};
use proptest::prelude::*;

// Small value ranges so duplicates actually occur.
fn records() -> impl Strategy<Value = Vec<CoordinateRecord>> {
    prop::collection::vec((0i64..3, 0i64..3, 0i64..2), 0..64)
        .prop_map(|v| v.into_iter().map(CoordinateRecord::from).collect())
}

proptest! {
    #[test]
    fn dedup_is_idempotent(input in records()) {
        let once = CoordinateDeduplicator::dedup_records(&input);
        let twice = CoordinateDeduplicator::dedup_records(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn dedup_never_grows(input in records()) {
        prop_assert!(CoordinateDeduplicator::dedup_records(&input).len() <= input.len());
    }

    #[test]
    fn dedup_leaves_no_adjacent_duplicates(input in records()) {
        let out = CoordinateDeduplicator::dedup_records(&input);
        for pair in out.windows(2) {
            prop_assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn dedup_keeps_the_header(input in records()) {
        let mut table = CoordinateTable::new(input);
        table.header.columns = vec!["x".into(), "y".into(), "z".into()];
        let out = CoordinateDeduplicator::dedup(&table);
        prop_assert_eq!(out.header, table.header);
    }
}

#[test]
fn dedup_keeps_non_consecutive_repeats() {
    let a = CoordinateRecord::new(1, 1, 5);
    let b = CoordinateRecord::new(2, 1, 0);
    let out = CoordinateDeduplicator::dedup_records(&[a, a, b, a]);
    assert_eq!(out, vec![a, b, a]);
}
