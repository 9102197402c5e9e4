use inkbot_communication::{CommandMessage, SentinelRemap};
use inkbot_core::CoordinateRecord;
use proptest::prelude::*;

proptest! {
    #[test]
    fn non_sentinel_z_passes_through(x in -500i64..500, y in -500i64..500, z in -10i64..10) {
        prop_assume!(z != 5);
        let msg = CommandMessage::new(CoordinateRecord::new(x, y, z), &SentinelRemap::default());
        prop_assert_eq!(msg.to_string(), format!("{} {} {}", x, y, z));
    }

    #[test]
    fn sentinel_z_is_pulled_back(x in -500i64..500, y in -500i64..500) {
        let msg = CommandMessage::new(CoordinateRecord::new(x, y, 5), &SentinelRemap::default());
        prop_assert_eq!(msg.record.z, 3);
        prop_assert!(!msg.to_string().ends_with('\n'));
    }
}
