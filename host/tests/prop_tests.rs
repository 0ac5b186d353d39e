use proptest::prelude::*;

use cairn_host::usage::{clear_usage, free_slot, is_set, set_usage, usage_sectors};

proptest! {
    /// set then enumerate contains the slot; clear and it does not.
    #[test]
    fn set_then_clear(words in prop::collection::vec(any::<u64>(), 1..8), slot_seed in any::<u64>()) {
        let mut usage = words;
        let slot = slot_seed % (usage.len() as u64 * 64);

        set_usage(&mut usage, slot);
        prop_assert!(is_set(&usage, slot));
        prop_assert!(usage_sectors(&usage).contains(&slot));

        clear_usage(&mut usage, slot);
        prop_assert!(!is_set(&usage, slot));
        prop_assert!(!usage_sectors(&usage).contains(&slot));
    }

    /// usage_sectors is sorted ascending and free of duplicates.
    #[test]
    fn enumeration_is_sorted(words in prop::collection::vec(any::<u64>(), 1..8)) {
        let sectors = usage_sectors(&words);
        for pair in sectors.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    /// enumeration agrees with the per-slot predicate.
    #[test]
    fn enumeration_matches_is_set(words in prop::collection::vec(any::<u64>(), 1..4)) {
        let sectors = usage_sectors(&words);
        for slot in 0..(words.len() as u64 * 64) {
            prop_assert_eq!(sectors.contains(&slot), is_set(&words, slot));
        }
    }

    /// free_slot returns a clear slot, and None only when every bit is set.
    #[test]
    fn free_slot_is_clear(words in prop::collection::vec(any::<u64>(), 1..8)) {
        match free_slot(&words) {
            Some(slot) => prop_assert!(!is_set(&words, slot)),
            None => prop_assert!(words.iter().all(|&w| w == u64::MAX)),
        }
    }

    /// set/clear only touches the named slot.
    #[test]
    fn operations_are_local(words in prop::collection::vec(any::<u64>(), 1..4), slot_seed in any::<u64>()) {
        let slot = slot_seed % (words.len() as u64 * 64);
        let before = usage_sectors(&words);

        let mut usage = words.clone();
        set_usage(&mut usage, slot);
        let mut expected: Vec<u64> = before.clone();
        if !expected.contains(&slot) {
            expected.push(slot);
            expected.sort_unstable();
        }
        prop_assert_eq!(usage_sectors(&usage), expected);

        clear_usage(&mut usage, slot);
        let expected_after: Vec<u64> = before.into_iter().filter(|&s| s != slot).collect();
        prop_assert_eq!(usage_sectors(&usage), expected_after);
    }
}
