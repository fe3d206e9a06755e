//! Partition properties over arbitrary row counts and batch sizes.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rowcommit_dataset::partition::{batch_count, partition_rows};

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn batches_tile_the_row_range(rows in 1usize..5_000, size in 1usize..600) {
        let v = partition_rows(rows, size).unwrap();
        prop_assert_eq!(v.len(), batch_count(rows, size));
        prop_assert_eq!(v.iter().map(|b| b.leaf_count()).sum::<usize>(), rows);
        prop_assert_eq!(v[0].start_row, 0);
        prop_assert_eq!(v.last().unwrap().end_row, rows);

        for (i, b) in v.iter().enumerate() {
            prop_assert_eq!(b.batch_id, i);
            prop_assert!(b.leaf_count() > 0);
            if i + 1 < v.len() {
                prop_assert_eq!(b.leaf_count(), size);
                prop_assert_eq!(b.end_row, v[i + 1].start_row);
            }
        }

        let tail = rows % size;
        let expected_last = if tail == 0 { size } else { tail };
        prop_assert_eq!(v.last().unwrap().leaf_count(), expected_last);
    }
}
