//! Property-based tests: grouped counts and sums agree with a plain model
//! whatever the record order.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use rill_core::{record, run_mapper, Record};
use rill_stats::{Stats1Mapper, Stats1Options};

proptest! {
    #[test]
    fn grouped_count_and_sum_match_model(
        rows in prop::collection::vec((0u8..6, -1000i64..1000), 0..200)
    ) {
        let records: Vec<Record> = rows
            .iter()
            .map(|(g, v)| record([("g", g.to_string()), ("v", v.to_string())]))
            .collect();
        let mut mapper = Stats1Mapper::new(
            Stats1Options::new(["count", "sum"], ["v"]).group_by(["g"]),
        )
        .unwrap();
        let out = run_mapper(&mut mapper, "in.dkvp", records).unwrap();

        // First-seen group order, with count and sum per group.
        let mut model: Vec<(u8, i64, i64)> = Vec::new();
        for &(g, v) in &rows {
            match model.iter_mut().find(|(k, _, _)| *k == g) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 += v;
                }
                None => model.push((g, 1, v)),
            }
        }
        let expected: Vec<Record> = model
            .iter()
            .map(|(g, count, sum)| {
                record([
                    ("g", g.to_string()),
                    ("v_count", count.to_string()),
                    ("v_sum", sum.to_string()),
                ])
            })
            .collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn median_is_an_ingested_value(values in prop::collection::vec(-50i64..50, 1..60)) {
        let records: Vec<Record> = values.iter().map(|v| record([("x", v.to_string())])).collect();
        let mut mapper = Stats1Mapper::new(Stats1Options::new(["median", "min", "max"], ["x"])).unwrap();
        let out = run_mapper(&mut mapper, "in.dkvp", records).unwrap();
        prop_assert_eq!(out.len(), 1);
        let read = |name: &str| out[0].get(name).unwrap().parse::<i64>().unwrap();
        let median = read("x_median");
        prop_assert!(values.contains(&median));
        prop_assert!(read("x_min") <= median && median <= read("x_max"));
    }
}
