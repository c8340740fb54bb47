use domain::{HistorySample, VehicleMetrics, merge_capped, prepend_capped};
use serde_json::json;

fn sample(timestamp: &str, ts_ms: i64) -> HistorySample {
    HistorySample {
        timestamp: timestamp.to_string(),
        ts_ms,
        raw: json!({ "ENTRYDATE": timestamp }),
        metrics: VehicleMetrics::default(),
    }
}

#[test]
fn prepend_keeps_newest_first_and_caps() {
    let mut history = Vec::new();
    for cycle in 0..7 {
        prepend_capped(&mut history, sample(&format!("t{cycle}"), cycle), 5);
        assert_eq!(history.len(), ((cycle + 1) as usize).min(5));
        assert_eq!(history[0].timestamp, format!("t{cycle}"));
    }
    assert_eq!(history.last().map(|item| item.timestamp.as_str()), Some("t2"));
}

#[test]
fn merge_dedupes_by_timestamp_and_sorts() {
    let mut history = vec![sample("c", 30), sample("a", 10)];
    let added = merge_capped(
        &mut history,
        vec![sample("b", 20), sample("a", 10), sample("b", 20), sample("d", 40)],
        10,
    );
    assert_eq!(added, 2);
    let order: Vec<&str> = history.iter().map(|item| item.timestamp.as_str()).collect();
    assert_eq!(order, vec!["d", "c", "b", "a"]);
}

#[test]
fn merge_truncates_to_cap() {
    let mut history = vec![sample("old", 1)];
    merge_capped(&mut history, vec![sample("new1", 5), sample("new2", 6)], 2);
    let order: Vec<&str> = history.iter().map(|item| item.timestamp.as_str()).collect();
    assert_eq!(order, vec!["new2", "new1"]);
}
