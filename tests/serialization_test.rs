use boundfreq::Counter;
use googletest::assert_that;
use googletest::prelude::contains_substring;

#[test]
fn scenario_5_round_trip_after_manual_prune() {
    let mut original = Counter::new(16).unwrap();
    for _ in 0..10 {
        original.increment("x", 1).unwrap();
    }
    for _ in 0..3 {
        original.increment("y", 1).unwrap();
    }
    original.increment("z", 1).unwrap();
    original.prune(2);

    let state = original.to_state();
    let restored = Counter::from_state(state).unwrap();

    for key in ["x", "y", "z"] {
        assert_eq!(restored.get(key).unwrap(), original.get(key).unwrap());
    }
    assert_eq!(restored.total(), original.total());
    assert_eq!(restored.size(), original.size());
    assert_eq!(restored.buckets(), original.buckets());
    assert_eq!(restored.cardinality(), original.cardinality());

    assert_eq!(
        restored.to_state().histogram_bytes,
        original.to_state().histogram_bytes
    );
}

#[test]
fn round_trip_preserves_many_keys() {
    let mut original = Counter::new(64).unwrap();
    for i in 0..50 {
        original.increment(&format!("key-{i}"), (i + 1) as i64).unwrap();
    }

    let restored = Counter::from_state(original.to_state()).unwrap();

    for i in 0..50 {
        let key = format!("key-{i}");
        assert_eq!(restored.get(&key).unwrap(), original.get(&key).unwrap());
    }
    assert_eq!(restored.total(), original.total());
    assert_eq!(
        restored.to_state().max_prune,
        original.to_state().max_prune
    );
}

#[test]
fn truncated_table_bytes_is_rejected() {
    let counter = Counter::new(16).unwrap();
    let mut state = counter.to_state();
    state.table_bytes.truncate(state.table_bytes.len() - 1);

    let err = Counter::from_state(state).unwrap_err();
    assert_that!(err.message(), contains_substring("table_bytes"));
}

#[test]
fn mismatched_hll_bytes_is_rejected() {
    let counter = Counter::new(16).unwrap();
    let mut state = counter.to_state();
    state.hll_bytes.pop();

    let err = Counter::from_state(state).unwrap_err();
    assert_that!(err.message(), contains_substring("hll_bytes"));
}

#[test]
fn non_power_of_two_buckets_is_rejected() {
    let counter = Counter::new(16).unwrap();
    let mut state = counter.to_state();
    state.buckets = 15;

    assert!(Counter::from_state(state).is_err());
}
