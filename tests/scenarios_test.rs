use boundfreq::{Counter, UpdateSource};
use googletest::assert_that;
use googletest::prelude::{ge, le};

#[test]
fn scenario_1_basic_counts_and_cardinality() {
    let mut counter = Counter::new(16).unwrap();
    for key in ["a", "b", "a", "c", "a"] {
        counter.increment(key, 1).unwrap();
    }

    assert_eq!(counter.get("a").unwrap(), 3);
    assert_eq!(counter.get("b").unwrap(), 1);
    assert_eq!(counter.get("c").unwrap(), 1);
    assert_eq!(counter.get("z").unwrap(), 0);
    assert_eq!(counter.total(), 5);
    assert_eq!(counter.size(), 3);
    assert_eq!(counter.cardinality(), 3);
}

#[test]
fn scenario_2_auto_prune_under_pressure() {
    let mut counter = Counter::new(4).unwrap();
    for i in 0..100 {
        counter.increment(&i.to_string(), 1).unwrap();
    }

    assert!(
        counter.to_state().max_prune >= 1,
        "expected at least one automatic prune"
    );
    assert!(counter.size() <= 3);
    assert!(counter.total() <= 100);

    let cardinality = counter.cardinality() as f64;
    assert_that!(cardinality, ge(80.0));
    assert_that!(cardinality, le(120.0));
    assert!(counter.quality() <= 1.0);
}

#[test]
fn scenario_3_manual_prune_at_boundary() {
    let mut counter = Counter::new(16).unwrap();
    for _ in 0..10 {
        counter.increment("x", 1).unwrap();
    }
    for _ in 0..3 {
        counter.increment("y", 1).unwrap();
    }
    counter.increment("z", 1).unwrap();

    counter.prune(2);

    // Boundary is the inclusive upper limit of counts removed (per the
    // glossary and §4.5): only "z" (count 1) falls at or below 2.
    assert_eq!(counter.get("x").unwrap(), 10);
    assert_eq!(counter.get("y").unwrap(), 3);
    assert_eq!(counter.get("z").unwrap(), 0);
    assert_eq!(counter.size(), 2);
    assert_eq!(counter.total(), 13);
    assert_eq!(counter.to_state().max_prune, 2);
}

#[test]
fn scenario_4_set_to_zero_keeps_cell_occupied() {
    let mut counter = Counter::new(8).unwrap();
    counter.set("k", 5).unwrap();
    counter.set("k", 0).unwrap();

    assert_eq!(counter.get("k").unwrap(), 0);
    assert_eq!(counter.size(), 0);

    let dump = counter.histogram_dump();
    let bin_zero = dump[0];
    assert_eq!(bin_zero.0, 0);
    assert!(bin_zero.2 >= 1);
}

#[test]
fn scenario_6_update_matches_sequential_increments() {
    let keys = ["a", "b", "a", "a", "b", "c"];

    let mut via_update = Counter::new(16).unwrap();
    via_update
        .update(UpdateSource::strings(keys.iter().copied()))
        .unwrap();

    let mut via_increment = Counter::new(16).unwrap();
    for key in keys {
        via_increment.increment(key, 1).unwrap();
    }

    for key in ["a", "b", "c"] {
        assert_eq!(via_update.get(key).unwrap(), via_increment.get(key).unwrap());
    }
    assert_eq!(via_update.total(), via_increment.total());
    assert_eq!(via_update.size(), via_increment.size());
}

#[test]
fn boundary_bucket_count_rejects_below_four() {
    assert!(Counter::new(3).is_err());
    let counter = Counter::new(4).unwrap();
    assert_eq!(counter.buckets(), 4);
}

#[test]
fn boundary_zero_delta_is_noop() {
    let mut counter = Counter::new(16).unwrap();
    counter.increment("a", 0).unwrap();
    assert_eq!(counter.get("a").unwrap(), 0);
    assert_eq!(counter.size(), 0);
}

#[test]
fn boundary_overflow_leaves_cell_unchanged() {
    let mut counter = Counter::new(16).unwrap();
    counter.increment("a", i64::MAX).unwrap();
    let err = counter.increment("a", 1).unwrap_err();
    assert_eq!(err.kind(), boundfreq::error::ErrorKind::Overflow);
    assert_eq!(counter.get("a").unwrap(), i64::MAX);
}

#[test]
fn boundary_set_zero_on_absent_key_does_not_allocate() {
    let mut counter = Counter::new(16).unwrap();
    counter.set("absent", 0).unwrap();
    assert_eq!(counter.size(), 0);
    assert_eq!(counter.get("absent").unwrap(), 0);
}

#[test]
fn key_with_null_byte_is_rejected() {
    let mut counter = Counter::new(16).unwrap();
    let bad = "a\0b";
    let err = counter.increment(bad, 1).unwrap_err();
    assert_eq!(err.kind(), boundfreq::error::ErrorKind::InvalidArgument);
}
