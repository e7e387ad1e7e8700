use boundfreq::{Counter, UpdateSource};

#[test]
fn update_from_pairs_applies_each_delta() {
    let mut counter = Counter::new(16).unwrap();
    let pairs = vec![("a", 2i64), ("b", 5), ("a", 1)];
    counter
        .update(UpdateSource::pairs(pairs.iter().map(|&(k, v)| (k, v))))
        .unwrap();

    assert_eq!(counter.get("a").unwrap(), 3);
    assert_eq!(counter.get("b").unwrap(), 5);
    assert_eq!(counter.total(), 8);
}

#[test]
fn update_from_another_counter_applies_its_counts() {
    let mut source = Counter::new(16).unwrap();
    source.increment("a", 3).unwrap();
    source.increment("b", 1).unwrap();

    let mut target = Counter::new(16).unwrap();
    target.increment("a", 1).unwrap();
    target.update(UpdateSource::Counter(&source)).unwrap();

    assert_eq!(target.get("a").unwrap(), 4);
    assert_eq!(target.get("b").unwrap(), 1);
}

#[test]
fn update_short_circuits_on_invalid_key() {
    let mut counter = Counter::new(16).unwrap();
    let items = vec!["ok", "a\0b", "never-applied"];
    let result = counter.update(UpdateSource::strings(items.into_iter()));

    assert!(result.is_err());
    assert_eq!(counter.get("ok").unwrap(), 1);
    assert_eq!(counter.get("never-applied").unwrap(), 0);
}
