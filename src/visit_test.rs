use std::rc::Rc;

use leptos::prelude::*;
use time::macros::datetime;

use super::*;
use crate::platform::memory::{FixedClock, MemoryStore};

fn counter_with(store: MemoryStore) -> (Rc<MemoryStore>, Rc<FixedClock>, VisitCounter) {
    let store = Rc::new(store);
    let clock = Rc::new(FixedClock::new(datetime!(2024-05-01 09:30:15.250 UTC)));
    let counter = VisitCounter::new(store.clone(), clock.clone());
    (store, clock, counter)
}

fn seeded(count: u64) -> MemoryStore {
    MemoryStore::with_entries([("su:visits", format!(r#"{{"count":{count},"lastVisit":null}}"#))])
}

fn stored_record(store: &MemoryStore, key: &str) -> VisitRecord {
    let raw = store.get(key).unwrap_or_default();
    serde_json::from_str(&raw).unwrap_or_default()
}

#[test]
fn first_visit_counts_one_with_no_last_visit() {
    let (_store, _clock, mut counter) = counter_with(MemoryStore::new());
    let visit = counter.init(None);

    assert_eq!(visit.count, 1);
    assert_eq!(visit.last_visit, None);
    assert_eq!(visit.milestone, None);
    assert_eq!(counter.count().get_untracked(), 1);
    assert_eq!(counter.last_visit().get_untracked(), None);
    assert_eq!(counter.milestone().get_untracked(), None);
}

#[test]
fn increments_existing_count() {
    let (_store, _clock, mut counter) = counter_with(seeded(2));
    assert_eq!(counter.init(None).count, 3);
}

#[test]
fn persists_count_and_iso_timestamp() {
    let (store, _clock, mut counter) = counter_with(MemoryStore::new());
    counter.init(None);

    let record = stored_record(&store, "su:visits");
    assert_eq!(record.count, 1);
    assert_eq!(record.last_visit.as_deref(), Some("2024-05-01T09:30:15.250Z"));
}

#[test]
fn publishes_previous_visit_time_not_current() {
    let (store, clock, mut counter) = counter_with(MemoryStore::new());
    counter.init(None);

    clock.set(datetime!(2024-05-03 18:00 UTC));
    let mut next_session = VisitCounter::new(store.clone(), clock.clone());
    let visit = next_session.init(None);

    assert_eq!(visit.count, 2);
    assert_eq!(visit.last_visit.as_deref(), Some("2024-05-01T09:30:15.250Z"));
    assert_eq!(next_session.last_visit_at(), Some(datetime!(2024-05-01 09:30:15.250 UTC)));
    assert_eq!(
        stored_record(&store, "su:visits").last_visit.as_deref(),
        Some("2024-05-03T18:00:00.000Z")
    );
}

#[test]
fn init_is_not_idempotent() {
    let (_store, _clock, mut counter) = counter_with(MemoryStore::new());
    counter.init(None);
    counter.init(None);
    assert_eq!(counter.init(None).count, 3);
}

#[test]
fn default_milestones() {
    let (store, _clock, mut counter) = counter_with(seeded(9));
    assert_eq!(counter.init(None).milestone, Some(10));

    store.set("su:visits", r#"{"count":99,"lastVisit":null}"#);
    assert_eq!(counter.init(None).milestone, Some(100));
}

#[test]
fn custom_milestones_fire_only_on_exact_visit() {
    let config = || {
        Some(VisitConfig {
            milestone_visits: Some(vec![5, 3]),
            ..VisitConfig::default()
        })
    };
    let (store, _clock, mut counter) = counter_with(seeded(2));
    assert_eq!(counter.init(config()).milestone, Some(3));
    assert_eq!(counter.milestones(), &[3, 5]);

    store.set("su:visits", r#"{"count":4,"lastVisit":null}"#);
    assert_eq!(counter.init(config()).milestone, Some(5));

    store.set("su:visits", r#"{"count":5,"lastVisit":null}"#);
    assert_eq!(counter.init(config()).milestone, None);
    assert_eq!(counter.milestone().get_untracked(), None);
}

#[test]
fn custom_storage_key() {
    let (store, _clock, mut counter) =
        counter_with(MemoryStore::with_entries([("my-visits", r#"{"count":0,"lastVisit":null}"#)]));
    counter.init(Some(VisitConfig {
        storage_key: Some("my-visits".to_owned()),
        ..VisitConfig::default()
    }));

    assert_eq!(stored_record(&store, "my-visits").count, 1);
    assert!(!store.contains("su:visits"));
}

#[test]
fn unreadable_record_starts_over() {
    for raw in ["not json", r#"{"count":-4}"#, r#"{"count":"3"}"#, "[]"] {
        let (_store, _clock, mut counter) =
            counter_with(MemoryStore::with_entries([("su:visits", raw)]));
        assert_eq!(counter.init(None).count, 1, "raw record {raw:?}");
    }
}

#[test]
fn bad_last_visit_keeps_the_count() {
    let (_store, _clock, mut counter) =
        counter_with(MemoryStore::with_entries([("su:visits", r#"{"count":4,"lastVisit":123}"#)]));
    let visit = counter.init(None);
    assert_eq!(visit.count, 5);
    assert_eq!(visit.last_visit, None);
}

#[test]
fn integral_float_count_is_accepted() {
    let (_store, _clock, mut counter) =
        counter_with(MemoryStore::with_entries([("su:visits", r#"{"count":2.0}"#)]));
    assert_eq!(counter.init(None).count, 3);

    let (_store, _clock, mut counter) =
        counter_with(MemoryStore::with_entries([("su:visits", r#"{"count":2.5}"#)]));
    assert_eq!(counter.init(None).count, 1);
}

#[test]
fn array_record_is_not_a_count() {
    let (store, _clock, mut counter) = counter_with(MemoryStore::with_entries([("su:visits", "[1]")]));
    assert_eq!(counter.init(None).count, 1);
    assert_eq!(stored_record(&store, "su:visits").count, 1);
}

#[test]
fn missing_fields_default_individually() {
    let (_store, _clock, mut counter) = counter_with(MemoryStore::with_entries([(
        "su:visits",
        r#"{"lastVisit":"2023-12-31T23:59:59.000Z"}"#,
    )]));
    let visit = counter.init(None);
    assert_eq!(visit.count, 1);
    assert_eq!(visit.last_visit.as_deref(), Some("2023-12-31T23:59:59.000Z"));
}

#[test]
fn last_visit_at_rejects_garbage() {
    let (_store, _clock, mut counter) = counter_with(MemoryStore::with_entries([(
        "su:visits",
        r#"{"count":1,"lastVisit":"yesterday"}"#,
    )]));
    counter.init(None);
    assert_eq!(counter.last_visit().get_untracked().as_deref(), Some("yesterday"));
    assert_eq!(counter.last_visit_at(), None);
}

#[test]
fn format_timestamp_converts_to_utc() {
    let at = datetime!(2024-01-01 02:00 +2);
    assert_eq!(format_timestamp(at).as_deref(), Some("2024-01-01T00:00:00.000Z"));
}
