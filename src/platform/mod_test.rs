use std::cell::Cell;
use std::rc::Rc;

use super::*;

#[test]
fn subscription_runs_teardown_once_on_drop() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let sub = Subscription::new(move || counter.set(counter.get() + 1));
    assert!(sub.is_active());

    drop(sub);
    assert_eq!(calls.get(), 1);
}

#[test]
fn subscription_unsubscribe_is_drop() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    Subscription::new(move || counter.set(counter.get() + 1)).unsubscribe();
    assert_eq!(calls.get(), 1);
}

#[test]
fn inert_subscription_has_nothing_to_tear_down() {
    let sub = Subscription::inert();
    assert!(!sub.is_active());
    assert!(format!("{sub:?}").contains("active: false"));
}

#[test]
fn system_clock_reports_utc() {
    let now = SystemClock.now_utc();
    assert!(now.offset().is_utc());
}
