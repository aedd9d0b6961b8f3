use leptos::prelude::*;

use super::*;

#[test]
fn starts_empty() {
    let spy = ScrollSpyTracker::new();
    assert_eq!(spy.active_section().get_untracked(), "");
}

#[test]
fn set_active_overwrites() {
    let spy = ScrollSpyTracker::new();
    spy.set_active("main");
    assert_eq!(spy.active_section().get_untracked(), "main");
}

#[test]
fn last_visible_report_wins() {
    let spy = ScrollSpyTracker::new();
    spy.report("intro", true);
    spy.report("pricing", true);
    spy.report("intro", false);
    assert_eq!(spy.active_section().get_untracked(), "pricing");
}

#[test]
fn clones_share_state() {
    let spy = ScrollSpyTracker::new();
    let observer_side = spy.clone();
    observer_side.report("faq", true);
    assert_eq!(spy.active_section().get_untracked(), "faq");
}

#[test]
fn center_band_policy() {
    // 800px viewport, center line at 400.
    assert!(in_center_band(100.0, 500.0, 800.0));
    assert!(in_center_band(400.0, 900.0, 800.0));
    assert!(!in_center_band(0.0, 399.0, 800.0));
    assert!(!in_center_band(401.0, 1200.0, 800.0));
}

#[test]
fn report_bounds_activates_only_centered_section() {
    let spy = ScrollSpyTracker::new();
    spy.report_bounds("header", -200.0, 120.0, 800.0);
    assert_eq!(spy.active_section().get_untracked(), "");

    spy.report_bounds("features", 120.0, 900.0, 800.0);
    assert_eq!(spy.active_section().get_untracked(), "features");
}
