//! Scroll-spy: which page section is currently in focus.
//!
//! Holds one section id, overwritten by whichever observed section most
//! recently reported becoming visible. In the browser,
//! `platform::browser::SectionObserver` feeds it from an intersection
//! observer; hosts that measure geometry themselves can call
//! [`ScrollSpyTracker::report_bounds`].

#[cfg(test)]
#[path = "scroll_spy_test.rs"]
mod scroll_spy_test;

use leptos::prelude::*;

/// Whether an element spanning `top..=bottom` (viewport coordinates) crosses
/// the vertical center of a viewport `viewport_height` tall.
#[must_use]
pub fn in_center_band(top: f64, bottom: f64, viewport_height: f64) -> bool {
    let center = viewport_height / 2.0;
    top <= center && bottom >= center
}

/// Active-section tracker. Clones share the same cell.
#[derive(Clone, Debug)]
pub struct ScrollSpyTracker {
    active: ArcRwSignal<String>,
}

impl Default for ScrollSpyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSpyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: ArcRwSignal::new(String::new()),
        }
    }

    /// Id of the section in focus; empty until something reports.
    #[must_use]
    pub fn active_section(&self) -> ArcReadSignal<String> {
        self.active.read_only()
    }

    /// Visibility transition for `section_id`. Only `visible == true` moves
    /// the active section.
    pub fn report(&self, section_id: &str, visible: bool) {
        if visible {
            self.set_active(section_id);
        }
    }

    /// Report measured bounds, applying the center-band policy.
    pub fn report_bounds(&self, section_id: &str, top: f64, bottom: f64, viewport_height: f64) {
        self.report(section_id, in_center_band(top, bottom, viewport_height));
    }

    pub fn set_active(&self, section_id: &str) {
        if self.active.with_untracked(|current| current != section_id) {
            self.active.set(section_id.to_owned());
        }
    }
}
