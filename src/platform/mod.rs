//! Host environment seams shared by every service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Services never touch `localStorage`, the document, `matchMedia`, timers,
//! or the wall clock directly. They receive these capabilities as trait
//! objects so the same state logic runs in the browser (`browser`, behind the
//! `hydrate` feature), during server rendering, and under test (`memory`).
//!
//! DESIGN
//! ======
//! Execution is single-threaded, so collaborators are shared as `Rc<dyn _>`
//! and take `&self`; implementations use interior mutability where needed.

pub mod memory;

#[cfg(feature = "hydrate")]
pub mod browser;

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use time::OffsetDateTime;

/// Synchronous string key-value persistence (`localStorage` shaped).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Document mutations: CSS custom properties and attributes on the root element.
pub trait StyleApplier {
    fn set_property(&self, name: &str, value: &str);
    fn set_attribute(&self, name: &str, value: &str);
}

/// Source of the OS-level `prefers-color-scheme: dark` signal.
pub trait SystemPreferenceWatcher {
    /// Current value of the signal.
    fn prefers_dark(&self) -> bool;

    /// Register `on_change` for future changes. The listener stays registered
    /// until the returned [`Subscription`] is dropped.
    fn subscribe(&self, on_change: Rc<dyn Fn(bool)>) -> Subscription;
}

/// One-shot delayed task execution.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Wall clock.
pub trait Clock {
    fn now_utc(&self) -> OffsetDateTime;
}

/// [`Clock`] backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// RAII handle for a registered listener. Dropping it unregisters.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap the teardown closure for a registered listener.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to tear down, used when registration
    /// could not happen.
    #[must_use]
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    /// Whether dropping this handle will unregister anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Unregister now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
