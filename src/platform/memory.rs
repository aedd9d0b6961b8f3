//! In-memory collaborators for tests and non-browser rendering.
//!
//! These are complete implementations, not mocks: `MemoryStore` behaves like
//! `localStorage`, `ManualScheduler` is a virtual clock that fires due tasks in
//! deadline order, and `ManualPreference` delivers change events only when the
//! signal actually flips, like a `MediaQueryList`.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use time::OffsetDateTime;

use super::{Clock, KeyValueStore, Scheduler, StyleApplier, Subscription, SystemPreferenceWatcher};

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

/// `localStorage` stand-in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries`, e.g. state left by a previous session.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RefCell::new(entries),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Records the last value written for every CSS property and attribute.
#[derive(Debug, Default)]
pub struct RecordingStyle {
    properties: RefCell<BTreeMap<String, String>>,
    attributes: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

impl RecordingStyle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<String> {
        self.properties.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    /// Snapshot of every property written so far.
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.properties.borrow().clone()
    }

    /// Total number of property and attribute writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl StyleApplier for RecordingStyle {
    fn set_property(&self, name: &str, value: &str) {
        self.writes.set(self.writes.get() + 1);
        self.properties
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.writes.set(self.writes.get() + 1);
        self.attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }
}

type Listeners = RefCell<Vec<(u64, Rc<dyn Fn(bool)>)>>;

/// Settable OS color-scheme signal.
#[derive(Default)]
pub struct ManualPreference {
    dark: Cell<bool>,
    next_id: Cell<u64>,
    listeners: Rc<Listeners>,
}

impl ManualPreference {
    #[must_use]
    pub fn new(dark: bool) -> Self {
        Self {
            dark: Cell::new(dark),
            ..Self::default()
        }
    }

    /// Change the signal, notifying listeners if the value flipped.
    pub fn set_dark(&self, dark: bool) {
        if self.dark.replace(dark) == dark {
            return;
        }
        // Listeners may unsubscribe while being notified.
        let snapshot: Vec<Rc<dyn Fn(bool)>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for cb in snapshot {
            cb(dark);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl SystemPreferenceWatcher for ManualPreference {
    fn prefers_dark(&self) -> bool {
        self.dark.get()
    }

    fn subscribe(&self, on_change: Rc<dyn Fn(bool)>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, on_change));

        let listeners: Weak<Listeners> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|(entry, _)| *entry != id);
            }
        })
    }
}

struct PendingTask {
    due: Duration,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// Virtual-time [`Scheduler`]. Nothing runs until [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    pending: RefCell<Vec<PendingTask>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since construction.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of tasks not yet fired.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move virtual time forward by `by`, running every task that comes due,
    /// earliest deadline first (ties in scheduling order). Tasks scheduled by
    /// a running task fire in the same call if they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(next) = self.take_due(target) {
            if next.due > self.now.get() {
                self.now.set(next.due);
            }
            (next.task)();
        }
        self.now.set(target);
    }

    fn take_due(&self, target: Duration) -> Option<PendingTask> {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(pending.remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.pending.borrow_mut().push(PendingTask {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}

/// [`Clock`] that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<OffsetDateTime>,
}

impl FixedClock {
    #[must_use]
    pub fn new(at: OffsetDateTime) -> Self {
        Self { now: Cell::new(at) }
    }

    pub fn set(&self, at: OffsetDateTime) {
        self.now.set(at);
    }

    pub fn advance(&self, by: time::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        self.now.get()
    }
}
