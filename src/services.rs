//! Composition root.
//!
//! SYSTEM CONTEXT
//! ==============
//! Applications build one [`Platform`] (the host collaborators) and one
//! [`Services`] bundle at startup, then hand individual services to the UI
//! layer by reference. Nothing here is a global; two bundles on two platforms
//! are fully independent.

#[cfg(test)]
#[path = "services_test.rs"]
mod services_test;

use std::rc::Rc;

use crate::config::SettingsConfig;
use crate::font_size::FontSizeEngine;
use crate::notification::NotificationQueue;
use crate::platform::memory::{FixedClock, ManualPreference, ManualScheduler, MemoryStore, RecordingStyle};
use crate::platform::{Clock, KeyValueStore, Scheduler, StyleApplier, SystemPreferenceWatcher};
use crate::scroll_spy::ScrollSpyTracker;
use crate::theme::ThemeEngine;
use crate::visit::{Visit, VisitCounter};

/// Host collaborators shared by all services.
#[derive(Clone)]
pub struct Platform {
    pub store: Rc<dyn KeyValueStore>,
    pub style: Rc<dyn StyleApplier>,
    pub system_preference: Rc<dyn SystemPreferenceWatcher>,
    pub scheduler: Rc<dyn Scheduler>,
    pub clock: Rc<dyn Clock>,
}

/// Concrete handles behind [`Platform::memory`], for driving and inspecting
/// the in-memory host.
pub struct MemoryHost {
    pub store: Rc<MemoryStore>,
    pub style: Rc<RecordingStyle>,
    pub system_preference: Rc<ManualPreference>,
    pub scheduler: Rc<ManualScheduler>,
    pub clock: Rc<FixedClock>,
}

impl Platform {
    /// In-memory host for tests and server rendering.
    #[must_use]
    pub fn memory() -> (Self, MemoryHost) {
        let host = MemoryHost {
            store: Rc::new(MemoryStore::new()),
            style: Rc::new(RecordingStyle::new()),
            system_preference: Rc::new(ManualPreference::new(false)),
            scheduler: Rc::new(ManualScheduler::new()),
            clock: Rc::new(FixedClock::default()),
        };
        let platform = Self {
            store: host.store.clone(),
            style: host.style.clone(),
            system_preference: host.system_preference.clone(),
            scheduler: host.scheduler.clone(),
            clock: host.clock.clone(),
        };
        (platform, host)
    }

    /// The real browser: `localStorage`, the root element, `matchMedia`,
    /// `setTimeout`, and the system clock.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn browser() -> Self {
        use crate::platform::SystemClock;
        use crate::platform::browser::{DocumentStyle, LocalStorage, MediaQueryWatcher, TimeoutScheduler};

        Self {
            store: Rc::new(LocalStorage),
            style: Rc::new(DocumentStyle),
            system_preference: Rc::new(MediaQueryWatcher::default()),
            scheduler: Rc::new(TimeoutScheduler),
            clock: Rc::new(SystemClock),
        }
    }
}

/// Every service, built against one platform.
pub struct Services {
    pub font_size: FontSizeEngine,
    pub theme: ThemeEngine,
    pub notifications: NotificationQueue,
    pub scroll_spy: ScrollSpyTracker,
    pub visits: VisitCounter,
}

impl Services {
    #[must_use]
    pub fn new(platform: &Platform) -> Self {
        Self {
            font_size: FontSizeEngine::new(platform.store.clone(), platform.style.clone()),
            theme: ThemeEngine::new(
                platform.store.clone(),
                platform.style.clone(),
                platform.system_preference.clone(),
            ),
            notifications: NotificationQueue::new(platform.scheduler.clone()),
            scroll_spy: ScrollSpyTracker::new(),
            visits: VisitCounter::new(platform.store.clone(), platform.clock.clone()),
        }
    }

    /// Configure and initialize every service for this session. Records one
    /// visit, so call it once per page load.
    pub fn init(&mut self, config: &SettingsConfig) -> Visit {
        self.font_size.configure(config.font_size.clone());
        self.font_size.init();
        self.theme.init(Some(config.theme.clone()));
        self.notifications.configure(config.notifications.clone());
        self.visits.init(Some(config.visits.clone()))
    }

    /// Release the OS preference subscription.
    pub fn destroy(&self) {
        self.theme.destroy();
    }
}
