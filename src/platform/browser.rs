//! Browser collaborators backed by `web-sys`.
//!
//! Every host API failure is converted to a [`HostError`], logged, and
//! swallowed: services keep their in-memory state even when `localStorage`
//! is disabled or the document is gone.

use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use leptos::logging::warn;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MediaQueryList, MediaQueryListEvent, Storage,
};

use super::{KeyValueStore, Scheduler, StyleApplier, Subscription, SystemPreferenceWatcher};
use crate::error::HostError;
use crate::scroll_spy::ScrollSpyTracker;

/// Media query whose `matches` is the OS dark-mode signal.
pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

fn js_error(op: &'static str, err: &JsValue) -> HostError {
    HostError::Js {
        op,
        detail: err.as_string().unwrap_or_else(|| format!("{err:?}")),
    }
}

fn report(result: Result<(), HostError>) {
    if let Err(err) = result {
        warn!("{err}");
    }
}

fn window() -> Result<web_sys::Window, HostError> {
    web_sys::window().ok_or(HostError::unavailable("window"))
}

fn local_storage() -> Result<Storage, HostError> {
    window()?
        .local_storage()
        .map_err(|e| js_error("localStorage", &e))?
        .ok_or(HostError::unavailable("localStorage"))
}

fn root_element() -> Result<Element, HostError> {
    window()?
        .document()
        .ok_or(HostError::unavailable("document"))?
        .document_element()
        .ok_or(HostError::unavailable("document element"))
}

/// `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        let storage = match local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                warn!("{err}");
                return None;
            }
        };
        match storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}", js_error("localStorage.getItem", &e));
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        report(local_storage().and_then(|storage| {
            storage
                .set_item(key, value)
                .map_err(|e| js_error("localStorage.setItem", &e))
        }));
    }

    fn remove(&self, key: &str) {
        report(local_storage().and_then(|storage| {
            storage
                .remove_item(key)
                .map_err(|e| js_error("localStorage.removeItem", &e))
        }));
    }
}

/// Writes to `document.documentElement`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentStyle;

impl StyleApplier for DocumentStyle {
    fn set_property(&self, name: &str, value: &str) {
        report(root_element().and_then(|el| {
            let el: HtmlElement = el
                .dyn_into()
                .map_err(|_| HostError::unavailable("html root element"))?;
            el.style()
                .set_property(name, value)
                .map_err(|e| js_error("style.setProperty", &e))
        }));
    }

    fn set_attribute(&self, name: &str, value: &str) {
        report(root_element().and_then(|el| {
            el.set_attribute(name, value)
                .map_err(|e| js_error("setAttribute", &e))
        }));
    }
}

/// `matchMedia` listener for the OS color scheme.
#[derive(Clone, Debug)]
pub struct MediaQueryWatcher {
    query: String,
}

impl Default for MediaQueryWatcher {
    fn default() -> Self {
        Self::new(DARK_SCHEME_QUERY)
    }
}

impl MediaQueryWatcher {
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_owned(),
        }
    }

    fn media_query(&self) -> Result<MediaQueryList, HostError> {
        window()?
            .match_media(&self.query)
            .map_err(|e| js_error("matchMedia", &e))?
            .ok_or(HostError::unavailable("matchMedia"))
    }
}

impl SystemPreferenceWatcher for MediaQueryWatcher {
    fn prefers_dark(&self) -> bool {
        match self.media_query() {
            Ok(mq) => mq.matches(),
            Err(err) => {
                warn!("{err}");
                false
            }
        }
    }

    fn subscribe(&self, on_change: Rc<dyn Fn(bool)>) -> Subscription {
        let mq = match self.media_query() {
            Ok(mq) => mq,
            Err(err) => {
                warn!("{err}");
                return Subscription::inert();
            }
        };

        let callback = Closure::wrap(Box::new(move |event: MediaQueryListEvent| {
            on_change(event.matches());
        }) as Box<dyn FnMut(MediaQueryListEvent)>);

        if let Err(e) = mq.add_event_listener_with_callback("change", callback.as_ref().unchecked_ref()) {
            warn!("{}", js_error("addEventListener", &e));
            return Subscription::inert();
        }

        Subscription::new(move || {
            if let Err(e) = mq.remove_event_listener_with_callback("change", callback.as_ref().unchecked_ref()) {
                warn!("{}", js_error("removeEventListener", &e));
            }
            drop(callback);
        })
    }
}

/// `setTimeout`-backed scheduler. Tasks are never cancelled.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task).forget();
    }
}

/// Reports one element's visibility to a [`ScrollSpyTracker`].
///
/// The root margin collapses the viewport to its horizontal center line, so
/// the element counts as visible while it spans the middle of the screen.
/// Observation stops when this value is dropped.
pub struct SectionObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl SectionObserver {
    pub const ROOT_MARGIN: &'static str = "-50% 0px -50% 0px";

    /// Start observing `element` as section `section_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Js`] if the browser rejects the observer.
    pub fn observe(tracker: ScrollSpyTracker, section_id: &str, element: &Element) -> Result<Self, HostError> {
        let section_id = section_id.to_owned();
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                tracker.report(&section_id, entry.is_intersecting());
            }
        }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_root_margin(Self::ROOT_MARGIN);
        options.set_threshold(&JsValue::from_f64(0.0));

        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|e| js_error("IntersectionObserver", &e))?;
        observer.observe(element);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for SectionObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
