//! Font size scaling.
//!
//! Holds the page's base font size in pixels, clamped to a configurable range,
//! and mirrors it into a CSS custom property on the root element. The value is
//! persisted as a plain numeric string so it survives reloads.
//!
//! TRADE-OFFS
//! ==========
//! Nothing here reports failure. Out of range input saturates at the bounds
//! and unreadable persisted values fall back to the default size.

#[cfg(test)]
#[path = "font_size_test.rs"]
mod font_size_test;

use std::rc::Rc;

use leptos::logging::warn;
use leptos::prelude::*;
use serde::Deserialize;

use crate::platform::{KeyValueStore, StyleApplier};

pub const DEFAULT_SIZE: f64 = 14.0;
pub const MIN_SIZE: f64 = 10.0;
pub const MAX_SIZE: f64 = 22.0;
pub const STEP: f64 = 2.0;
pub const STORAGE_KEY: &str = "su:font-size";
pub const CSS_VAR_NAME: &str = "--base-font-size";

/// Partial configuration. Omitted fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSizeConfig {
    pub default_size: Option<f64>,
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub step: Option<f64>,
    pub storage_key: Option<String>,
    pub css_var_name: Option<String>,
}

/// Reactive, clamped font size.
pub struct FontSizeEngine {
    store: Rc<dyn KeyValueStore>,
    style: Rc<dyn StyleApplier>,
    storage_key: String,
    css_var_name: String,
    size: ArcRwSignal<f64>,
    min_size: ArcRwSignal<f64>,
    max_size: ArcRwSignal<f64>,
    default_size: ArcRwSignal<f64>,
    step: ArcRwSignal<f64>,
}

impl FontSizeEngine {
    pub fn new(store: Rc<dyn KeyValueStore>, style: Rc<dyn StyleApplier>) -> Self {
        Self {
            store,
            style,
            storage_key: STORAGE_KEY.to_owned(),
            css_var_name: CSS_VAR_NAME.to_owned(),
            size: ArcRwSignal::new(DEFAULT_SIZE),
            min_size: ArcRwSignal::new(MIN_SIZE),
            max_size: ArcRwSignal::new(MAX_SIZE),
            default_size: ArcRwSignal::new(DEFAULT_SIZE),
            step: ArcRwSignal::new(STEP),
        }
    }

    /// Apply `config`, then repair the invariants in a fixed order: raise max
    /// to min, pull the default into range, replace a bad step with 1, and
    /// finally reclamp the current size.
    pub fn configure(&mut self, config: FontSizeConfig) {
        if let Some(min) = config.min_size.filter(|v| v.is_finite()) {
            self.min_size.set(min);
        }
        if let Some(max) = config.max_size.filter(|v| v.is_finite()) {
            self.max_size.set(max);
        }
        if let Some(default) = config.default_size.filter(|v| v.is_finite()) {
            self.default_size.set(default);
        }
        if let Some(step) = config.step {
            self.step.set(step);
        }
        if let Some(key) = config.storage_key.filter(|k| !k.is_empty()) {
            self.storage_key = key;
        }
        if let Some(name) = config.css_var_name.filter(|n| !n.is_empty()) {
            self.css_var_name = name;
        }

        let min = self.min_size.get_untracked();
        if min > self.max_size.get_untracked() {
            self.max_size.set(min);
        }
        let max = self.max_size.get_untracked();
        let default = self.default_size.get_untracked();
        if default < min {
            self.default_size.set(min);
        } else if default > max {
            self.default_size.set(max);
        }
        let step = self.step.get_untracked();
        if step <= 0.0 || !step.is_finite() {
            self.step.set(1.0);
        }

        let clamped = self.clamp(self.size.get_untracked());
        self.size.set(clamped);
    }

    /// Restore the persisted size (or the default), clamp it, and apply it to
    /// the document. Does not write to storage.
    pub fn init(&self) {
        let size = self.clamp(self.read_persisted());
        self.size.set(size);
        self.apply_css_var(size);
    }

    /// Set the size, clamped into range, and persist it. `NaN` is ignored.
    pub fn set_size(&self, size: f64) {
        if size.is_nan() {
            return;
        }
        let clamped = self.clamp(size);
        self.size.set(clamped);
        self.apply_css_var(clamped);
        self.store.set(&self.storage_key, &clamped.to_string());
    }

    /// Grow by `step`, or by the configured step when `None`.
    pub fn increase(&self, step: Option<f64>) {
        let step = step.unwrap_or_else(|| self.step.get_untracked());
        self.set_size(self.size.get_untracked() + step);
    }

    /// Shrink by `step`, or by the configured step when `None`.
    pub fn decrease(&self, step: Option<f64>) {
        let step = step.unwrap_or_else(|| self.step.get_untracked());
        self.set_size(self.size.get_untracked() - step);
    }

    /// Return to the default size and forget the persisted value.
    pub fn reset(&self) {
        let default = self.default_size.get_untracked();
        self.size.set(default);
        self.apply_css_var(default);
        self.store.remove(&self.storage_key);
    }

    pub fn size(&self) -> ArcReadSignal<f64> {
        self.size.read_only()
    }

    pub fn min_size(&self) -> ArcReadSignal<f64> {
        self.min_size.read_only()
    }

    pub fn max_size(&self) -> ArcReadSignal<f64> {
        self.max_size.read_only()
    }

    pub fn default_size(&self) -> ArcReadSignal<f64> {
        self.default_size.read_only()
    }

    pub fn step(&self) -> ArcReadSignal<f64> {
        self.step.read_only()
    }

    // Sizes only ever come from assignment or clamping, so exact comparison is intended.
    #[allow(clippy::float_cmp)]
    pub fn is_default(&self) -> bool {
        self.size.get() == self.default_size.get()
    }

    #[allow(clippy::float_cmp)]
    pub fn is_min(&self) -> bool {
        self.size.get() == self.min_size.get()
    }

    #[allow(clippy::float_cmp)]
    pub fn is_max(&self) -> bool {
        self.size.get() == self.max_size.get()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn css_var_name(&self) -> &str {
        &self.css_var_name
    }

    fn clamp(&self, size: f64) -> f64 {
        size.max(self.min_size.get_untracked())
            .min(self.max_size.get_untracked())
    }

    fn read_persisted(&self) -> f64 {
        let default = self.default_size.get_untracked();
        let Some(raw) = self.store.get(&self.storage_key) else {
            return default;
        };
        match raw.trim().parse::<f64>() {
            Ok(size) if size.is_finite() => size,
            _ => {
                warn!("font size: ignoring persisted value {raw:?} under {}", self.storage_key);
                default
            }
        }
    }

    fn apply_css_var(&self, size: f64) {
        self.style
            .set_property(&self.css_var_name, &format!("{size}px"));
    }
}
