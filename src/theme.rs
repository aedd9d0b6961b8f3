//! Theme preference, resolution, and application.
//!
//! DESIGN
//! ======
//! The user states a [`ThemePreference`]; the engine resolves it to a concrete
//! [`ResolvedTheme`] and applies that to the document as a `data-theme`
//! attribute plus a set of prefixed CSS variables. A `system` preference
//! delegates to the OS color scheme and keeps following it through a single
//! [`Subscription`] that exists only while the preference is `system`.
//!
//! The OS callback holds a `Weak` reference to the engine state, so a live
//! subscription never keeps a dropped engine alive, and dropping the last
//! engine handle tears the subscription down.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use leptos::logging::warn;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use crate::platform::{KeyValueStore, StyleApplier, Subscription, SystemPreferenceWatcher};

pub const STORAGE_KEY: &str = "su:theme";
pub const CSS_VAR_PREFIX: &str = "--su-theme-";
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// CSS variable name (without prefix) to value.
pub type ThemeVariables = BTreeMap<String, String>;

/// What the user asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    Contrast,
    Custom,
    #[default]
    System,
}

impl ThemePreference {
    pub const ALL: [Self; 5] = [Self::Light, Self::Dark, Self::Contrast, Self::Custom, Self::System];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Contrast => "contrast",
            Self::Custom => "custom",
            Self::System => "system",
        }
    }

    /// Parse a persisted preference name. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// The concrete theme this preference pins, or `None` for `system`.
    #[must_use]
    pub fn explicit(self) -> Option<ResolvedTheme> {
        match self {
            Self::Light => Some(ResolvedTheme::Light),
            Self::Dark => Some(ResolvedTheme::Dark),
            Self::Contrast => Some(ResolvedTheme::Contrast),
            Self::Custom => Some(ResolvedTheme::Custom),
            Self::System => None,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ResolvedTheme> for ThemePreference {
    fn from(theme: ResolvedTheme) -> Self {
        match theme {
            ResolvedTheme::Light => Self::Light,
            ResolvedTheme::Dark => Self::Dark,
            ResolvedTheme::Contrast => Self::Contrast,
            ResolvedTheme::Custom => Self::Custom,
        }
    }
}

/// What is actually applied. Never `system`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
    Contrast,
    Custom,
}

impl ResolvedTheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        ThemePreference::from(self).as_str()
    }

    /// Theme that follows the OS dark-mode signal.
    #[must_use]
    pub fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }

    /// Built-in variables for this theme.
    #[must_use]
    pub fn default_variables(self) -> ThemeVariables {
        let pairs: &[(&str, &str)] = match self {
            Self::Light => &[
                ("color", "#333"),
                ("background", "#fff"),
                ("main-accent", "#007bff"),
                ("second-accent", "#6c757d"),
                ("third-accent", "#28a745"),
            ],
            Self::Dark => &[
                ("color", "#f0f0f0"),
                ("background", "#1a1a1a"),
                ("main-accent", "#38a8e1"),
                ("second-accent", "#a8b0b5"),
                ("third-accent", "#2ee057"),
            ],
            Self::Contrast => &[("color", "#000"), ("background", "#fff"), ("main-accent", "#ff0000")],
            Self::Custom => &[],
        };
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial configuration, merged into the current settings on `init`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub storage_key: Option<String>,
    pub css_var_prefix: Option<String>,
    pub default_theme: Option<ThemePreference>,
    /// Per-theme overrides; these win over the built-in values key by key.
    pub themes: BTreeMap<ResolvedTheme, ThemeVariables>,
}

#[derive(Debug)]
struct ThemeSettings {
    storage_key: String,
    css_var_prefix: String,
    default_theme: Option<ThemePreference>,
    overrides: BTreeMap<ResolvedTheme, ThemeVariables>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_owned(),
            css_var_prefix: CSS_VAR_PREFIX.to_owned(),
            default_theme: None,
            overrides: BTreeMap::new(),
        }
    }
}

impl ThemeSettings {
    fn merge(&mut self, config: ThemeConfig) {
        if let Some(key) = config.storage_key {
            self.storage_key = key;
        }
        if let Some(prefix) = config.css_var_prefix {
            self.css_var_prefix = prefix;
        }
        if config.default_theme.is_some() {
            self.default_theme = config.default_theme;
        }
        for (theme, vars) in config.themes {
            self.overrides.insert(theme, vars);
        }
    }

    fn variables_for(&self, theme: ResolvedTheme) -> ThemeVariables {
        let mut vars = theme.default_variables();
        if let Some(overrides) = self.overrides.get(&theme) {
            vars.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        vars
    }
}

struct ThemeState {
    store: Rc<dyn KeyValueStore>,
    style: Rc<dyn StyleApplier>,
    watcher: Rc<dyn SystemPreferenceWatcher>,
    settings: RefCell<ThemeSettings>,
    preference: ArcRwSignal<ThemePreference>,
    resolved: ArcRwSignal<ResolvedTheme>,
    subscription: RefCell<Option<Subscription>>,
}

impl ThemeState {
    fn apply(&self, theme: ResolvedTheme) {
        self.resolved.set(theme);
        self.style.set_attribute(THEME_ATTRIBUTE, theme.as_str());

        let settings = self.settings.borrow();
        for (name, value) in settings.variables_for(theme) {
            if value.is_empty() {
                continue;
            }
            self.style
                .set_property(&format!("{}{name}", settings.css_var_prefix), &value);
        }
    }

    fn on_system_change(&self, prefers_dark: bool) {
        if self.preference.get_untracked() == ThemePreference::System {
            self.apply(ResolvedTheme::from_system(prefers_dark));
        }
    }

    fn stop_listening(&self) {
        let subscription = self.subscription.borrow_mut().take();
        drop(subscription);
    }
}

/// Theme engine handle. Clones share state.
#[derive(Clone)]
pub struct ThemeEngine {
    state: Rc<ThemeState>,
}

impl ThemeEngine {
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        style: Rc<dyn StyleApplier>,
        watcher: Rc<dyn SystemPreferenceWatcher>,
    ) -> Self {
        Self {
            state: Rc::new(ThemeState {
                store,
                style,
                watcher,
                settings: RefCell::new(ThemeSettings::default()),
                preference: ArcRwSignal::new(ThemePreference::Light),
                resolved: ArcRwSignal::new(ResolvedTheme::Light),
                subscription: RefCell::new(None),
            }),
        }
    }

    /// Merge `config`, then restore the persisted preference (falling back to
    /// the configured default, then `system`) without re-persisting it.
    pub fn init(&self, config: Option<ThemeConfig>) {
        if let Some(config) = config {
            self.state.settings.borrow_mut().merge(config);
        }

        let (stored, fallback) = {
            let settings = self.state.settings.borrow();
            let stored = self.state.store.get(&settings.storage_key);
            (stored, settings.default_theme.unwrap_or(ThemePreference::System))
        };
        let preference = match stored {
            None => fallback,
            Some(name) => ThemePreference::from_name(&name).unwrap_or_else(|| {
                warn!("theme: ignoring unknown persisted preference {name:?}");
                fallback
            }),
        };

        self.set_theme(preference, false);
    }

    /// Switch to `theme`, optionally persisting the preference.
    pub fn set_theme(&self, theme: ThemePreference, persist: bool) {
        let state = &self.state;
        if theme != ThemePreference::System {
            state.stop_listening();
        }

        let resolved = theme
            .explicit()
            .unwrap_or_else(|| ResolvedTheme::from_system(state.watcher.prefers_dark()));

        state.preference.set(theme);
        state.apply(resolved);

        if persist {
            let key = state.settings.borrow().storage_key.clone();
            state.store.set(&key, theme.as_str());
        }

        if theme == ThemePreference::System {
            self.listen_to_system();
        }
    }

    /// Stop following the OS color scheme. Safe to call repeatedly.
    pub fn destroy(&self) {
        self.state.stop_listening();
    }

    /// Resolved theme cell.
    pub fn theme(&self) -> ArcReadSignal<ResolvedTheme> {
        self.state.resolved.read_only()
    }

    /// Preference cell (may be `system`).
    pub fn preference(&self) -> ArcReadSignal<ThemePreference> {
        self.state.preference.read_only()
    }

    pub fn current(&self) -> ResolvedTheme {
        self.state.resolved.get_untracked()
    }

    pub fn user_preference(&self) -> ThemePreference {
        self.state.preference.get_untracked()
    }

    /// Whether an OS color-scheme listener is actually registered.
    pub fn is_listening_to_system(&self) -> bool {
        self.state
            .subscription
            .borrow()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    fn listen_to_system(&self) {
        // An inert subscription still counts: registration is tried once.
        if self.state.subscription.borrow().is_some() {
            return;
        }
        let weak: Weak<ThemeState> = Rc::downgrade(&self.state);
        let subscription = self.state.watcher.subscribe(Rc::new(move |prefers_dark: bool| {
            if let Some(state) = weak.upgrade() {
                state.on_system_change(prefers_dark);
            }
        }));
        *self.state.subscription.borrow_mut() = Some(subscription);
    }
}
