//! Toast notifications.
//!
//! DESIGN
//! ======
//! An insertion-ordered list of transient messages. Auto-closing entries
//! schedule a one-shot dismissal when shown. Those tasks are never cancelled:
//! if the entry was already dismissed or cleared, the late dismissal finds
//! nothing to remove and does nothing. Tasks hold only a `Weak` reference to
//! the queue.

#[cfg(test)]
#[path = "notification_test.rs"]
mod notification_test;

use std::rc::{Rc, Weak};
use std::time::Duration;

use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::platform::Scheduler;

pub const DEFAULT_DURATION_MS: u64 = 3000;

/// Styling and default-icon category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Custom,
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Custom => "custom",
        }
    }
}

/// Icon setting: `false`, `true`, or a custom image URL / inline SVG string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IconSetting", into = "IconSetting")]
pub enum Icon {
    Hidden,
    #[default]
    Default,
    Custom(String),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum IconSetting {
    Flag(bool),
    Source(String),
}

impl From<IconSetting> for Icon {
    fn from(setting: IconSetting) -> Self {
        match setting {
            IconSetting::Flag(false) => Self::Hidden,
            IconSetting::Flag(true) => Self::Default,
            IconSetting::Source(source) => Self::Custom(source),
        }
    }
}

impl From<Icon> for IconSetting {
    fn from(icon: Icon) -> Self {
        match icon {
            Icon::Hidden => Self::Flag(false),
            Icon::Default => Self::Flag(true),
            Icon::Custom(source) => Self::Source(source),
        }
    }
}

/// How a renderer should draw a notification's icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconSource<'a> {
    None,
    /// The built-in icon for the notification kind.
    Builtin(NotificationKind),
    /// Path or URL for an `<img>`.
    Image(&'a str),
    /// Inline SVG markup.
    Inline(&'a str),
}

fn looks_like_image(source: &str) -> bool {
    source.ends_with(".png")
        || source.ends_with(".jpg")
        || source.ends_with(".svg")
        || source.starts_with("http")
        || source.starts_with('/')
}

/// Where notifications are stacked on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    TopCenter,
    BottomCenter,
}

/// Request to show a notification. Unset fields take the queue defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationOptions {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(rename = "duration")]
    pub duration_ms: Option<u64>,
    pub auto_close: Option<bool>,
    pub css_class: Option<String>,
    pub icon: Option<Icon>,
}

impl NotificationOptions {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    #[must_use]
    pub fn auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = Some(auto_close);
        self
    }

    #[must_use]
    pub fn css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// A shown notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub auto_close: bool,
    pub css_class: Option<String>,
    pub icon: Icon,
}

impl Notification {
    #[must_use]
    pub fn icon_source(&self) -> IconSource<'_> {
        match &self.icon {
            Icon::Hidden => IconSource::None,
            Icon::Default => IconSource::Builtin(self.kind),
            Icon::Custom(source) if looks_like_image(source) => IconSource::Image(source),
            Icon::Custom(source) => IconSource::Inline(source),
        }
    }
}

/// Partial configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationConfig {
    pub position: Option<NotificationPosition>,
}

struct QueueState {
    scheduler: Rc<dyn Scheduler>,
    entries: ArcRwSignal<Vec<Notification>>,
    position: ArcRwSignal<NotificationPosition>,
}

impl QueueState {
    fn dismiss(&self, id: &str) {
        let present = self
            .entries
            .with_untracked(|list| list.iter().any(|n| n.id == id));
        if present {
            self.entries.update(|list| list.retain(|n| n.id != id));
        }
    }
}

/// Notification queue handle. Clones share state.
#[derive(Clone)]
pub struct NotificationQueue {
    state: Rc<QueueState>,
}

impl NotificationQueue {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            state: Rc::new(QueueState {
                scheduler,
                entries: ArcRwSignal::new(Vec::new()),
                position: ArcRwSignal::new(NotificationPosition::default()),
            }),
        }
    }

    pub fn configure(&self, config: NotificationConfig) {
        if let Some(position) = config.position {
            self.state.position.set(position);
        }
    }

    /// Append a notification and return its id.
    pub fn show(&self, options: NotificationOptions) -> String {
        let id = Uuid::new_v4().to_string();
        let notification = Notification {
            id: id.clone(),
            kind: options.kind,
            message: options.message,
            duration_ms: options.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
            auto_close: options.auto_close.unwrap_or(true),
            css_class: options.css_class,
            icon: options.icon.unwrap_or_default(),
        };
        let auto_close = notification
            .auto_close
            .then_some(Duration::from_millis(notification.duration_ms));

        self.state.entries.update(|list| list.push(notification));

        if let Some(delay) = auto_close {
            let weak: Weak<QueueState> = Rc::downgrade(&self.state);
            let target = id.clone();
            self.state.scheduler.schedule(
                delay,
                Box::new(move || {
                    if let Some(state) = weak.upgrade() {
                        state.dismiss(&target);
                    }
                }),
            );
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.show(NotificationOptions::new(NotificationKind::Info, message))
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.show(NotificationOptions::new(NotificationKind::Success, message))
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.show(NotificationOptions::new(NotificationKind::Warning, message))
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.show(NotificationOptions::new(NotificationKind::Error, message))
    }

    /// Remove the notification with `id`, if present.
    pub fn dismiss(&self, id: &str) {
        self.state.dismiss(id);
    }

    /// Remove everything. Pending auto-close tasks stay scheduled.
    pub fn clear_all(&self) {
        self.state.entries.set(Vec::new());
    }

    pub fn notifications(&self) -> ArcReadSignal<Vec<Notification>> {
        self.state.entries.read_only()
    }

    pub fn position(&self) -> ArcReadSignal<NotificationPosition> {
        self.state.position.read_only()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.state
            .entries
            .with_untracked(|list| list.iter().find(|n| n.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.state.entries.with_untracked(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.with_untracked(Vec::is_empty)
    }
}
