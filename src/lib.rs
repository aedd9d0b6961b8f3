//! # settings-utils
//!
//! Small, independent UI preference services for Leptos applications: font
//! size scaling, theme switching, toast notifications, scroll-spy section
//! tracking, and visit counting.
//!
//! Each service owns a slice of reactive state (Leptos signals), persists it
//! to a key-value store, and applies side effects to the document through the
//! collaborator traits in [`platform`]. In the browser (`hydrate` feature)
//! those are `localStorage`, the root element, `matchMedia`, and
//! `setTimeout`; everywhere else they are the in-memory versions in
//! [`platform::memory`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`font_size`] | Clamped base font size mirrored into a CSS variable |
//! | [`theme`] | Preference to resolved theme, OS color-scheme tracking |
//! | [`notification`] | Ordered toast queue with auto-close |
//! | [`scroll_spy`] | Currently focused page section |
//! | [`visit`] | Per-session visit counter with milestones |
//! | [`services`] | `Platform` and `Services` composition root |
//! | [`config`] | JSON-loadable configuration for every service |
//! | [`platform`] | Host collaborator traits and implementations |
//! | [`error`] | Configuration and host API errors |

pub mod config;
pub mod error;
pub mod font_size;
pub mod notification;
pub mod platform;
pub mod scroll_spy;
pub mod services;
pub mod theme;
pub mod visit;

pub use config::SettingsConfig;
pub use services::{Platform, Services};
