//! Application-level configuration for all services.
//!
//! Every field is optional; absent sections leave a service on its built-in
//! defaults. The JSON shape uses camelCase keys:
//!
//! ```json
//! {
//!   "fontSize": { "minSize": 12, "maxSize": 28 },
//!   "theme": { "defaultTheme": "system", "themes": { "dark": { "background": "#111" } } },
//!   "notifications": { "position": "bottom-right" },
//!   "visits": { "milestoneVisits": [5, 50] }
//! }
//! ```

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::font_size::FontSizeConfig;
use crate::notification::NotificationConfig;
use crate::theme::ThemeConfig;
use crate::visit::VisitConfig;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsConfig {
    pub font_size: FontSizeConfig,
    pub theme: ThemeConfig,
    pub notifications: NotificationConfig,
    pub visits: VisitConfig,
}

impl SettingsConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `raw` is not valid JSON or a field
    /// has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}
