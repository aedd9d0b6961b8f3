#![allow(clippy::float_cmp)]

use super::*;
use crate::notification::NotificationPosition;
use crate::theme::{ResolvedTheme, ThemePreference};

#[test]
fn empty_document_is_all_defaults() {
    let Ok(config) = SettingsConfig::from_json("{}") else {
        panic!("empty object must parse");
    };
    assert_eq!(config, SettingsConfig::default());
}

#[test]
fn full_document_parses_every_section() {
    let raw = r##"{
        "fontSize": { "minSize": 12, "maxSize": 28, "cssVarName": "--reader" },
        "theme": { "defaultTheme": "system", "themes": { "dark": { "background": "#111" } } },
        "notifications": { "position": "bottom-right" },
        "visits": { "storageKey": "app:visits", "milestoneVisits": [5, 50] }
    }"##;
    let Ok(config) = SettingsConfig::from_json(raw) else {
        panic!("document must parse");
    };

    assert_eq!(config.font_size.min_size, Some(12.0));
    assert_eq!(config.font_size.css_var_name.as_deref(), Some("--reader"));
    assert_eq!(config.theme.default_theme, Some(ThemePreference::System));
    assert!(config.theme.themes.contains_key(&ResolvedTheme::Dark));
    assert_eq!(config.notifications.position, Some(NotificationPosition::BottomRight));
    assert_eq!(config.visits.milestone_visits, Some(vec![5, 50]));
}

#[test]
fn wrong_types_are_reported() {
    let result = SettingsConfig::from_json(r#"{"theme": {"defaultTheme": "sepia"}}"#);
    assert!(matches!(result, Err(ConfigError::Parse(_))));

    let result = SettingsConfig::from_json("not json");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
