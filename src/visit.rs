//! Visit counting with milestones.
//!
//! `init` counts the current session as a visit: it reads the previous record,
//! publishes the incremented count together with the *previous* visit time,
//! and persists the new record stamped with now. It is not
//! idempotent; call it once per session.

#[cfg(test)]
#[path = "visit_test.rs"]
mod visit_test;

use std::rc::Rc;

use leptos::logging::warn;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::platform::{Clock, KeyValueStore};

pub const STORAGE_KEY: &str = "su:visits";
pub const DEFAULT_MILESTONES: [u64; 2] = [10, 100];

/// Persisted shape: `{"count": n, "lastVisit": "2024-01-01T12:00:00.000Z"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisitRecord {
    pub count: u64,
    pub last_visit: Option<String>,
}

/// Partial configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisitConfig {
    pub storage_key: Option<String>,
    pub milestone_visits: Option<Vec<u64>>,
}

/// What `init` published for this session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub count: u64,
    pub last_visit: Option<String>,
    pub milestone: Option<u64>,
}

/// Format `at` the way `Date.prototype.toISOString` does.
#[must_use]
pub fn format_timestamp(at: OffsetDateTime) -> Option<String> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
    match at.to_offset(UtcOffset::UTC).format(&format) {
        Ok(formatted) => Some(formatted),
        Err(err) => {
            warn!("visits: cannot format timestamp {at}: {err}");
            None
        }
    }
}

pub struct VisitCounter {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    storage_key: String,
    milestones: Vec<u64>,
    count: ArcRwSignal<u64>,
    last_visit: ArcRwSignal<Option<String>>,
    milestone: ArcRwSignal<Option<u64>>,
}

impl VisitCounter {
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            storage_key: STORAGE_KEY.to_owned(),
            milestones: DEFAULT_MILESTONES.to_vec(),
            count: ArcRwSignal::new(0),
            last_visit: ArcRwSignal::new(None),
            milestone: ArcRwSignal::new(None),
        }
    }

    /// Count this session as a visit.
    pub fn init(&mut self, config: Option<VisitConfig>) -> Visit {
        if let Some(config) = config {
            if let Some(key) = config.storage_key.filter(|k| !k.is_empty()) {
                self.storage_key = key;
            }
            if let Some(mut milestones) = config.milestone_visits {
                milestones.sort_unstable();
                self.milestones = milestones;
            }
        }

        let previous = self.read_persisted();
        let count = previous.count.saturating_add(1);
        let milestone = self.milestones.iter().copied().find(|m| *m == count);

        self.count.set(count);
        self.last_visit.set(previous.last_visit.clone());
        self.milestone.set(milestone);

        let record = VisitRecord {
            count,
            last_visit: format_timestamp(self.clock.now_utc()),
        };
        match serde_json::to_string(&record) {
            Ok(raw) => self.store.set(&self.storage_key, &raw),
            Err(err) => warn!("visits: cannot encode record: {err}"),
        }

        Visit {
            count,
            last_visit: previous.last_visit,
            milestone,
        }
    }

    pub fn count(&self) -> ArcReadSignal<u64> {
        self.count.read_only()
    }

    /// Time of the visit before this one, as stored.
    pub fn last_visit(&self) -> ArcReadSignal<Option<String>> {
        self.last_visit.read_only()
    }

    /// Milestone reached by exactly this visit, if any.
    pub fn milestone(&self) -> ArcReadSignal<Option<u64>> {
        self.milestone.read_only()
    }

    /// The previous visit time, parsed. `None` if there was none or it is
    /// not a valid RFC 3339 timestamp.
    pub fn last_visit_at(&self) -> Option<OffsetDateTime> {
        let raw = self.last_visit.get_untracked()?;
        match OffsetDateTime::parse(&raw, &Rfc3339) {
            Ok(at) => Some(at),
            Err(err) => {
                warn!("visits: previous visit {raw:?} is not a timestamp: {err}");
                None
            }
        }
    }

    pub fn milestones(&self) -> &[u64] {
        &self.milestones
    }

    fn read_persisted(&self) -> VisitRecord {
        let Some(raw) = self.store.get(&self.storage_key) else {
            return VisitRecord::default();
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(fields)) => record_from_fields(&fields),
            Ok(other) => {
                warn!("visits: ignoring non-object record under {}: {other}", self.storage_key);
                VisitRecord::default()
            }
            Err(err) => {
                warn!("visits: ignoring unreadable record under {}: {err}", self.storage_key);
                VisitRecord::default()
            }
        }
    }
}

/// Read each field on its own so one bad field does not discard the other.
fn record_from_fields(fields: &Map<String, Value>) -> VisitRecord {
    let count = match fields.get("count") {
        None | Some(Value::Null) => 0,
        Some(value) => whole_count(value).unwrap_or_else(|| {
            warn!("visits: ignoring invalid count {value}");
            0
        }),
    };
    let last_visit = match fields.get("lastVisit") {
        Some(Value::String(at)) => Some(at.clone()),
        None | Some(Value::Null) => None,
        Some(other) => {
            warn!("visits: ignoring invalid lastVisit {other}");
            None
        }
    };
    VisitRecord { count, last_visit }
}

/// Non-negative integral count. Accepts `2.0` as well as `2`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn whole_count(value: &Value) -> Option<u64> {
    if let Some(count) = value.as_u64() {
        return Some(count);
    }
    let count = value.as_f64()?;
    (count.is_finite() && count >= 0.0 && count.fract() == 0.0 && count < u64::MAX as f64).then_some(count as u64)
}
