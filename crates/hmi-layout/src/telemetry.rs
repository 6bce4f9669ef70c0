//! Telemetry snapshots and channel selection.

#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{WidgetType, GLOBAL_DEFAULT_VALUE};
use crate::util::now_unix_ms;

/// Latest named numeric values from the controller. Read-only to the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub channels: IndexMap<String, f64>,
    #[serde(default)]
    pub received_at_ms: u128,
}

impl TelemetrySnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, channel: impl Into<String>, value: f64) -> Self {
        self.channels.insert(channel.into(), value);
        self
    }

    /// Builds a snapshot from a flat JSON object.
    ///
    /// Numbers are kept, booleans become 1/0, anything else is skipped.
    /// Returns `None` when `value` is not an object.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let channels = object
            .iter()
            .filter_map(|(name, value)| {
                numeric_value_from_json(value).map(|number| (name.clone(), number))
            })
            .collect();
        Some(Self {
            channels,
            received_at_ms: now_unix_ms(),
        })
    }

    #[must_use]
    pub fn get(&self, channel: &str) -> Option<f64> {
        self.channels.get(channel).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

fn numeric_value_from_json(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::Bool(boolean) => Some(if *boolean { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// The value a widget of `widget_type` should display.
///
/// Total: a registered type reads its channel and falls back to its own
/// default, an unregistered one (`None`) gets [`GLOBAL_DEFAULT_VALUE`].
/// No clamping.
#[must_use]
pub fn resolve(widget_type: Option<&WidgetType>, snapshot: Option<&TelemetrySnapshot>) -> f64 {
    let Some(widget_type) = widget_type else {
        return GLOBAL_DEFAULT_VALUE;
    };
    widget_type
        .channel
        .as_deref()
        .zip(snapshot)
        .and_then(|(channel, snapshot)| snapshot.get(channel))
        .unwrap_or(widget_type.default_value)
}

/// Shared latest-value cell between a telemetry producer and the editor.
///
/// Producers replace the whole snapshot; readers clone it out and never
/// wait on the producer beyond the lock.
#[derive(Debug, Clone, Default)]
pub struct TelemetryFeed {
    latest: Arc<Mutex<Option<TelemetrySnapshot>>>,
}

impl TelemetryFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: TelemetrySnapshot) {
        if let Ok(mut guard) = self.latest.lock() {
            *guard = Some(snapshot);
        }
    }

    /// Merges `channels` into the current snapshot, keeping other channels.
    pub fn update(&self, channels: impl IntoIterator<Item = (String, f64)>) {
        if let Ok(mut guard) = self.latest.lock() {
            let snapshot = guard.get_or_insert_with(TelemetrySnapshot::default);
            snapshot.channels.extend(channels);
            snapshot.received_at_ms = now_unix_ms();
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<TelemetrySnapshot> {
        self.latest.lock().ok().and_then(|guard| guard.clone())
    }
}
