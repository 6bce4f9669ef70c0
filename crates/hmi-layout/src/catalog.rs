//! Widget type catalog.
//!
//! [`WidgetKind`] is the set of types shipped with the editor. What the
//! rest of the crate reads is a [`WidgetType`]: placement defaults and the
//! telemetry binding, carried by each registered renderer. Adding a type
//! means registering a renderer, not extending [`WidgetKind`].

#![allow(missing_docs)]

use std::fmt;

use smol_str::SmolStr;

use crate::widget::{Point, Size};

/// Value shown by a widget whose type tag is not in the catalog.
pub const GLOBAL_DEFAULT_VALUE: f64 = 50.0;

/// Where `add` places a new widget.
pub const DEFAULT_POSITION: Point = Point { x: 200.0, y: 200.0 };

/// Built-in widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Lock chamber level gauge.
    ChamberLevel,
    /// Upstream reach level gauge.
    UpstreamLevel,
    /// Downstream reach level gauge.
    DownstreamLevel,
    /// Upstream sluice gate position.
    UpstreamGate,
    /// Downstream sluice gate position.
    DownstreamGate,
    /// Two-LED traffic signal.
    SignalLight,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 6] = [
        WidgetKind::ChamberLevel,
        WidgetKind::UpstreamLevel,
        WidgetKind::DownstreamLevel,
        WidgetKind::UpstreamGate,
        WidgetKind::DownstreamGate,
        WidgetKind::SignalLight,
    ];

    /// Wire tag stored in layouts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChamberLevel => "level-chamber",
            Self::UpstreamLevel => "level-upstream",
            Self::DownstreamLevel => "level-downstream",
            Self::UpstreamGate => "gate-upstream",
            Self::DownstreamGate => "gate-downstream",
            Self::SignalLight => "signal-light",
        }
    }

    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Operator-facing name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ChamberLevel => "Chamber level",
            Self::UpstreamLevel => "Upstream level",
            Self::DownstreamLevel => "Downstream level",
            Self::UpstreamGate => "Upstream gate",
            Self::DownstreamGate => "Downstream gate",
            Self::SignalLight => "Signal light",
        }
    }

    #[must_use]
    pub const fn default_size(self) -> Size {
        match self {
            Self::ChamberLevel => Size::new(350.0, 80.0),
            Self::UpstreamLevel => Size::new(250.0, 70.0),
            Self::DownstreamLevel => Size::new(185.0, 60.0),
            Self::UpstreamGate | Self::DownstreamGate => Size::new(40.0, 160.0),
            Self::SignalLight => Size::new(42.0, 62.0),
        }
    }

    /// Telemetry channel key this type displays.
    #[must_use]
    pub const fn channel(self) -> &'static str {
        match self {
            Self::ChamberLevel => "chamber_level",
            Self::UpstreamLevel => "upstream_level",
            Self::DownstreamLevel => "downstream_level",
            Self::UpstreamGate => "upstream_gate",
            Self::DownstreamGate => "downstream_gate",
            Self::SignalLight => "signal_state",
        }
    }

    /// Value shown when the channel is missing from the snapshot.
    #[must_use]
    pub const fn default_value(self) -> f64 {
        match self {
            Self::ChamberLevel => 75.0,
            Self::UpstreamLevel => 60.0,
            Self::DownstreamLevel => 45.0,
            Self::UpstreamGate | Self::DownstreamGate | Self::SignalLight => 0.0,
        }
    }
}

/// Everything the editor knows about a widget type besides how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetType {
    pub tag: SmolStr,
    /// Operator-facing name.
    pub label: SmolStr,
    /// Geometry a freshly added widget starts with.
    pub default_size: Size,
    /// Telemetry channel the type displays, if any.
    pub channel: Option<SmolStr>,
    /// Shown when the channel is absent or there is no snapshot.
    pub default_value: f64,
}

impl WidgetType {
    /// A type with no telemetry binding; it shows [`GLOBAL_DEFAULT_VALUE`].
    #[must_use]
    pub fn new(tag: impl Into<SmolStr>, default_size: Size) -> Self {
        let tag = tag.into();
        Self {
            label: tag.clone(),
            tag,
            default_size,
            channel: None,
            default_value: GLOBAL_DEFAULT_VALUE,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = label.into();
        self
    }

    /// Binds the type to `channel`, showing `default_value` while it is absent.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<SmolStr>, default_value: f64) -> Self {
        self.channel = Some(channel.into());
        self.default_value = default_value;
        self
    }
}

impl From<WidgetKind> for WidgetType {
    fn from(kind: WidgetKind) -> Self {
        Self::new(kind.as_str(), kind.default_size())
            .with_label(kind.label())
            .with_channel(kind.channel(), kind.default_value())
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
