//! Widget renderers and type-indexed dispatch.
//!
//! Each widget type has one [`WidgetRenderer`] registered under its tag.
//! The renderer also describes its type ([`WidgetType`]), so placing and
//! binding a new type needs nothing beyond `register`.
//!
//! Dispatch is total: a tag with no renderer produces a labelled
//! placeholder instead of failing, so unknown or corrupt layout entries
//! stay visible and removable.

#![allow(missing_docs)]

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::catalog::{WidgetKind, WidgetType};
use crate::telemetry::{self, TelemetrySnapshot};
use crate::util::{escape_xml, stable_component};
use crate::widget::{Size, WidgetInstance};

mod gate;
mod level;
mod signal;

pub use gate::GateIndicator;
pub use level::LevelGauge;
pub use signal::SignalLight;

/// Rendered SVG markup for one widget, drawn in a `width`×`height` box
/// with its origin at the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Visual(String);

impl Visual {
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Visual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-call inputs a renderer needs besides the value.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub instance_id: &'a str,
    /// Unscaled widget box; the surface applies `scale` around it.
    pub size: Size,
}

impl RenderContext<'_> {
    /// Element id unique to this instance, for clip paths and gradients.
    #[must_use]
    pub fn element_id(&self, suffix: &str) -> String {
        format!("hmi-{}-{suffix}", stable_component(self.instance_id))
    }
}

/// Turns a numeric value into a widget visual.
///
/// Implementations clamp `value` into their own display range and animate
/// changes on their own; callers never coordinate transitions.
pub trait WidgetRenderer: Send + Sync {
    /// The type this renderer draws; its tag is the registry key.
    fn widget_type(&self) -> WidgetType;
    fn render(&self, value: f64, ctx: &RenderContext<'_>, edit_mode: bool) -> Visual;
}

struct Registered {
    widget_type: WidgetType,
    renderer: Box<dyn WidgetRenderer>,
}

/// Tag → renderer mapping, built once at startup.
pub struct RendererRegistry {
    entries: IndexMap<SmolStr, Registered>,
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("tags", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RendererRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// One renderer per [`WidgetKind`].
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for kind in WidgetKind::ALL {
            let renderer: Box<dyn WidgetRenderer> = match kind {
                WidgetKind::ChamberLevel
                | WidgetKind::UpstreamLevel
                | WidgetKind::DownstreamLevel => Box::new(LevelGauge::for_kind(kind)),
                WidgetKind::UpstreamGate | WidgetKind::DownstreamGate => {
                    Box::new(GateIndicator::new(kind))
                }
                WidgetKind::SignalLight => Box::new(SignalLight::new()),
            };
            registry.register(renderer);
        }
        registry
    }

    /// Adds or replaces the renderer for its tag.
    pub fn register(&mut self, renderer: Box<dyn WidgetRenderer>) {
        let widget_type = renderer.widget_type();
        self.entries.insert(
            widget_type.tag.clone(),
            Registered {
                widget_type,
                renderer,
            },
        );
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&dyn WidgetRenderer> {
        self.entries.get(tag).map(|entry| &*entry.renderer)
    }

    #[must_use]
    pub fn widget_type(&self, tag: &str) -> Option<&WidgetType> {
        self.entries.get(tag).map(|entry| &entry.widget_type)
    }

    /// Registered types in registration order.
    pub fn widget_types(&self) -> impl Iterator<Item = &WidgetType> {
        self.entries.values().map(|entry| &entry.widget_type)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(SmolStr::as_str)
    }

    /// The value a widget tagged `tag` displays from `snapshot`.
    #[must_use]
    pub fn resolve(&self, tag: &str, snapshot: Option<&TelemetrySnapshot>) -> f64 {
        telemetry::resolve(self.widget_type(tag), snapshot)
    }

    /// Renders `instance` bound to its telemetry channel.
    ///
    /// The embedded widget always renders in live mode: `edit_mode` is
    /// about placement, so here it only disables pointer interaction on
    /// the widget body.
    #[must_use]
    pub fn render(
        &self,
        instance: &WidgetInstance,
        snapshot: Option<&TelemetrySnapshot>,
        edit_mode: bool,
    ) -> Visual {
        let ctx = RenderContext {
            instance_id: &instance.id,
            size: Size::new(instance.width, instance.height),
        };
        let body = match self.entries.get(instance.kind.as_str()) {
            Some(entry) => {
                let value = telemetry::resolve(Some(&entry.widget_type), snapshot);
                entry.renderer.render(value, &ctx, false)
            }
            None => unknown_component(&instance.kind, &ctx),
        };
        if edit_mode {
            Visual::new(format!(r#"<g pointer-events="none">{body}</g>"#))
        } else {
            body
        }
    }
}

/// Placeholder for a tag with no registered renderer.
#[must_use]
pub fn unknown_component(tag: &str, ctx: &RenderContext<'_>) -> Visual {
    let Size { width, height } = ctx.size;
    Visual::new(format!(
        concat!(
            r#"<g class="hmi-unknown">"#,
            r##"<rect width="{w}" height="{h}" fill="rgba(107,114,128,0.2)" stroke="#6b7280" stroke-width="1"/>"##,
            r##"<text x="{cx}" y="{cy}" font-size="12" fill="#e5e7eb" text-anchor="middle" dominant-baseline="middle">unknown component: {tag}</text>"##,
            "</g>"
        ),
        w = width,
        h = height,
        cx = width / 2.0,
        cy = height / 2.0,
        tag = escape_xml(tag),
    ))
}

/// Clamps into `[0, 100]`; NaN reads as empty.
pub(crate) fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
