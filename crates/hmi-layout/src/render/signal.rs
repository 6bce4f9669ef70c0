//! Two-lamp signal light.

use crate::catalog::{WidgetKind, WidgetType};
use crate::widget::Size;

use super::{RenderContext, Visual, WidgetRenderer};

/// Values at or above this light the green lamp.
pub const GO_THRESHOLD: f64 = 50.0;

const GREEN: &str = "#00FF26";
const RED: &str = "#FF000D";
const UNLIT: &str = "#666666";

#[derive(Debug, Clone, Default)]
pub struct SignalLight;

impl SignalLight {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl WidgetRenderer for SignalLight {
    fn widget_type(&self) -> WidgetType {
        WidgetKind::SignalLight.into()
    }

    fn render(&self, value: f64, ctx: &RenderContext<'_>, edit_mode: bool) -> Visual {
        let Size { width, height } = ctx.size;
        // NaN compares false and shows red.
        let go = value >= GO_THRESHOLD;
        let (top, bottom) = if go { (UNLIT, GREEN) } else { (RED, UNLIT) };
        let transition = if edit_mode {
            "transition: none"
        } else {
            "transition: fill 0.3s ease-in-out"
        };
        Visual::new(format!(
            concat!(
                r#"<g class="hmi-signal" data-state="{state}">"#,
                r#"<svg width="{width}" height="{height}" viewBox="0 0 21 31">"#,
                r##"<rect x="0.5" y="0.5" width="20" height="30" rx="3" fill="#1f2937" stroke="#94a3b8"/>"##,
                r#"<circle cx="10.5" cy="8.5" r="5.5" fill="{top}" style="{transition}"/>"#,
                r#"<circle cx="10.5" cy="22.5" r="5.5" fill="{bottom}" style="{transition}"/>"#,
                "</svg>",
                "</g>"
            ),
            state = if go { "go" } else { "stop" },
            width = width,
            height = height,
            top = top,
            bottom = bottom,
            transition = transition,
        ))
    }
}
