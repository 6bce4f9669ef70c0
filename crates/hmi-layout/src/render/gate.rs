//! Gate indicator: a frame with a leaf that slides with the opening.

use crate::catalog::{WidgetKind, WidgetType};
use crate::widget::Size;

use super::{clamp_percent, RenderContext, Visual, WidgetRenderer};

/// Leaf travel in surface pixels at 100% open.
pub const GATE_TRAVEL: f64 = 20.0;
const LEAF_TRANSITION: &str = "transition: transform 0.8s ease-in-out";

#[derive(Debug, Clone)]
pub struct GateIndicator {
    kind: WidgetKind,
}

impl GateIndicator {
    #[must_use]
    pub const fn new(kind: WidgetKind) -> Self {
        Self { kind }
    }

    fn offset(value: f64) -> f64 {
        clamp_percent(value) / 100.0 * GATE_TRAVEL
    }
}

impl WidgetRenderer for GateIndicator {
    fn widget_type(&self) -> WidgetType {
        self.kind.into()
    }

    fn render(&self, value: f64, ctx: &RenderContext<'_>, edit_mode: bool) -> Visual {
        let Size { width, height } = ctx.size;
        let offset = Self::offset(value);
        let style = if edit_mode {
            format!("transform: translateY({offset}px)")
        } else {
            format!("transform: translateY({offset}px); {LEAF_TRANSITION}")
        };
        Visual::new(format!(
            concat!(
                r#"<g class="hmi-gate" data-value="{percent:.1}">"#,
                r#"<svg width="{width}" height="{height}" viewBox="0 0 16 102" preserveAspectRatio="none">"#,
                r##"<rect x="1" y="1" width="14" height="100" fill="none" stroke="#94a3b8" stroke-width="2" vector-effect="non-scaling-stroke"/>"##,
                "</svg>",
                r#"<g style="{style}">"#,
                r#"<svg width="{width}" height="{height}" viewBox="0 0 16 102" preserveAspectRatio="none">"#,
                r##"<rect x="3" y="3" width="10" height="96" fill="#cbd5e1" stroke="#475569" stroke-width="1"/>"##,
                "</svg>",
                "</g>",
                "</g>"
            ),
            percent = clamp_percent(value),
            width = width,
            height = height,
            style = style,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderContext<'static> {
        RenderContext {
            instance_id: "gate-upstream-1",
            size: Size::new(40.0, 160.0),
        }
    }

    #[test]
    fn leaf_moves_with_opening() {
        let gate = GateIndicator::new(WidgetKind::UpstreamGate);
        let closed = gate.render(0.0, &ctx(), false);
        assert!(closed.as_str().contains("translateY(0px)"), "{closed}");
        let half = gate.render(50.0, &ctx(), false);
        assert!(half.as_str().contains("translateY(10px)"), "{half}");
        let beyond = gate.render(250.0, &ctx(), false);
        assert!(beyond.as_str().contains("translateY(20px)"), "{beyond}");
    }

    #[test]
    fn only_live_mode_animates() {
        let gate = GateIndicator::new(WidgetKind::DownstreamGate);
        assert!(gate.render(30.0, &ctx(), false).as_str().contains(LEAF_TRANSITION));
        assert!(!gate.render(30.0, &ctx(), true).as_str().contains(LEAF_TRANSITION));
    }
}
