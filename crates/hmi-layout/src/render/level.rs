//! Level gauges: an outline filled bottom-up to the current level.

use crate::catalog::{WidgetKind, WidgetType};
use crate::widget::Size;

use super::{clamp_percent, RenderContext, Visual, WidgetRenderer};

const FILL_COLOR: &str = "#1E00FF";
const OUTLINE_COLOR: &str = "#94a3b8";
const FILL_TRANSITION: &str = "transition: all 0.5s ease-in-out";

#[derive(Debug, Clone)]
pub struct LevelGauge {
    kind: WidgetKind,
    view_box: Size,
    outline: &'static str,
}

impl LevelGauge {
    #[must_use]
    pub const fn new(kind: WidgetKind, view_box: Size, outline: &'static str) -> Self {
        Self {
            kind,
            view_box,
            outline,
        }
    }

    /// Built-in gauge shapes. Non-level kinds get a plain rectangle.
    #[must_use]
    pub fn for_kind(kind: WidgetKind) -> Self {
        let (view_box, outline) = match kind {
            WidgetKind::ChamberLevel => (
                Size::new(400.0, 100.0),
                "M0 52V0H400V100H14L4 90V58Z",
            ),
            WidgetKind::UpstreamLevel => (Size::new(300.0, 80.0), "M8 0H300V80H0V10Z"),
            _ => (Size::new(200.0, 80.0), "M0 0H200V80H0Z"),
        };
        Self::new(kind, view_box, outline)
    }
}

impl WidgetRenderer for LevelGauge {
    fn widget_type(&self) -> WidgetType {
        self.kind.into()
    }

    fn render(&self, value: f64, ctx: &RenderContext<'_>, edit_mode: bool) -> Visual {
        let percent = clamp_percent(value);
        let Size { width, height } = ctx.size;
        let Size {
            width: view_width,
            height: view_height,
        } = self.view_box;
        let fill = view_height * percent / 100.0;
        let clip = ctx.element_id("level");
        let transition = if edit_mode {
            "transition: none"
        } else {
            FILL_TRANSITION
        };
        Visual::new(format!(
            concat!(
                r#"<g class="hmi-level" data-value="{percent:.1}">"#,
                r#"<svg width="{width}" height="{height}" viewBox="0 0 {vw} {vh}" preserveAspectRatio="none">"#,
                r#"<defs><clipPath id="{clip}"><rect x="0" y="{top}" width="{vw}" height="{fill}" style="{transition}"/></clipPath></defs>"#,
                r#"<path d="{outline}" fill="{fill_color}" clip-path="url(#{clip})" style="{transition}"/>"#,
                r#"<path d="{outline}" fill="none" stroke="{outline_color}" stroke-width="2" vector-effect="non-scaling-stroke"/>"#,
                "</svg>",
                r##"<text x="2" y="-4" font-size="11" fill="#ffffff">{label}: {percent:.1}%</text>"##,
                "</g>"
            ),
            percent = percent,
            width = width,
            height = height,
            vw = view_width,
            vh = view_height,
            clip = clip,
            top = view_height - fill,
            fill = fill,
            transition = transition,
            outline = self.outline,
            fill_color = FILL_COLOR,
            outline_color = OUTLINE_COLOR,
            label = self.kind.label(),
        ))
    }
}
