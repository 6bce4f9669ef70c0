//! Editor surface: stacking, edit decorations and hit testing.
//!
//! Widgets are placed top-left anchored at `(x, y)` and drawn at
//! `width × height` times `scale`. Decorations (grid, outline, debug
//! label, resize handle, delete button) exist only in edit mode and are
//! drawn in surface pixels, so the handle keeps its size at any scale.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::interaction::HitTarget;
use crate::render::{RendererRegistry, Visual};
use crate::store::LayoutStore;
use crate::telemetry::TelemetrySnapshot;
use crate::util::escape_xml;
use crate::widget::{Point, Size, WidgetInstance};

pub const DEFAULT_GRID: f64 = 25.0;
pub const DEFAULT_WIDTH: f64 = 1280.0;
pub const DEFAULT_HEIGHT: f64 = 720.0;
/// Side of the square resize handle, in surface pixels.
pub const HANDLE_SIZE: f64 = 12.0;
pub const DELETE_SIZE: f64 = 16.0;
pub const BASE_Z: u32 = 500;
pub const SELECTED_Z: u32 = 1000;

const BACKGROUND: &str = "#0f172a";
const GRID_STROKE: &str = "rgba(0,255,0,0.2)";
const OUTLINE_FILL: &str = "rgba(255,0,0,0.3)";

/// Surface geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    /// Alignment grid pitch in pixels.
    pub grid: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            grid: DEFAULT_GRID,
        }
    }
}

/// Pointer input in surface coordinates, before hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfacePointer {
    Down { at: Point },
    Move { at: Point },
    Up,
    Leave,
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceHit {
    /// A widget body or its resize handle.
    Widget(HitTarget),
    /// The delete button of the selected widget.
    Delete { id: String },
}

/// One widget as it will be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWidget {
    pub id: String,
    pub kind: SmolStr,
    pub origin: Point,
    /// Unscaled box.
    pub size: Size,
    pub scale: f64,
    pub z: u32,
    pub selected: bool,
    pub visual: Visual,
}

impl PlacedWidget {
    fn of(widget: &WidgetInstance, selected: bool, visual: Visual) -> Self {
        Self {
            id: widget.id.clone(),
            kind: widget.kind.clone(),
            origin: widget.position(),
            size: Size::new(widget.width, widget.height),
            scale: widget.scale,
            z: if selected { SELECTED_Z } else { BASE_Z },
            selected,
            visual,
        }
    }

    #[must_use]
    pub fn scaled_size(&self) -> Size {
        Size::new(self.size.width * self.scale, self.size.height * self.scale)
    }
}

/// A composed frame, widgets in ascending draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFrame {
    pub surface: Surface,
    pub edit_mode: bool,
    pub widgets: Vec<PlacedWidget>,
}

impl Surface {
    #[must_use]
    pub const fn new(width: f64, height: f64, grid: f64) -> Self {
        Self {
            width,
            height,
            grid,
        }
    }

    /// Visible widgets in draw order. The sort is stable, so equal z keeps
    /// layout order and only the selection is lifted.
    #[must_use]
    pub fn compose(
        &self,
        store: &LayoutStore,
        registry: &RendererRegistry,
        snapshot: Option<&TelemetrySnapshot>,
        edit_mode: bool,
        selected: Option<&str>,
    ) -> SurfaceFrame {
        let mut widgets = store
            .iter()
            .filter(|widget| widget.visible)
            .map(|widget| {
                let is_selected = edit_mode && selected == Some(widget.id.as_str());
                let visual = registry.render(widget, snapshot, edit_mode);
                PlacedWidget::of(widget, is_selected, visual)
            })
            .collect::<Vec<_>>();
        widgets.sort_by_key(|placed| placed.z);
        SurfaceFrame {
            surface: *self,
            edit_mode,
            widgets,
        }
    }

    /// Topmost thing under `at`, following draw order. Decorations of the
    /// selected widget win over any body.
    #[must_use]
    pub fn hit_test(
        &self,
        store: &LayoutStore,
        edit_mode: bool,
        selected: Option<&str>,
        at: Point,
    ) -> Option<SurfaceHit> {
        if !edit_mode {
            return None;
        }
        if let Some(widget) = selected
            .and_then(|id| store.get(id))
            .filter(|widget| widget.visible)
        {
            if delete_box(widget).contains(at) {
                return Some(SurfaceHit::Delete {
                    id: widget.id.clone(),
                });
            }
            if handle_box(widget).contains(at) {
                return Some(SurfaceHit::Widget(HitTarget::resize_handle(&widget.id)));
            }
            if widget.contains(at) {
                return Some(SurfaceHit::Widget(HitTarget::body(&widget.id)));
            }
        }
        store
            .iter()
            .rev()
            .filter(|widget| widget.visible)
            .find(|widget| widget.contains(at))
            .map(|widget| SurfaceHit::Widget(HitTarget::body(&widget.id)))
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    fn contains(self, at: Point) -> bool {
        at.x >= self.x && at.y >= self.y && at.x <= self.x + self.width && at.y <= self.y + self.height
    }
}

fn handle_box(widget: &WidgetInstance) -> Rect {
    let size = widget.scaled_size();
    Rect {
        x: widget.x + size.width - HANDLE_SIZE,
        y: widget.y + size.height - HANDLE_SIZE,
        width: HANDLE_SIZE,
        height: HANDLE_SIZE,
    }
}

fn delete_box(widget: &WidgetInstance) -> Rect {
    let size = widget.scaled_size();
    Rect {
        x: widget.x + size.width - DELETE_SIZE,
        y: widget.y - DELETE_SIZE,
        width: DELETE_SIZE,
        height: DELETE_SIZE,
    }
}

impl SurfaceFrame {
    /// Standalone SVG document for the frame.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let Surface {
            width,
            height,
            grid,
        } = self.surface;
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="hmi-surface{}" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#,
            if self.edit_mode { " editing" } else { "" },
        );
        out.push_str(&format!(
            r#"<rect width="{width}" height="{height}" fill="{BACKGROUND}"/>"#
        ));
        if self.edit_mode {
            out.push_str(&format!(
                concat!(
                    r#"<defs><pattern id="hmi-grid" width="{grid}" height="{grid}" patternUnits="userSpaceOnUse">"#,
                    r#"<path d="M{grid} 0H0V{grid}" fill="none" stroke="{stroke}" stroke-width="1"/>"#,
                    "</pattern></defs>",
                    r#"<rect class="hmi-grid" width="{width}" height="{height}" fill="url(#hmi-grid)"/>"#
                ),
                grid = grid,
                stroke = GRID_STROKE,
                width = width,
                height = height,
            ));
        }
        for placed in &self.widgets {
            self.write_widget(&mut out, placed);
        }
        out.push_str("</svg>");
        out
    }

    fn write_widget(&self, out: &mut String, placed: &PlacedWidget) {
        let id = escape_xml(&placed.id);
        let Point { x, y } = placed.origin;
        out.push_str(&format!(
            r#"<g class="hmi-widget{}" data-id="{id}" data-z="{}">"#,
            if placed.selected { " selected" } else { "" },
            placed.z,
        ));
        out.push_str(&format!(
            r#"<g transform="translate({x} {y}) scale({})">{}"#,
            placed.scale, placed.visual
        ));
        if self.edit_mode {
            out.push_str(&format!(
                r##"<rect class="hmi-outline" width="{}" height="{}" fill="{OUTLINE_FILL}" stroke="#ff0000" stroke-width="1" vector-effect="non-scaling-stroke"/>"##,
                placed.size.width, placed.size.height,
            ));
        }
        out.push_str("</g>");

        if self.edit_mode {
            let scaled = placed.scaled_size();
            out.push_str(&format!(
                r##"<text class="hmi-debug" x="{x}" y="{}" font-size="10" fill="#ffffff">{} ({}, {})</text>"##,
                y + scaled.height + 12.0,
                escape_xml(&placed.kind),
                x.round(),
                y.round(),
            ));
            if placed.selected {
                out.push_str(&format!(
                    r##"<rect class="hmi-resize" x="{}" y="{}" width="{HANDLE_SIZE}" height="{HANDLE_SIZE}" fill="#00ff00" style="cursor: se-resize"/>"##,
                    x + scaled.width - HANDLE_SIZE,
                    y + scaled.height - HANDLE_SIZE,
                ));
                let dx = x + scaled.width - DELETE_SIZE;
                let dy = y - DELETE_SIZE;
                out.push_str(&format!(
                    concat!(
                        r#"<g class="hmi-delete" style="cursor: pointer">"#,
                        r##"<rect x="{dx}" y="{dy}" width="{size}" height="{size}" rx="3" fill="#dc2626"/>"##,
                        r##"<path d="M{a} {b}L{c} {d}M{c} {b}L{a} {d}" stroke="#ffffff" stroke-width="2"/>"##,
                        "</g>"
                    ),
                    dx = dx,
                    dy = dy,
                    size = DELETE_SIZE,
                    a = dx + 4.0,
                    b = dy + 4.0,
                    c = dx + DELETE_SIZE - 4.0,
                    d = dy + DELETE_SIZE - 4.0,
                ));
            }
        }
        out.push_str("</g>");
    }
}
