//! Pointer drag/selection state machine and property inspector.
//!
//! ```text
//! Idle ──down(widget)──▶ Dragging ──up/leave──▶ Selected
//!                          ▲  │ move: emit delta, origin = pointer
//!                          │  ▼
//!            Selected ──down(widget)
//! ```
//!
//! A pointer-down on empty surface keeps the current selection; only a
//! new pointer-down on a widget or removing the selected widget changes it.
//! Outside edit mode every pointer event is ignored.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EditorError;
use crate::widget::{Point, WidgetInstance, WidgetPatch};

/// Scale range offered by the inspector. The model itself does not clamp.
pub const INSPECTOR_SCALE_MIN: f64 = 0.1;
pub const INSPECTOR_SCALE_MAX: f64 = 3.0;

/// Smallest width/height a resize drag will produce.
pub const MIN_WIDGET_EXTENT: f64 = 1.0;

/// Which part of a widget the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grip {
    #[default]
    Body,
    ResizeHandle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitTarget {
    pub id: String,
    #[serde(default)]
    pub grip: Grip,
}

impl HitTarget {
    #[must_use]
    pub fn body(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            grip: Grip::Body,
        }
    }

    #[must_use]
    pub fn resize_handle(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            grip: Grip::ResizeHandle,
        }
    }
}

/// Raw pointer input, in surface coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    /// `target` is `None` when the pointer went down on empty surface.
    Down {
        #[serde(default)]
        target: Option<HitTarget>,
        at: Point,
    },
    Move {
        at: Point,
    },
    Up,
    /// The pointer left the editor surface.
    Leave,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Selected {
        id: String,
    },
    Dragging {
        id: String,
        origin: Point,
        grip: Grip,
    },
}

impl DragState {
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Selected { id } | Self::Dragging { id, .. } => Some(id.as_str()),
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

/// Layout change requested by a drag step, in surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DragMutation {
    Translate { id: String, dx: f64, dy: f64 },
    Resize { id: String, dx: f64, dy: f64 },
}

impl DragMutation {
    /// The patch that applies this step to `widget`.
    ///
    /// Resize deltas are divided by the widget's scale, since the handle
    /// moves in surface pixels while width/height are unscaled. A step that
    /// would overflow a field leaves that field as it was.
    #[must_use]
    pub fn patch_for(&self, widget: &WidgetInstance) -> WidgetPatch {
        match self {
            Self::Translate { dx, dy, .. } => WidgetPatch::position(
                finite_or(widget.x + dx, widget.x),
                finite_or(widget.y + dy, widget.y),
            ),
            Self::Resize { dx, dy, .. } => {
                let scale = if widget.scale.is_finite() && widget.scale > 0.0 {
                    widget.scale
                } else {
                    1.0
                };
                WidgetPatch::size(
                    finite_or(widget.width + dx / scale, widget.width).max(MIN_WIDGET_EXTENT),
                    finite_or(widget.height + dy / scale, widget.height).max(MIN_WIDGET_EXTENT),
                )
            }
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Translate { id, .. } | Self::Resize { id, .. } => id,
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Drives [`DragState`] from pointer events.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: DragState,
}

impl Interaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.state.selected()
    }

    /// Applies one pointer event; returns the layout change it implies.
    pub fn handle(&mut self, event: PointerEvent, edit_mode: bool) -> Option<DragMutation> {
        if !edit_mode {
            self.end_drag();
            return None;
        }
        match event {
            PointerEvent::Down {
                target: Some(target),
                at,
            } => {
                debug!(id = %target.id, grip = ?target.grip, "drag started");
                self.state = DragState::Dragging {
                    id: target.id,
                    origin: at,
                    grip: target.grip,
                };
                None
            }
            PointerEvent::Down { target: None, .. } => None,
            PointerEvent::Move { at } => {
                let DragState::Dragging { id, origin, grip } = &mut self.state else {
                    return None;
                };
                let (dx, dy) = origin.delta_to(at);
                *origin = at;
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                let id = id.clone();
                Some(match grip {
                    Grip::Body => DragMutation::Translate { id, dx, dy },
                    Grip::ResizeHandle => DragMutation::Resize { id, dx, dy },
                })
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.end_drag();
                None
            }
        }
    }

    /// Ends an active drag, keeping the selection. Movement already
    /// applied stays applied.
    pub fn end_drag(&mut self) {
        if let DragState::Dragging { id, .. } = &self.state {
            debug!(id = %id, "drag ended");
            self.state = DragState::Selected { id: id.clone() };
        }
    }

    /// Drops the selection if it points at `id`.
    pub fn forget(&mut self, id: &str) {
        if self.state.selected() == Some(id) {
            self.state = DragState::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Numeric fields the property inspector can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorField {
    X,
    Y,
    Width,
    Height,
    Scale,
}

impl InspectorField {
    pub const ALL: [InspectorField; 5] = [
        InspectorField::X,
        InspectorField::Y,
        InspectorField::Width,
        InspectorField::Height,
        InspectorField::Scale,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Width => "width",
            Self::Height => "height",
            Self::Scale => "scale",
        }
    }

    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(text.trim()))
    }

    /// Validates `value` and builds the single-field patch.
    pub fn patch(self, value: f64) -> Result<WidgetPatch, EditorError> {
        if !value.is_finite() {
            return Err(EditorError::InvalidValue {
                field: self.as_str(),
                value,
            });
        }
        let mut patch = WidgetPatch::default();
        match self {
            Self::X => patch.x = Some(value),
            Self::Y => patch.y = Some(value),
            Self::Width => patch.width = Some(value),
            Self::Height => patch.height = Some(value),
            Self::Scale => {
                patch.scale = Some(value.clamp(INSPECTOR_SCALE_MIN, INSPECTOR_SCALE_MAX));
            }
        }
        Ok(patch)
    }
}

/// What the property panel shows for the selected widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectorView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub visible: bool,
}

impl InspectorView {
    /// Position is rounded for display; size and scale are shown as stored.
    #[must_use]
    pub fn of(widget: &WidgetInstance) -> Self {
        Self {
            id: widget.id.clone(),
            kind: widget.kind.to_string(),
            x: widget.x.round(),
            y: widget.y.round(),
            width: widget.width,
            height: widget.height,
            scale: widget.scale,
            visible: widget.visible,
        }
    }

    /// Plain-text rendering for terminals and logs.
    #[must_use]
    pub fn render_text(&self) -> String {
        format!(
            "{} ({})\n  x: {}  y: {}\n  width: {}  height: {}\n  scale: {}{}",
            self.id,
            self.kind,
            self.x,
            self.y,
            self.width,
            self.height,
            self.scale,
            if self.visible { "" } else { "\n  hidden" }
        )
    }
}
