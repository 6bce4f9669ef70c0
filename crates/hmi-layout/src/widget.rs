//! Placed widget records and geometry primitives.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::catalog::{WidgetKind, DEFAULT_POSITION};

/// A point on the editor surface, origin top-left, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset from `self` to `other`.
    #[must_use]
    pub fn delta_to(self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

const fn default_scale() -> f64 {
    1.0
}

const fn default_visible() -> bool {
    true
}

/// One placed widget.
///
/// `kind` holds the raw type tag so layouts written by a newer editor (or
/// edited by hand) still load; tags outside [`WidgetKind`] render as a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SmolStr,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl WidgetInstance {
    /// A fresh instance of `kind` with its catalog geometry.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: WidgetKind) -> Self {
        Self::placed(id, kind.as_str(), kind.default_size())
    }

    /// A fresh instance of type `tag` at the default position.
    #[must_use]
    pub fn placed(id: impl Into<String>, tag: impl Into<SmolStr>, size: Size) -> Self {
        Self {
            id: id.into(),
            kind: tag.into(),
            x: DEFAULT_POSITION.x,
            y: DEFAULT_POSITION.y,
            width: size.width,
            height: size.height,
            scale: 1.0,
            visible: true,
        }
    }

    #[must_use]
    pub fn known_kind(&self) -> Option<WidgetKind> {
        WidgetKind::parse(&self.kind)
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Rendered box size: `width`/`height` multiplied by `scale`.
    #[must_use]
    pub fn scaled_size(&self) -> Size {
        Size::new(self.width * self.scale, self.height * self.scale)
    }

    /// Whether `point` falls inside the rendered box.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let size = self.scaled_size();
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + size.width
            && point.y <= self.y + size.height
    }

    /// Merges every field present in `patch`. Non-finite numbers are
    /// skipped: the layout is stored as JSON, which cannot hold them.
    pub fn apply(&mut self, patch: &WidgetPatch) {
        let finite = |value: Option<f64>| value.filter(|value| value.is_finite());
        if let Some(x) = finite(patch.x) {
            self.x = x;
        }
        if let Some(y) = finite(patch.y) {
            self.y = y;
        }
        if let Some(width) = finite(patch.width) {
            self.width = width;
        }
        if let Some(height) = finite(patch.height) {
            self.height = height;
        }
        if let Some(scale) = finite(patch.scale) {
            self.scale = scale;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
    }
}

/// Partial update for [`WidgetInstance`]; absent fields are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl WidgetPatch {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// First numeric field holding NaN or an infinity, with its value.
    #[must_use]
    pub fn non_finite(&self) -> Option<(&'static str, f64)> {
        [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
            ("scale", self.scale),
        ]
        .into_iter()
        .find_map(|(field, value)| {
            value
                .filter(|value| !value.is_finite())
                .map(|value| (field, value))
        })
    }
}
