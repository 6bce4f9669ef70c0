//! `hmi-layout` - layout model and editing core for the HMI dashboard editor.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Widget types: the built-in catalog and the open type descriptor.
pub mod catalog;
/// Editor composition root.
pub mod editor;
/// Editor errors.
pub mod error;
/// Pointer drag/selection state machine and property inspector.
pub mod interaction;
/// Durable layout slot and recovery on load.
pub mod persist;
/// Widget renderers and type-indexed dispatch.
pub mod render;
/// Ordered collection of placed widgets.
pub mod store;
/// Editor surface composition and hit testing.
pub mod surface;
/// Telemetry snapshots and channel selection.
pub mod telemetry;
/// Placed widget records and geometry primitives.
pub mod widget;

mod util;

pub use catalog::{WidgetKind, WidgetType};
pub use editor::HmiEditor;
pub use error::{EditorError, LayoutError};
pub use interaction::{DragState, Grip, HitTarget, InspectorField, InspectorView, PointerEvent};
pub use persist::{FileLayoutSlot, LayoutPersistence, LayoutSlot, MemoryLayoutSlot};
pub use render::{RendererRegistry, Visual, WidgetRenderer};
pub use store::LayoutStore;
pub use surface::Surface;
pub use telemetry::{TelemetryFeed, TelemetrySnapshot};
pub use widget::{Point, Size, WidgetInstance, WidgetPatch};
