//! Editor composition root.
//!
//! [`HmiEditor`] owns the layout and is the only thing that mutates it.
//! Pointer input, the inspector and explicit commands all funnel through
//! here so selection and layout stay consistent.

#![allow(missing_docs)]

use tracing::{debug, info};

use crate::catalog::WidgetKind;
use crate::error::EditorError;
use crate::interaction::{
    DragMutation, DragState, InspectorField, InspectorView, Interaction, PointerEvent,
};
use crate::persist::{LayoutPersistence, LayoutSlot};
use crate::render::RendererRegistry;
use crate::store::LayoutStore;
use crate::surface::{Surface, SurfaceFrame, SurfaceHit, SurfacePointer};
use crate::telemetry::TelemetrySnapshot;
use crate::util::now_unix_ms;
use crate::widget::{WidgetInstance, WidgetPatch};

/// A single editing session over one persisted layout.
#[derive(Debug)]
pub struct HmiEditor {
    store: LayoutStore,
    interaction: Interaction,
    persistence: LayoutPersistence,
    registry: RendererRegistry,
    surface: Surface,
    edit_mode: bool,
    last_saved_ms: Option<u128>,
}

impl HmiEditor {
    /// Loads the layout from `slot` once. Unreadable data opens empty.
    #[must_use]
    pub fn open(slot: Box<dyn LayoutSlot>) -> Self {
        let persistence = LayoutPersistence::new(slot);
        let store = LayoutStore::from_widgets(persistence.load());
        info!(
            slot = %persistence.describe(),
            widgets = store.len(),
            "layout opened"
        );
        Self {
            store,
            interaction: Interaction::new(),
            persistence,
            registry: RendererRegistry::builtin(),
            surface: Surface::default(),
            edit_mode: false,
            last_saved_ms: None,
        }
    }

    #[must_use]
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutStore {
        &self.store
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    #[must_use]
    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        self.interaction.state()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.interaction.selected()
    }

    #[must_use]
    pub fn last_saved_ms(&self) -> Option<u128> {
        self.last_saved_ms
    }

    #[must_use]
    pub fn slot_location(&self) -> String {
        self.persistence.describe()
    }

    /// Turning edit mode off ends any drag in progress; the selection and
    /// any movement already applied are kept.
    pub fn set_edit_mode(&mut self, on: bool) {
        if !on {
            self.interaction.end_drag();
        }
        if self.edit_mode != on {
            debug!(edit_mode = on, "edit mode changed");
        }
        self.edit_mode = on;
    }

    pub fn add(&mut self, kind: WidgetKind) -> String {
        self.store.add(kind)
    }

    /// Adds a widget of any registered type, using the size it registered.
    pub fn add_tag(&mut self, tag: &str) -> Result<String, EditorError> {
        let widget_type = self
            .registry
            .widget_type(tag)
            .ok_or_else(|| EditorError::UnknownKind(tag.into()))?;
        Ok(self
            .store
            .place(&widget_type.tag, widget_type.default_size, now_unix_ms()))
    }

    /// Removes `id` and drops the selection if it pointed there. An absent
    /// id changes nothing.
    pub fn remove(&mut self, id: &str) -> Option<WidgetInstance> {
        let removed = self.store.remove(id)?;
        self.interaction.forget(id);
        Some(removed)
    }

    /// Rejects NaN and infinities; the layout has to stay serialisable.
    pub fn update(&mut self, id: &str, patch: &WidgetPatch) -> Result<(), EditorError> {
        if let Some((field, value)) = patch.non_finite() {
            return Err(EditorError::InvalidValue { field, value });
        }
        if self.store.update(id, patch) {
            Ok(())
        } else {
            Err(EditorError::UnknownWidget(id.into()))
        }
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), EditorError> {
        self.update(id, &WidgetPatch::visible(visible))
    }

    pub fn replace_all(&mut self, widgets: Vec<WidgetInstance>) {
        self.store.replace_all(widgets);
        if let Some(id) = self.selected().map(str::to_owned) {
            if !self.store.contains(&id) {
                self.interaction.reset();
            }
        }
    }

    /// Empties the layout and erases the persisted slot.
    pub fn clear(&mut self) {
        self.store.clear();
        self.interaction.reset();
        self.persistence.erase();
    }

    pub fn arrange_grid(&mut self) {
        self.store.arrange_grid();
    }

    pub fn save(&mut self) {
        self.save_with(|_| {});
    }

    /// Persists the layout, then hands the saved widgets to `on_saved`.
    pub fn save_with(&mut self, on_saved: impl FnOnce(&[WidgetInstance])) {
        self.persistence.save(self.store.widgets());
        self.last_saved_ms = Some(now_unix_ms());
        on_saved(self.store.widgets());
    }

    /// Feeds one hit-tested pointer event; returns whether the layout moved.
    ///
    /// A pointer-down naming a widget that is not placed and visible counts
    /// as a press on empty surface.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        let event = match event {
            PointerEvent::Down {
                target: Some(target),
                at,
            } if !self.is_pickable(&target.id) => PointerEvent::Down { target: None, at },
            event => event,
        };
        let Some(mutation) = self.interaction.handle(event, self.edit_mode) else {
            return false;
        };
        self.apply_drag(&mutation)
    }

    /// Feeds raw surface input, hit testing it first. A pointer-down on the
    /// delete button removes that widget.
    pub fn pointer_at(&mut self, input: SurfacePointer) -> bool {
        let event = match input {
            SurfacePointer::Down { at } => {
                let hit = self
                    .surface
                    .hit_test(&self.store, self.edit_mode, self.selected(), at);
                match hit {
                    Some(SurfaceHit::Delete { id }) => return self.remove(&id).is_some(),
                    Some(SurfaceHit::Widget(target)) => PointerEvent::Down {
                        target: Some(target),
                        at,
                    },
                    None => PointerEvent::Down { target: None, at },
                }
            }
            SurfacePointer::Move { at } => PointerEvent::Move { at },
            SurfacePointer::Up => PointerEvent::Up,
            SurfacePointer::Leave => PointerEvent::Leave,
        };
        self.pointer(event)
    }

    fn is_pickable(&self, id: &str) -> bool {
        self.store.get(id).is_some_and(|widget| widget.visible)
    }

    fn apply_drag(&mut self, mutation: &DragMutation) -> bool {
        let Some(widget) = self.store.get(mutation.id()) else {
            return false;
        };
        let patch = mutation.patch_for(widget);
        self.store.update(mutation.id(), &patch)
    }

    /// Sets one numeric property of the selected widget.
    pub fn inspect(&mut self, field: InspectorField, value: f64) -> Result<(), EditorError> {
        if !self.edit_mode {
            return Err(EditorError::NotEditing);
        }
        let id = self
            .selected()
            .map(str::to_owned)
            .ok_or(EditorError::NoSelection)?;
        let patch = field.patch(value)?;
        self.update(&id, &patch)
    }

    /// Property panel contents; only shown while editing with a selection.
    #[must_use]
    pub fn inspector(&self) -> Option<InspectorView> {
        if !self.edit_mode {
            return None;
        }
        self.selected()
            .and_then(|id| self.store.get(id))
            .map(InspectorView::of)
    }

    #[must_use]
    pub fn render(&self, snapshot: Option<&TelemetrySnapshot>) -> SurfaceFrame {
        self.surface.compose(
            &self.store,
            &self.registry,
            snapshot,
            self.edit_mode,
            self.selected(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WidgetType;
    use crate::interaction::HitTarget;
    use crate::persist::MemoryLayoutSlot;
    use crate::widget::{Point, Size};

    fn editor() -> (MemoryLayoutSlot, HmiEditor) {
        let slot = MemoryLayoutSlot::new();
        let editor = HmiEditor::open(Box::new(slot.clone()));
        (slot, editor)
    }

    fn drag(editor: &mut HmiEditor, id: &str, from: Point, steps: &[(f64, f64)]) {
        editor.pointer(PointerEvent::Down {
            target: Some(HitTarget::body(id)),
            at: from,
        });
        let mut at = from;
        for (dx, dy) in steps {
            at = Point::new(at.x + dx, at.y + dy);
            editor.pointer(PointerEvent::Move { at });
        }
        editor.pointer(PointerEvent::Up);
    }

    #[test]
    fn drag_moves_by_the_sum_of_deltas() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::ChamberLevel);
        editor.set_edit_mode(true);
        let steps = [(3.0, 4.0), (-1.0, 0.5), (10.0, -20.0), (0.0, 0.0), (7.25, 1.0)];
        drag(&mut editor, &id, Point::new(210.0, 210.0), &steps);
        let widget = editor.layout().get(&id).expect("widget");
        assert_eq!(widget.position(), Point::new(219.25, 185.5));
        assert_eq!(editor.selected(), Some(id.as_str()));
        assert!(!editor.drag_state().is_dragging());
    }

    #[test]
    fn pointer_is_ignored_outside_edit_mode() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::SignalLight);
        drag(&mut editor, &id, Point::new(210.0, 210.0), &[(50.0, 50.0)]);
        assert_eq!(
            editor.layout().get(&id).expect("widget").position(),
            Point::new(200.0, 200.0)
        );
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn removing_selected_widget_returns_to_idle() {
        let (_, mut editor) = editor();
        let keep = editor.add(WidgetKind::UpstreamGate);
        let gone = editor.add(WidgetKind::DownstreamGate);
        editor.set_edit_mode(true);
        drag(&mut editor, &gone, Point::new(201.0, 201.0), &[]);
        assert_eq!(editor.selected(), Some(gone.as_str()));

        assert!(editor.remove("missing").is_none());
        assert_eq!(editor.selected(), Some(gone.as_str()));
        assert_eq!(editor.layout().len(), 2);

        assert!(editor.remove(&gone).is_some());
        assert_eq!(editor.drag_state(), &DragState::Idle);
        assert!(editor.layout().contains(&keep));
    }

    #[test]
    fn delete_button_removes_through_pointer_input() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::ChamberLevel);
        editor.set_edit_mode(true);
        editor.pointer_at(SurfacePointer::Down {
            at: Point::new(250.0, 230.0),
        });
        editor.pointer_at(SurfacePointer::Up);
        assert_eq!(editor.selected(), Some(id.as_str()));
        assert!(editor.pointer_at(SurfacePointer::Down {
            at: Point::new(545.0, 190.0),
        }));
        assert!(editor.layout().is_empty());
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn resize_handle_drag_grows_the_widget() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::SignalLight);
        editor.set_edit_mode(true);
        editor.pointer_at(SurfacePointer::Down {
            at: Point::new(210.0, 210.0),
        });
        editor.pointer_at(SurfacePointer::Up);
        // signal light is 42x62 at (200, 200)
        editor.pointer_at(SurfacePointer::Down {
            at: Point::new(240.0, 260.0),
        });
        editor.pointer_at(SurfacePointer::Move {
            at: Point::new(250.0, 280.0),
        });
        editor.pointer_at(SurfacePointer::Leave);
        let widget = editor.layout().get(&id).expect("widget");
        assert_eq!((widget.width, widget.height), (52.0, 82.0));
        assert_eq!(widget.position(), Point::new(200.0, 200.0));
    }

    #[test]
    fn leaving_edit_mode_mid_drag_keeps_applied_movement() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::SignalLight);
        editor.set_edit_mode(true);
        editor.pointer(PointerEvent::Down {
            target: Some(HitTarget::body(&id)),
            at: Point::new(0.0, 0.0),
        });
        editor.pointer(PointerEvent::Move {
            at: Point::new(5.0, 5.0),
        });
        editor.set_edit_mode(false);
        assert!(!editor.pointer(PointerEvent::Move {
            at: Point::new(50.0, 50.0),
        }));
        assert_eq!(
            editor.layout().get(&id).expect("widget").position(),
            Point::new(205.0, 205.0)
        );
        assert_eq!(
            editor.drag_state(),
            &DragState::Selected { id: id.clone() }
        );
    }

    #[test]
    fn inspector_requires_edit_mode_and_selection() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::UpstreamLevel);
        assert_eq!(
            editor.inspect(InspectorField::X, 10.0),
            Err(EditorError::NotEditing)
        );
        editor.set_edit_mode(true);
        assert_eq!(
            editor.inspect(InspectorField::X, 10.0),
            Err(EditorError::NoSelection)
        );
        assert!(editor.inspector().is_none());

        drag(&mut editor, &id, Point::new(201.0, 201.0), &[]);
        editor.inspect(InspectorField::X, 10.4).expect("x");
        editor.inspect(InspectorField::Scale, 9.0).expect("scale");
        assert!(matches!(
            editor.inspect(InspectorField::Width, f64::INFINITY),
            Err(EditorError::InvalidValue { field: "width", .. })
        ));
        let view = editor.inspector().expect("view");
        assert_eq!(view.x, 10.0);
        assert_eq!(view.scale, 3.0);
        assert_eq!(view.width, 250.0);
    }

    #[test]
    fn add_tag_rejects_unknown_types() {
        let (_, mut editor) = editor();
        assert_eq!(
            editor.add_tag("pump"),
            Err(EditorError::UnknownKind("pump".into()))
        );
        let id = editor.add_tag("gate-upstream").expect("known tag");
        assert!(id.starts_with("gate-upstream-"));
    }

    #[test]
    fn pointer_down_on_a_missing_or_hidden_widget_selects_nothing() {
        let (_, mut editor) = editor();
        editor.set_edit_mode(true);
        editor.pointer(PointerEvent::Down {
            target: Some(HitTarget::body("ghost")),
            at: Point::new(210.0, 210.0),
        });
        assert_eq!(editor.selected(), None);
        assert_eq!(
            editor.inspect(InspectorField::X, 1.0),
            Err(EditorError::NoSelection)
        );

        let shown = editor.add(WidgetKind::SignalLight);
        let hidden = editor.add(WidgetKind::UpstreamGate);
        editor.set_visible(&hidden, false).expect("known");
        drag(&mut editor, &shown, Point::new(210.0, 210.0), &[]);
        drag(&mut editor, &hidden, Point::new(210.0, 210.0), &[(5.0, 5.0)]);
        assert_eq!(editor.selected(), Some(shown.as_str()));
        assert_eq!(
            editor.layout().get(&hidden).expect("kept").position(),
            Point::new(200.0, 200.0)
        );
    }

    #[test]
    fn tiny_scale_resize_keeps_the_layout_saveable() {
        let (slot, mut editor) = editor();
        let keep = editor.add(WidgetKind::ChamberLevel);
        let tiny = editor.add(WidgetKind::SignalLight);
        let patch = WidgetPatch {
            scale: Some(1e-320),
            ..WidgetPatch::default()
        };
        editor.update(&tiny, &patch).expect("finite scale");
        editor.set_edit_mode(true);
        editor.pointer(PointerEvent::Down {
            target: Some(HitTarget::resize_handle(&tiny)),
            at: Point::new(242.0, 262.0),
        });
        editor.pointer(PointerEvent::Move {
            at: Point::new(243.0, 262.0),
        });
        editor.pointer(PointerEvent::Up);
        let widget = editor.layout().get(&tiny).expect("widget");
        assert!(widget.width.is_finite() && widget.height.is_finite());

        editor.save();
        let reopened = HmiEditor::open(Box::new(slot));
        assert_eq!(reopened.layout().len(), 2);
        assert!(reopened.layout().contains(&keep));
    }

    #[test]
    fn update_rejects_non_finite_values() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::SignalLight);
        assert!(matches!(
            editor.update(&id, &WidgetPatch::size(f64::INFINITY, 5.0)),
            Err(EditorError::InvalidValue { field: "width", .. })
        ));
        assert_eq!(editor.layout().get(&id).expect("kept").height, 62.0);
    }

    #[test]
    fn update_of_missing_widget_is_rejected_without_change() {
        let (_, mut editor) = editor();
        editor.add(WidgetKind::SignalLight);
        let before = editor.layout().clone();
        assert_eq!(
            editor.set_visible("nope", false),
            Err(EditorError::UnknownWidget("nope".into()))
        );
        assert_eq!(editor.layout(), &before);
    }

    #[test]
    fn save_persists_and_reopens() {
        let (slot, mut editor) = editor();
        let id = editor.add(WidgetKind::DownstreamLevel);
        editor.set_visible(&id, false).expect("known");
        let mut saved = 0;
        editor.save_with(|widgets| saved = widgets.len());
        assert_eq!(saved, 1);
        assert!(editor.last_saved_ms().is_some());

        let reopened = HmiEditor::open(Box::new(slot));
        assert_eq!(reopened.layout(), editor.layout());
    }

    #[test]
    fn unsaved_changes_are_not_persisted() {
        let (slot, mut editor) = editor();
        editor.add(WidgetKind::SignalLight);
        assert_eq!(slot.contents(), None);
        editor.save();
        editor.add(WidgetKind::SignalLight);
        let reopened = HmiEditor::open(Box::new(slot));
        assert_eq!(reopened.layout().len(), 1);
    }

    #[test]
    fn clear_erases_slot_and_selection() {
        let (slot, mut editor) = editor();
        let id = editor.add(WidgetKind::ChamberLevel);
        editor.save();
        editor.set_edit_mode(true);
        drag(&mut editor, &id, Point::new(201.0, 201.0), &[]);
        editor.clear();
        assert!(editor.layout().is_empty());
        assert_eq!(editor.selected(), None);
        assert_eq!(slot.contents(), None);
    }

    #[test]
    fn corrupt_slot_opens_empty() {
        let slot = MemoryLayoutSlot::with_contents("{ this is not a layout");
        let editor = HmiEditor::open(Box::new(slot));
        assert!(editor.layout().is_empty());
    }

    #[test]
    fn replace_all_drops_stale_selection() {
        let (_, mut editor) = editor();
        let id = editor.add(WidgetKind::SignalLight);
        editor.set_edit_mode(true);
        drag(&mut editor, &id, Point::new(201.0, 201.0), &[]);
        editor.replace_all(vec![WidgetInstance::new("other", WidgetKind::SignalLight)]);
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn registered_type_can_be_placed_and_bound() {
        struct PumpRenderer;

        impl crate::render::WidgetRenderer for PumpRenderer {
            fn widget_type(&self) -> WidgetType {
                WidgetType::new("pump-status", Size::new(60.0, 30.0))
                    .with_label("Pump")
                    .with_channel("pump_speed", 10.0)
            }

            fn render(
                &self,
                value: f64,
                _ctx: &crate::render::RenderContext<'_>,
                _edit_mode: bool,
            ) -> crate::render::Visual {
                crate::render::Visual::new(format!("<pump value=\"{value}\"/>"))
            }
        }

        let mut registry = RendererRegistry::builtin();
        registry.register(Box::new(PumpRenderer));
        let (_, editor) = editor();
        let mut editor = editor.with_registry(registry);
        let id = editor.add_tag("pump-status").expect("registered tag");
        let pump = editor.layout().get(&id).expect("placed");
        assert_eq!((pump.width, pump.height), (60.0, 30.0));

        let svg = editor.render(None).to_svg();
        assert!(svg.contains(r#"<pump value="10"/>"#), "{svg}");
        let snapshot = TelemetrySnapshot::new().with("pump_speed", 72.5);
        let svg = editor.render(Some(&snapshot)).to_svg();
        assert!(svg.contains(r#"<pump value="72.5"/>"#), "{svg}");

        let mut stray = WidgetInstance::new("stray-1", WidgetKind::SignalLight);
        stray.kind = "valve".into();
        editor.replace_all(vec![stray]);
        let svg = editor.render(None).to_svg();
        assert!(svg.contains("unknown component: valve"), "{svg}");
        assert_eq!(
            editor.add_tag("valve"),
            Err(EditorError::UnknownKind("valve".into()))
        );
    }

    #[test]
    fn render_lifts_selected_widget() {
        let (_, mut editor) = editor();
        let first = editor.add(WidgetKind::UpstreamGate);
        editor.add(WidgetKind::DownstreamGate);
        editor.set_edit_mode(true);
        drag(&mut editor, &first, Point::new(201.0, 201.0), &[]);
        let frame = editor.render(None);
        assert_eq!(frame.widgets.last().map(|w| w.id.as_str()), Some(first.as_str()));
        editor.set_edit_mode(false);
        let frame = editor.render(None);
        assert_eq!(frame.widgets.first().map(|w| w.id.as_str()), Some(first.as_str()));
    }
}
