//! Ordered collection of placed widgets.
//!
//! Insertion order is the stacking baseline: later widgets draw above
//! earlier ones. Every mutation goes through this type so the id
//! uniqueness invariant holds no matter where the widgets came from.

#![allow(missing_docs)]

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::catalog::WidgetKind;
use crate::util::now_unix_ms;
use crate::widget::{Size, WidgetInstance, WidgetPatch};

const ARRANGE_COLUMNS: usize = 5;
const ARRANGE_ORIGIN_X: f64 = 100.0;
const ARRANGE_ORIGIN_Y: f64 = 200.0;
const ARRANGE_STEP_X: f64 = 150.0;
const ARRANGE_STEP_Y: f64 = 100.0;

/// Placed widgets in stacking order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutStore {
    widgets: Vec<WidgetInstance>,
}

impl LayoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from loaded widgets, renaming duplicate ids.
    #[must_use]
    pub fn from_widgets(widgets: Vec<WidgetInstance>) -> Self {
        let mut store = Self::new();
        store.replace_all(widgets);
        store
    }

    /// Places a new `kind` widget with catalog geometry and returns its id.
    pub fn add(&mut self, kind: WidgetKind) -> String {
        self.add_at(kind, now_unix_ms())
    }

    /// [`LayoutStore::add`] with an explicit creation timestamp.
    pub fn add_at(&mut self, kind: WidgetKind, now_ms: u128) -> String {
        self.place(kind.as_str(), kind.default_size(), now_ms)
    }

    /// Places a new widget of any type tag with the given starting size.
    pub fn place(&mut self, tag: &str, size: Size, now_ms: u128) -> String {
        let id = self.unique_id(&format!("{tag}-{now_ms}"));
        debug!(id = %id, kind = %tag, "widget added");
        self.widgets.push(WidgetInstance::placed(id.clone(), tag, size));
        id
    }

    /// Deletes the widget with `id`; returns it when it was present.
    pub fn remove(&mut self, id: &str) -> Option<WidgetInstance> {
        let index = self.position(id)?;
        let removed = self.widgets.remove(index);
        debug!(id = %id, "widget removed");
        Some(removed)
    }

    /// Merges `patch` into the widget with `id`; returns whether it exists.
    pub fn update(&mut self, id: &str, patch: &WidgetPatch) -> bool {
        match self.get_mut(id) {
            Some(widget) => {
                widget.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        self.update(id, &WidgetPatch::visible(visible))
    }

    /// Swaps in a whole new widget sequence.
    ///
    /// A repeated id keeps its first occurrence untouched; later copies get
    /// a `-<n>` suffix.
    pub fn replace_all(&mut self, widgets: Vec<WidgetInstance>) {
        let mut seen: HashSet<String> = HashSet::with_capacity(widgets.len());
        let mut next = Vec::with_capacity(widgets.len());
        for mut widget in widgets {
            if seen.contains(&widget.id) {
                let renamed = suffixed_id(&widget.id, |candidate| seen.contains(candidate));
                warn!(id = %widget.id, renamed = %renamed, "duplicate widget id in layout");
                widget.id = renamed;
            }
            seen.insert(widget.id.clone());
            next.push(widget);
        }
        self.widgets = next;
    }

    pub fn clear(&mut self) {
        self.widgets.clear();
    }

    /// Lays every widget out on a five-column grid, in insertion order.
    pub fn arrange_grid(&mut self) {
        for (index, widget) in self.widgets.iter_mut().enumerate() {
            let column = (index % ARRANGE_COLUMNS) as f64;
            let row = (index / ARRANGE_COLUMNS) as f64;
            widget.x = ARRANGE_ORIGIN_X + column * ARRANGE_STEP_X;
            widget.y = ARRANGE_ORIGIN_Y + row * ARRANGE_STEP_Y;
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetInstance> {
        self.widgets.iter().find(|widget| widget.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut WidgetInstance> {
        self.widgets.iter_mut().find(|widget| widget.id == id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.widgets.iter().position(|widget| widget.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &WidgetInstance> {
        self.widgets.iter()
    }

    #[must_use]
    pub fn widgets(&self) -> &[WidgetInstance] {
        &self.widgets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn unique_id(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        suffixed_id(base, |candidate| self.contains(candidate))
    }
}

fn suffixed_id(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
