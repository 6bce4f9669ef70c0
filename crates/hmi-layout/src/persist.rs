//! Durable layout slot.
//!
//! A slot is a single named value holding the JSON array of widgets. Slot
//! failures never reach the editor: a missing or corrupt slot loads as an
//! empty layout and a failed write is logged and forgotten.

#![allow(missing_docs)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::LayoutError;
use crate::widget::WidgetInstance;

/// Slot name used when none is configured.
pub const DEFAULT_SLOT_KEY: &str = "hmi-components-config";

/// Raw key-value storage behind the layout.
pub trait LayoutSlot: Send {
    /// Returns `None` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, LayoutError>;
    fn write(&self, text: &str) -> Result<(), LayoutError>;
    /// Removing an absent slot succeeds.
    fn remove(&self) -> Result<(), LayoutError>;
    /// Human-readable location for log lines.
    fn describe(&self) -> String;
}

/// File-based layout slot: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileLayoutSlot {
    path: PathBuf,
}

impl FileLayoutSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>, key: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{key}.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayoutSlot for FileLayoutSlot {
    fn read(&self) -> Result<Option<String>, LayoutError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(LayoutError::Slot(
                format!("read {}: {err}", self.path.display()).into(),
            )),
        }
    }

    fn write(&self, text: &str) -> Result<(), LayoutError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    LayoutError::Slot(format!("create {}: {err}", parent.display()).into())
                })?;
            }
        }
        fs::write(&self.path, text).map_err(|err| {
            LayoutError::Slot(format!("write {}: {err}", self.path.display()).into())
        })
    }

    fn remove(&self) -> Result<(), LayoutError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(LayoutError::Slot(
                format!("remove {}: {err}", self.path.display()).into(),
            )),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory slot. Clones share the same cell, so a test can keep a handle
/// and inspect what the editor wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayoutSlot {
    cell: Arc<Mutex<Option<String>>>,
}

impl MemoryLayoutSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contents(text: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.set(Some(text.into()));
        slot
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.cell.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn set(&self, text: Option<String>) {
        if let Ok(mut guard) = self.cell.lock() {
            *guard = text;
        }
    }
}

impl LayoutSlot for MemoryLayoutSlot {
    fn read(&self) -> Result<Option<String>, LayoutError> {
        self.cell
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| LayoutError::Slot("memory slot poisoned".into()))
    }

    fn write(&self, text: &str) -> Result<(), LayoutError> {
        let mut guard = self
            .cell
            .lock()
            .map_err(|_| LayoutError::Slot("memory slot poisoned".into()))?;
        *guard = Some(text.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), LayoutError> {
        let mut guard = self
            .cell
            .lock()
            .map_err(|_| LayoutError::Slot("memory slot poisoned".into()))?;
        *guard = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Save/load/erase over a [`LayoutSlot`], with recovery on load.
pub struct LayoutPersistence {
    slot: Box<dyn LayoutSlot>,
}

impl std::fmt::Debug for LayoutPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutPersistence")
            .field("slot", &self.slot.describe())
            .finish()
    }
}

impl LayoutPersistence {
    #[must_use]
    pub fn new(slot: Box<dyn LayoutSlot>) -> Self {
        Self { slot }
    }

    /// Writes the layout. Failures are logged, never returned.
    pub fn save(&self, widgets: &[WidgetInstance]) {
        if let Err(err) = self.try_save(widgets) {
            warn!(slot = %self.slot.describe(), error = %err, "layout save failed");
            return;
        }
        info!(slot = %self.slot.describe(), widgets = widgets.len(), "layout saved");
    }

    pub fn try_save(&self, widgets: &[WidgetInstance]) -> Result<(), LayoutError> {
        let text = encode_layout(widgets)?;
        self.slot.write(&text)
    }

    /// Reads the layout; absent or unreadable data yields an empty layout.
    #[must_use]
    pub fn load(&self) -> Vec<WidgetInstance> {
        match self.try_load() {
            Ok(Some(widgets)) => widgets,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(slot = %self.slot.describe(), error = %err, "ignoring saved layout");
                Vec::new()
            }
        }
    }

    /// `Ok(None)` means the slot is empty.
    pub fn try_load(&self) -> Result<Option<Vec<WidgetInstance>>, LayoutError> {
        let Some(text) = self.slot.read()? else {
            return Ok(None);
        };
        decode_layout(&text).map(Some)
    }

    /// Deletes the slot. Failures are logged, never returned.
    pub fn erase(&self) {
        match self.slot.remove() {
            Ok(()) => info!(slot = %self.slot.describe(), "layout erased"),
            Err(err) => warn!(slot = %self.slot.describe(), error = %err, "layout erase failed"),
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        self.slot.describe()
    }
}

/// Pretty-printed JSON array of widgets.
pub fn encode_layout(widgets: &[WidgetInstance]) -> Result<String, LayoutError> {
    serde_json::to_string_pretty(widgets).map_err(|err| LayoutError::Encode(err.to_string().into()))
}

pub fn decode_layout(text: &str) -> Result<Vec<WidgetInstance>, LayoutError> {
    serde_json::from_str(text).map_err(|err| LayoutError::Parse(err.to_string().into()))
}
