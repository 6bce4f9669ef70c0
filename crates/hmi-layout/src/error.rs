//! Layout and editor errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Failures of the durable layout slot.
///
/// These never escape the persistence adapter's `save`/`load`/`erase`; they
/// are logged and the editor carries on with whatever it has in memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Reading, writing or removing the slot failed.
    #[error("layout slot error '{0}'")]
    Slot(SmolStr),

    /// The slot held data that is not a valid widget sequence.
    #[error("invalid layout data '{0}'")]
    Parse(SmolStr),

    /// The in-memory layout could not be encoded.
    #[error("layout encode error '{0}'")]
    Encode(SmolStr),
}

/// Editor commands rejected by the current editing state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// The command needs edit mode.
    #[error("edit mode is off")]
    NotEditing,

    /// The command needs a selected widget.
    #[error("no widget selected")]
    NoSelection,

    /// No widget with that id is placed.
    #[error("unknown widget '{0}'")]
    UnknownWidget(SmolStr),

    /// No widget type with that tag is registered.
    #[error("unknown widget type '{0}'")]
    UnknownKind(SmolStr),

    /// A numeric property value was rejected.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}
