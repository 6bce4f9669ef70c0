//! `hmi-editor` - configuration, logging and the browser host for the HMI
//! layout editor.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// `hmi-editor.toml` loading and validation.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
/// Embedded browser UI server.
pub mod web;

pub use config::{ConfigError, EditorConfig};
pub use web::{start_web_server, EditorHost, WebServer};
