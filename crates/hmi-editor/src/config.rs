//! Editor configuration (`hmi-editor.toml`).

#![allow(missing_docs)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use hmi_layout::persist::DEFAULT_SLOT_KEY;
use hmi_layout::{FileLayoutSlot, Surface};
use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;

pub const CONFIG_FILE: &str = "hmi-editor.toml";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8090";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: {message}")]
    Read { path: SmolStr, message: SmolStr },

    #[error("invalid config '{0}'")]
    Parse(SmolStr),

    #[error("invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: SmolStr },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<SmolStr>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub log_level: SmolStr,
    pub layout: LayoutConfig,
    pub surface: Surface,
    pub web: WebConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub dir: PathBuf,
    pub key: SmolStr,
}

impl LayoutConfig {
    #[must_use]
    pub fn slot(&self) -> FileLayoutSlot {
        FileLayoutSlot::in_dir(&self.dir, &self.key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebConfig {
    pub enabled: bool,
    pub listen: SmolStr,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            log_level: SmolStr::new("info"),
            layout: LayoutConfig {
                dir: PathBuf::from("."),
                key: SmolStr::new(DEFAULT_SLOT_KEY),
            },
            surface: Surface::default(),
            web: WebConfig {
                enabled: true,
                listen: SmolStr::new(DEFAULT_LISTEN),
            },
        }
    }
}

impl EditorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string().into(),
            message: err.to_string().into(),
        })?;
        Self::from_toml_str(&text)
    }

    /// An explicit path must exist; otherwise `hmi-editor.toml` in the
    /// working directory is used when present, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE);
        if local.is_file() {
            Self::load(local)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: ConfigToml =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string().into()))?;
        raw.into_config()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    log_level: Option<String>,
    layout: Option<LayoutSection>,
    surface: Option<SurfaceSection>,
    web: Option<WebSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutSection {
    dir: Option<PathBuf>,
    key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SurfaceSection {
    width: Option<u32>,
    height: Option<u32>,
    grid: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WebSection {
    enabled: Option<bool>,
    listen: Option<String>,
}

impl ConfigToml {
    fn into_config(self) -> Result<EditorConfig, ConfigError> {
        let defaults = EditorConfig::default();

        let log_level = match self.log_level {
            Some(level) => {
                let level = level.trim().to_ascii_lowercase();
                if level.parse::<tracing::Level>().is_err() {
                    return Err(ConfigError::invalid(
                        "log_level",
                        format!("unknown level '{level}'"),
                    ));
                }
                SmolStr::new(level)
            }
            None => defaults.log_level,
        };

        let layout_section = self.layout.unwrap_or_default();
        let key = match layout_section.key {
            Some(key) => validate_slot_key(&key)?,
            None => defaults.layout.key,
        };
        let layout = LayoutConfig {
            dir: layout_section.dir.unwrap_or(defaults.layout.dir),
            key,
        };

        let surface_section = self.surface.unwrap_or_default();
        let surface = Surface::new(
            positive("surface.width", surface_section.width, defaults.surface.width)?,
            positive("surface.height", surface_section.height, defaults.surface.height)?,
            positive("surface.grid", surface_section.grid, defaults.surface.grid)?,
        );

        let web_section = self.web.unwrap_or_default();
        let listen = match web_section.listen {
            Some(listen) => {
                let listen = listen.trim().to_string();
                listen.parse::<SocketAddr>().map_err(|err| {
                    ConfigError::invalid("web.listen", format!("'{listen}': {err}"))
                })?;
                SmolStr::new(listen)
            }
            None => defaults.web.listen,
        };
        let web = WebConfig {
            enabled: web_section.enabled.unwrap_or(defaults.web.enabled),
            listen,
        };

        Ok(EditorConfig {
            log_level,
            layout,
            surface,
            web,
        })
    }
}

fn validate_slot_key(key: &str) -> Result<SmolStr, ConfigError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::invalid("layout.key", "must not be empty"));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        || key.starts_with('.')
    {
        return Err(ConfigError::invalid(
            "layout.key",
            format!("'{key}' may only contain letters, digits, '-', '_' and '.'"),
        ));
    }
    Ok(SmolStr::new(key))
}

fn positive(key: &'static str, value: Option<u32>, default: f64) -> Result<f64, ConfigError> {
    match value {
        None => Ok(default),
        Some(0) => Err(ConfigError::invalid(key, "must be greater than zero")),
        Some(value) => Ok(f64::from(value)),
    }
}
