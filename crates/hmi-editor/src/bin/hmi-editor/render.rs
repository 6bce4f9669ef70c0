//! `hmi-editor render`.

use std::path::Path;

use anyhow::{anyhow, Context};
use hmi_editor::EditorConfig;
use hmi_layout::{HmiEditor, TelemetrySnapshot};

use crate::paint::{paint, Tone};

pub fn run_render(
    config: &EditorConfig,
    telemetry: Option<&Path>,
    edit: bool,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let snapshot = telemetry.map(load_snapshot).transpose()?;
    let mut editor = HmiEditor::open(Box::new(config.layout.slot())).with_surface(config.surface);
    editor.set_edit_mode(edit);
    let svg = editor.render(snapshot.as_ref()).to_svg();
    match out {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("write {}", path.display()))?;
            println!("{}", paint(format!("wrote {}", path.display()), Tone::Done));
        }
        None => println!("{svg}"),
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> anyhow::Result<TelemetrySnapshot> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    TelemetrySnapshot::from_json(&value)
        .ok_or_else(|| anyhow!("{}: telemetry must be a JSON object", path.display()))
}
