//! `hmi-editor kinds` and `hmi-editor layout ...`.

use anyhow::bail;
use hmi_editor::EditorConfig;
use hmi_layout::{HmiEditor, InspectorView, RendererRegistry, WidgetPatch};

use crate::cli::LayoutAction;
use crate::paint::{paint, Tone};

pub fn run_kinds() -> anyhow::Result<()> {
    for ty in RendererRegistry::builtin().widget_types() {
        println!(
            "{:<18} {:<18} {:>4}x{:<4} {:<18} default {}",
            paint(&ty.tag, Tone::Name),
            ty.label,
            ty.default_size.width,
            ty.default_size.height,
            ty.channel.as_deref().unwrap_or("-"),
            ty.default_value
        );
    }
    Ok(())
}

pub fn run_layout(config: &EditorConfig, action: LayoutAction) -> anyhow::Result<()> {
    let mut editor = HmiEditor::open(Box::new(config.layout.slot()));
    match action {
        LayoutAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(editor.layout().widgets())?);
                return Ok(());
            }
            if editor.layout().is_empty() {
                let empty = format!("{}: no widgets", editor.slot_location());
                println!("{}", paint(empty, Tone::Quiet));
                return Ok(());
            }
            for widget in editor.layout().iter() {
                let view = InspectorView::of(widget);
                println!(
                    "{:<32} {:<18} at ({}, {}) {}x{} scale {}{}",
                    paint(&view.id, Tone::Name),
                    view.kind,
                    view.x,
                    view.y,
                    view.width,
                    view.height,
                    view.scale,
                    if view.visible { "" } else { " (hidden)" }
                );
            }
        }
        LayoutAction::Add { tag } => {
            let id = editor.add_tag(&tag)?;
            editor.save();
            println!("{}", paint(format!("added {id}"), Tone::Done));
        }
        LayoutAction::Remove { id } => {
            if editor.remove(&id).is_some() {
                editor.save();
                println!("{}", paint(format!("removed {id}"), Tone::Done));
            } else {
                println!("{}", paint(format!("no widget '{id}'"), Tone::Warn));
            }
        }
        LayoutAction::Set {
            id,
            x,
            y,
            width,
            height,
            scale,
            visible,
        } => {
            let patch = WidgetPatch {
                x,
                y,
                width,
                height,
                scale,
                visible,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one of --x --y --width --height --scale --visible");
            }
            let numeric = [
                ("x", x),
                ("y", y),
                ("width", width),
                ("height", height),
                ("scale", scale),
            ];
            for (field, value) in numeric {
                if let Some(value) = value.filter(|value| !value.is_finite()) {
                    bail!("invalid value for {field}: {value}");
                }
            }
            editor.update(&id, &patch)?;
            editor.save();
            if let Some(widget) = editor.layout().get(&id) {
                println!("{}", InspectorView::of(widget).render_text());
            }
        }
        LayoutAction::Arrange => {
            editor.arrange_grid();
            editor.save();
            let arranged = format!("arranged {} widget(s)", editor.layout().len());
            println!("{}", paint(arranged, Tone::Done));
        }
        LayoutAction::Clear => {
            editor.clear();
            println!("{}", paint("layout cleared", Tone::Done));
        }
    }
    Ok(())
}
