//! `hmi-editor serve`.

use std::sync::Arc;

use anyhow::bail;
use hmi_editor::{start_web_server, EditorConfig, EditorHost};
use hmi_layout::{HmiEditor, TelemetryFeed};
use smol_str::SmolStr;

use crate::paint::{paint, Tone};

pub fn run_serve(config: &EditorConfig, listen: Option<String>) -> anyhow::Result<()> {
    let mut web = config.web.clone();
    if let Some(listen) = listen {
        web.listen = SmolStr::new(listen);
        web.enabled = true;
    }
    if !web.enabled {
        bail!("web server disabled ([web] enabled = false); pass --listen to override");
    }

    let editor = HmiEditor::open(Box::new(config.layout.slot())).with_surface(config.surface);
    let slot = editor.slot_location();
    let widgets = editor.layout().len();
    let host = Arc::new(EditorHost::new(editor, TelemetryFeed::new()));
    let server = start_web_server(&web, host)?;

    println!(
        "{} {}",
        paint("HMI editor running at", Tone::Done),
        paint(format!("http://{}", server.listen), Tone::Name)
    );
    let summary = format!("layout: {slot} ({widgets} widget(s))");
    println!("{}", paint(summary, Tone::Quiet));
    server.wait()?;
    Ok(())
}
