use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use hmi_layout::persist::DEFAULT_SLOT_KEY;
use hmi_layout::surface::SurfacePointer;
use hmi_layout::{FileLayoutSlot, HmiEditor, Point, WidgetKind};

fn temp_dir(prefix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{}-{stamp}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn file_slot_survives_reopen() {
    let dir = temp_dir("hmi-layout-reopen");
    let slot = FileLayoutSlot::in_dir(&dir, DEFAULT_SLOT_KEY);
    let path = slot.path().to_path_buf();

    let mut editor = HmiEditor::open(Box::new(slot.clone()));
    let gauge = editor.add(WidgetKind::ChamberLevel);
    let light = editor.add(WidgetKind::SignalLight);
    editor.set_edit_mode(true);
    editor.pointer_at(SurfacePointer::Down {
        at: Point::new(205.0, 205.0),
    });
    editor.pointer_at(SurfacePointer::Move {
        at: Point::new(305.0, 255.0),
    });
    editor.pointer_at(SurfacePointer::Up);
    editor.save();
    assert!(path.is_file());

    let reopened = HmiEditor::open(Box::new(slot));
    assert_eq!(reopened.layout(), editor.layout());
    // topmost widget under the pointer was the signal light
    let moved = reopened.layout().get(&light).expect("light");
    assert_eq!(moved.position(), Point::new(300.0, 250.0));
    let still = reopened.layout().get(&gauge).expect("gauge");
    assert_eq!(still.position(), Point::new(200.0, 200.0));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn corrupt_file_opens_empty_and_clear_removes_it() {
    let dir = temp_dir("hmi-layout-corrupt");
    let slot = FileLayoutSlot::in_dir(&dir, "broken");
    std::fs::write(slot.path(), "[{\"id\": 3}").expect("write corrupt layout");

    let mut editor = HmiEditor::open(Box::new(slot.clone()));
    assert!(editor.layout().is_empty());
    assert!(slot.path().is_file());

    editor.clear();
    assert!(!slot.path().exists());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_directory_is_created_on_save() {
    let dir = temp_dir("hmi-layout-nested").join("a").join("b");
    let slot = FileLayoutSlot::in_dir(&dir, DEFAULT_SLOT_KEY);
    let mut editor = HmiEditor::open(Box::new(slot.clone()));
    editor.add(WidgetKind::UpstreamGate);
    editor.save();

    let text = std::fs::read_to_string(slot.path()).expect("saved layout");
    assert!(text.contains("\"type\": \"gate-upstream\""), "{text}");
}
