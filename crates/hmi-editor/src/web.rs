//! Embedded browser UI server.
//!
//! One request thread serves the editor page, the rendered surface and a
//! small JSON API. All editor state sits behind a single mutex, so requests
//! apply one at a time in arrival order.

#![allow(missing_docs)]

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use hmi_layout::surface::SurfacePointer;
use hmi_layout::{
    DragState, EditorError, HmiEditor, InspectorField, RendererRegistry, TelemetryFeed,
    TelemetrySnapshot, WidgetPatch,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smol_str::SmolStr;
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

use crate::config::WebConfig;

const INDEX_HTML: &str = include_str!("web/ui/index.html");
const APP_JS: &str = include_str!("web/ui/app.js");

const WIDGETS_PREFIX: &str = "/api/widgets/";

#[derive(Debug, Error)]
pub enum WebError {
    #[error("web disabled")]
    Disabled,
    #[error("web bind: {0}")]
    Bind(SmolStr),
    #[error("web server thread stopped unexpectedly")]
    Stopped,
}

/// HTTP reply produced by [`EditorHost::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    fn ok(value: &Value) -> Self {
        Self::json(200, value)
    }

    fn error(status: u16, message: impl AsRef<str>) -> Self {
        Self::json(status, &json!({ "error": message.as_ref() }))
    }

    fn text(content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    fn rejected(err: &EditorError) -> Self {
        Self::error(409, err.to_string())
    }

    fn bad_request(message: impl AsRef<str>) -> Self {
        Self::error(400, message)
    }

    fn not_found() -> Self {
        Self::error(404, "not found")
    }
}

#[derive(Debug, Deserialize)]
struct AddRequest {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct EditModeRequest {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct InspectorRequest {
    field: String,
    value: f64,
}

/// Editor session plus the latest telemetry, shared with the web thread.
#[derive(Debug)]
pub struct EditorHost {
    editor: Mutex<HmiEditor>,
    telemetry: TelemetryFeed,
}

impl EditorHost {
    #[must_use]
    pub fn new(editor: HmiEditor, telemetry: TelemetryFeed) -> Self {
        Self {
            editor: Mutex::new(editor),
            telemetry,
        }
    }

    #[must_use]
    pub fn telemetry(&self) -> &TelemetryFeed {
        &self.telemetry
    }

    fn lock(&self) -> MutexGuard<'_, HmiEditor> {
        self.editor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_editor<R>(&self, f: impl FnOnce(&mut HmiEditor) -> R) -> R {
        f(&mut self.lock())
    }

    /// Routes one request. `url` may carry a query string.
    pub fn handle(&self, method: &Method, url: &str, body: &str) -> Reply {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        match (method, path) {
            (Method::Get, "/") => Reply::text("text/html; charset=utf-8", INDEX_HTML),
            (Method::Get, "/app.js") => Reply::text("application/javascript", APP_JS),
            (Method::Get, "/surface.svg") => self.surface_svg(query),
            (Method::Get, "/api/layout") => self.layout_json(),
            (Method::Get, "/api/kinds") => Reply::ok(&kinds_json(self.lock().registry())),
            (Method::Get, "/api/inspector") => self.inspector_json(),
            (Method::Post, "/api/widgets") => self.add_widget(body),
            (Method::Post, "/api/pointer") => self.pointer(body),
            (Method::Post, "/api/edit-mode") => self.edit_mode(body),
            (Method::Post, "/api/inspector") => self.inspect(body),
            (Method::Post, "/api/save") => self.save(),
            (Method::Post, "/api/clear") => {
                self.lock().clear();
                self.layout_json()
            }
            (Method::Post, "/api/arrange") => {
                self.lock().arrange_grid();
                self.layout_json()
            }
            (Method::Post, "/api/telemetry") => self.telemetry_update(body),
            (Method::Patch, path) => match widget_id(path) {
                Some(id) => self.patch_widget(&id, body),
                None => Reply::not_found(),
            },
            (Method::Delete, path) => match widget_id(path) {
                Some(id) => self.delete_widget(&id),
                None => Reply::not_found(),
            },
            _ => Reply::not_found(),
        }
    }

    fn surface_svg(&self, query: &str) -> Reply {
        let snapshot = self.telemetry.latest();
        let editor = self.lock();
        let edit_mode = query_flag(query, "edit").unwrap_or_else(|| editor.edit_mode());
        let frame = editor.surface().compose(
            editor.layout(),
            editor.registry(),
            snapshot.as_ref(),
            edit_mode,
            editor.selected(),
        );
        Reply::text("image/svg+xml", frame.to_svg())
    }

    fn layout_json(&self) -> Reply {
        let editor = self.lock();
        Reply::ok(&json!({
            "widgets": editor.layout().widgets(),
            "edit_mode": editor.edit_mode(),
            "selected": editor.selected(),
            "drag": drag_name(editor.drag_state()),
            "last_saved_ms": editor.last_saved_ms().and_then(|ms| u64::try_from(ms).ok()),
            "slot": editor.slot_location(),
        }))
    }

    fn inspector_json(&self) -> Reply {
        let view = self.lock().inspector();
        Reply::ok(&json!(view))
    }

    fn add_widget(&self, body: &str) -> Reply {
        let request: AddRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(err) => return Reply::bad_request(format!("invalid json: {err}")),
        };
        match self.lock().add_tag(request.kind.trim()) {
            Ok(id) => Reply::json(201, &json!({ "id": id })),
            Err(err) => Reply::rejected(&err),
        }
    }

    fn patch_widget(&self, id: &str, body: &str) -> Reply {
        let patch: WidgetPatch = match serde_json::from_str(body) {
            Ok(patch) => patch,
            Err(err) => return Reply::bad_request(format!("invalid patch: {err}")),
        };
        let mut editor = self.lock();
        match editor.update(id, &patch) {
            Ok(()) => Reply::ok(&json!(editor.layout().get(id))),
            Err(err) => Reply::rejected(&err),
        }
    }

    fn delete_widget(&self, id: &str) -> Reply {
        let removed = self.lock().remove(id).is_some();
        Reply::ok(&json!({ "removed": removed }))
    }

    fn pointer(&self, body: &str) -> Reply {
        let input: SurfacePointer = match serde_json::from_str(body) {
            Ok(input) => input,
            Err(err) => return Reply::bad_request(format!("invalid pointer event: {err}")),
        };
        let mut editor = self.lock();
        let changed = editor.pointer_at(input);
        Reply::ok(&json!({
            "changed": changed,
            "selected": editor.selected(),
            "drag": drag_name(editor.drag_state()),
        }))
    }

    fn edit_mode(&self, body: &str) -> Reply {
        let request: EditModeRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(err) => return Reply::bad_request(format!("invalid json: {err}")),
        };
        let mut editor = self.lock();
        editor.set_edit_mode(request.enabled);
        Reply::ok(&json!({ "edit_mode": editor.edit_mode() }))
    }

    fn inspect(&self, body: &str) -> Reply {
        let request: InspectorRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(err) => return Reply::bad_request(format!("invalid json: {err}")),
        };
        let Some(field) = InspectorField::parse(&request.field) else {
            return Reply::bad_request(format!("unknown field '{}'", request.field));
        };
        let mut editor = self.lock();
        match editor.inspect(field, request.value) {
            Ok(()) => Reply::ok(&json!(editor.inspector())),
            Err(err) => Reply::rejected(&err),
        }
    }

    fn save(&self) -> Reply {
        let mut editor = self.lock();
        let mut saved = 0;
        editor.save_with(|widgets| saved = widgets.len());
        Reply::ok(&json!({
            "saved": saved,
            "last_saved_ms": editor.last_saved_ms().and_then(|ms| u64::try_from(ms).ok()),
        }))
    }

    fn telemetry_update(&self, body: &str) -> Reply {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(err) => return Reply::bad_request(format!("invalid json: {err}")),
        };
        let Some(snapshot) = TelemetrySnapshot::from_json(&value) else {
            return Reply::bad_request("telemetry must be a JSON object");
        };
        let channels = snapshot.channels.len();
        self.telemetry.update(snapshot.channels);
        Reply::ok(&json!({ "channels": channels }))
    }
}

fn widget_id(path: &str) -> Option<String> {
    let raw = path.strip_prefix(WIDGETS_PREFIX)?;
    if raw.is_empty() || raw.contains('/') {
        return None;
    }
    Some(
        urlencoding::decode(raw)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_string()),
    )
}

fn query_flag(query: &str, name: &str) -> Option<bool> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, "1"));
        if key != name {
            return None;
        }
        match value {
            "1" | "true" | "on" => Some(true),
            "0" | "false" | "off" => Some(false),
            _ => None,
        }
    })
}

fn drag_name(state: &DragState) -> &'static str {
    match state {
        DragState::Idle => "idle",
        DragState::Selected { .. } => "selected",
        DragState::Dragging { .. } => "dragging",
    }
}

fn kinds_json(registry: &RendererRegistry) -> Value {
    Value::Array(
        registry
            .widget_types()
            .map(|ty| {
                json!({
                    "type": ty.tag,
                    "label": ty.label,
                    "width": ty.default_size.width,
                    "height": ty.default_size.height,
                    "channel": ty.channel,
                    "default_value": ty.default_value,
                })
            })
            .collect(),
    )
}

pub struct WebServer {
    handle: thread::JoinHandle<()>,
    pub listen: String,
}

impl WebServer {
    /// Blocks until the request loop ends.
    pub fn wait(self) -> Result<(), WebError> {
        self.handle.join().map_err(|_| WebError::Stopped)
    }
}

pub fn start_web_server(config: &WebConfig, host: Arc<EditorHost>) -> Result<WebServer, WebError> {
    if !config.enabled {
        return Err(WebError::Disabled);
    }
    let listen = config.listen.to_string();
    let server = Server::http(&listen).map_err(|err| WebError::Bind(err.to_string().into()))?;
    info!(listen = %listen, "editor web server listening");
    let handle = thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();
            let mut body = String::new();
            let reply = if request.as_reader().read_to_string(&mut body).is_err() {
                Reply::bad_request("invalid body")
            } else {
                host.handle(&method, &url, &body)
            };
            debug!(method = %method, url = %url, status = reply.status, "request");
            respond(request, reply);
        }
    });
    Ok(WebServer { handle, listen })
}

fn respond(request: Request, reply: Reply) {
    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes("Content-Type", reply.content_type) {
        response.add_header(header);
    }
    if let Err(err) = request.respond(response) {
        warn!(error = %err, "failed to send response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmi_layout::{MemoryLayoutSlot, WidgetKind};

    fn host() -> (MemoryLayoutSlot, EditorHost) {
        let slot = MemoryLayoutSlot::new();
        let editor = HmiEditor::open(Box::new(slot.clone()));
        (slot, EditorHost::new(editor, TelemetryFeed::new()))
    }

    fn body(reply: &Reply) -> Value {
        serde_json::from_str(&reply.body).expect("json body")
    }

    #[test]
    fn add_then_patch_then_delete() {
        let (_, host) = host();
        let reply = host.handle(&Method::Post, "/api/widgets", r#"{"type":"signal-light"}"#);
        assert_eq!(reply.status, 201);
        let id = body(&reply)["id"].as_str().expect("id").to_string();

        let reply = host.handle(
            &Method::Patch,
            &format!("/api/widgets/{id}"),
            r#"{"x": 10, "visible": false}"#,
        );
        assert_eq!(reply.status, 200, "{}", reply.body);
        assert_eq!(body(&reply)["x"], json!(10.0));
        assert_eq!(body(&reply)["visible"], json!(false));

        let reply = host.handle(&Method::Delete, &format!("/api/widgets/{id}"), "");
        assert_eq!(body(&reply), json!({ "removed": true }));
        let reply = host.handle(&Method::Delete, &format!("/api/widgets/{id}"), "");
        assert_eq!(body(&reply), json!({ "removed": false }));
    }

    #[test]
    fn status_codes() {
        let (_, host) = host();
        assert_eq!(host.handle(&Method::Get, "/nope", "").status, 404);
        assert_eq!(host.handle(&Method::Delete, "/api/widgets/", "").status, 404);
        assert_eq!(host.handle(&Method::Post, "/api/widgets", "{").status, 400);
        assert_eq!(
            host.handle(&Method::Post, "/api/widgets", r#"{"type":"pump"}"#).status,
            409
        );
        assert_eq!(
            host.handle(&Method::Patch, "/api/widgets/ghost", r#"{"x":1}"#).status,
            409
        );
        assert_eq!(
            host.handle(&Method::Patch, "/api/widgets/ghost", r#"{"colour":1}"#).status,
            400
        );
        assert_eq!(
            host.handle(&Method::Post, "/api/inspector", r#"{"field":"x","value":1}"#).status,
            409
        );
        assert_eq!(
            host.handle(&Method::Post, "/api/inspector", r#"{"field":"depth","value":1}"#).status,
            400
        );
        assert_eq!(host.handle(&Method::Post, "/api/telemetry", "[1]").status, 400);
    }

    #[test]
    fn pointer_drag_over_the_api() {
        let (slot, host) = host();
        host.handle(&Method::Post, "/api/widgets", r#"{"type":"gate-upstream"}"#);
        host.handle(&Method::Post, "/api/edit-mode", r#"{"enabled":true}"#);
        let reply = host.handle(
            &Method::Post,
            "/api/pointer",
            r#"{"kind":"down","at":{"x":210,"y":210}}"#,
        );
        assert_eq!(body(&reply)["drag"], json!("dragging"));
        let reply = host.handle(
            &Method::Post,
            "/api/pointer",
            r#"{"kind":"move","at":{"x":230,"y":250}}"#,
        );
        assert_eq!(body(&reply)["changed"], json!(true));
        host.handle(&Method::Post, "/api/pointer", r#"{"kind":"up"}"#);

        let inspector = body(&host.handle(&Method::Get, "/api/inspector", ""));
        assert_eq!(inspector["x"], json!(220.0));
        assert_eq!(inspector["y"], json!(240.0));

        assert_eq!(slot.contents(), None);
        let saved = body(&host.handle(&Method::Post, "/api/save", ""));
        assert_eq!(saved["saved"], json!(1));
        assert!(saved["last_saved_ms"].is_u64());
        assert!(slot.contents().is_some());
    }

    #[test]
    fn surface_reflects_telemetry_and_edit_flag() {
        let (_, host) = host();
        host.handle(&Method::Post, "/api/widgets", r#"{"type":"level-chamber"}"#);
        host.handle(&Method::Post, "/api/telemetry", r#"{"chamber_level": 12}"#);
        let live = host.handle(&Method::Get, "/surface.svg", "");
        assert_eq!(live.content_type, "image/svg+xml");
        assert!(live.body.contains("12.0%"));
        assert!(!live.body.contains("hmi-grid"));
        let edit = host.handle(&Method::Get, "/surface.svg?edit=1", "");
        assert!(edit.body.contains("hmi-grid"));
    }

    #[test]
    fn kinds_lists_the_catalog() {
        let (_, host) = host();
        let kinds = body(&host.handle(&Method::Get, "/api/kinds", ""));
        let tags = kinds
            .as_array()
            .expect("array")
            .iter()
            .map(|kind| kind["type"].as_str().expect("tag").to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            tags,
            WidgetKind::ALL.map(|kind| kind.as_str().to_string()).to_vec()
        );
    }

    #[test]
    fn widget_ids_are_percent_decoded() {
        assert_eq!(widget_id("/api/widgets/a%20b"), Some("a b".to_string()));
        assert_eq!(widget_id("/api/widgets/a/b"), None);
        assert_eq!(widget_id("/api/layout"), None);
    }

    #[test]
    fn query_flags() {
        assert_eq!(query_flag("edit=1", "edit"), Some(true));
        assert_eq!(query_flag("a=2&edit=false", "edit"), Some(false));
        assert_eq!(query_flag("edit", "edit"), Some(true));
        assert_eq!(query_flag("", "edit"), None);
    }
}
