//! Browser binding for the editing engine.
//!
//! `Editor` wraps [`EngineCore`] for the JavaScript host that owns the
//! diagramming surface. Gestures go in as JSON (`CanvasEvent`), actions come
//! back as JSON arrays. The binding also owns the three browser concerns the
//! core stays free of: the drag-data channel, the export download, and the
//! training timer. The timer handle lives on the editor and is cleared when
//! the editor is dropped, so a pending completion never fires into a torn-down
//! editor.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::consts::{DRAG_CONFIG_FORMAT, DRAG_TYPE_FORMAT, EXPORT_NOTICE};
use crate::doc::{Edge, EdgeStyle, Node};
use crate::engine::{Action, EngineCore, ViewConfig};
use crate::export::{ExportError, export_file_name};
use crate::geom::Position;
use crate::input::CanvasEvent;
use crate::layer::LayerKind;
use crate::palette::{DragPayload, find_block};
use crate::properties::{LAYER_TYPE_OPTIONS, ModelSummary, PanelField};
use crate::render::accent_color;
use crate::selection::{Chrome, Selection};

/// Error raised by browser-facing calls.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("browser window is unavailable")]
    NoWindow,
    #[error("document body is unavailable")]
    NoBody,
    #[error("unknown connection style: {0}")]
    UnknownStyle(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::Js(format!("{value:?}"))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

type Listener = Rc<RefCell<Option<js_sys::Function>>>;

/// Pending `setTimeout` for a training run. Clearing on drop suppresses the
/// completion if the editor goes away first.
struct TrainingTimer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for TrainingTimer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}

/// Editor state handed to the JavaScript host.
#[wasm_bindgen]
pub struct Editor {
    core: Rc<RefCell<EngineCore>>,
    listener: Listener,
    training_timer: Option<TrainingTimer>,
}

#[wasm_bindgen]
impl Editor {
    /// Create an editor. `starter` preloads the three-layer starter graph.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(starter: bool) -> Editor {
        let core = if starter { EngineCore::starter(ViewConfig::default()) } else { EngineCore::new() };
        Self { core: Rc::new(RefCell::new(core)), listener: Rc::new(RefCell::new(None)), training_timer: None }
    }

    /// Register a callback receiving actions produced outside a direct call
    /// (training completion).
    pub fn set_listener(&mut self, listener: js_sys::Function) {
        *self.listener.borrow_mut() = Some(listener);
    }

    /// Apply a JSON-encoded `CanvasEvent`.
    ///
    /// # Errors
    ///
    /// Fails if the event JSON does not parse.
    pub fn handle_event(&mut self, event_json: &str) -> Result<String, JsValue> {
        let event: CanvasEvent = serde_json::from_str(event_json).map_err(WebError::from)?;
        let actions = self.core.borrow_mut().handle(event);
        to_json(&actions)
    }

    /// Palette click.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn add_block(&mut self, type_name: &str) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().add_kind(LayerKind::from(type_name));
        to_json(&actions)
    }

    /// Palette drag start: write the payload into the drag channel.
    ///
    /// # Errors
    ///
    /// Fails if the browser rejects the drag data.
    pub fn on_drag_start(&self, type_name: &str, data: &web_sys::DataTransfer) -> Result<(), JsValue> {
        let payload = match find_block(&LayerKind::from(type_name)) {
            Some(block) => block.drag_payload(),
            None => DragPayload { kind: type_name.to_owned(), config: None },
        };
        data.set_data(DRAG_TYPE_FORMAT, &payload.kind)?;
        data.set_data(DRAG_CONFIG_FORMAT, payload.config.as_deref().unwrap_or("{}"))?;
        data.set_effect_allowed("move");
        Ok(())
    }

    /// Canvas drop: read the drag channel and create the node at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn on_drop(&mut self, data: &web_sys::DataTransfer, x: f64, y: f64) -> Result<String, JsValue> {
        let kind = data.get_data(DRAG_TYPE_FORMAT).unwrap_or_default();
        let config = match data.get_data(DRAG_CONFIG_FORMAT) {
            Ok(raw) if !raw.is_empty() => Some(raw),
            _ => None,
        };
        let payload = DragPayload { kind, config };
        let actions = self.core.borrow_mut().drop_payload(&payload, Position::new(x, y));
        to_json(&actions)
    }

    /// Apply raw form input to the selected node.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn edit_selected(&mut self, field: &str, raw: &str) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().edit_selected(field, raw);
        to_json(&actions)
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn duplicate_selected(&mut self) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().duplicate_selected();
        to_json(&actions)
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn delete_selected_node(&mut self) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().delete_selected_node();
        to_json(&actions)
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn delete_selected_edge(&mut self) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().delete_selected_edge();
        to_json(&actions)
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn cancel_edge_selection(&mut self) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().cancel_edge_selection();
        to_json(&actions)
    }

    /// # Errors
    ///
    /// Fails only if the resulting actions cannot be serialized.
    pub fn toggle_properties_panel(&mut self) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().toggle_properties_panel();
        to_json(&actions)
    }

    /// # Errors
    ///
    /// Fails on an unknown style name.
    pub fn set_connection_style(&mut self, style: &str) -> Result<(), JsValue> {
        let style = EdgeStyle::parse(style).ok_or_else(|| WebError::UnknownStyle(style.to_owned()))?;
        self.core.borrow_mut().set_connection_style(style);
        Ok(())
    }

    /// Set the palette search query.
    pub fn search_palette(&mut self, query: &str) {
        self.core.borrow_mut().palette.set_query(query);
    }

    /// Expand or collapse a palette section.
    pub fn toggle_palette_section(&mut self, title: &str) {
        self.core.borrow_mut().palette.toggle_section(title);
    }

    /// Show or hide the palette sidebar.
    pub fn set_sidebar_open(&mut self, open: bool) {
        self.core.borrow_mut().set_sidebar_open(open);
    }

    /// Start a simulated training run and arm its completion timer.
    ///
    /// # Errors
    ///
    /// Fails if the timer cannot be scheduled; the run is rolled back.
    pub fn train(&mut self) -> Result<String, JsValue> {
        let actions = self.core.borrow_mut().begin_training();
        for action in &actions {
            if let Action::TrainingScheduled { delay_ms } = action {
                if let Err(e) = self.schedule_training(*delay_ms) {
                    self.core.borrow_mut().cancel_training();
                    return Err(e.into());
                }
            }
        }
        to_json(&actions)
    }

    /// Serialize the model and hand it to the browser as a file download.
    ///
    /// # Errors
    ///
    /// Fails if serialization or any browser call fails.
    pub fn export_model(&self) -> Result<String, JsValue> {
        let body = self.core.borrow().export_model().to_pretty_json().map_err(WebError::from)?;
        let date = String::from(js_sys::Date::new_0().to_iso_string());
        download_json(&export_file_name(&date), &body)?;
        to_json(&[Action::Notice { message: EXPORT_NOTICE.to_owned() }])
    }

    /// Everything the host needs to render the current frame.
    ///
    /// # Errors
    ///
    /// Fails only if the view cannot be serialized.
    pub fn view(&self) -> Result<String, JsValue> {
        let core = self.core.borrow();
        let palette: Vec<PaletteSectionView> = core
            .palette
            .visible_sections()
            .into_iter()
            .map(|visible| PaletteSectionView {
                title: visible.section.title,
                open: visible.open,
                items: visible.items.iter().map(|b| (b.kind.as_str().to_owned(), b.display_name)).collect(),
            })
            .collect();
        let fields = match core.selected_node() {
            Some(node) => core
                .panel_fields()
                .into_iter()
                .map(|field| FieldView {
                    field,
                    key: field.key(),
                    label: field.label(&node.data.kind),
                    value: field.value(node),
                    step: field.step(),
                })
                .collect(),
            None => Vec::new(),
        };
        let type_options = LAYER_TYPE_OPTIONS
            .iter()
            .map(|(kind, label)| TypeOptionView { value: kind.as_str(), label: *label, accent: accent_color(kind) })
            .collect();
        let view = EditorView {
            nodes: core.store.nodes(),
            edges: core.store.edges(),
            selection: core.selection(),
            selected_node: core.selected_node(),
            chrome: core.chrome(),
            fields,
            type_options,
            summary: core.model_summary(),
            training: core.is_training(),
            config: core.view,
            palette,
        };
        to_json(&view)
    }
}

impl Editor {
    fn schedule_training(&mut self, delay_ms: u32) -> Result<(), WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let core = Rc::clone(&self.core);
        let listener = Rc::clone(&self.listener);
        let callback = Closure::wrap(Box::new(move || {
            let actions = match core.try_borrow_mut() {
                Ok(mut core) => core.complete_training(),
                Err(e) => {
                    log::warn!("training completion skipped: {e}");
                    return;
                }
            };
            notify(&listener, &actions);
        }) as Box<dyn FnMut()>);
        let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handle =
            window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), timeout)?;
        self.training_timer = Some(TrainingTimer { handle, _callback: callback });
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaletteSectionView {
    title: &'static str,
    open: bool,
    items: Vec<(String, &'static str)>,
}

#[derive(Serialize)]
struct FieldView {
    field: PanelField,
    key: &'static str,
    label: &'static str,
    value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<f64>,
}

#[derive(Serialize)]
struct TypeOptionView {
    value: &'static str,
    label: &'static str,
    accent: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorView<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
    selection: &'a Selection,
    selected_node: Option<&'a Node>,
    chrome: Chrome,
    fields: Vec<FieldView>,
    type_options: Vec<TypeOptionView>,
    summary: Option<ModelSummary>,
    training: bool,
    config: ViewConfig,
    palette: Vec<PaletteSectionView>,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| WebError::from(e).into())
}

fn notify(listener: &RefCell<Option<js_sys::Function>>, actions: &[Action]) {
    let guard = listener.borrow();
    let Some(callback) = guard.as_ref() else {
        return;
    };
    match serde_json::to_string(actions) {
        Ok(json) => {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("action listener threw: {e:?}");
            }
        }
        Err(e) => log::warn!("failed to encode actions for listener: {e}"),
    }
}

fn download_json(file_name: &str, body: &str) -> Result<(), WebError> {
    let window = web_sys::window().ok_or(WebError::NoWindow)?;
    let document = window.document().ok_or(WebError::NoWindow)?;
    let html_body = document.body().ok_or(WebError::NoBody)?;

    let parts = js_sys::Array::of1(&JsValue::from_str(body));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| WebError::Js("created element is not an anchor".into()))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    html_body.append_child(&anchor)?;
    anchor.click();
    html_body.remove_child(&anchor)?;
    web_sys::Url::revoke_object_url(&url)?;
    Ok(())
}
