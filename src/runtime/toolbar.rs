//! Floating editor toolbar webview
//!
//! The toolbar floats over the sandbox surface, so it cannot live in the
//! chrome webview (child views always paint above their parent). It is a
//! small child webview of its own, created after the sandbox surface so it
//! stacks on top, moved around by the host from the model's editor state.

use std::rc::Rc;
use std::sync::mpsc::Sender;

use serde::Serialize;
use winit::window::Window;
use wry::{Rect as WryRect, WebView, WebViewBuilder};

use super::chrome::{decode_event, ChromeEvent};
use crate::messages::Msg;
use crate::model::{AppModel, Panel};

/// Toolbar size in logical pixels; height grows when a panel is open
pub const TOOLBAR_WIDTH: f64 = 450.0;
pub const TOOLBAR_HEIGHT: f64 = 44.0;
pub const PANEL_HEIGHT: f64 = 48.0;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolbarState<'a> {
    tag_name: &'a str,
    panel: Option<&'static str>,
    input: &'a str,
    ai_busy: bool,
}

pub struct ToolbarView {
    webview: WebView,
}

impl ToolbarView {
    pub fn new(window: &Rc<Window>, msg_tx: Sender<Msg>) -> Result<Self, wry::Error> {
        let webview = WebViewBuilder::new()
            .with_html(TOOLBAR_HTML)
            .with_transparent(true)
            .with_bounds(WryRect {
                position: wry::dpi::LogicalPosition::new(0.0, 0.0).into(),
                size: wry::dpi::LogicalSize::new(TOOLBAR_WIDTH, TOOLBAR_HEIGHT).into(),
            })
            .with_ipc_handler(move |request| {
                if let Some(msg) = decode_event(request.body()).and_then(ChromeEvent::into_msg) {
                    let _ = msg_tx.send(msg);
                }
            })
            .build_as_child(window)?;
        let _ = webview.set_visible(false);
        Ok(Self { webview })
    }

    pub fn hide(&self) {
        let _ = self.webview.set_visible(false);
    }

    /// Sync visibility, position, and panel state from the model
    ///
    /// `origin` is the sandbox surface's top-left corner in logical pixels;
    /// the editor position is in sandbox viewport coordinates.
    pub fn render(&self, model: &AppModel, origin: (f64, f64)) {
        let Some(selected) = model.editor.selected() else {
            let _ = self.webview.set_visible(false);
            return;
        };

        let panel = model.editor.active_panel.map(|p| match p {
            Panel::Ai => "ai",
            Panel::Style => "style",
        });
        let state = ToolbarState {
            tag_name: &selected.tag_name,
            panel,
            input: &model.editor.input,
            ai_busy: model.editor.ai_busy,
        };
        match serde_json::to_string(&state) {
            Ok(json) => {
                let script = format!(
                    "if (window.__toolbarRender) window.__toolbarRender({});",
                    json
                );
                let _ = self.webview.evaluate_script(&script);
            }
            Err(e) => {
                tracing::error!("Failed to serialize toolbar state: {}", e);
                return;
            }
        }

        let position = model.editor.position.clamped(model.window_size.0 as f64);
        let height = if panel.is_some() {
            TOOLBAR_HEIGHT + PANEL_HEIGHT
        } else {
            TOOLBAR_HEIGHT
        };
        let _ = self.webview.set_bounds(WryRect {
            position: wry::dpi::LogicalPosition::new(
                origin.0 + position.left,
                origin.1 + position.top,
            )
            .into(),
            size: wry::dpi::LogicalSize::new(TOOLBAR_WIDTH, height).into(),
        });
        let _ = self.webview.set_visible(true);
    }
}

const TOOLBAR_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  * { box-sizing: border-box; margin: 0; }
  body { font-family: -apple-system, "Segoe UI", sans-serif; background: transparent;
         overflow: hidden; user-select: none; }
  #bar { display: flex; align-items: center; gap: 4px; height: 40px; padding: 0 6px;
         background: #181825; border: 1px solid #45475a; border-radius: 8px;
         box-shadow: 0 4px 12px rgba(0,0,0,0.4); }
  #tag { color: #89b4fa; font-size: 11px; font-family: Menlo, monospace; padding: 0 4px;
         cursor: grab; }
  button { background: #313244; color: #cdd6f4; border: 1px solid #45475a;
           border-radius: 4px; min-width: 28px; height: 28px; cursor: pointer; font-size: 12px; }
  button:hover { background: #45475a; }
  button.active { background: #89b4fa; color: #1e1e2e; }
  input[type=color] { width: 28px; height: 28px; border: none; background: none;
                      padding: 0; cursor: pointer; }
  #panel { display: none; margin-top: 4px; gap: 4px; }
  #panel.open { display: flex; }
  #panel input[type=text] { flex: 1; background: #11111b; color: #cdd6f4;
                            border: 1px solid #45475a; border-radius: 4px; padding: 6px; }
</style>
</head>
<body>
  <div id="bar">
    <span id="tag">div</span>
    <button data-cmd="bold"><b>B</b></button>
    <button data-cmd="italic"><i>I</i></button>
    <button data-cmd="underline"><u>U</u></button>
    <button data-cmd="justifyLeft">&#x2190;</button>
    <button data-cmd="justifyCenter">&#x2194;</button>
    <button data-cmd="justifyRight">&#x2192;</button>
    <input type="color" id="color" value="#cdd6f4" title="Text color">
    <button id="panel-ai" title="Rewrite with AI">AI</button>
    <button id="panel-style" title="Edit classes">{}</button>
    <button id="jump" title="Jump to code">&lt;/&gt;</button>
    <button id="close" title="Deselect">&#x2715;</button>
  </div>
  <div id="panel">
    <input type="text" id="panel-input">
    <button id="panel-submit">&#x21a9;</button>
  </div>
<script>
(function () {
  var post = function (obj) { window.ipc.postMessage(JSON.stringify(obj)); };
  var el = function (id) { return document.getElementById(id); };

  document.querySelectorAll('[data-cmd]').forEach(function (b) {
    b.addEventListener('click', function () {
      post({ type: 'EXEC_COMMAND', command: b.dataset.cmd });
    });
  });
  el('color').addEventListener('change', function () {
    post({ type: 'EXEC_COMMAND', command: 'foreColor', value: el('color').value });
  });
  el('panel-ai').addEventListener('click', function () {
    post({ type: 'TOGGLE_PANEL', panel: 'ai' });
  });
  el('panel-style').addEventListener('click', function () {
    post({ type: 'TOGGLE_PANEL', panel: 'style' });
  });
  el('jump').addEventListener('click', function () { post({ type: 'JUMP_TO_SOURCE' }); });
  el('close').addEventListener('click', function () { post({ type: 'CLOSE_EDITOR' }); });

  el('panel-input').addEventListener('input', function () {
    post({ type: 'SET_INPUT', text: el('panel-input').value });
  });
  el('panel-input').addEventListener('keydown', function (e) {
    if (e.key === 'Enter') post({ type: 'SUBMIT_PANEL' });
  });
  el('panel-submit').addEventListener('click', function () { post({ type: 'SUBMIT_PANEL' }); });

  // Drag by the tag label. Screen coordinates stay stable while the host
  // moves this view, unlike client coordinates.
  var dragging = false;
  el('tag').addEventListener('mousedown', function (e) {
    dragging = true;
    post({ type: 'DRAG_START', x: e.screenX, y: e.screenY });
  });
  window.addEventListener('mousemove', function (e) {
    if (dragging) post({ type: 'DRAG_MOVE', x: e.screenX, y: e.screenY });
  });
  window.addEventListener('mouseup', function () {
    if (dragging) { dragging = false; post({ type: 'DRAG_END' }); }
  });

  window.__toolbarRender = function (s) {
    el('tag').textContent = s.tagName.toLowerCase();
    el('panel-ai').classList.toggle('active', s.panel === 'ai');
    el('panel-style').classList.toggle('active', s.panel === 'style');
    el('panel-ai').disabled = s.aiBusy;
    var panel = el('panel');
    panel.classList.toggle('open', !!s.panel);
    var input = el('panel-input');
    input.placeholder = s.panel === 'ai' ? 'Describe the change' : 'Class names';
    if (document.activeElement !== input) input.value = s.input;
    el('panel-submit').disabled = s.aiBusy;
  };
})();
</script>
</body>
</html>
"##;
