//! Application chrome webview
//!
//! Renders the tabs, toolbar, and panes around the sandbox surface. The
//! chrome is trusted UI: it runs host-authored markup only, and talks to
//! the update loop through its own event channel, separate from the
//! sandbox protocol.

use std::rc::Rc;
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use winit::window::Window;
use wry::{Rect as WryRect, WebView, WebViewBuilder};

use crate::messages::{AppMsg, EditorMsg, Msg, OutputMsg, PreviewMsg};
use crate::model::{
    ActiveTab, AppModel, Format, OutputId, Panel, RichTextCommand, ViewportPreset,
};
use crate::markdown::source_preview_html;

/// Height of the chrome top bar, in logical pixels
pub const TOP_BAR_HEIGHT: f64 = 48.0;

/// Events posted by the chrome UI (and the floating toolbar)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChromeEvent {
    SelectTab { tab: String },
    OpenSource,
    SourceEdited { content: String },
    ToggleSourcePreview,
    GenerateOutput { format: Format },
    CodeEdited { code: String },
    SelectOutput { id: u64 },
    DeleteOutput { id: u64 },
    Refresh,
    SetViewport { preset: ViewportPreset },
    Rotate,
    SetEditMode { enabled: bool },
    CopyCode,
    DownloadCode,
    ExportPdf,
    ExportImage,
    DismissNotice,
    TogglePanel { panel: String },
    SetInput { text: String },
    SubmitPanel,
    ExecCommand {
        command: String,
        #[serde(default)]
        value: Option<String>,
    },
    JumpToSource,
    CloseEditor,
    DragStart { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
}

/// Decode a raw chrome IPC string
///
/// Malformed traffic is logged and dropped, same policy as the sandbox
/// protocol.
pub fn decode_event(raw: &str) -> Option<ChromeEvent> {
    match serde_json::from_str(raw) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("Dropping malformed chrome event: {}", e);
            None
        }
    }
}

impl ChromeEvent {
    /// Translate a chrome event into an update-loop message
    pub fn into_msg(self) -> Option<Msg> {
        Some(match self {
            ChromeEvent::SelectTab { tab } => {
                let tab = match tab.as_str() {
                    "source" => ActiveTab::Source,
                    "code" => ActiveTab::Code,
                    "preview" => ActiveTab::Preview,
                    _ => return None,
                };
                Msg::Preview(PreviewMsg::TabChanged(tab))
            }
            ChromeEvent::OpenSource => Msg::App(AppMsg::OpenSource),
            ChromeEvent::SourceEdited { content } => Msg::App(AppMsg::SourceEdited { content }),
            ChromeEvent::ToggleSourcePreview => Msg::App(AppMsg::ToggleSourcePreview),
            ChromeEvent::GenerateOutput { format } => {
                Msg::Output(OutputMsg::GenerationRequested { format })
            }
            ChromeEvent::CodeEdited { code } => Msg::Output(OutputMsg::CodeEdited { code }),
            ChromeEvent::SelectOutput { id } => Msg::Output(OutputMsg::Select(OutputId(id))),
            ChromeEvent::DeleteOutput { id } => Msg::Output(OutputMsg::Delete(OutputId(id))),
            ChromeEvent::Refresh => Msg::Preview(PreviewMsg::Refresh),
            ChromeEvent::SetViewport { preset } => {
                Msg::Preview(PreviewMsg::SetViewportPreset(preset))
            }
            ChromeEvent::Rotate => Msg::Preview(PreviewMsg::Rotate),
            ChromeEvent::SetEditMode { enabled } => Msg::Preview(PreviewMsg::SetEditMode(enabled)),
            ChromeEvent::CopyCode => Msg::App(AppMsg::CopyCode),
            ChromeEvent::DownloadCode => Msg::App(AppMsg::DownloadCode),
            ChromeEvent::ExportPdf => Msg::App(AppMsg::ExportPdf),
            ChromeEvent::ExportImage => Msg::App(AppMsg::ExportImage),
            ChromeEvent::DismissNotice => Msg::App(AppMsg::DismissNotice),
            ChromeEvent::TogglePanel { panel } => {
                let panel = match panel.as_str() {
                    "ai" => Panel::Ai,
                    "style" => Panel::Style,
                    _ => return None,
                };
                Msg::Editor(EditorMsg::TogglePanel(panel))
            }
            ChromeEvent::SetInput { text } => Msg::Editor(EditorMsg::SetInput(text)),
            ChromeEvent::SubmitPanel => Msg::Editor(EditorMsg::SubmitPanel),
            ChromeEvent::ExecCommand { command, value } => {
                Msg::Editor(EditorMsg::Command(rich_text_command(&command, value)?))
            }
            ChromeEvent::JumpToSource => Msg::Editor(EditorMsg::JumpToSource),
            ChromeEvent::CloseEditor => Msg::Editor(EditorMsg::Close),
            ChromeEvent::DragStart { x, y } => Msg::Editor(EditorMsg::DragStart { x, y }),
            ChromeEvent::DragMove { x, y } => Msg::Editor(EditorMsg::DragMove { x, y }),
            ChromeEvent::DragEnd => Msg::Editor(EditorMsg::DragEnd),
        })
    }
}

fn rich_text_command(name: &str, value: Option<String>) -> Option<RichTextCommand> {
    Some(match name {
        "bold" => RichTextCommand::Bold,
        "italic" => RichTextCommand::Italic,
        "underline" => RichTextCommand::Underline,
        "justifyLeft" => RichTextCommand::JustifyLeft,
        "justifyCenter" => RichTextCommand::JustifyCenter,
        "justifyRight" => RichTextCommand::JustifyRight,
        "foreColor" => RichTextCommand::ForeColor(value?),
        _ => return None,
    })
}

// === State pushed into the chrome ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewportState {
    preset: ViewportPreset,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceState<'a> {
    name: &'a str,
    content: &'a str,
    show_preview: bool,
    preview_html: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionEntry {
    id: u64,
    label: &'static str,
    timestamp: u64,
    revision: u64,
    active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FormatEntry {
    value: Format,
    label: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChromeState<'a> {
    active_tab: &'static str,
    generating: bool,
    loading: bool,
    edit_mode: bool,
    notice: Option<&'a str>,
    viewport: ViewportState,
    source: SourceState<'a>,
    code: Option<&'a str>,
    code_label: Option<&'static str>,
    versions: Vec<VersionEntry>,
    formats: Vec<FormatEntry>,
    default_format: Format,
}

fn chrome_state(model: &AppModel) -> ChromeState<'_> {
    let active_tab = match model.active_tab {
        ActiveTab::Source => "source",
        ActiveTab::Code => "code",
        ActiveTab::Preview => "preview",
    };
    let active = model.outputs.active();
    let versions = model
        .outputs
        .formats()
        .into_iter()
        .flat_map(|f| model.outputs.by_format(f))
        .map(|o| VersionEntry {
            id: o.id.0,
            label: o.format.label(),
            timestamp: o.timestamp,
            revision: o.revision,
            active: Some(o.id) == model.outputs.active_id(),
        })
        .collect();
    let formats = [
        Format::StaticHtml,
        Format::PlainHtml,
        Format::ReactComponent,
        Format::VueSfc,
    ]
    .into_iter()
    .map(|f| FormatEntry {
        value: f,
        label: f.label(),
    })
    .collect();

    let preview_html = if model.source.show_preview {
        source_preview_html(&model.source)
    } else {
        None
    };

    ChromeState {
        active_tab,
        generating: model.generating,
        loading: model.preview.loading,
        edit_mode: model.preview.edit_mode,
        notice: model.notice.as_deref(),
        viewport: ViewportState {
            preset: model.preview.viewport.preset,
            width: model.preview.viewport.width,
            height: model.preview.viewport.height,
        },
        source: SourceState {
            name: &model.source.name,
            content: &model.source.content,
            show_preview: model.source.show_preview,
            preview_html,
        },
        code: active.map(|o| o.code.as_str()),
        code_label: active.map(|o| o.format.label()),
        versions,
        formats,
        default_format: model.config.default_format,
    }
}

/// The chrome webview itself
pub struct ChromeView {
    webview: WebView,
}

impl ChromeView {
    pub fn new(window: &Rc<Window>, msg_tx: Sender<Msg>) -> Result<Self, wry::Error> {
        let webview = WebViewBuilder::new()
            .with_html(CHROME_HTML)
            .with_ipc_handler(move |request| {
                if let Some(msg) = decode_event(request.body()).and_then(ChromeEvent::into_msg) {
                    let _ = msg_tx.send(msg);
                }
            })
            .build(window)?;
        Ok(Self { webview })
    }

    /// Push the current model state into the chrome UI
    pub fn render(&self, model: &AppModel) {
        let state = chrome_state(model);
        match serde_json::to_string(&state) {
            Ok(json) => {
                let script = format!(
                    "if (window.__chromeRender) window.__chromeRender({});",
                    json
                );
                if let Err(e) = self.webview.evaluate_script(&script) {
                    tracing::warn!("Failed to render chrome: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize chrome state: {}", e),
        }
    }

    pub fn set_bounds(&self, rect: WryRect) {
        let _ = self.webview.set_bounds(rect);
    }
}

const CHROME_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  * { box-sizing: border-box; margin: 0; }
  body { font-family: -apple-system, "Segoe UI", sans-serif; font-size: 13px;
         background: #1e1e2e; color: #cdd6f4; height: 100vh; overflow: hidden; }
  #topbar { height: 48px; display: flex; align-items: center; gap: 8px;
            padding: 0 12px; background: #181825; border-bottom: 1px solid #313244; }
  button, select { background: #313244; color: #cdd6f4; border: 1px solid #45475a;
                   border-radius: 4px; padding: 4px 10px; cursor: pointer; font-size: 12px; }
  button:hover { background: #45475a; }
  button.active { background: #89b4fa; color: #1e1e2e; }
  button:disabled { opacity: 0.4; cursor: default; }
  .spacer { flex: 1; }
  #status { color: #a6adc8; font-size: 12px; }
  #notice { position: fixed; top: 56px; left: 50%; transform: translateX(-50%);
            background: #f38ba8; color: #1e1e2e; padding: 8px 14px; border-radius: 6px;
            display: none; z-index: 30; cursor: pointer; }
  .pane { position: absolute; top: 48px; bottom: 0; left: 0; right: 0; display: none; }
  .pane.visible { display: flex; }
  textarea { flex: 1; background: #11111b; color: #cdd6f4; border: none; outline: none;
             padding: 12px; font-family: "SF Mono", Menlo, Consolas, monospace;
             font-size: 13px; resize: none; }
  #source-preview { flex: 1; border: none; background: #fff; display: none; }
  #pane-preview { align-items: center; justify-content: center; color: #6c7086; }
</style>
</head>
<body>
  <div id="topbar">
    <button data-tab="source">Source</button>
    <button data-tab="code">Code</button>
    <button data-tab="preview">Preview</button>
    <select id="generate-format"></select>
    <button id="generate">Generate</button>
    <select id="versions"></select>
    <button id="delete-version" title="Delete version">&#x2715;</button>
    <span class="spacer"></span>
    <span id="status"></span>
    <select id="viewport"></select>
    <button id="rotate" title="Rotate viewport">&#x21bb;</button>
    <button id="refresh" title="Refresh preview">&#x27f3;</button>
    <button id="edit-mode">Edit</button>
    <button id="copy">Copy</button>
    <button id="download">Save</button>
    <button id="export-pdf">PDF</button>
    <button id="export-image">Image</button>
    <button id="open-source">Open&#8230;</button>
  </div>
  <div id="notice"></div>
  <div id="pane-source" class="pane">
    <textarea id="source-text" placeholder="Load or paste a source document"></textarea>
    <iframe id="source-preview"></iframe>
  </div>
  <div id="pane-code" class="pane">
    <textarea id="code-text" spellcheck="false"></textarea>
  </div>
  <div id="pane-preview" class="pane"><span>No output yet</span></div>
<script>
(function () {
  var post = function (obj) { window.ipc.postMessage(JSON.stringify(obj)); };
  var el = function (id) { return document.getElementById(id); };

  var PRESETS = [
    ['responsive', 'Responsive'], ['mobile', 'Mobile'], ['tablet', 'Tablet'],
    ['desktop', 'Desktop'], ['a4', 'A4'], ['letter', 'Letter'], ['custom', 'Custom']
  ];
  PRESETS.forEach(function (p) {
    var o = document.createElement('option');
    o.value = p[0]; o.textContent = p[1];
    el('viewport').appendChild(o);
  });

  document.querySelectorAll('#topbar [data-tab]').forEach(function (b) {
    b.addEventListener('click', function () { post({ type: 'SELECT_TAB', tab: b.dataset.tab }); });
  });
  el('generate').addEventListener('click', function () {
    post({ type: 'GENERATE_OUTPUT', format: el('generate-format').value });
  });
  el('versions').addEventListener('change', function () {
    post({ type: 'SELECT_OUTPUT', id: parseInt(el('versions').value, 10) });
  });
  el('delete-version').addEventListener('click', function () {
    var v = el('versions').value;
    if (v !== '') post({ type: 'DELETE_OUTPUT', id: parseInt(v, 10) });
  });
  el('viewport').addEventListener('change', function () {
    post({ type: 'SET_VIEWPORT', preset: el('viewport').value });
  });
  el('rotate').addEventListener('click', function () { post({ type: 'ROTATE' }); });
  el('refresh').addEventListener('click', function () { post({ type: 'REFRESH' }); });
  el('edit-mode').addEventListener('click', function () {
    post({ type: 'SET_EDIT_MODE', enabled: !state.editMode });
  });
  el('copy').addEventListener('click', function () { post({ type: 'COPY_CODE' }); });
  el('download').addEventListener('click', function () { post({ type: 'DOWNLOAD_CODE' }); });
  el('export-pdf').addEventListener('click', function () { post({ type: 'EXPORT_PDF' }); });
  el('export-image').addEventListener('click', function () { post({ type: 'EXPORT_IMAGE' }); });
  el('open-source').addEventListener('click', function () { post({ type: 'OPEN_SOURCE' }); });
  el('notice').addEventListener('click', function () { post({ type: 'DISMISS_NOTICE' }); });

  var debounce = function (fn, ms) {
    var t = null;
    return function () {
      var args = arguments;
      clearTimeout(t);
      t = setTimeout(function () { fn.apply(null, args); }, ms);
    };
  };
  el('source-text').addEventListener('input', debounce(function () {
    post({ type: 'SOURCE_EDITED', content: el('source-text').value });
  }, 300));
  el('code-text').addEventListener('input', debounce(function () {
    post({ type: 'CODE_EDITED', code: el('code-text').value });
  }, 300));

  var state = { editMode: false };
  window.__chromeRender = function (s) {
    state = s;
    document.querySelectorAll('#topbar [data-tab]').forEach(function (b) {
      b.classList.toggle('active', b.dataset.tab === s.activeTab);
    });
    ['source', 'code', 'preview'].forEach(function (t) {
      el('pane-' + t).classList.toggle('visible', t === s.activeTab);
    });

    var gen = el('generate-format');
    if (gen.options.length === 0) {
      s.formats.forEach(function (f) {
        var o = document.createElement('option');
        o.value = f.value; o.textContent = f.label;
        gen.appendChild(o);
      });
      gen.value = s.defaultFormat;
    }
    el('generate').disabled = s.generating;

    var versions = el('versions');
    versions.innerHTML = '';
    s.versions.forEach(function (v) {
      var o = document.createElement('option');
      o.value = v.id;
      o.textContent = v.label + ' r' + v.revision + ' · ' +
        new Date(v.timestamp).toLocaleTimeString();
      o.selected = v.active;
      versions.appendChild(o);
    });
    el('delete-version').disabled = s.versions.length <= 1;

    el('viewport').value = s.viewport.preset;
    el('edit-mode').classList.toggle('active', s.editMode);
    el('status').textContent = s.generating ? 'Generating…'
      : (s.loading ? 'Loading…' : '');

    var notice = el('notice');
    notice.style.display = s.notice ? 'block' : 'none';
    notice.textContent = s.notice || '';

    var src = el('source-text');
    if (document.activeElement !== src) src.value = s.source.content;
    var preview = el('source-preview');
    if (s.source.showPreview && s.source.previewHtml) {
      preview.style.display = 'block';
      if (preview.srcdoc !== s.source.previewHtml) preview.srcdoc = s.source.previewHtml;
    } else {
      preview.style.display = 'none';
    }

    var code = el('code-text');
    if (document.activeElement !== code) code.value = s.code || '';
  };
})();
</script>
</body>
</html>
"##;
