//! Runtime bridge injected into every synthesized document
//!
//! The bridge is a self-contained script that runs inside the sandbox after
//! the document loads. It owns the hover/selection overlay, contenteditable
//! handover, command execution, and the outbound half of the message
//! protocol. All of its state lives in one bridge instance created per
//! document load, with an explicit teardown, so a replacement document can
//! never collide with a stale instance.
//!
//! Everything the bridge adds to the document is tagged (`data-mw-*`
//! attributes, the overlay id) so [`strip_bridge`] can remove it from the
//! serialized markup the sandbox reports back. Canonical code must never
//! accrete injected markup across edit cycles.

use std::sync::OnceLock;

use regex::Regex;

/// Id of the single overlay element mirroring the hovered/selected rect
pub const OVERLAY_ID: &str = "mw-editor-overlay";

/// Placeholder substituted with the configured debounce window
const DEBOUNCE_TOKEN: &str = "__MW_DEBOUNCE_MS__";

const BRIDGE_JS: &str = r#"
(function () {
  if (window.__mw && typeof window.__mw.teardown === 'function') {
    window.__mw.teardown();
  }
  var OVERLAY_ID = 'mw-editor-overlay';
  var DEBOUNCE_MS = __MW_DEBOUNCE_MS__;

  function post(msg) {
    try { window.ipc.postMessage(JSON.stringify(msg)); } catch (e) { }
  }

  function createBridge() {
    var state = {
      hovered: null,
      selected: null,
      editMode: false,
      readySent: false,
      debounceTimer: null,
      listeners: []
    };

    var style = document.createElement('style');
    style.setAttribute('data-mw-bridge', '');
    style.innerHTML = '#' + OVERLAY_ID + ' {' +
      ' position: fixed; border: 2px solid #3b82f6; background: transparent;' +
      ' pointer-events: none; z-index: 9999; transition: all 0.1s ease;' +
      ' display: none; border-radius: 4px;' +
      ' box-shadow: 0 0 0 1px rgba(59, 130, 246, 0.5); }' +
      ' [contenteditable="true"] { outline: none; }' +
      ' @media print { #' + OVERLAY_ID + ' { display: none !important; } }';
    document.head.appendChild(style);

    var overlay = document.createElement('div');
    overlay.id = OVERLAY_ID;
    document.body.appendChild(overlay);

    function updateOverlay(el) {
      if (!el || !state.editMode) return;
      var rect = el.getBoundingClientRect();
      overlay.style.display = 'block';
      overlay.style.top = rect.top + 'px';
      overlay.style.left = rect.left + 'px';
      overlay.style.width = rect.width + 'px';
      overlay.style.height = rect.height + 'px';
    }

    function scrollTop() {
      return window.pageYOffset || document.documentElement.scrollTop;
    }

    function sendUpdate() {
      clearTimeout(state.debounceTimer);
      state.debounceTimer = setTimeout(function () {
        post({
          type: 'CONTENT_UPDATED',
          html: document.documentElement.outerHTML,
          scrollTop: scrollTop()
        });
      }, DEBOUNCE_MS);
    }

    function disableEditing(el) {
      if (el) el.contentEditable = 'false';
    }

    function clearSelection() {
      if (state.selected) disableEditing(state.selected);
      state.selected = null;
    }

    function dispatch(msg) {
      if (!msg || typeof msg.type !== 'string') return;

      if (msg.type === 'TOGGLE_EDIT_MODE') {
        state.editMode = !!msg.enabled;
        if (!state.editMode) {
          overlay.style.display = 'none';
          clearSelection();
        }
      } else if (msg.type === 'HIDE_OVERLAY') {
        overlay.style.display = 'none';
        clearSelection();
      } else if (msg.type === 'EXEC_COMMAND') {
        if (!state.selected) return;
        if (document.activeElement !== state.selected) state.selected.focus();
        document.execCommand(msg.command, false, msg.value || null);
        sendUpdate();
      } else if (msg.type === 'UPDATE_ELEMENT') {
        if (!state.selected) return;
        if (msg.html) {
          state.selected.outerHTML = msg.html;
          state.selected = null;
          overlay.style.display = 'none';
          sendUpdate();
        } else if (typeof msg.className === 'string') {
          state.selected.setAttribute('class', msg.className);
          updateOverlay(state.selected);
          sendUpdate();
        }
      }
    }

    function on(target, type, handler, capture) {
      target.addEventListener(type, handler, capture);
      state.listeners.push([target, type, handler, capture]);
    }

    on(document, 'mouseover', function (e) {
      if (!state.editMode) return;
      if (state.selected) return;
      if (e.target.id === OVERLAY_ID) return;
      state.hovered = e.target;
      updateOverlay(state.hovered);
    }, false);

    // Capture phase so the overlay tracks whichever inner element scrolls
    on(window, 'scroll', function () {
      if (!state.editMode) return;
      if (state.selected) updateOverlay(state.selected);
      else if (state.hovered) updateOverlay(state.hovered);
    }, true);

    on(document, 'click', function (e) {
      if (!state.editMode) return;
      if (state.selected && state.selected.contains(e.target)) return;
      e.preventDefault();
      e.stopPropagation();
      if (state.selected && state.selected !== e.target) disableEditing(state.selected);
      state.selected = e.target;
      updateOverlay(state.selected);
      state.selected.contentEditable = 'true';
      state.selected.focus();
      var rect = state.selected.getBoundingClientRect();
      post({
        type: 'ELEMENT_SELECTED',
        payload: {
          tagName: state.selected.tagName,
          className: state.selected.getAttribute('class') || '',
          outerHTML: state.selected.outerHTML,
          innerText: state.selected.innerText,
          rect: { top: rect.top, left: rect.left, width: rect.width, height: rect.height }
        }
      });
    }, true);

    on(document, 'input', function (e) {
      if (state.selected && state.selected.contains(e.target)) {
        updateOverlay(state.selected);
        sendUpdate();
      }
    }, false);

    return {
      dispatch: dispatch,
      ready: function () {
        if (state.readySent) return;
        state.readySent = true;
        post({ type: 'PREVIEW_READY' });
      },
      teardown: function () {
        clearTimeout(state.debounceTimer);
        state.listeners.forEach(function (l) {
          l[0].removeEventListener(l[1], l[2], l[3]);
        });
        clearSelection();
        if (overlay.parentNode) overlay.parentNode.removeChild(overlay);
        if (style.parentNode) style.parentNode.removeChild(style);
        delete window.__mw;
      }
    };
  }

  window.__mw = createBridge();
})();
"#;

/// The bridge script block, with the configured debounce window baked in
pub fn bridge_script(debounce_ms: u64) -> String {
    format!(
        "<script data-mw-bridge>{}</script>",
        BRIDGE_JS.replace(DEBOUNCE_TOKEN, &debounce_ms.to_string())
    )
}

/// Script block emitting the ready signal through the bridge's once-latch
///
/// Falls back to a direct post if the bridge itself failed to initialize,
/// so the host loading state always resolves.
pub fn ready_signal_script() -> &'static str {
    concat!(
        "<script data-mw-ready>",
        "if (window.__mw) { window.__mw.ready(); } ",
        "else { try { window.ipc.postMessage(JSON.stringify({ type: 'PREVIEW_READY' })); } catch (e) { } }",
        "</script>"
    )
}

/// Script block restoring a previously recorded scroll offset after load
pub fn scroll_restore_script(scroll_top: f64) -> String {
    format!(
        "<script data-mw-scroll>setTimeout(function () {{ window.scrollTo(0, {}); }}, 10);</script>",
        scroll_top
    )
}

/// JS expression dispatching one encoded outbound message into the bridge
///
/// Evaluated in the sandbox by the host; a missing bridge (document still
/// loading, or a diagnostic document) makes it a no-op.
pub fn dispatch_call(encoded_message: &str) -> String {
    format!(
        "if (window.__mw) window.__mw.dispatch({});",
        encoded_message
    )
}

/// Script rasterizing the document and posting the result as a data URL
///
/// Loads html2canvas from CDN on first use. The overlay is hidden for the
/// duration of the capture. Failures post an empty data URL so the host
/// never waits forever.
pub fn capture_image_script() -> &'static str {
    concat!(
        "(function () {",
        "  var overlay = document.getElementById('mw-editor-overlay');",
        "  var done = function (url) {",
        "    if (overlay) overlay.style.display = '';",
        "    try { window.ipc.postMessage(JSON.stringify({ type: 'IMAGE_CAPTURED', dataUrl: url })); } catch (e) { }",
        "  };",
        "  var run = function () {",
        "    html2canvas(document.body).then(function (canvas) {",
        "      done(canvas.toDataURL('image/png'));",
        "    }).catch(function () { done(''); });",
        "  };",
        "  if (overlay) overlay.style.display = 'none';",
        "  if (window.html2canvas) { run(); return; }",
        "  var s = document.createElement('script');",
        "  s.src = 'https://cdnjs.cloudflare.com/ajax/libs/html2canvas/1.4.1/html2canvas.min.js';",
        "  s.onload = run;",
        "  s.onerror = function () { done(''); };",
        "  document.head.appendChild(s);",
        "})();"
    )
}

fn strip_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r#"(?s)<script data-mw-[a-z]+(?:="")?>.*?</script>"#).unwrap(),
            Regex::new(r#"(?s)<style data-mw-[a-z]+(?:="")?>.*?</style>"#).unwrap(),
            Regex::new(r#"<div id="mw-editor-overlay"[^>]*></div>"#).unwrap(),
        ]
    })
}

/// Remove every trace of the bridge from sandbox-reported markup
///
/// Applied before serialized HTML becomes the new canonical code, so the
/// next synthesis cycle injects a fresh bridge instead of stacking a second
/// one on top of a serialized copy.
pub fn strip_bridge(html: &str) -> String {
    let mut out = html.to_string();
    for pattern in strip_patterns() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_script_bakes_in_debounce() {
        let script = bridge_script(250);
        assert!(script.contains("DEBOUNCE_MS = 250"));
        assert!(!script.contains(DEBOUNCE_TOKEN));
    }

    #[test]
    fn test_strip_bridge_removes_injected_markup() {
        let doc = format!(
            r#"<html><head><style data-mw-bridge="">#x {{}}</style></head><body><h1>Hi</h1>{}{}<div id="mw-editor-overlay" style="display: none;"></div></body></html>"#,
            bridge_script(300),
            ready_signal_script(),
        );
        let stripped = strip_bridge(&doc);
        assert!(stripped.contains("<h1>Hi</h1>"));
        assert!(!stripped.contains("data-mw"));
        assert!(!stripped.contains(OVERLAY_ID));
    }

    #[test]
    fn test_strip_bridge_is_idempotent() {
        let doc = format!("<body>content{}</body>", bridge_script(300));
        let once = strip_bridge(&doc);
        assert_eq!(once, strip_bridge(&once));
        assert_eq!(once, "<body>content</body>");
    }
}
