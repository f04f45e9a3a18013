//! Document synthesis: format-specific shells around prepared fragments
//!
//! `synthesize` always returns a complete standalone document, whatever the
//! input. Adapter failures compile into a diagnostic document instead of an
//! error, and every emitted document carries exactly one ready-signal
//! emission path, so the host's loading indicator is never left spinning.

use super::adapters::{self, AdapterError, PreparedFragment};
use super::bridge;
use crate::model::output::Format;

/// Knobs the synthesizer bakes into the emitted document
#[derive(Debug, Clone, Copy)]
pub struct SynthesisOptions {
    /// Debounce window for the bridge's content reports (milliseconds)
    pub debounce_ms: u64,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

/// Print stylesheet injected into every synthesized document
///
/// Tagged so [`bridge::strip_bridge`] removes it from reported markup.
const PRINT_STYLES: &str = "<style data-mw-print>\
@media print { \
body { -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; } \
#mw-editor-overlay { display: none !important; } \
::-webkit-scrollbar { display: none; } \
}\
</style>";

/// Compile `(code, format)` into a complete executable document
///
/// Exhaustive over the closed format set; an adapter failure yields a
/// diagnostic document rather than surfacing an error to the host.
pub fn synthesize(code: &str, format: Format, opts: &SynthesisOptions) -> String {
    match adapters::prepare(code, format) {
        Ok(PreparedFragment::Html { code }) => html_document(&code, opts),
        Ok(PreparedFragment::React { code, component }) => {
            react_document(&code, &component, opts)
        }
        Ok(PreparedFragment::Vue { code }) => vue_document(&code, opts),
        Err(error) => {
            tracing::warn!("Synthesis failed, emitting diagnostic document: {}", error);
            diagnostic_document(&error)
        }
    }
}

/// HTML passthrough: the user's document with the print stylesheet slotted
/// into the head and the bridge plus ready signal slotted into the body.
/// Nothing else is altered.
fn html_document(code: &str, opts: &SynthesisOptions) -> String {
    let injected_scripts = format!(
        "{}{}",
        bridge::bridge_script(opts.debounce_ms),
        bridge::ready_signal_script()
    );

    let mut doc = if code.contains("</head>") {
        code.replacen("</head>", &format!("{}</head>", PRINT_STYLES), 1)
    } else {
        format!("{}{}", PRINT_STYLES, code)
    };

    if doc.contains("</body>") {
        doc = doc.replacen("</body>", &format!("{}</body>", injected_scripts), 1);
    } else {
        doc.push_str(&injected_scripts);
    }
    doc
}

const REACT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>React Preview</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://unpkg.com/react@18/umd/react.development.js" crossorigin></script>
    <script src="https://unpkg.com/react-dom@18/umd/react-dom.development.js" crossorigin></script>
    <script src="https://unpkg.com/@babel/standalone/babel.min.js" crossorigin></script>
    <script src="https://unpkg.com/lucide@0.294.0" crossorigin></script>
    <style>body { margin: 0; padding: 0; } .mw-error-overlay { position: fixed; top: 0; left: 0; width: 100%; padding: 20px; background: #fee2e2; color: #991b1b; z-index: 10000; font-family: monospace; border-bottom: 2px solid #7f1d1d; }</style>
    __MW_PRINT__
</head>
<body>
    <div id="root"></div>
    <div id="error-container"></div>
    __MW_BRIDGE__
    <script>
      window.onerror = function (message, source, lineno) {
        var container = document.getElementById('error-container');
        if (container) {
          container.innerHTML = '<div class="mw-error-overlay"><h3>Runtime Error</h3><p>' + message + '</p><small>' + source + ':' + lineno + '</small></div>';
        }
        if (window.__mw) window.__mw.ready();
      };
      window.lucideReact = {};
      if (window.lucide && window.lucide.icons) {
        Object.keys(window.lucide.icons).forEach(function (key) {
          window.lucideReact[key] = function (props) {
            props = props || {};
            var color = props.color || 'currentColor';
            var size = props.size || 24;
            var strokeWidth = props.strokeWidth || 2;
            var iconNode = window.lucide.icons[key];
            if (!iconNode) return null;
            var baseAttrs = iconNode[1];
            var childrenNodes = iconNode[2] || [];
            var createEl = function (node, index) {
              var childChildren = node[2] ? node[2].map(createEl) : null;
              return React.createElement(node[0], Object.assign({}, node[1], { key: index }), childChildren);
            };
            var children = childrenNodes.map(createEl);
            return React.createElement('svg', Object.assign({}, baseAttrs, {
              width: size, height: size, stroke: color, strokeWidth: strokeWidth,
              className: 'lucide lucide-' + key + (props.className ? ' ' + props.className : '')
            }), children);
          };
        });
      }
    </script>
    <script type="text/babel" data-presets="react,typescript">
      try {
        const { useState, useEffect, useRef, useCallback, useMemo, useReducer, useContext, createContext } = React;
        __MW_CODE__

        let RenderComponent;
        if (typeof __MW_COMPONENT__ !== 'undefined') RenderComponent = __MW_COMPONENT__;
        if (!RenderComponent && typeof App !== 'undefined') RenderComponent = App;
        if (!RenderComponent) {
          if (typeof Page !== 'undefined') RenderComponent = Page;
          else if (typeof Component !== 'undefined') RenderComponent = Component;
          else if (typeof Main !== 'undefined') RenderComponent = Main;
        }
        if (!RenderComponent) throw new Error('Could not find a component to render. Ensure you export default a component.');
        const root = ReactDOM.createRoot(document.getElementById('root'));
        root.render(<RenderComponent />);
        if (window.__mw) window.__mw.ready();
      } catch (e) {
        document.getElementById('error-container').innerHTML = '<div class="mw-error-overlay"><h3>Render Error</h3><p>' + e.message + '</p></div>';
        if (window.__mw) window.__mw.ready();
      }
    </script>
</body>
</html>"#;

/// React shell: CDN runtime + in-browser transpiler + icon shim, mounting
/// the resolved component with an error shell around the whole attempt
fn react_document(code: &str, component: &str, opts: &SynthesisOptions) -> String {
    REACT_SHELL
        .replace("__MW_PRINT__", PRINT_STYLES)
        .replace("__MW_BRIDGE__", &bridge::bridge_script(opts.debounce_ms))
        .replace("__MW_COMPONENT__", component)
        .replace("__MW_CODE__", code)
}

const VUE_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Vue Preview</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://unpkg.com/vue@3/dist/vue.global.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/vue3-sfc-loader/dist/vue3-sfc-loader.js"></script>
    <style>body { margin: 0; padding: 0; } .mw-error-overlay { position: fixed; top: 0; left: 0; width: 100%; padding: 20px; background: #fee2e2; color: #991b1b; z-index: 10000; font-family: monospace; border-bottom: 2px solid #7f1d1d; }</style>
    __MW_PRINT__
</head>
<body>
    <div id="app"></div>
    <div id="error-container"></div>
    __MW_BRIDGE__
    <script>
        function mwShowError(title, message) {
            var container = document.getElementById('error-container');
            if (container) {
                container.innerHTML = '<div class="mw-error-overlay"><h3>' + title + '</h3><p>' + message + '</p></div>';
            }
            if (window.__mw) window.__mw.ready();
        }
        window.onerror = function (message) { mwShowError('Error', message); };
        var loadModule = window['vue3-sfc-loader'].loadModule;
        var options = {
            moduleCache: { vue: Vue },
            getFile: function (url) {
                if (url === '/App.vue' || url === './App.vue') return Promise.resolve(`__MW_CODE__`);
                return fetch(url).then(function (res) {
                    if (!res.ok) throw new Error(res.statusText + ' ' + url);
                    return {
                        getContentData: function (asBinary) {
                            return asBinary ? res.arrayBuffer() : res.text();
                        }
                    };
                });
            },
            addStyle: function (textContent) {
                var style = document.createElement('style');
                style.textContent = textContent;
                document.head.appendChild(style);
            },
            pathResolve: function (ctx) {
                if (ctx.relPath === 'vue') return 'vue';
                if (ctx.relPath.indexOf('.') === 0 || ctx.relPath.indexOf('/') === 0) return ctx.relPath;
                return 'https://esm.sh/' + ctx.relPath + '?external=vue';
            },
            log: function (type) {
                if (type === 'error') {
                    mwShowError('Compilation Error', Array.prototype.slice.call(arguments, 1).join(' '));
                }
            }
        };
        var app = Vue.createApp({
            components: {
                'App': Vue.defineAsyncComponent(function () {
                    return loadModule('/App.vue', options).catch(function (err) {
                        mwShowError('Load Error', err.message);
                        throw err;
                    });
                })
            },
            template: '<App />'
        });
        app.mount('#app');
        if (window.__mw) window.__mw.ready();
    </script>
</body>
</html>"#;

/// Vue shell: the SFC embedded as a string literal served to the
/// asynchronous module loader, then mounted
fn vue_document(code: &str, opts: &SynthesisOptions) -> String {
    VUE_SHELL
        .replace("__MW_PRINT__", PRINT_STYLES)
        .replace("__MW_BRIDGE__", &bridge::bridge_script(opts.debounce_ms))
        .replace("__MW_CODE__", code)
}

const DIAGNOSTIC_SHELL: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>__MW_TITLE__</title></head>
<body style="font-family: sans-serif; display: flex; align-items: center; justify-content: center; height: 100vh; background: #fff1f2; color: #9f1239; margin: 0;">
    <div style="text-align: center; padding: 20px; border: 1px solid #fda4af; background: white; border-radius: 8px; max-width: 480px;">
        <h3 style="margin-top: 0;">&#9888;&#65039; __MW_TITLE__</h3>
        <p>__MW_MESSAGE__</p>
        <p>__MW_HINT__</p>
    </div>
    __MW_READY__
</body>
</html>"#;

/// Standalone explanatory panel shown instead of a blank frame
///
/// Carries the ready signal so the host loading state still resolves.
pub fn diagnostic_document(error: &AdapterError) -> String {
    let (title, hint) = match error {
        AdapterError::FormatMismatch { .. } => (
            "Format Mismatch",
            "Please switch the output format or regenerate.",
        ),
        AdapterError::ComponentNotFound => (
            "Component Not Found",
            "Add an <code>export default</code> to the generated component.",
        ),
    };
    DIAGNOSTIC_SHELL
        .replace("__MW_TITLE__", title)
        .replace("__MW_MESSAGE__", &escape_html(&error.to_string()))
        .replace("__MW_HINT__", hint)
        .replace("__MW_READY__", bridge::ready_signal_script())
}

/// Minimal text escaping for diagnostic panel interpolation
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
