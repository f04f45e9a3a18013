//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use markweave::commands::Cmd;
use markweave::config::AppConfig;
use markweave::model::{ActiveTab, AppModel, Format};
use markweave::sandbox::protocol::{ElementRect, SelectedElement};

/// Create an empty test model with default config
pub fn test_model() -> AppModel {
    AppModel::new(1280, 860, AppConfig::default())
}

/// Create a model with one active output, preview tab focused, and the
/// initial document swap already performed
pub fn model_with_output(format: Format, code: &str) -> AppModel {
    let mut model = test_model();
    model.outputs.push(format, code.to_string());
    model.active_tab = ActiveTab::Preview;
    let output = model.outputs.active().unwrap();
    let (id, revision) = (output.id, output.revision);
    let generation = model.preview.begin_swap(id, revision);
    model.preview.resolve_loading(generation);
    model
}

/// A selected-element descriptor as the sandbox would report it
pub fn selected_element(tag: &str, class: &str, outer_html: &str) -> SelectedElement {
    SelectedElement {
        tag_name: tag.to_uppercase(),
        class_name: class.to_string(),
        outer_html: outer_html.to_string(),
        inner_text: String::new(),
        rect: ElementRect {
            top: 100.0,
            left: 40.0,
            width: 200.0,
            height: 30.0,
        },
    }
}

/// Flatten a command tree into a list for assertions
pub fn flatten(cmd: Option<Cmd>) -> Vec<Cmd> {
    fn walk(cmd: Cmd, out: &mut Vec<Cmd>) {
        match cmd {
            Cmd::Batch(cmds) => {
                for c in cmds {
                    walk(c, out);
                }
            }
            other => out.push(other),
        }
    }
    let mut out = Vec::new();
    if let Some(cmd) = cmd {
        walk(cmd, &mut out);
    }
    out
}
