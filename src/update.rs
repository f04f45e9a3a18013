//! State transitions - the update function of the Elm-style architecture
//!
//! `update` is the only place the model changes. It takes the current model
//! and a message, mutates the model, and returns the side effects to run.
//! The runtime shell owns all actual I/O; nothing here touches a webview,
//! the clipboard, or the filesystem.

use std::sync::OnceLock;

use regex::Regex;

use crate::commands::Cmd;
use crate::messages::{AppMsg, EditorMsg, Msg, OutputMsg, PreviewMsg};
use base64::Engine;

use crate::model::{ActiveTab, AppModel, Format, Panel, SaveTarget};
use crate::sandbox::{InboundMessage, OutboundMessage};

/// Process a message and return the commands to execute
pub fn update(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Preview(msg) => update_preview(model, msg),
        Msg::Editor(msg) => update_editor(model, msg),
        Msg::Output(msg) => update_output(model, msg),
        Msg::App(msg) => update_app(model, msg),
    }
}

// === Preview pane ===

fn update_preview(model: &mut AppModel, msg: PreviewMsg) -> Option<Cmd> {
    match msg {
        PreviewMsg::TabChanged(tab) => {
            model.active_tab = tab;
            let swap = if tab == ActiveTab::Preview {
                maybe_resynthesize(model, false)
            } else {
                None
            };
            Cmd::merge(swap, Some(Cmd::Redraw))
        }

        PreviewMsg::Refresh => {
            Cmd::merge(maybe_resynthesize(model, true), Some(Cmd::Redraw))
        }

        PreviewMsg::SetViewportPreset(preset) => {
            model.preview.viewport.apply_preset(preset);
            // Named presets become the default for the next session
            let mut cmds = vec![
                Cmd::ResizeSandbox {
                    width: model.preview.viewport.width,
                    height: model.preview.viewport.height,
                },
                Cmd::Redraw,
            ];
            if preset != crate::model::ViewportPreset::Custom
                && model.config.default_viewport != preset
            {
                model.config.default_viewport = preset;
                cmds.push(Cmd::PersistConfig);
            }
            Some(Cmd::Batch(cmds))
        }

        PreviewMsg::Rotate => {
            model.preview.viewport.rotate();
            let vp = model.preview.viewport;
            Some(Cmd::Batch(vec![
                Cmd::ResizeSandbox {
                    width: vp.width,
                    height: vp.height,
                },
                Cmd::Redraw,
            ]))
        }

        PreviewMsg::SetEditMode(enabled) => {
            model.preview.edit_mode = enabled;
            let mut cmds = vec![Cmd::PostToSandbox(OutboundMessage::ToggleEditMode {
                enabled,
            })];
            if !enabled {
                // Leaving edit mode drops the selection on both sides
                model.editor.close();
                cmds.push(Cmd::PostToSandbox(OutboundMessage::HideOverlay));
            }
            cmds.push(Cmd::Redraw);
            Some(Cmd::Batch(cmds))
        }

        PreviewMsg::ReadyTimeout { generation } => {
            if model.preview.resolve_loading(generation) {
                tracing::warn!(
                    generation,
                    "Preview ready signal never arrived; clearing loading state"
                );
                Some(Cmd::Redraw)
            } else {
                None
            }
        }

        PreviewMsg::Inbound(msg) => route_inbound(model, msg),
    }
}

/// Dispatch one decoded sandbox message
fn route_inbound(model: &mut AppModel, msg: InboundMessage) -> Option<Cmd> {
    match msg {
        InboundMessage::PreviewReady => {
            let generation = model.preview.generation;
            let resolved = model.preview.resolve_loading(generation);
            // A freshly swapped document starts with edit mode off; restore
            // the host's setting
            let restore = if model.preview.edit_mode {
                Some(Cmd::PostToSandbox(OutboundMessage::ToggleEditMode {
                    enabled: true,
                }))
            } else {
                None
            };
            Cmd::merge(restore, resolved.then_some(Cmd::Redraw))
        }

        InboundMessage::ElementSelected { payload } => {
            if !model.preview.edit_mode {
                // Stale report from before edit mode was disabled
                tracing::debug!("Ignoring selection outside edit mode");
                return None;
            }
            model.editor.select(payload);
            Some(Cmd::Redraw)
        }

        InboundMessage::ContentUpdated { html, scroll_top } => {
            model.preview.scroll_top = scroll_top;
            let stripped = model.sandbox.ingest_content(&html)?;
            merge_content(model, stripped)
        }

        InboundMessage::ImageCaptured { data_url } => {
            if data_url.is_empty() {
                model.notice = Some("Failed to capture preview image".to_string());
                return Some(Cmd::Redraw);
            }
            model.pending_save = Some(SaveTarget::Image { data_url });
            Some(Cmd::ShowSaveFileDialog {
                suggested_name: "preview.png".to_string(),
            })
        }
    }
}

/// Fold an accepted content report into the canonical code
///
/// Only HTML formats carry the live DOM as their source text; for component
/// formats the serialized document is a rendering, not the code, so only the
/// scroll offset (already recorded) is kept.
fn merge_content(model: &mut AppModel, stripped: String) -> Option<Cmd> {
    let format = model.outputs.active().map(|o| o.format)?;
    if !matches!(format, Format::StaticHtml | Format::PlainHtml) {
        tracing::debug!(?format, "Content report not merged for component format");
        return None;
    }
    if !model.outputs.supersede_active(stripped) {
        return None;
    }
    if let Some(o) = model.outputs.active() {
        // The sandbox already shows this revision; do not resynthesize it
        model.preview.mark_synthesized(o.id, o.revision);
    }
    Some(Cmd::Redraw)
}

// === Floating editor toolbar ===

fn update_editor(model: &mut AppModel, msg: EditorMsg) -> Option<Cmd> {
    match msg {
        EditorMsg::TogglePanel(panel) => {
            if !model.editor.is_open() {
                return None;
            }
            model.editor.toggle_panel(panel);
            Some(Cmd::Redraw)
        }

        EditorMsg::SetInput(text) => {
            model.editor.input = text;
            None
        }

        EditorMsg::SubmitPanel => match model.editor.active_panel {
            Some(Panel::Ai) => submit_rewrite(model),
            Some(Panel::Style) => submit_class_edit(model),
            None => None,
        },

        EditorMsg::Command(command) => {
            if model.editor.selected().is_none() {
                return None;
            }
            // The resulting content report comes back as a normal accepted
            // edit, same as typing
            Some(Cmd::PostToSandbox(OutboundMessage::ExecCommand {
                command: command.name().to_string(),
                value: command.value().map(str::to_string),
            }))
        }

        EditorMsg::RewriteCompleted { result } => {
            model.editor.ai_busy = false;
            match result {
                Ok(html) => apply_rewrite(model, html),
                Err(err) => {
                    tracing::warn!("Element rewrite failed: {}", err);
                    model.notice = Some(format!("Failed to rewrite element: {}", err));
                    Some(Cmd::Redraw)
                }
            }
        }

        EditorMsg::JumpToSource => {
            if !model.editor.is_open() {
                return None;
            }
            model.active_tab = ActiveTab::Code;
            Some(Cmd::Redraw)
        }

        EditorMsg::Close => {
            if !model.editor.is_open() {
                return None;
            }
            model.editor.close();
            Some(Cmd::Batch(vec![
                Cmd::PostToSandbox(OutboundMessage::HideOverlay),
                Cmd::Redraw,
            ]))
        }

        EditorMsg::DragStart { x, y } => {
            model.editor.drag_start(x, y);
            None
        }

        EditorMsg::DragMove { x, y } => {
            if model.editor.drag.is_none() {
                return None;
            }
            model.editor.drag_move(x, y);
            Some(Cmd::Redraw)
        }

        EditorMsg::DragEnd => {
            model.editor.drag_end();
            None
        }
    }
}

/// Kick off an AI rewrite of the selected element
fn submit_rewrite(model: &mut AppModel) -> Option<Cmd> {
    let instruction = model.editor.input.trim().to_string();
    if instruction.is_empty() || model.editor.ai_busy {
        return None;
    }
    let outer_html = model.editor.selected()?.outer_html.clone();
    model.editor.ai_busy = true;
    Some(Cmd::Batch(vec![
        Cmd::RewriteElement {
            outer_html,
            instruction,
        },
        Cmd::Redraw,
    ]))
}

/// Push the edited class string to the selected element
fn submit_class_edit(model: &mut AppModel) -> Option<Cmd> {
    let class = model.editor.input.trim().to_string();
    let old_outer = model.editor.selected()?.outer_html.clone();
    let new_outer = rewrite_class_attribute(&old_outer, &class);

    // The sandbox echoes the mutation back as a content report. When the
    // canonical code absorbed the push, that report is a duplicate and the
    // guard drops it; when the replacement missed, the report is the only
    // carrier of the change and must stay acceptable.
    if apply_canonical_replace(model, &old_outer, &new_outer) {
        model.sandbox.arm_echo();
    }
    model.editor.record_class_change(&class, new_outer);
    model.editor.active_panel = None;
    model.editor.input.clear();
    Some(Cmd::Batch(vec![
        Cmd::PostToSandbox(OutboundMessage::replace_class(class)),
        Cmd::Redraw,
    ]))
}

/// Push a completed rewrite result into the sandbox and the canonical code
fn apply_rewrite(model: &mut AppModel, new_html: String) -> Option<Cmd> {
    let Some(old_outer) = model.editor.selected().map(|el| el.outer_html.clone()) else {
        // Selection was closed while the request was in flight
        return Some(Cmd::Redraw);
    };
    // Same echo policy as the class edit: only a successful canonical
    // replacement makes the follow-up report a discardable duplicate
    if apply_canonical_replace(model, &old_outer, &new_html) {
        model.sandbox.arm_echo();
    }
    // Replacing the markup destroys the selected node; drop the selection
    model.editor.close();
    Some(Cmd::Batch(vec![
        Cmd::PostToSandbox(OutboundMessage::replace_html(new_html)),
        Cmd::Redraw,
    ]))
}

/// Best-effort canonical update for a host-initiated element mutation
///
/// Replaces the first occurrence of the element's old markup in the active
/// output's code. Returns whether the replacement happened: when the markup
/// is not found verbatim (the sandbox may serialize attributes differently
/// than the source), the caller must leave the echo guard disarmed so the
/// sandbox's content report carries the change into canonical code instead.
fn apply_canonical_replace(model: &mut AppModel, old_outer: &str, new_outer: &str) -> bool {
    let Some((code, format)) = model.active_code() else {
        return false;
    };
    if !matches!(format, Format::StaticHtml | Format::PlainHtml) {
        return false;
    }
    if !code.contains(old_outer) {
        tracing::warn!("Selected element markup not found in code; deferring sync");
        return false;
    }
    let new_code = code.replacen(old_outer, new_outer, 1);
    model.outputs.supersede_active(new_code);
    if let Some(o) = model.outputs.active() {
        model.preview.mark_synthesized(o.id, o.revision);
    }
    true
}

/// Set the class attribute in the opening tag of an element's markup,
/// inserting one after the tag name when none exists
fn rewrite_class_attribute(outer_html: &str, class: &str) -> String {
    static CLASS_ATTR: OnceLock<Regex> = OnceLock::new();
    let re = CLASS_ATTR.get_or_init(|| {
        Regex::new(r#"class\s*=\s*("[^"]*"|'[^']*')"#).unwrap()
    });

    let tag_end = outer_html.find('>').map(|i| i + 1).unwrap_or(outer_html.len());
    let (head, tail) = outer_html.split_at(tag_end);

    let replacement = format!("class=\"{}\"", class);
    let new_head = if re.is_match(head) {
        re.replace(head, regex::NoExpand(&replacement)).into_owned()
    } else {
        // Insert right after the tag name
        let insert_at = head
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_whitespace() || *c == '>' || *c == '/')
            .map(|(i, _)| i)
            .unwrap_or(head.len());
        format!("{} {}{}", &head[..insert_at], replacement, &head[insert_at..])
    };
    format!("{}{}", new_head, tail)
}

// === Output history ===

fn update_output(model: &mut AppModel, msg: OutputMsg) -> Option<Cmd> {
    match msg {
        OutputMsg::GenerationRequested { format } => {
            if model.generating {
                return None;
            }
            if model.source.content.trim().is_empty() {
                model.notice = Some("Load a source document before generating".to_string());
                return Some(Cmd::Redraw);
            }
            model.generating = true;
            model.notice = None;
            Some(Cmd::Batch(vec![
                Cmd::Generate {
                    format,
                    source: model.source.content.clone(),
                },
                Cmd::Redraw,
            ]))
        }

        OutputMsg::GenerationCompleted { format, result } => {
            model.generating = false;
            match result {
                Ok(code) => {
                    model.outputs.push(format, code);
                    model.preview.scroll_top = 0.0;
                    let swap = if model.active_tab == ActiveTab::Preview {
                        maybe_resynthesize(model, false)
                    } else {
                        None
                    };
                    Cmd::merge(swap, Some(Cmd::Redraw))
                }
                Err(err) => {
                    tracing::warn!("Generation failed: {}", err);
                    model.notice = Some(err);
                    Some(Cmd::Redraw)
                }
            }
        }

        OutputMsg::Select(id) => {
            if !model.outputs.select(id) {
                return None;
            }
            model.preview.scroll_top = 0.0;
            let swap = if model.active_tab == ActiveTab::Preview {
                maybe_resynthesize(model, false)
            } else {
                None
            };
            Cmd::merge(swap, Some(Cmd::Redraw))
        }

        OutputMsg::Delete(id) => {
            if !model.outputs.delete(id) {
                model.notice = Some("Cannot delete the only output version".to_string());
                return Some(Cmd::Redraw);
            }
            let swap = if model.active_tab == ActiveTab::Preview {
                maybe_resynthesize(model, false)
            } else {
                None
            };
            Cmd::merge(swap, Some(Cmd::Redraw))
        }

        OutputMsg::CodeEdited { code } => {
            if !model.outputs.supersede_active(code) {
                return None;
            }
            // Not marked synthesized: the sandbox shows stale content until
            // the preview tab is shown or refreshed
            let swap = if model.active_tab == ActiveTab::Preview {
                maybe_resynthesize(model, false)
            } else {
                None
            };
            Cmd::merge(swap, Some(Cmd::Redraw))
        }
    }
}

// === Application level ===

fn update_app(model: &mut AppModel, msg: AppMsg) -> Option<Cmd> {
    match msg {
        AppMsg::Resize(width, height) => {
            model.window_size = (width, height);
            Some(Cmd::Redraw)
        }

        AppMsg::CopyCode => {
            let (code, _) = model.active_code()?;
            Some(Cmd::CopyToClipboard(code.to_string()))
        }

        AppMsg::DownloadCode => {
            let (_, format) = model.active_code()?;
            model.pending_save = Some(SaveTarget::Code);
            Some(Cmd::ShowSaveFileDialog {
                suggested_name: format.file_name().to_string(),
            })
        }

        AppMsg::SaveDialogResult { path } => {
            let target = model.pending_save.take()?;
            let path = path?;
            match target {
                SaveTarget::Code => {
                    let (code, _) = model.active_code()?;
                    Some(Cmd::SaveFile {
                        path,
                        content: code.to_string(),
                    })
                }
                SaveTarget::Image { data_url } => match decode_data_url(&data_url) {
                    Some(bytes) => Some(Cmd::SaveBinaryFile { path, bytes }),
                    None => {
                        model.notice = Some("Captured image data was malformed".to_string());
                        Some(Cmd::Redraw)
                    }
                },
            }
        }

        AppMsg::SaveCompleted(result) => {
            if let Err(err) = result {
                tracing::warn!("Save failed: {}", err);
                model.notice = Some(format!("Failed to save file: {}", err));
                return Some(Cmd::Redraw);
            }
            None
        }

        AppMsg::ExportPdf => {
            model.active_code()?;
            Some(Cmd::PrintPreview)
        }

        AppMsg::ExportImage => {
            model.active_code()?;
            Some(Cmd::CaptureImage)
        }

        AppMsg::OpenSource => Some(Cmd::ShowOpenFileDialog),

        AppMsg::LoadSource { name, content } => {
            model.source.name = name;
            model.source.content = content;
            Some(Cmd::Redraw)
        }

        AppMsg::SourceEdited { content } => {
            model.source.content = content;
            None
        }

        AppMsg::SourceLoadFailed(err) => {
            tracing::warn!("Failed to load source document: {}", err);
            model.notice = Some(format!("Failed to load source document: {}", err));
            Some(Cmd::Redraw)
        }

        AppMsg::ToggleSourcePreview => {
            model.source.show_preview = !model.source.show_preview;
            Some(Cmd::Redraw)
        }

        AppMsg::DismissNotice => {
            model.notice = None;
            Some(Cmd::Redraw)
        }

        AppMsg::Quit => Some(Cmd::Quit),
    }
}

/// Extract the raw bytes from a base64 image data URL
fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let (_, payload) = data_url.split_once(";base64,")?;
    base64::engine::general_purpose::STANDARD.decode(payload).ok()
}

// === Resynthesis ===

/// Swap a fresh document into the sandbox when the canonical code moved on
///
/// Skipped while a generation request is streaming and when the sandbox
/// already shows the active revision (unless forced). Every swap closes the
/// selection, forgets any pending echo, and starts a bounded ready wait.
fn maybe_resynthesize(model: &mut AppModel, force: bool) -> Option<Cmd> {
    if model.generating {
        return None;
    }
    let output = model.outputs.active()?;
    if output.code.is_empty() {
        return None;
    }
    if !force && !model.preview.needs_refresh(output.id, output.revision) {
        return None;
    }

    let html = model
        .sandbox
        .build_document(&output.code, output.format, model.preview.scroll_top);
    let (id, revision) = (output.id, output.revision);

    let generation = model.preview.begin_swap(id, revision);
    model.sandbox.reset_echo();
    model.editor.close();

    Some(Cmd::Batch(vec![
        Cmd::SwapDocument { html },
        Cmd::ScheduleReadyTimeout {
            generation,
            delay_ms: model.config.ready_timeout_ms,
        },
        Cmd::Redraw,
    ]))
}
