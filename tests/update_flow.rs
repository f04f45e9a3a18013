//! End-to-end update-loop tests: generation, preview lifecycle, edit mode,
//! echo suppression, and the floating editor flows

mod common;

use common::{flatten, model_with_output, selected_element, test_model};
use markweave::commands::Cmd;
use markweave::messages::{AppMsg, EditorMsg, Msg, OutputMsg, PreviewMsg};
use markweave::model::{ActiveTab, Format, Panel, RichTextCommand};
use markweave::sandbox::{InboundMessage, OutboundMessage};
use markweave::update::update;

fn inbound(msg: InboundMessage) -> Msg {
    Msg::Preview(PreviewMsg::Inbound(msg))
}

// ========================================================================
// Generation and document swap
// ========================================================================

#[test]
fn test_generation_request_and_completion_swap_the_preview() {
    let mut model = test_model();
    model.active_tab = ActiveTab::Preview;
    model.source.content = "# A document".to_string();

    let cmds = flatten(update(
        &mut model,
        Msg::Output(OutputMsg::GenerationRequested {
            format: Format::StaticHtml,
        }),
    ));
    assert!(model.generating);
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::Generate { format: Format::StaticHtml, .. })));

    let cmds = flatten(update(
        &mut model,
        Msg::Output(OutputMsg::GenerationCompleted {
            format: Format::StaticHtml,
            result: Ok("<p>hi</p>".to_string()),
        }),
    ));
    assert!(!model.generating);
    assert!(model.preview.loading);

    let swap = cmds.iter().find_map(|c| match c {
        Cmd::SwapDocument { html } => Some(html),
        _ => None,
    });
    let html = swap.expect("completion should swap the preview document");
    assert!(html.contains("<p>hi</p>"));
    assert!(html.contains("data-mw-bridge"));
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::ScheduleReadyTimeout { delay_ms: 5000, .. })));
}

#[test]
fn test_generation_failure_sets_notice_and_keeps_code() {
    let mut model = model_with_output(Format::StaticHtml, "<p>old</p>");
    let cmds = flatten(update(
        &mut model,
        Msg::Output(OutputMsg::GenerationCompleted {
            format: Format::StaticHtml,
            result: Err("backend unavailable".to_string()),
        }),
    ));
    assert_eq!(model.notice.as_deref(), Some("backend unavailable"));
    assert_eq!(model.outputs.active().unwrap().code, "<p>old</p>");
    assert!(!cmds.iter().any(|c| matches!(c, Cmd::SwapDocument { .. })));
}

#[test]
fn test_generation_requires_a_source_document() {
    let mut model = test_model();
    let cmds = flatten(update(
        &mut model,
        Msg::Output(OutputMsg::GenerationRequested {
            format: Format::StaticHtml,
        }),
    ));
    assert!(!model.generating);
    assert!(model.notice.is_some());
    assert!(!cmds.iter().any(|c| matches!(c, Cmd::Generate { .. })));
}

// ========================================================================
// Loading lifecycle
// ========================================================================

#[test]
fn test_ready_signal_resolves_loading() {
    let mut model = model_with_output(Format::StaticHtml, "<p>x</p>");
    update(&mut model, Msg::Preview(PreviewMsg::Refresh));
    assert!(model.preview.loading);

    update(&mut model, inbound(InboundMessage::PreviewReady));
    assert!(!model.preview.loading);
}

#[test]
fn test_stale_ready_timeout_cannot_clear_newer_loading_state() {
    let mut model = model_with_output(Format::StaticHtml, "<p>x</p>");
    update(&mut model, Msg::Preview(PreviewMsg::Refresh));
    let generation = model.preview.generation;

    update(
        &mut model,
        Msg::Preview(PreviewMsg::ReadyTimeout {
            generation: generation - 1,
        }),
    );
    assert!(model.preview.loading);

    update(
        &mut model,
        Msg::Preview(PreviewMsg::ReadyTimeout { generation }),
    );
    assert!(!model.preview.loading);
}

#[test]
fn test_refresh_swaps_even_when_already_synced() {
    let mut model = model_with_output(Format::StaticHtml, "<p>x</p>");
    let cmds = flatten(update(&mut model, Msg::Preview(PreviewMsg::Refresh)));
    assert!(cmds.iter().any(|c| matches!(c, Cmd::SwapDocument { .. })));
}

#[test]
fn test_ready_signal_restores_edit_mode() {
    let mut model = model_with_output(Format::StaticHtml, "<p>x</p>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(&mut model, Msg::Preview(PreviewMsg::Refresh));

    let cmds = flatten(update(&mut model, inbound(InboundMessage::PreviewReady)));
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::PostToSandbox(OutboundMessage::ToggleEditMode { enabled: true })
    )));
}

// ========================================================================
// Edit mode and selection
// ========================================================================

#[test]
fn test_edit_mode_toggle_round_trip() {
    let mut model = model_with_output(Format::StaticHtml, "<div>x</div>");

    let cmds = flatten(update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true))));
    assert!(model.preview.edit_mode);
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::PostToSandbox(OutboundMessage::ToggleEditMode { enabled: true })
    )));

    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "", "<div>x</div>"),
        }),
    );
    assert!(model.editor.is_open());

    let cmds = flatten(update(
        &mut model,
        Msg::Preview(PreviewMsg::SetEditMode(false)),
    ));
    assert!(!model.editor.is_open());
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::PostToSandbox(OutboundMessage::HideOverlay))));
}

#[test]
fn test_selection_ignored_outside_edit_mode() {
    let mut model = model_with_output(Format::StaticHtml, "<div>x</div>");
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "", "<div>x</div>"),
        }),
    );
    assert!(!model.editor.is_open());
}

#[test]
fn test_toolbar_anchors_below_selected_element() {
    let mut model = model_with_output(Format::StaticHtml, "<div>x</div>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "", "<div>x</div>"),
        }),
    );
    // rect top 100 + height 30 + 8px gap
    assert_eq!(model.editor.position.top, 138.0);
    assert_eq!(model.editor.position.left, 40.0);
}

#[test]
fn test_toolbar_drag_moves_by_pointer_delta() {
    let mut model = model_with_output(Format::StaticHtml, "<div>x</div>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "", "<div>x</div>"),
        }),
    );

    update(&mut model, Msg::Editor(EditorMsg::DragStart { x: 10.0, y: 10.0 }));
    update(&mut model, Msg::Editor(EditorMsg::DragMove { x: 30.0, y: 15.0 }));
    assert_eq!(model.editor.position.left, 60.0);
    assert_eq!(model.editor.position.top, 143.0);

    update(&mut model, Msg::Editor(EditorMsg::DragEnd));
    assert!(model.editor.drag.is_none());
}

// ========================================================================
// Content reports and echo suppression
// ========================================================================

#[test]
fn test_accepted_content_report_supersedes_canonical_code() {
    let mut model = model_with_output(Format::StaticHtml, "<p>a</p>");
    let reported = "<html><head><script data-mw-bridge>x</script></head>\
                    <body><p>b</p><div id=\"mw-editor-overlay\" style=\"\"></div></body></html>";

    update(
        &mut model,
        inbound(InboundMessage::ContentUpdated {
            html: reported.to_string(),
            scroll_top: 12.0,
        }),
    );

    let code = &model.outputs.active().unwrap().code;
    assert!(code.contains("<p>b</p>"));
    assert!(!code.contains("data-mw"));
    assert!(!code.contains("mw-editor-overlay"));
    assert_eq!(model.outputs.active().unwrap().revision, 1);
    assert_eq!(model.preview.scroll_top, 12.0);

    // The sandbox already shows this edit; re-entering the preview tab must
    // not resynthesize it
    let cmds = flatten(update(
        &mut model,
        Msg::Preview(PreviewMsg::TabChanged(ActiveTab::Preview)),
    ));
    assert!(!cmds.iter().any(|c| matches!(c, Cmd::SwapDocument { .. })));
}

#[test]
fn test_component_format_reports_record_scroll_only() {
    let mut model = model_with_output(Format::ReactComponent, "export default function App() {}");
    update(
        &mut model,
        inbound(InboundMessage::ContentUpdated {
            html: "<html><body><div id=\"root\">rendered</div></body></html>".to_string(),
            scroll_top: 40.0,
        }),
    );
    assert_eq!(
        model.outputs.active().unwrap().code,
        "export default function App() {}"
    );
    assert_eq!(model.outputs.active().unwrap().revision, 0);
    assert_eq!(model.preview.scroll_top, 40.0);
}

#[test]
fn test_class_edit_updates_code_and_discards_the_echo() {
    let mut model = model_with_output(Format::StaticHtml, r#"<div class="old">x</div>"#);
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "old", r#"<div class="old">x</div>"#),
        }),
    );

    update(&mut model, Msg::Editor(EditorMsg::TogglePanel(Panel::Style)));
    assert_eq!(model.editor.input, "old");

    update(&mut model, Msg::Editor(EditorMsg::SetInput("fresh".to_string())));
    let cmds = flatten(update(&mut model, Msg::Editor(EditorMsg::SubmitPanel)));

    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::PostToSandbox(OutboundMessage::UpdateElement {
            html: None,
            class_name: Some(name)
        }) if name == "fresh"
    )));
    assert_eq!(
        model.outputs.active().unwrap().code,
        r#"<div class="fresh">x</div>"#
    );
    let revision = model.outputs.active().unwrap().revision;

    // The sandbox echoes the mutation back; it must not be folded in again
    update(
        &mut model,
        inbound(InboundMessage::ContentUpdated {
            html: r#"<html><body><div class="fresh">x</div></body></html>"#.to_string(),
            scroll_top: 0.0,
        }),
    );
    assert_eq!(model.outputs.active().unwrap().revision, revision);

    // The next report is a real edit and is accepted
    update(
        &mut model,
        inbound(InboundMessage::ContentUpdated {
            html: r#"<html><body><div class="fresh">typed</div></body></html>"#.to_string(),
            scroll_top: 0.0,
        }),
    );
    assert!(model.outputs.active().unwrap().code.contains("typed"));
}

#[test]
fn test_class_edit_with_unmatched_source_spelling_syncs_via_the_report() {
    // The code spells the attribute with single quotes; the sandbox
    // serializes with double quotes, so the push-time replacement misses
    let mut model = model_with_output(Format::StaticHtml, "<div class='old'>x</div>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "old", r#"<div class="old">x</div>"#),
        }),
    );
    update(&mut model, Msg::Editor(EditorMsg::TogglePanel(Panel::Style)));
    update(&mut model, Msg::Editor(EditorMsg::SetInput("fresh".to_string())));
    update(&mut model, Msg::Editor(EditorMsg::SubmitPanel));

    // Canonical sync deferred
    assert_eq!(model.outputs.active().unwrap().code, "<div class='old'>x</div>");
    assert_eq!(model.outputs.active().unwrap().revision, 0);

    // The sandbox report of the mutation is now the only carrier of the
    // change and must be merged, not dropped as an echo
    update(
        &mut model,
        inbound(InboundMessage::ContentUpdated {
            html: r#"<html><body><div class="fresh">x</div></body></html>"#.to_string(),
            scroll_top: 0.0,
        }),
    );
    assert!(model
        .outputs
        .active()
        .unwrap()
        .code
        .contains(r#"class="fresh""#));
    assert_eq!(model.outputs.active().unwrap().revision, 1);
}

#[test]
fn test_rewrite_with_unmatched_source_spelling_syncs_via_the_report() {
    let mut model = model_with_output(Format::StaticHtml, "<br>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("br", "", "<br/>"),
        }),
    );
    update(&mut model, Msg::Editor(EditorMsg::TogglePanel(Panel::Ai)));
    update(&mut model, Msg::Editor(EditorMsg::SetInput("make it a rule".to_string())));
    update(&mut model, Msg::Editor(EditorMsg::SubmitPanel));

    update(
        &mut model,
        Msg::Editor(EditorMsg::RewriteCompleted {
            result: Ok("<hr/>".to_string()),
        }),
    );
    assert_eq!(model.outputs.active().unwrap().code, "<br>");

    update(
        &mut model,
        inbound(InboundMessage::ContentUpdated {
            html: "<html><body><hr/></body></html>".to_string(),
            scroll_top: 0.0,
        }),
    );
    assert!(model.outputs.active().unwrap().code.contains("<hr/>"));
}

#[test]
fn test_exec_command_echo_is_accepted_as_a_normal_edit() {
    let mut model = model_with_output(Format::StaticHtml, "<p>plain</p>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("p", "", "<p>plain</p>"),
        }),
    );

    let cmds = flatten(update(
        &mut model,
        Msg::Editor(EditorMsg::Command(RichTextCommand::Bold)),
    ));
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::PostToSandbox(OutboundMessage::ExecCommand { command, .. }) if command == "bold"
    )));

    update(
        &mut model,
        inbound(InboundMessage::ContentUpdated {
            html: "<html><body><p><b>plain</b></p></body></html>".to_string(),
            scroll_top: 0.0,
        }),
    );
    assert!(model.outputs.active().unwrap().code.contains("<b>plain</b>"));
}

// ========================================================================
// AI rewrite
// ========================================================================

#[test]
fn test_rewrite_submission_and_success() {
    let mut model = model_with_output(Format::StaticHtml, "<div>old text</div>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "", "<div>old text</div>"),
        }),
    );

    update(&mut model, Msg::Editor(EditorMsg::TogglePanel(Panel::Ai)));
    update(
        &mut model,
        Msg::Editor(EditorMsg::SetInput("make it friendlier".to_string())),
    );
    let cmds = flatten(update(&mut model, Msg::Editor(EditorMsg::SubmitPanel)));
    assert!(model.editor.ai_busy);
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::RewriteElement { instruction, .. } if instruction == "make it friendlier"
    )));

    let cmds = flatten(update(
        &mut model,
        Msg::Editor(EditorMsg::RewriteCompleted {
            result: Ok("<div>hello there</div>".to_string()),
        }),
    ));
    assert!(!model.editor.ai_busy);
    assert!(!model.editor.is_open());
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::PostToSandbox(OutboundMessage::UpdateElement {
            html: Some(html),
            class_name: None
        }) if html == "<div>hello there</div>"
    )));
    assert_eq!(
        model.outputs.active().unwrap().code,
        "<div>hello there</div>"
    );
}

#[test]
fn test_rewrite_failure_keeps_selection_and_sets_notice() {
    let mut model = model_with_output(Format::StaticHtml, "<div>x</div>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "", "<div>x</div>"),
        }),
    );
    update(&mut model, Msg::Editor(EditorMsg::TogglePanel(Panel::Ai)));
    update(&mut model, Msg::Editor(EditorMsg::SetInput("x".to_string())));
    update(&mut model, Msg::Editor(EditorMsg::SubmitPanel));

    update(
        &mut model,
        Msg::Editor(EditorMsg::RewriteCompleted {
            result: Err("rate limited".to_string()),
        }),
    );
    assert!(!model.editor.ai_busy);
    assert!(model.editor.is_open());
    assert!(model.notice.as_deref().unwrap().contains("rate limited"));
    assert_eq!(model.outputs.active().unwrap().code, "<div>x</div>");
}

#[test]
fn test_empty_instruction_is_not_submitted() {
    let mut model = model_with_output(Format::StaticHtml, "<div>x</div>");
    update(&mut model, Msg::Preview(PreviewMsg::SetEditMode(true)));
    update(
        &mut model,
        inbound(InboundMessage::ElementSelected {
            payload: selected_element("div", "", "<div>x</div>"),
        }),
    );
    update(&mut model, Msg::Editor(EditorMsg::TogglePanel(Panel::Ai)));
    update(&mut model, Msg::Editor(EditorMsg::SetInput("   ".to_string())));
    let cmds = flatten(update(&mut model, Msg::Editor(EditorMsg::SubmitPanel)));
    assert!(!model.editor.ai_busy);
    assert!(!cmds.iter().any(|c| matches!(c, Cmd::RewriteElement { .. })));
}

// ========================================================================
// Output history
// ========================================================================

#[test]
fn test_selecting_another_version_swaps_the_preview() {
    let mut model = model_with_output(Format::StaticHtml, "<p>first</p>");
    let first = model.outputs.active_id().unwrap();
    update(
        &mut model,
        Msg::Output(OutputMsg::GenerationCompleted {
            format: Format::StaticHtml,
            result: Ok("<p>second</p>".to_string()),
        }),
    );

    let cmds = flatten(update(&mut model, Msg::Output(OutputMsg::Select(first))));
    let swap = cmds.iter().find_map(|c| match c {
        Cmd::SwapDocument { html } => Some(html),
        _ => None,
    });
    assert!(swap.unwrap().contains("<p>first</p>"));
}

#[test]
fn test_deleting_the_last_version_is_refused() {
    let mut model = model_with_output(Format::StaticHtml, "<p>only</p>");
    let id = model.outputs.active_id().unwrap();
    update(&mut model, Msg::Output(OutputMsg::Delete(id)));
    assert_eq!(model.outputs.len(), 1);
    assert!(model.notice.is_some());
}

// ========================================================================
// Clipboard and files
// ========================================================================

#[test]
fn test_copy_and_download_use_the_active_output() {
    let mut model = model_with_output(Format::ReactComponent, "export default App");

    let cmds = flatten(update(&mut model, Msg::App(AppMsg::CopyCode)));
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::CopyToClipboard(text) if text == "export default App"
    )));

    let cmds = flatten(update(&mut model, Msg::App(AppMsg::DownloadCode)));
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::ShowSaveFileDialog { suggested_name } if suggested_name == "App.tsx"
    )));

    let path = std::path::PathBuf::from("/tmp/App.tsx");
    let cmds = flatten(update(
        &mut model,
        Msg::App(AppMsg::SaveDialogResult {
            path: Some(path.clone()),
        }),
    ));
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::SaveFile { path: p, content } if *p == path && content == "export default App"
    )));
}

#[test]
fn test_cancelled_save_dialog_does_nothing() {
    let mut model = model_with_output(Format::StaticHtml, "<p>x</p>");
    update(&mut model, Msg::App(AppMsg::DownloadCode));
    let cmds = flatten(update(
        &mut model,
        Msg::App(AppMsg::SaveDialogResult { path: None }),
    ));
    assert!(!cmds.iter().any(|c| matches!(c, Cmd::SaveFile { .. })));
    assert!(model.pending_save.is_none());
}

#[test]
fn test_captured_image_opens_save_dialog_then_writes_bytes() {
    let mut model = model_with_output(Format::StaticHtml, "<p>x</p>");
    // 8 bytes: "png data" base64-encoded
    let data_url = "data:image/png;base64,cG5nIGRhdGE=".to_string();

    let cmds = flatten(update(
        &mut model,
        inbound(InboundMessage::ImageCaptured { data_url }),
    ));
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::ShowSaveFileDialog { suggested_name } if suggested_name == "preview.png"
    )));

    let cmds = flatten(update(
        &mut model,
        Msg::App(AppMsg::SaveDialogResult {
            path: Some(std::path::PathBuf::from("/tmp/preview.png")),
        }),
    ));
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::SaveBinaryFile { bytes, .. } if bytes == b"png data"
    )));
}

#[test]
fn test_failed_capture_sets_notice() {
    let mut model = model_with_output(Format::StaticHtml, "<p>x</p>");
    update(
        &mut model,
        inbound(InboundMessage::ImageCaptured {
            data_url: String::new(),
        }),
    );
    assert!(model.notice.is_some());
    assert!(model.pending_save.is_none());
}
