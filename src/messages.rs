//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use std::path::PathBuf;

use crate::model::{ActiveTab, Format, OutputId, Panel, RichTextCommand, ViewportPreset};
use crate::sandbox::InboundMessage;

/// Preview pane messages (viewport, loading, sandbox traffic)
#[derive(Debug, Clone)]
pub enum PreviewMsg {
    /// Switch the active main view
    TabChanged(ActiveTab),
    /// Re-swap the current document without changing canonical code
    Refresh,
    /// Apply a named viewport preset
    SetViewportPreset(ViewportPreset),
    /// Swap viewport width and height (becomes Custom)
    Rotate,
    /// Enable or disable visual edit mode
    SetEditMode(bool),
    /// The bounded wait for the ready signal elapsed
    ReadyTimeout { generation: u64 },
    /// A decoded message from the sandbox
    Inbound(InboundMessage),
}

/// Floating editor toolbar messages
#[derive(Debug, Clone)]
pub enum EditorMsg {
    /// Open/close the AI or class panel
    TogglePanel(Panel),
    /// Update the open panel's input text
    SetInput(String),
    /// Submit the open panel (AI instruction or class string)
    SubmitPanel,
    /// Dispatch a rich-text command to the selected element
    Command(RichTextCommand),
    /// The external rewrite collaborator finished (async result)
    RewriteCompleted { result: Result<String, String> },
    /// Switch to the code editor for the active output
    JumpToSource,
    /// Close the toolbar and deselect
    Close,

    // === Toolbar drag ===
    DragStart { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
}

/// Output history messages (generation results, version management)
#[derive(Debug, Clone)]
pub enum OutputMsg {
    /// Ask the generation collaborator for a new output of this format
    GenerationRequested { format: Format },
    /// A generation request finished (async result)
    GenerationCompleted {
        format: Format,
        result: Result<String, String>,
    },
    /// Activate another output version
    Select(OutputId),
    /// Delete an output version (refused for the last one)
    Delete(OutputId),
    /// The user edited the code directly in the code view
    CodeEdited { code: String },
}

/// Application-level messages (window, clipboard, files, export)
#[derive(Debug, Clone)]
pub enum AppMsg {
    /// Window resized
    Resize(u32, u32),
    /// Copy the active output's code to the clipboard
    CopyCode,
    /// Ask where to save the active output's code
    DownloadCode,
    /// Save dialog returned a path (or None if cancelled)
    SaveDialogResult { path: Option<PathBuf> },
    /// A file write finished (async result)
    SaveCompleted(Result<(), String>),
    /// The user edited the source document text
    SourceEdited { content: String },
    /// Invoke the sandbox's native print (PDF export)
    ExportPdf,
    /// Rasterize the sandbox document to an image
    ExportImage,
    /// Ask where to load a source document from
    OpenSource,
    /// Replace the source document
    LoadSource { name: String, content: String },
    /// Reading the picked source file failed
    SourceLoadFailed(String),
    /// Toggle the markdown split preview of the source
    ToggleSourcePreview,
    /// Dismiss the blocking notification
    DismissNotice,
    /// Quit the application
    Quit,
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    Preview(PreviewMsg),
    Editor(EditorMsg),
    Output(OutputMsg),
    App(AppMsg),
}

// Convenience constructors for common messages
impl Msg {
    /// Wrap a decoded sandbox message
    pub fn inbound(msg: InboundMessage) -> Self {
        Msg::Preview(PreviewMsg::Inbound(msg))
    }

    /// Create a resize message
    pub fn resize(width: u32, height: u32) -> Self {
        Msg::App(AppMsg::Resize(width, height))
    }
}
