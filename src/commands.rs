//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an
//! update. The runtime shell executes them; `update` only describes them.

use std::path::PathBuf;

use crate::model::Format;
use crate::sandbox::OutboundMessage;

/// A side effect requested by `update`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Re-render the application chrome
    Redraw,
    /// Execute multiple commands
    Batch(Vec<Cmd>),

    // === Sandbox surface ===
    /// Replace the sandbox surface's document wholesale
    SwapDocument { html: String },
    /// Deliver one protocol message into the sandbox
    PostToSandbox(OutboundMessage),
    /// Resize the sandbox surface to the viewport dimensions
    ResizeSandbox { width: u32, height: u32 },
    /// After `delay_ms`, send `PreviewMsg::ReadyTimeout { generation }`
    ScheduleReadyTimeout { generation: u64, delay_ms: u64 },

    // === External collaborators ===
    /// Ask the generation service for a new output.
    /// Sends `OutputMsg::GenerationCompleted` when done.
    Generate { format: Format, source: String },
    /// Ask the rewrite service for a new version of an element.
    /// Sends `EditorMsg::RewriteCompleted` when done.
    RewriteElement {
        outer_html: String,
        instruction: String,
    },

    // === Clipboard / files / export ===
    /// Put text on the system clipboard
    CopyToClipboard(String),
    /// Show the native open dialog for a source document
    ShowOpenFileDialog,
    /// Show the native save dialog, pre-filled with a suggested name
    ShowSaveFileDialog { suggested_name: String },
    /// Write text content to disk
    SaveFile { path: PathBuf, content: String },
    /// Write binary content to disk (captured images)
    SaveBinaryFile { path: PathBuf, bytes: Vec<u8> },
    /// Invoke the sandbox window's native print
    PrintPreview,
    /// Rasterize the sandbox document (overlay and scripts excluded)
    CaptureImage,

    // === Application ===
    /// Write the current configuration to disk
    PersistConfig,
    /// Request application exit
    Quit,
}

impl Cmd {
    /// Combine two optional commands into one
    pub fn merge(a: Option<Cmd>, b: Option<Cmd>) -> Option<Cmd> {
        match (a, b) {
            (None, None) => None,
            (Some(cmd), None) | (None, Some(cmd)) => Some(cmd),
            (Some(a), Some(b)) => Some(Cmd::Batch(vec![a, b])),
        }
    }

    /// Whether the chrome should be repainted after executing this command
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            Cmd::SwapDocument { .. } => true,
            Cmd::PostToSandbox(_) => false,
            Cmd::ResizeSandbox { .. } => true,
            // Timeout fires a message later; nothing to paint now
            Cmd::ScheduleReadyTimeout { .. } => false,
            // Collaborators report back via messages
            Cmd::Generate { .. } => false,
            Cmd::RewriteElement { .. } => false,
            Cmd::CopyToClipboard(_) => false,
            Cmd::ShowOpenFileDialog => false,
            Cmd::ShowSaveFileDialog { .. } => false,
            Cmd::SaveFile { .. } => false,
            Cmd::SaveBinaryFile { .. } => false,
            Cmd::PrintPreview => false,
            Cmd::CaptureImage => false,
            Cmd::PersistConfig => false,
            Cmd::Quit => false,
        }
    }
}
