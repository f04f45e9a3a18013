//! Application model - the complete state of the host
//!
//! All state types follow the Elm Architecture pattern: the model is only
//! mutated by `update`, and everything the runtime renders derives from it.

pub mod editor;
pub mod output;
pub mod preview;

pub use editor::{DragState, EditController, EditorPosition, Panel, RichTextCommand};
pub use output::{Format, GeneratedOutput, OutputHistory, OutputId};
pub use preview::{PreviewState, Viewport, ViewportPreset};

use crate::config::AppConfig;
use crate::sandbox::SandboxSession;
use crate::synthesis::SynthesisOptions;

/// Which main view is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    /// The source document the outputs were generated from
    Source,
    /// Code editor for the active generated output
    Code,
    /// The sandboxed live preview
    #[default]
    Preview,
}

/// The source document driving generation (markdown or plain text)
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    pub name: String,
    pub content: String,
    /// Split view showing the rendered markdown next to the text
    pub show_preview: bool,
}

impl SourceDocument {
    pub fn is_markdown(&self) -> bool {
        self.name.ends_with(".md")
    }
}

/// What the pending save dialog will write when a path comes back
#[derive(Debug, Clone, PartialEq)]
pub enum SaveTarget {
    /// The active output's code
    Code,
    /// A captured preview image, as a data URL
    Image { data_url: String },
}

/// The complete application model
#[derive(Debug)]
pub struct AppModel {
    /// Persisted configuration
    pub config: AppConfig,
    /// Generated output versions; canonical code lives in the active one
    pub outputs: OutputHistory,
    /// Preview pane: viewport, loading lifecycle, scroll, edit mode
    pub preview: PreviewState,
    /// Floating toolbar / selection state
    pub editor: EditController,
    /// Synthesis options and echo guard for the sandbox surface
    pub sandbox: SandboxSession,
    /// Source document and its split preview toggle
    pub source: SourceDocument,
    pub active_tab: ActiveTab,
    /// Host window dimensions in physical pixels
    pub window_size: (u32, u32),
    /// True while a generation request is streaming; the preview does not
    /// resynthesize mid-generation
    pub generating: bool,
    /// Blocking notification for collaborator failures
    pub notice: Option<String>,
    /// Set while a save dialog is open
    pub pending_save: Option<SaveTarget>,
}

impl AppModel {
    pub fn new(window_width: u32, window_height: u32, config: AppConfig) -> Self {
        let opts = SynthesisOptions {
            debounce_ms: config.content_debounce_ms,
        };
        let preview = PreviewState::new(config.default_viewport);
        Self {
            config,
            outputs: OutputHistory::new(),
            preview,
            editor: EditController::new(),
            sandbox: SandboxSession::new(opts),
            source: SourceDocument::default(),
            active_tab: ActiveTab::default(),
            window_size: (window_width, window_height),
            generating: false,
            notice: None,
            pending_save: None,
        }
    }

    /// Code and format of the active output, when one exists
    pub fn active_code(&self) -> Option<(&str, Format)> {
        self.outputs
            .active()
            .map(|o| (o.code.as_str(), o.format))
    }
}
