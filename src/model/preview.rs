//! Preview pane state: viewport geometry and loading lifecycle
//!
//! The loading indicator is bounded: it clears on the sandbox ready signal
//! or on a fixed timeout, whichever comes first. Both carry the generation
//! counter of the document swap they belong to, so a signal from a document
//! that has already been replaced can never clear a newer loading state.

use serde::{Deserialize, Serialize};

use super::output::OutputId;

/// Named viewport sizes for the preview surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewportPreset {
    #[default]
    Responsive,
    Mobile,
    Tablet,
    Desktop,
    A4,
    Letter,
    /// Set implicitly by rotating or manual resize
    Custom,
}

impl ViewportPreset {
    /// Pixel dimensions of the preset, if it has fixed ones
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            ViewportPreset::Responsive => Some((1000, 800)),
            ViewportPreset::Mobile => Some((375, 667)),
            ViewportPreset::Tablet => Some((768, 1024)),
            ViewportPreset::Desktop => Some((1440, 900)),
            ViewportPreset::A4 => Some((794, 1123)),
            ViewportPreset::Letter => Some((816, 1056)),
            ViewportPreset::Custom => None,
        }
    }
}

/// Preview viewport: preset plus concrete pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub preset: ViewportPreset,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(preset: ViewportPreset) -> Self {
        let (width, height) = preset.dimensions().unwrap_or((1000, 800));
        Self {
            preset,
            width,
            height,
        }
    }

    /// Apply a named preset, replacing any custom size
    pub fn apply_preset(&mut self, preset: ViewportPreset) {
        if let Some((w, h)) = preset.dimensions() {
            self.width = w;
            self.height = h;
        }
        self.preset = preset;
    }

    /// Swap width and height (portrait/landscape); the result is Custom
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
        self.preset = ViewportPreset::Custom;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportPreset::default())
    }
}

/// State of the preview pane on the host side
#[derive(Debug)]
pub struct PreviewState {
    pub viewport: Viewport,
    /// True while waiting for the sandbox ready signal
    pub loading: bool,
    /// Incremented on every document swap; stale ready/timeout signals are
    /// matched against this and dropped
    pub generation: u64,
    /// Scroll offset last reported by the sandbox, restored on resynthesis
    pub scroll_top: f64,
    /// Whether visual edit mode is enabled
    pub edit_mode: bool,
    /// Output id and revision of the last document handed to the sandbox
    last_synthesized: Option<(OutputId, u64)>,
}

impl PreviewState {
    pub fn new(preset: ViewportPreset) -> Self {
        Self {
            viewport: Viewport::new(preset),
            loading: false,
            generation: 0,
            scroll_top: 0.0,
            edit_mode: false,
            last_synthesized: None,
        }
    }

    /// Does this (output, revision) pair differ from the document currently
    /// in the sandbox?
    pub fn needs_refresh(&self, output_id: OutputId, revision: u64) -> bool {
        self.last_synthesized != Some((output_id, revision))
    }

    /// Record a document swap: bumps the generation and enters loading
    ///
    /// Returns the new generation, to be carried by the matching ready
    /// timeout command.
    pub fn begin_swap(&mut self, output_id: OutputId, revision: u64) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.last_synthesized = Some((output_id, revision));
        self.generation
    }

    /// Mark an in-place edit as already represented in the sandbox, so the
    /// next refresh check does not resynthesize what the user just typed
    pub fn mark_synthesized(&mut self, output_id: OutputId, revision: u64) {
        self.last_synthesized = Some((output_id, revision));
    }

    /// Clear the loading state if `generation` is still current
    ///
    /// Returns true when the signal was accepted.
    pub fn resolve_loading(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.loading {
            self.loading = false;
            true
        } else {
            false
        }
    }
}

impl Default for PreviewState {
    fn default() -> Self {
        Self::new(ViewportPreset::default())
    }
}
