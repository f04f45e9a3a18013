//! Generated output versions and the closed format set
//!
//! The canonical `code` string for the preview always lives in the active
//! output. Edits reported back by the sandbox supersede the active output's
//! code; they never mutate historical snapshots observed by callers.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Target format of a generated output
///
/// Closed set: every format has exactly one synthesis adapter, dispatched
/// exhaustively. Adding a variant without an adapter is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// Self-contained HTML document (may carry inline CSS/JS)
    #[default]
    StaticHtml,
    /// Bare HTML without styling
    PlainHtml,
    /// React component source (TSX), compiled in the sandbox
    ReactComponent,
    /// Vue 3 single-file component, loaded in the sandbox
    VueSfc,
}

impl Format {
    /// Human-readable label for tabs and dropdowns
    pub fn label(&self) -> &'static str {
        match self {
            Format::StaticHtml => "HTML",
            Format::PlainHtml => "Plain HTML",
            Format::ReactComponent => "React",
            Format::VueSfc => "Vue",
        }
    }

    /// Suggested file name when downloading the code
    pub fn file_name(&self) -> &'static str {
        match self {
            Format::StaticHtml | Format::PlainHtml => "index.html",
            Format::ReactComponent => "App.tsx",
            Format::VueSfc => "App.vue",
        }
    }

    /// Guess a format from a file extension, if recognizable
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext {
            "html" | "htm" => Some(Format::StaticHtml),
            "tsx" | "jsx" => Some(Format::ReactComponent),
            "vue" => Some(Format::VueSfc),
            _ => None,
        }
    }
}

/// Identifies one generated output version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u64);

/// One generated document version
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    pub id: OutputId,
    pub format: Format,
    pub code: String,
    /// Milliseconds since the Unix epoch, set when produced or superseded
    pub timestamp: u64,
    /// Bumped on every code change; drives resynthesis gating
    pub revision: u64,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// All output versions of the current session, newest id last
#[derive(Debug, Default)]
pub struct OutputHistory {
    outputs: Vec<GeneratedOutput>,
    active_id: Option<OutputId>,
    next_id: u64,
}

impl OutputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly generated output and make it active
    pub fn push(&mut self, format: Format, code: String) -> OutputId {
        let id = OutputId(self.next_id);
        self.next_id += 1;
        self.outputs.push(GeneratedOutput {
            id,
            format,
            code,
            timestamp: now_ms(),
            revision: 0,
        });
        self.active_id = Some(id);
        id
    }

    /// The currently active output, if any
    pub fn active(&self) -> Option<&GeneratedOutput> {
        self.active_id
            .and_then(|id| self.outputs.iter().find(|o| o.id == id))
    }

    pub fn active_id(&self) -> Option<OutputId> {
        self.active_id
    }

    pub fn get(&self, id: OutputId) -> Option<&GeneratedOutput> {
        self.outputs.iter().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Switch the active output. Returns false for an unknown id.
    pub fn select(&mut self, id: OutputId) -> bool {
        if self.outputs.iter().any(|o| o.id == id) {
            self.active_id = Some(id);
            true
        } else {
            false
        }
    }

    /// Replace the active output's code with an edited version
    ///
    /// The previous code string is superseded: timestamp and revision move
    /// forward so the preview knows the canonical document changed.
    pub fn supersede_active(&mut self, code: String) -> bool {
        let Some(id) = self.active_id else {
            return false;
        };
        let Some(output) = self.outputs.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        output.code = code;
        output.timestamp = now_ms();
        output.revision += 1;
        true
    }

    /// Delete an output version
    ///
    /// Refused when it would delete the last remaining version. If the
    /// active output is deleted, the newest remaining one becomes active.
    pub fn delete(&mut self, id: OutputId) -> bool {
        if self.outputs.len() <= 1 {
            return false;
        }
        let Some(idx) = self.outputs.iter().position(|o| o.id == id) else {
            return false;
        };
        self.outputs.remove(idx);
        if self.active_id == Some(id) {
            self.active_id = self
                .outputs
                .iter()
                .max_by_key(|o| (o.timestamp, o.id))
                .map(|o| o.id);
        }
        true
    }

    /// Outputs of one format, newest first (for the version dropdown)
    pub fn by_format(&self, format: Format) -> Vec<&GeneratedOutput> {
        let mut group: Vec<&GeneratedOutput> =
            self.outputs.iter().filter(|o| o.format == format).collect();
        group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        group
    }

    /// All formats that currently have at least one output
    pub fn formats(&self) -> Vec<Format> {
        let mut seen = Vec::new();
        for o in &self.outputs {
            if !seen.contains(&o.format) {
                seen.push(o.format);
            }
        }
        seen
    }
}
