//! Selection and edit controller state
//!
//! Holds the single live selected-element descriptor, the floating toolbar
//! position, and the toolbar's expansion panels. The toolbar position is
//! derived from the element's bounding rect only when a *different* element
//! is selected; dragging moves it freely and re-selection of the same
//! element never happens (the bridge swallows clicks inside the selection).

use crate::sandbox::protocol::SelectedElement;

/// Gap between the selected element's bottom edge and the toolbar
const TOOLBAR_OFFSET_PX: f64 = 8.0;
/// Toolbar width assumed when clamping to the window
const TOOLBAR_WIDTH_PX: f64 = 450.0;

/// Floating toolbar position, in host window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditorPosition {
    pub top: f64,
    pub left: f64,
}

impl EditorPosition {
    /// Anchor position derived from a freshly selected element
    pub fn from_rect(rect: &crate::sandbox::protocol::ElementRect) -> Self {
        Self {
            top: rect.top + rect.height + TOOLBAR_OFFSET_PX,
            left: rect.left.max(0.0),
        }
    }

    /// Clamp so the toolbar stays reachable inside the window
    pub fn clamped(&self, window_width: f64) -> Self {
        Self {
            top: self.top.max(0.0),
            left: self
                .left
                .min((window_width - TOOLBAR_WIDTH_PX).max(0.0))
                .max(0.0),
        }
    }
}

/// Toolbar expansion panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Natural-language AI rewrite instruction
    Ai,
    /// Class-list editor
    Style,
}

/// Rich-text commands the toolbar can dispatch into the sandbox
#[derive(Debug, Clone, PartialEq)]
pub enum RichTextCommand {
    Bold,
    Italic,
    Underline,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    ForeColor(String),
}

impl RichTextCommand {
    /// The editing command name understood by the sandbox document
    pub fn name(&self) -> &'static str {
        match self {
            RichTextCommand::Bold => "bold",
            RichTextCommand::Italic => "italic",
            RichTextCommand::Underline => "underline",
            RichTextCommand::JustifyLeft => "justifyLeft",
            RichTextCommand::JustifyCenter => "justifyCenter",
            RichTextCommand::JustifyRight => "justifyRight",
            RichTextCommand::ForeColor(_) => "foreColor",
        }
    }

    /// Optional command argument (currently only the color value)
    pub fn value(&self) -> Option<&str> {
        match self {
            RichTextCommand::ForeColor(color) => Some(color),
            _ => None,
        }
    }
}

/// In-progress toolbar drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub last_x: f64,
    pub last_y: f64,
}

/// State machine for the floating element editor
#[derive(Debug, Default)]
pub struct EditController {
    selected: Option<SelectedElement>,
    pub position: EditorPosition,
    pub drag: Option<DragState>,
    pub active_panel: Option<Panel>,
    /// Text of whichever panel is open (instruction or class string)
    pub input: String,
    /// True while an AI rewrite request is in flight
    pub ai_busy: bool,
}

impl EditController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live descriptor, if an element is selected
    pub fn selected(&self) -> Option<&SelectedElement> {
        self.selected.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Take over a new selection reported by the sandbox
    ///
    /// The toolbar snaps back to the element's rect; any open panel and
    /// in-progress drag are dropped.
    pub fn select(&mut self, element: SelectedElement) {
        self.position = EditorPosition::from_rect(&element.rect);
        self.selected = Some(element);
        self.drag = None;
        self.active_panel = None;
        self.input.clear();
    }

    /// Update the stored descriptor after a class-list push, keeping the
    /// selection (the sandbox keeps the element selected too)
    pub fn record_class_change(&mut self, class_name: &str, outer_html: String) {
        if let Some(el) = self.selected.as_mut() {
            el.class_name = class_name.to_string();
            el.outer_html = outer_html;
        }
    }

    /// Close the toolbar and clear all selection-scoped state
    pub fn close(&mut self) {
        self.selected = None;
        self.drag = None;
        self.active_panel = None;
        self.input.clear();
        self.ai_busy = false;
    }

    /// Toggle a panel open/closed; Style pre-fills the class string
    pub fn toggle_panel(&mut self, panel: Panel) {
        if self.active_panel == Some(panel) {
            self.active_panel = None;
            self.input.clear();
            return;
        }
        self.active_panel = Some(panel);
        self.input = match panel {
            Panel::Style => self
                .selected
                .as_ref()
                .map(|el| el.class_name.clone())
                .unwrap_or_default(),
            Panel::Ai => String::new(),
        };
    }

    // === Drag ===

    pub fn drag_start(&mut self, x: f64, y: f64) {
        if self.selected.is_some() {
            self.drag = Some(DragState { last_x: x, last_y: y });
        }
    }

    /// Move the toolbar by the pointer delta; position is never re-derived
    /// from the element rect while the same selection is live
    pub fn drag_move(&mut self, x: f64, y: f64) {
        if let Some(drag) = self.drag.as_mut() {
            self.position.left += x - drag.last_x;
            self.position.top += y - drag.last_y;
            drag.last_x = x;
            drag.last_y = y;
        }
    }

    pub fn drag_end(&mut self) {
        self.drag = None;
    }
}
