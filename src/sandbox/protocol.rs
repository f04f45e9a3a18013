//! Message protocol across the sandbox isolation boundary
//!
//! Tagged JSON union, one message per call, no batching. Each variant is
//! addressed to exactly one side: `OutboundMessage` travels host→sandbox,
//! `InboundMessage` travels sandbox→host. Messages of unexpected shape are
//! dropped silently; the protocol is fire-and-forget.

use serde::{Deserialize, Serialize};

/// Bounding rectangle of an element, in sandbox viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Descriptor of the element currently selected in the sandbox
///
/// Ephemeral: lives only between a selection event and the next
/// selection or deselection. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedElement {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    #[serde(rename = "className", default)]
    pub class_name: String,
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
    #[serde(rename = "innerText", default)]
    pub inner_text: String,
    pub rect: ElementRect,
}

/// Host → sandbox messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Enable or disable visual edit mode inside the sandbox
    #[serde(rename = "TOGGLE_EDIT_MODE")]
    ToggleEditMode { enabled: bool },

    /// Hide the overlay and revoke content-editability, keeping content
    #[serde(rename = "HIDE_OVERLAY")]
    HideOverlay,

    /// Run a rich-text command against the current selection
    #[serde(rename = "EXEC_COMMAND")]
    ExecCommand {
        command: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    /// Replace the selected element's markup or class list
    ///
    /// Exactly one of the two fields is set per message.
    #[serde(rename = "UPDATE_ELEMENT")]
    UpdateElement {
        #[serde(skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
    },
}

impl OutboundMessage {
    /// Full outer-HTML replacement of the selected element
    pub fn replace_html(html: impl Into<String>) -> Self {
        OutboundMessage::UpdateElement {
            html: Some(html.into()),
            class_name: None,
        }
    }

    /// Class-attribute-only rewrite of the selected element
    pub fn replace_class(class_name: impl Into<String>) -> Self {
        OutboundMessage::UpdateElement {
            html: None,
            class_name: Some(class_name.into()),
        }
    }
}

/// Sandbox → host messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// An element was click-selected in edit mode
    #[serde(rename = "ELEMENT_SELECTED")]
    ElementSelected { payload: SelectedElement },

    /// The live document changed; carries the full serialized markup
    #[serde(rename = "CONTENT_UPDATED")]
    ContentUpdated {
        html: String,
        #[serde(rename = "scrollTop", default)]
        scroll_top: f64,
    },

    /// The document's setup path finished (success or caught failure)
    #[serde(rename = "PREVIEW_READY")]
    PreviewReady,

    /// Result of an image capture request; `data_url` is empty on failure
    #[serde(rename = "IMAGE_CAPTURED")]
    ImageCaptured {
        #[serde(rename = "dataUrl", default)]
        data_url: String,
    },
}

/// Serialize an outbound message for delivery into the sandbox
pub fn encode(msg: &OutboundMessage) -> String {
    // These variants contain nothing unserializable; an empty object is the
    // harmless fallback the dispatch entry point ignores.
    serde_json::to_string(msg).unwrap_or_else(|_| "{}".to_string())
}

/// Parse a raw IPC string from the sandbox
///
/// Returns None for anything that is not a well-formed inbound message;
/// malformed traffic is logged at debug level and otherwise ignored.
pub fn decode(raw: &str) -> Option<InboundMessage> {
    match serde_json::from_str(raw) {
        Ok(msg) => Some(msg),
        Err(e) => {
            tracing::debug!("Dropping malformed sandbox message: {}", e);
            None
        }
    }
}
