//! Sandbox surface management
//!
//! Owns the wry WebView that renders generated documents in isolation. The
//! surface is a child view of the host window; the only paths across its
//! boundary are document swaps, script evaluation, and the IPC channel.

use std::rc::Rc;
use std::sync::mpsc::Sender;

use winit::window::Window;
use wry::{Rect as WryRect, WebView, WebViewBuilder};

use crate::messages::Msg;
use crate::sandbox::protocol::{self, OutboundMessage};
use crate::synthesis::bridge;

/// Surface bounds inside the host window, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The isolated preview surface
pub struct SandboxSurface {
    webview: WebView,
}

impl SandboxSurface {
    /// Create the surface as a child of the host window
    ///
    /// Raw IPC strings from the sandbox are decoded here; well-formed
    /// messages are forwarded to the update loop, everything else is
    /// dropped.
    pub fn new(
        window: &Rc<Window>,
        bounds: SurfaceBounds,
        html: &str,
        msg_tx: Sender<Msg>,
    ) -> Result<Self, wry::Error> {
        let scale_factor = window.scale_factor();
        let window_height = window.inner_size().height;

        let webview = WebViewBuilder::new()
            .with_html(html)
            .with_bounds(to_wry_rect(bounds, scale_factor, window_height))
            .with_transparent(false)
            .with_ipc_handler(move |request| {
                if let Some(msg) = protocol::decode(request.body()) {
                    let _ = msg_tx.send(Msg::inbound(msg));
                }
            })
            .with_navigation_handler(|url| {
                // Open external links in the default browser; the sandbox
                // document itself never navigates
                if url.starts_with("http://") || url.starts_with("https://") {
                    let _ = open::that(&url);
                    false
                } else {
                    true
                }
            })
            .build_as_child(window)?;

        Ok(Self { webview })
    }

    /// Replace the surface's document wholesale
    pub fn swap_document(&self, html: &str) {
        if let Err(e) = self.webview.load_html(html) {
            tracing::error!("Failed to swap sandbox document: {}", e);
        }
    }

    /// Deliver one protocol message into the sandbox
    ///
    /// A no-op inside the sandbox when no bridge is installed (document
    /// still loading, or a diagnostic document).
    pub fn post(&self, msg: &OutboundMessage) {
        let script = bridge::dispatch_call(&protocol::encode(msg));
        if let Err(e) = self.webview.evaluate_script(&script) {
            tracing::warn!("Failed to post message to sandbox: {}", e);
        }
    }

    /// Run a host-injected script in the sandbox document
    pub fn evaluate(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            tracing::warn!("Failed to evaluate script in sandbox: {}", e);
        }
    }

    /// Move/resize the surface within the host window
    pub fn set_bounds(&self, bounds: SurfaceBounds, scale_factor: f64, window_height: u32) {
        let _ = self
            .webview
            .set_bounds(to_wry_rect(bounds, scale_factor, window_height));
    }

    pub fn set_visible(&self, visible: bool) {
        let _ = self.webview.set_visible(visible);
    }

    /// Native print of the sandbox document (PDF export path)
    pub fn print(&self) {
        if let Err(e) = self.webview.print() {
            tracing::warn!("Failed to print sandbox document: {}", e);
        }
    }
}

/// Convert physical-pixel bounds to wry's Rect.
///
/// wry's set_bounds expects logical points; on macOS NSView uses a
/// bottom-left origin, so the Y coordinate is flipped.
fn to_wry_rect(bounds: SurfaceBounds, scale_factor: f64, window_height_px: u32) -> WryRect {
    use wry::dpi::{LogicalPosition, LogicalSize};

    let logical_x = bounds.x / scale_factor;
    let logical_w = bounds.width / scale_factor;
    let logical_h = bounds.height / scale_factor;

    let logical_y = if cfg!(target_os = "macos") {
        let window_height_logical = window_height_px as f64 / scale_factor;
        window_height_logical - (bounds.y / scale_factor + logical_h)
    } else {
        bounds.y / scale_factor
    };

    WryRect {
        position: LogicalPosition::new(logical_x, logical_y).into(),
        size: LogicalSize::new(logical_w, logical_h).into(),
    }
}
