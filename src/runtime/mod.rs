//! Runtime module - winit/platform integration
//!
//! Platform-specific code for running the host:
//! - `app` - ApplicationHandler, command execution, window management
//! - `chrome` - trusted application UI webview and its event channel
//! - `toolbar` - floating editor toolbar webview
//! - `webview` - the isolated sandbox surface

pub mod app;
pub mod chrome;
pub mod toolbar;
pub mod webview;

pub use app::App;
