//! Markweave - preview and visually edit generated markup
//!
//! This crate hosts machine-generated documents (HTML, React, Vue) in an
//! isolated webview, following the Elm Architecture pattern: a pure
//! `update` function drives all state, and the runtime shell executes the
//! side effects it describes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod markdown;
pub mod messages;
pub mod model;
pub mod runtime;
pub mod sandbox;
pub mod services;
pub mod synthesis;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::AppConfig;
pub use messages::Msg;
pub use model::AppModel;
