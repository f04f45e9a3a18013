//! Sandbox boundary: message protocol, echo suppression, session state
//!
//! The sandbox only ever *proposes* new canonical code via content reports;
//! the host decides, through the echo guard, whether to accept it.

pub mod echo;
pub mod protocol;
pub mod session;

pub use echo::{EchoGuard, EchoVerdict};
pub use protocol::{InboundMessage, OutboundMessage, SelectedElement};
pub use session::SandboxSession;
