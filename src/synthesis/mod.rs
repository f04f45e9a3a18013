//! Document synthesizer: compiles generated code into executable documents
//!
//! Layered as adapter (pure per-format transform) -> document shell
//! (complete standalone HTML) -> bridge (injected editing runtime).

pub mod adapters;
pub mod bridge;
pub mod document;

pub use adapters::{AdapterError, PreparedFragment};
pub use document::{synthesize, SynthesisOptions};
