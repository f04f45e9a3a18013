//! Host-side sandbox session
//!
//! Owns the synthesis options and the echo suppression guard for one
//! sandbox surface, and assembles the exact document string handed to it.
//! One session per surface; its state never leaks into a replacement
//! surface.

use super::echo::{EchoGuard, EchoVerdict};
use crate::model::output::Format;
use crate::synthesis::{self, bridge, SynthesisOptions};

#[derive(Debug)]
pub struct SandboxSession {
    opts: SynthesisOptions,
    echo: EchoGuard,
}

impl SandboxSession {
    pub fn new(opts: SynthesisOptions) -> Self {
        Self {
            opts,
            echo: EchoGuard::new(),
        }
    }

    /// Compile canonical code into the document for the next swap,
    /// appending a scroll-restoration script when an offset was recorded
    pub fn build_document(&self, code: &str, format: Format, scroll_top: f64) -> String {
        let mut doc = synthesis::synthesize(code, format, &self.opts);
        if scroll_top > 0.0 {
            doc.push_str(&bridge::scroll_restore_script(scroll_top));
        }
        doc
    }

    /// Arm the echo guard before a host-initiated element mutation
    pub fn arm_echo(&mut self) {
        self.echo.arm();
    }

    /// Judge an inbound content report against the guard
    pub fn observe_echo(&mut self) -> EchoVerdict {
        self.echo.observe()
    }

    /// Forget any pending echo, e.g. when the document is replaced and the
    /// report will never arrive
    pub fn reset_echo(&mut self) {
        self.echo.reset();
    }

    /// Clean sandbox-reported markup into canonical code
    ///
    /// Returns None when the report is the expected echo of a host push;
    /// otherwise the markup with every trace of the bridge stripped.
    pub fn ingest_content(&mut self, html: &str) -> Option<String> {
        match self.observe_echo() {
            EchoVerdict::Discard => {
                tracing::debug!("Discarding echoed content report");
                None
            }
            EchoVerdict::Accept => Some(bridge::strip_bridge(html)),
        }
    }
}
