//! External collaborator seams
//!
//! Generation and element rewriting are performed by external services the
//! host only talks to through these traits. Both are request/response with
//! string errors; results come back into the update loop as messages.

/// Produces a complete document in one format from a source document
pub trait GenerationService: Send + Sync {
    /// Generate code for `format` from the source text
    ///
    /// Blocking; the runtime calls this off the event loop thread.
    fn generate(&self, source: &str, format_hint: &str) -> Result<String, String>;
}

/// Stand-in used when no generation backend is configured
#[derive(Debug, Default)]
pub struct UnconfiguredGenerationService;

impl GenerationService for UnconfiguredGenerationService {
    fn generate(&self, _source: &str, _format_hint: &str) -> Result<String, String> {
        Err("No generation service is configured".to_string())
    }
}

/// Rewrites one element's markup from a natural-language instruction
pub trait RewriteService: Send + Sync {
    /// Return a replacement for `outer_html` following `instruction`
    ///
    /// Blocking; the runtime calls this off the event loop thread. The
    /// result must be a standalone HTML fragment.
    fn rewrite(&self, outer_html: &str, instruction: &str) -> Result<String, String>;
}

/// Stand-in used when no rewrite backend is configured
#[derive(Debug, Default)]
pub struct UnconfiguredRewriteService;

impl RewriteService for UnconfiguredRewriteService {
    fn rewrite(&self, _outer_html: &str, _instruction: &str) -> Result<String, String> {
        Err("No rewrite service is configured".to_string())
    }
}
