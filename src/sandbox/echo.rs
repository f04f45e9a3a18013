//! Echo suppression guard
//!
//! When the host pushes a mutation into the sandbox (an element rewrite, a
//! class change, a rich-text command), the bridge reports the resulting
//! document back as a `ContentUpdated` message. That report is an echo of
//! the host's own write, not a fresh user edit, and must not be merged into
//! canonical state a second time.
//!
//! Modeled as an explicit two-state machine rather than a bare flag so the
//! "discard exactly the next update" contract is auditable.

/// Verdict for one inbound `ContentUpdated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoVerdict {
    /// A genuine sandbox-originated edit; merge into canonical code
    Accept,
    /// The expected echo of a host-initiated push; drop it
    Discard,
}

/// Two-state echo suppression machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoGuard {
    /// No host push outstanding
    #[default]
    Idle,
    /// A host push is in flight; the next content report is its echo
    AwaitingEcho,
}

impl EchoGuard {
    pub fn new() -> Self {
        EchoGuard::Idle
    }

    /// Arm the guard immediately before a host-initiated mutation is pushed
    ///
    /// Arming while already armed stays in `AwaitingEcho`: overlapping host
    /// pushes collapse into one suppression, matching the debounced single
    /// report the bridge emits for a burst of pushes.
    pub fn arm(&mut self) {
        *self = EchoGuard::AwaitingEcho;
    }

    /// Judge an inbound `ContentUpdated`, consuming the armed state
    pub fn observe(&mut self) -> EchoVerdict {
        match *self {
            EchoGuard::Idle => EchoVerdict::Accept,
            EchoGuard::AwaitingEcho => {
                *self = EchoGuard::Idle;
                EchoVerdict::Discard
            }
        }
    }

    /// Drop any armed state, e.g. when the document is replaced wholesale
    /// and the pending echo will never arrive
    pub fn reset(&mut self) {
        *self = EchoGuard::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_accepts() {
        let mut guard = EchoGuard::new();
        assert_eq!(guard.observe(), EchoVerdict::Accept);
        assert_eq!(guard.observe(), EchoVerdict::Accept);
    }

    #[test]
    fn test_armed_discards_exactly_once() {
        let mut guard = EchoGuard::new();
        guard.arm();
        assert_eq!(guard.observe(), EchoVerdict::Discard);
        assert_eq!(guard.observe(), EchoVerdict::Accept);
    }

    #[test]
    fn test_overlapping_pushes_collapse() {
        let mut guard = EchoGuard::new();
        guard.arm();
        guard.arm();
        assert_eq!(guard.observe(), EchoVerdict::Discard);
        assert_eq!(guard.observe(), EchoVerdict::Accept);
    }

    #[test]
    fn test_reset_disarms() {
        let mut guard = EchoGuard::new();
        guard.arm();
        guard.reset();
        assert_eq!(guard.observe(), EchoVerdict::Accept);
    }
}
