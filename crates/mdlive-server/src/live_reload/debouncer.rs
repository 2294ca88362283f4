//! Change debouncing for the watched file.
//!
//! Editors emit several filesystem events per save, and some save by
//! writing a temp file and renaming it over the original. Raw events
//! within the debounce window coalesce into at most one logical change.

use std::time::{Duration, Instant};

/// Kind of change observed on the watched file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// Pending change waiting out its debounce window.
struct Pending {
    kind: ChangeKind,
    deadline: Instant,
}

/// Debouncer for the single watched path.
///
/// Owned by the consumer task; every recorded event pushes the deadline
/// out by the full window.
pub(crate) struct ChangeDebouncer {
    pending: Option<Pending>,
    window: Duration,
}

impl ChangeDebouncer {
    /// Create a debouncer with the given window.
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            pending: None,
            window,
        }
    }

    /// Record a raw event, coalescing it with any pending change.
    pub(crate) fn record(&mut self, kind: ChangeKind) {
        let deadline = Instant::now() + self.window;
        self.pending = match self.pending.take() {
            None => Some(Pending { kind, deadline }),
            Some(existing) => coalesce(existing.kind, kind).map(|kind| Pending { kind, deadline }),
        };
    }

    /// Take the pending change if its debounce window has passed.
    pub(crate) fn take_ready(&mut self) -> Option<ChangeKind> {
        if self.pending.as_ref()?.deadline <= Instant::now() {
            self.pending.take().map(|p| p.kind)
        } else {
            None
        }
    }
}

/// Coalesce two change kinds.
///
/// Returns `None` if both changes cancel out (Created + Removed: the file
/// never existed as far as serving is concerned).
#[allow(clippy::match_same_arms)]
fn coalesce(existing: ChangeKind, new: ChangeKind) -> Option<ChangeKind> {
    use ChangeKind::{Created, Modified, Removed};

    match (existing, new) {
        // Created + anything
        (Created, Created) => Some(Created),  // Duplicate
        (Created, Modified) => Some(Created), // Content included in create
        (Created, Removed) => None,           // File never existed for us

        // Modified + anything
        (Modified, Created) => Some(Created),   // File was recreated
        (Modified, Modified) => Some(Modified), // Normal debounce
        (Modified, Removed) => Some(Removed),   // File is gone

        // Removed + anything
        (Removed, Created) => Some(Created),  // File was replaced; watch must follow
        (Removed, Modified) => Some(Removed), // Invalid state, ignore new
        (Removed, Removed) => Some(Removed),  // Duplicate
    }
}
