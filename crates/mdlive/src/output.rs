//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
