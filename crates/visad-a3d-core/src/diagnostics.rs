//! Per-call diagnostics returned by transforms and drags.
//!
//! Instead of pushing into shared string lists, each operation returns a
//! [`Diagnostics`] value and the caller aggregates them.

/// Cursor readouts and recovered failures produced by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// `name = value` lines for the on-screen cursor readout.
    pub cursor_strings: Vec<String>,
    /// Human-readable descriptions of failures that were recovered from.
    pub exceptions: Vec<String>,
}

impl Diagnostics {
    /// Creates empty diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there is nothing to report.
    pub fn is_empty(&self) -> bool {
        self.cursor_strings.is_empty() && self.exceptions.is_empty()
    }

    /// Adds a cursor readout line.
    pub fn push_cursor(&mut self, line: impl Into<String>) {
        self.cursor_strings.push(line.into());
    }

    /// Records a recovered failure.
    pub fn push_exception(&mut self, message: impl Into<String>) {
        self.exceptions.push(message.into());
    }

    /// Appends everything from `other`.
    pub fn merge(&mut self, other: Diagnostics) {
        self.cursor_strings.extend(other.cursor_strings);
        self.exceptions.extend(other.exceptions);
    }
}

impl Extend<Diagnostics> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostics>>(&mut self, iter: I) {
        for d in iter {
            self.merge(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut a = Diagnostics::new();
        a.push_cursor("u = 1");
        let mut b = Diagnostics::new();
        b.push_exception("frame 2 missing");
        a.extend([b]);
        assert_eq!(a.cursor_strings, ["u = 1"]);
        assert_eq!(a.exceptions, ["frame 2 missing"]);
        assert!(!a.is_empty());
        assert!(Diagnostics::new().is_empty());
    }
}
