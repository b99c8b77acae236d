use std::fmt;

/// Byte-offset range `[start, end)` into the text a block was parsed from.
///
/// Blocks attached at document level span the document source. Blocks nested
/// inside a table cell span that cell's accumulated content string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Extends `end` to cover `other`. `start` never moves and `end` never
    /// shrinks.
    pub fn cover(&mut self, other: Span) {
        if other.end > self.end {
            self.end = other.end;
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_empty() {
        assert_eq!(Span::new(2, 7).len(), 5);
        assert!(!Span::new(2, 7).is_empty());
        assert!(Span::new(3, 3).is_empty());
        assert_eq!(Span::new(5, 3).len(), 0);
    }

    #[test]
    fn test_cover_only_grows() {
        let mut span = Span::new(4, 10);
        span.cover(Span::new(0, 8));
        assert_eq!(span, Span::new(4, 10));
        span.cover(Span::new(12, 20));
        assert_eq!(span, Span::new(4, 20));
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::new(1, 9).to_string(), "1..9");
    }
}
