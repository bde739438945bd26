use std::fmt;

/// Location of a character in a GraphQL source: byte offset, line and
/// column, all zero-based.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    index: usize,
    line: usize,
    col: usize,
}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(index: usize, line: usize, col: usize) -> Self {
        Self { index, line, col }
    }

    /// First character of a source.
    #[doc(hidden)]
    pub fn new_origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Steps over `ch`, wrapping to the next line on `\n`.
    #[doc(hidden)]
    pub fn advance(&mut self, ch: char) {
        self.index += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
    }

    /// Byte offset into the source body.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Line number, zero for the first line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column in characters, zero for the first one of a line.
    pub fn column(&self) -> usize {
        self.col
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Half-open range of a source: `end` is the first position past the
/// covered text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    /// First covered position.
    pub start: SourcePosition,
    /// First position after the covered text.
    pub end: SourcePosition,
}

impl Span {
    #[doc(hidden)]
    #[inline]
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    #[doc(hidden)]
    #[inline]
    pub fn zero_width(pos: SourcePosition) -> Self {
        Self::new(pos, pos)
    }

    #[doc(hidden)]
    #[inline]
    pub fn single_width(pos: SourcePosition, ch: char) -> Self {
        let mut end = pos;
        end.advance(ch);
        Self::new(pos, end)
    }

    /// Span of nodes parsed without location tracking. All such spans are
    /// equal, so nodes compare by content alone.
    #[inline]
    pub fn unlocated() -> Self {
        Self::zero_width(SourcePosition::new_origin())
    }
}

/// An item with the [`Span`] it was parsed from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Spanning<T> {
    /// The item.
    pub item: T,
    /// Where it was found.
    pub span: Span,
}

impl<T> Spanning<T> {
    #[doc(hidden)]
    pub fn new(span: Span, item: T) -> Self {
        Self { item, span }
    }

    #[doc(hidden)]
    pub fn zero_width(&pos: &SourcePosition, item: T) -> Self {
        Self::new(Span::zero_width(pos), item)
    }

    #[doc(hidden)]
    pub fn start_end(&start: &SourcePosition, &end: &SourcePosition, item: T) -> Self {
        Self::new(Span::new(start, end), item)
    }

    #[doc(hidden)]
    pub fn unlocated(item: T) -> Self {
        Self::new(Span::unlocated(), item)
    }

    /// Where the item starts.
    #[inline]
    pub fn start(&self) -> SourcePosition {
        self.span.start
    }

    /// First position after the item.
    #[inline]
    pub fn end(&self) -> SourcePosition {
        self.span.end
    }

    /// Transforms the item, keeping its span.
    pub fn map<O, F: FnOnce(T) -> O>(self, f: F) -> Spanning<O> {
        Spanning::new(self.span, f(self.item))
    }
}

impl<T: fmt::Display> fmt::Display for Spanning<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. At {}", self.item, self.span.start)
    }
}

impl<T: std::error::Error> std::error::Error for Spanning<T> {}

#[cfg(test)]
mod tests {
    use super::{SourcePosition, Span, Spanning};

    #[test]
    fn advance_counts_bytes_and_characters() {
        let mut pos = SourcePosition::new_origin();
        for ch in "aé\nb".chars() {
            pos.advance(ch);
        }

        assert_eq!(pos, SourcePosition::new(5, 1, 1));
    }

    #[test]
    fn unlocated_spans_are_equal() {
        assert_eq!(Spanning::unlocated("x"), Spanning::unlocated("x"));
        assert_ne!(
            Spanning::zero_width(&SourcePosition::new(3, 0, 3), "x"),
            Spanning::unlocated("x"),
        );
        assert_eq!(
            Span::single_width(SourcePosition::new_origin(), '{').end,
            SourcePosition::new(1, 0, 1),
        );
    }

    #[test]
    fn display_points_at_start() {
        let s = Spanning::start_end(
            &SourcePosition::new(12, 2, 4),
            &SourcePosition::new(14, 2, 6),
            "Unexpected \"}\"",
        );

        assert_eq!(s.to_string(), "Unexpected \"}\". At 2:4");
    }
}
