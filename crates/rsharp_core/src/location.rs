//! Line/column source locations and spans.
//!
//! These types are used throughout the front-end to track where tokens,
//! AST nodes, and diagnostics originate in the source code. Lines and
//! columns are 1-based; `Location::NONE` (0,0) marks a location that was
//! never stamped.

use std::fmt;

/// A position in source text, as the lexer reports it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Location {
    /// The null location, used before a node's span has been stamped.
    pub const NONE: Location = Location { line: 0, column: 0 };

    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Whether this location was ever stamped.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// A half-open source span, `start ≤ end`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub const NONE: Span = Span {
        start: Location::NONE,
        end: Location::NONE,
    };

    #[inline]
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// An empty span at a single position.
    #[inline]
    pub fn at(loc: Location) -> Self {
        Self { start: loc, end: loc }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start.is_valid()
    }

    /// Whether the given location falls inside this span (inclusive of
    /// both ends, since the end location names the last consumed token's
    /// end rather than one past it).
    pub fn contains(&self, loc: Location) -> bool {
        self.start <= loc && loc <= self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn encloses(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The smallest span covering both spans.
    pub fn union(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_ordering() {
        let a = Location::new(1, 5);
        let b = Location::new(1, 9);
        let c = Location::new(2, 1);
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn span_contains_and_encloses() {
        let outer = Span::new(Location::new(1, 1), Location::new(4, 2));
        let inner = Span::new(Location::new(2, 3), Location::new(3, 7));
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
        assert!(outer.contains(Location::new(4, 2)));
        assert!(!outer.contains(Location::new(4, 3)));
    }

    #[test]
    fn span_union() {
        let a = Span::new(Location::new(1, 1), Location::new(1, 8));
        let b = Span::new(Location::new(1, 4), Location::new(2, 2));
        let u = a.union(&b);
        assert_eq!(u.start, Location::new(1, 1));
        assert_eq!(u.end, Location::new(2, 2));
    }
}
