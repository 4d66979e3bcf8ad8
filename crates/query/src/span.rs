//! Inclusive character intervals.

use std::fmt;
use std::iter::once;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// An inclusive `[start, end]` interval of character indices.
///
/// Both bounds count Unicode scalar values. A span always covers at least one
/// character: `start <= end` is checked on construction and on
/// deserialization.
///
/// ```rust
/// use query::Span;
///
/// let span = Span::new(3, 5).unwrap();
/// assert_eq!(span.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
/// assert_eq!(span.slice("abcdefg"), Some("def"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct Span {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawSpan {
    start: usize,
    end: usize,
}

impl TryFrom<RawSpan> for Span {
    type Error = QueryError;

    fn try_from(raw: RawSpan) -> Result<Self, Self::Error> {
        Span::new(raw.start, raw.end)
    }
}

impl Span {
    pub fn new(start: usize, end: usize) -> Result<Self, QueryError> {
        if end < start {
            return Err(QueryError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of characters covered, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        (self.end - self.start).saturating_add(1)
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The covered indices, `start` through `end`.
    pub fn iter(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The span moved right by `base` characters, or `None` on overflow.
    pub fn offset_by(&self, base: usize) -> Option<Span> {
        Some(Span {
            start: self.start.checked_add(base)?,
            end: self.end.checked_add(base)?,
        })
    }

    /// The span expressed relative to the start of `outer`, if it lies inside it.
    pub fn relative_to(&self, outer: &Span) -> Option<Span> {
        outer.contains(self).then(|| Span {
            start: self.start - outer.start,
            end: self.end - outer.start,
        })
    }

    /// The covered characters of `text`, or `None` if the span runs past its end.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        let mut bounds = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(once(text.len()));
        let start = bounds.nth(self.start)?;
        let end = bounds.nth(self.end - self.start)?;
        Some(&text[start..end])
    }
}

impl IntoIterator for Span {
    type Item = usize;
    type IntoIter = RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &Span {
    type Item = usize;
    type IntoIter = RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
