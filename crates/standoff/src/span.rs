use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` range of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `[0,0)` marks the implicit writer agent, which has no literal text.
    pub fn is_writer_sentinel(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Re-express `self` relative to an enclosing span.
    pub fn relative_to(&self, outer: &Span) -> Option<Span> {
        outer.contains(self).then(|| Span {
            start: self.start - outer.start,
            end: self.end - outer.start,
        })
    }
}

/// Maps character offsets to byte offsets for one text.
///
/// Annotation offsets count characters, Rust slices count bytes; the table is
/// built once per document so every head lookup is O(1).
pub struct CharIndex<'a> {
    text: &'a str,
    byte_at: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut byte_at: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_at.push(text.len());
        Self { text, byte_at }
    }

    pub fn char_len(&self) -> usize {
        self.byte_at.len() - 1
    }

    /// Pull a span back inside the text, the way slicing past the end reads
    /// only up to the last character.
    pub fn clamp(&self, span: Span) -> Span {
        let len = self.char_len();
        Span {
            start: span.start.min(len),
            end: span.end.min(len),
        }
    }

    pub fn slice(&self, span: Span) -> Option<&'a str> {
        let start = *self.byte_at.get(span.start)?;
        let end = *self.byte_at.get(span.end)?;
        Some(&self.text[start..end])
    }
}
