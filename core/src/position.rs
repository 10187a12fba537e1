//! Source positions and offset translation between derived expression
//! strings and the original text they were extracted from.
//!
//! A [`PositionMapping`] is a chain of [`OffsetTransform`]s. The first
//! transform takes an offset in the derived string one level closer to the
//! original; the last one lands in the original text. Nested template
//! sub-expressions therefore build their mapping by prepending a shift to
//! the parent's chain.

use core::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }

    pub fn start(&self) -> usize {
        self.0.start
    }

    pub fn end(&self) -> usize {
        self.0.end
    }

    pub fn len(&self) -> usize {
        self.0.end - self.0.start
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

/// One invertible step of a [`PositionMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetTransform {
    /// The derived string starts `by` bytes into its parent.
    Shift { by: usize },
}

impl OffsetTransform {
    fn apply(self, offset: usize) -> usize {
        match self {
            OffsetTransform::Shift { by } => offset + by,
        }
    }

    /// Total inverse: offsets before the start of the derived string clamp to 0.
    fn invert(self, offset: usize) -> usize {
        match self {
            OffsetTransform::Shift { by } => offset.saturating_sub(by),
        }
    }
}

/// Invertible offset translator between a derived expression string and its
/// original source. The empty chain is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMapping {
    transforms: Vec<OffsetTransform>,
}

impl PositionMapping {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.transforms
            .iter()
            .all(|t| matches!(t, OffsetTransform::Shift { by: 0 }))
    }

    pub fn transforms(&self) -> &[OffsetTransform] {
        &self.transforms
    }

    /// Mapping for a string found at `local_offset` inside the string this
    /// mapping describes: `shift ∘ self ∘ shift⁻¹`.
    pub fn nested(&self, local_offset: usize) -> Self {
        let mut transforms = Vec::with_capacity(self.transforms.len() + 1);
        transforms.push(OffsetTransform::Shift { by: local_offset });
        transforms.extend_from_slice(&self.transforms);
        Self { transforms }
    }

    /// Translate an offset in the derived string to the original source.
    pub fn to_original(&self, offset: usize) -> usize {
        self.transforms.iter().fold(offset, |acc, t| t.apply(acc))
    }

    /// Translate an offset in the original source back to the derived string.
    pub fn to_derived(&self, offset: usize) -> usize {
        self.transforms.iter().rev().fold(offset, |acc, t| t.invert(acc))
    }

    pub fn span_to_original(&self, span: &Span) -> Span {
        Span::new(self.to_original(span.start()), self.to_original(span.end()))
    }
}

/// 1-based line number of `offset` in `source`. Offsets past the end report
/// the last line.
pub fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}
