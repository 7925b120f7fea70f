//! Offset-based edits against an immutable byte buffer.
//!
//! Edits are recorded against offsets in the original bytes and applied in a
//! single forward pass, so earlier edits never shift later offsets.

use std::fmt;

/// One pending change to the original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    Insert { offset: usize, text: String },
    Replace { start: usize, end: usize, text: String },
}

impl EditOperation {
    fn span(&self) -> (usize, usize) {
        match self {
            Self::Insert { offset, .. } => (*offset, *offset),
            Self::Replace { start, end, .. } => (*start, *end),
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Insert { text, .. } | Self::Replace { text, .. } => text,
        }
    }
}

/// Edits that cannot be applied to the buffer they were recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditConflict {
    OutOfBounds { start: usize, end: usize, len: usize },
    Overlap { first: (usize, usize), second: (usize, usize) },
}

impl fmt::Display for EditConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { start, end, len } => {
                write!(f, "edit [{start},{end}) outside buffer of {len} bytes")
            }
            Self::Overlap { first, second } => write!(
                f,
                "overlapping edits [{},{}) and [{},{})",
                first.0, first.1, second.0, second.1
            ),
        }
    }
}

impl std::error::Error for EditConflict {}

#[derive(Debug)]
pub struct EditBuffer<'a> {
    original: &'a [u8],
    edits: Vec<EditOperation>,
}

impl<'a> EditBuffer<'a> {
    pub fn new(original: &'a [u8]) -> Self {
        Self {
            original,
            edits: Vec::new(),
        }
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.edits.push(EditOperation::Insert {
            offset,
            text: text.into(),
        });
    }

    pub fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.edits.push(EditOperation::Replace {
            start,
            end,
            text: text.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Materialize all edits in ascending offset order.
    ///
    /// The sort is stable on `(start, end)`, so an insert recorded at the
    /// start of a replaced span lands before the replacement text.
    pub fn apply(mut self) -> Result<Vec<u8>, EditConflict> {
        let len = self.original.len();
        self.edits.sort_by_key(EditOperation::span);

        let extra: usize = self.edits.iter().map(|edit| edit.text().len()).sum();
        let mut out = Vec::with_capacity(len + extra);
        let mut cursor = 0usize;
        let mut prev: Option<(usize, usize)> = None;

        for edit in &self.edits {
            let (start, end) = edit.span();
            if start > end || end > len {
                return Err(EditConflict::OutOfBounds { start, end, len });
            }
            if start < cursor {
                return Err(EditConflict::Overlap {
                    first: prev.unwrap_or((cursor, cursor)),
                    second: (start, end),
                });
            }
            out.extend_from_slice(&self.original[cursor..start]);
            out.extend_from_slice(edit.text().as_bytes());
            cursor = end;
            prev = Some((start, end));
        }
        out.extend_from_slice(&self.original[cursor..]);
        Ok(out)
    }
}
