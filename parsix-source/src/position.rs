use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::ParseFailure;

/// Relation between two cursors over the same (or different) sources.
///
/// `Forward` means the *other* cursor has consumed more of the input than
/// `self`; `Behind` is the mirror image. Cursors over different sources, or
/// over suffixes that cannot belong to the same text, are `Irrelevant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionOrder {
    Equal,
    Forward,
    Behind,
    Irrelevant,
}

/// A cursor for traversing source text during lexing and parsing.
///
/// The buffer is shared through an `Arc<str>` so that clones are cheap and
/// speculative branches can advance an independent copy. Carriage returns are
/// stripped at construction, so the cursor only ever sees `\n` line endings.
#[derive(Debug, Clone)]
pub struct SourcePosition {
    source: Arc<str>,
    name: Arc<str>,
    offset: usize,
    line: usize,
    column: usize,
}

impl SourcePosition {
    /// Creates a cursor at the start of `source`, normalizing CRLF to LF.
    pub fn new<S: AsRef<str>>(source: S, name: &str) -> Self {
        let cleaned: String = source.as_ref().chars().filter(|c| *c != '\r').collect();
        Self {
            source: Arc::<str>::from(cleaned),
            name: Arc::<str>::from(name),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Creates an anonymously named cursor.
    pub fn anonymous<S: AsRef<str>>(source: S) -> Self {
        Self::new(source, "<input>")
    }

    /// Returns the source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source name as a shared handle, for embedding in tokens.
    pub fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Current line, 1-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column, 1-based, reset by every newline.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Byte offset from the start of the (normalized) source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the cursor is at the end of the input.
    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Returns the next character without advancing the cursor.
    pub fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the unconsumed suffix of the source.
    pub fn rest(&self) -> &str {
        &self.source[self.offset..]
    }

    /// Advances the cursor by one character and returns it.
    ///
    /// Advancing past the end of the input is an error, not a no-op.
    pub fn advance(&mut self) -> Result<char, ParseFailure> {
        let ch = self
            .current_char()
            .ok_or_else(|| ParseFailure::unexpected_eof(&self.name))?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Ok(ch)
    }

    /// Advances the cursor by `n` characters.
    pub fn advance_by(&mut self, n: usize) -> Result<(), ParseFailure> {
        for _ in 0..n {
            self.advance()?;
        }
        Ok(())
    }

    /// Overwrites this cursor in place, committing a speculative branch.
    pub fn assign(&mut self, other: &SourcePosition) {
        *self = other.clone();
    }

    /// Compares the progress of two cursors.
    ///
    /// Cursors are `Equal` when they name the same source, see the same
    /// remaining suffix and agree on line/column. One cursor is `Forward` of
    /// another when the other's suffix is a proper suffix of its own, i.e.
    /// the other has consumed more.
    pub fn compare_to(&self, other: &SourcePosition) -> PositionOrder {
        if self.name != other.name {
            return PositionOrder::Irrelevant;
        }
        if Arc::ptr_eq(&self.source, &other.source) || self.source == other.source {
            return match self.offset.cmp(&other.offset) {
                Ordering::Equal => {
                    if self.line == other.line && self.column == other.column {
                        PositionOrder::Equal
                    } else {
                        PositionOrder::Irrelevant
                    }
                }
                Ordering::Less => PositionOrder::Forward,
                Ordering::Greater => PositionOrder::Behind,
            };
        }
        let mine = self.rest();
        let theirs = other.rest();
        if mine == theirs {
            if self.line == other.line && self.column == other.column {
                PositionOrder::Equal
            } else {
                PositionOrder::Irrelevant
            }
        } else if mine.ends_with(theirs) {
            PositionOrder::Forward
        } else if theirs.ends_with(mine) {
            PositionOrder::Behind
        } else {
            PositionOrder::Irrelevant
        }
    }
}
