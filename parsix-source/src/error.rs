use thiserror::Error;

use crate::position::SourcePosition;

/// A recoverable parse failure, produced by the lexer and by every parser
/// combinator. Failures form a semigroup under [`ParseFailure::combine`],
/// which ordered-choice combinators use to aggregate the errors of the
/// branches they tried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("{source_name} - parse error at line {line}, column {column}: {msg}")]
    Syntax {
        msg: String,
        source_name: String,
        line: usize,
        column: usize,
    },

    /// End of input interrupted an in-flight token or escape sequence.
    #[error("{source_name} - parse error at line 0, column 0: unexpected end of input")]
    UnexpectedEof { source_name: String },

    /// Both branches of a `parallel` combinator succeeded over the identical
    /// span. This indicates a grammar bug, not an input bug, and is never
    /// caught by the combinators themselves.
    #[error("{source_name} - parse error at line {line}, column {column}: ambiguous grammar, both parallel branches matched the same span")]
    Ambiguous {
        source_name: String,
        line: usize,
        column: usize,
    },

    #[error("{}", format_multiple(.0))]
    Multiple(Vec<ParseFailure>),
}

fn format_multiple(failures: &[ParseFailure]) -> String {
    let mut out = format!("{} parse errors:", failures.len());
    for failure in failures {
        out.push('\n');
        out.push_str(&failure.to_string());
    }
    out
}

impl ParseFailure {
    /// A syntax failure at the given cursor position.
    pub fn at(pos: &SourcePosition, msg: impl Into<String>) -> Self {
        ParseFailure::Syntax {
            msg: msg.into(),
            source_name: pos.name().to_string(),
            line: pos.line(),
            column: pos.column(),
        }
    }

    pub fn unexpected_eof(source_name: &str) -> Self {
        ParseFailure::UnexpectedEof {
            source_name: source_name.to_string(),
        }
    }

    pub fn ambiguous_at(pos: &SourcePosition) -> Self {
        ParseFailure::Ambiguous {
            source_name: pos.name().to_string(),
            line: pos.line(),
            column: pos.column(),
        }
    }

    /// Combines two failures into a composite. Existing composites are
    /// flattened; constituents are kept in order and never deduplicated.
    pub fn combine(self, other: ParseFailure) -> ParseFailure {
        let mut items = match self {
            ParseFailure::Multiple(items) => items,
            single => vec![single],
        };
        match other {
            ParseFailure::Multiple(more) => items.extend(more),
            single => items.push(single),
        }
        ParseFailure::Multiple(items)
    }

    /// Number of underlying failures.
    pub fn count(&self) -> usize {
        match self {
            ParseFailure::Multiple(items) => items.len(),
            _ => 1,
        }
    }
}

/// An error in the declarative lexer configuration, raised while compiling a
/// rule set. These are programmer errors and are not recoverable by parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("digit separator must be a single character, got {0:?}")]
    InvalidSeparator(String),

    #[error("digit separator {0:?} collides with hexadecimal digits")]
    SeparatorIsHexDigit(char),

    #[error("quote delimiter must not be empty")]
    EmptyQuote,

    #[error("invalid guard pattern {pattern:?}: {reason}")]
    BadPattern { pattern: String, reason: String },
}
