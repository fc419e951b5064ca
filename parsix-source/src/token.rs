use std::fmt;
use std::sync::Arc;

/// Kind tag for integer literals produced by the numbers preset.
pub const INTEGER: &str = "integer";

/// Kind tag for float literals produced by the numbers preset.
pub const FLOAT: &str = "float";

/// Internal kind tag marking a number glued to an identifier character.
/// The lexer converts tokens of this kind into a failure; it never escapes
/// through the public `next()` surface.
pub const NUMBER_NO_FOLLOW: &str = "__number_nofollow";

/// Kind tag for a keyword installed by the keywords preset.
pub fn keyword_kind(word: &str) -> String {
    format!("__kw_{word}")
}

/// Default kind tag for a quoted string opened by `delim`.
pub fn quoted_by_kind(delim: &str) -> String {
    format!("__quoted_by_{delim}")
}

/// A token produced by the lexer.
///
/// `kind` is a string tag, either user-chosen or one of the well-known tags
/// above. `literal` is the decoded lexeme: for quoted strings the escape
/// sequences have already been translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: String,
    pub literal: String,
    pub source_name: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        kind: impl Into<String>,
        literal: impl Into<String>,
        source_name: Arc<str>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            literal: literal.into(),
            source_name,
            line,
            column,
        }
    }

    /// Returns true if this token carries the given kind tag.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Rewrites the kind tag, keeping everything else. Used by guard
    /// transformers.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` ({})", self.literal, self.kind)
    }
}
