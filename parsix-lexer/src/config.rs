use std::fmt;
use std::sync::Arc;

use parsix_source::{quoted_by_kind, Token};

/// Operator associativity, recorded in the precedence table for consumers
/// implementing precedence climbing. The lexer itself never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    #[default]
    None,
    Left,
    Right,
}

/// A guard pattern: either a literal lexeme matched by string equality, or a
/// regular expression tried in declared order after all literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPattern {
    Literal(String),
    Regex(String),
}

/// What a matched guard does with the bare token: tag it with a final kind,
/// or run an arbitrary transformer over it.
#[derive(Clone)]
pub enum GuardAction {
    Kind(String),
    Transform(Arc<dyn Fn(Token) -> Token + Send + Sync>),
}

impl GuardAction {
    pub(crate) fn apply(&self, bare: Token) -> Token {
        match self {
            GuardAction::Kind(kind) => bare.with_kind(kind.clone()),
            GuardAction::Transform(f) => f(bare),
        }
    }
}

impl fmt::Debug for GuardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardAction::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            GuardAction::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Configuration for the numeric literal preset.
///
/// Integer families are decimal, hexadecimal (`0x`), octal (`0o`) and binary
/// (`0b`); floats are `D+.D*` with an optional exponent. The digit separator
/// must be a single character that is not a hexadecimal digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberRules {
    pub integer: bool,
    pub float: bool,
    pub separator: Option<String>,
    pub no_follow: bool,
    pub signed: bool,
}

impl Default for NumberRules {
    fn default() -> Self {
        Self {
            integer: true,
            float: true,
            separator: Some("_".to_string()),
            no_follow: true,
            signed: false,
        }
    }
}

impl NumberRules {
    pub fn integers_only() -> Self {
        Self {
            float: false,
            ..Self::default()
        }
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn separator(mut self, separator: Option<&str>) -> Self {
        self.separator = separator.map(|s| s.to_string());
        self
    }

    pub fn no_follow(mut self, no_follow: bool) -> Self {
        self.no_follow = no_follow;
        self
    }
}

/// A quoted-string rule: opening delimiter, stop sequence, whether backslash
/// escapes are decoded and whether literal newlines are allowed in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRule {
    pub kind: String,
    pub start: String,
    pub stop: String,
    pub escape: bool,
    pub multiline: bool,
}

impl QuoteRule {
    /// A single-line escaped string delimited by `delim` on both sides.
    pub fn symmetric(delim: &str) -> Self {
        Self {
            kind: quoted_by_kind(delim),
            start: delim.to_string(),
            stop: delim.to_string(),
            escape: true,
            multiline: false,
        }
    }

    /// A single-line escaped string with distinct open and close delimiters.
    pub fn pair(start: &str, stop: &str) -> Self {
        Self {
            kind: quoted_by_kind(start),
            start: start.to_string(),
            stop: stop.to_string(),
            escape: true,
            multiline: false,
        }
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }

    pub fn escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }
}

/// A block comment delimiter pair. With `nested` set, begin/end pairs track
/// a depth counter; otherwise the first end sequence closes the comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedComment {
    pub begin: String,
    pub end: String,
    pub nested: bool,
}

/// One operator declaration inside a precedence level.
#[derive(Debug, Clone)]
pub struct OperatorDef {
    pub pattern: GuardPattern,
    pub assoc: Assoc,
}

impl OperatorDef {
    pub fn literal(op: &str) -> Self {
        Self {
            pattern: GuardPattern::Literal(op.to_string()),
            assoc: Assoc::None,
        }
    }

    pub fn pattern(regex: &str) -> Self {
        Self {
            pattern: GuardPattern::Regex(regex.to_string()),
            assoc: Assoc::None,
        }
    }

    pub fn assoc(mut self, assoc: Assoc) -> Self {
        self.assoc = assoc;
        self
    }
}
