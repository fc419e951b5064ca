//! parsix: a rule-driven lexer plus a monadic parser-combinator library for
//! building recursive-descent parsers of programming-language-like text.
//!
//! The lexer is configured declaratively through [`RuleSet::builder`]:
//! keywords, operators with precedence, quoted strings with escapes, line
//! and block comments, and numeric literals with "no-follow" guards. The
//! combinators compose parsers from tokens into arbitrary result values
//! with predictable backtracking: a branch that failed after consuming
//! input is final unless wrapped in [`attempt`].
//!
//! ```
//! use std::sync::Arc;
//! use parsix::{token, NumberRules, RuleSet, INTEGER};
//!
//! let rules = Arc::new(
//!     RuleSet::builder()
//!         .numbers(NumberRules::default())
//!         .build()
//!         .unwrap(),
//! );
//! let number = token(INTEGER).translate(|t| t.literal.parse::<i64>().unwrap());
//! let value = parsix::parse_str(&rules, "42", "readme", &number).unwrap();
//! assert_eq!(value, 42);
//! ```

use std::sync::Arc;

pub use parsix_lexer::{
    decode_escape, Assoc, GuardAction, GuardPattern, Lexer, NestedComment, NumberRules,
    OperatorDef, PrecedenceTable, QuoteRule, RuleSet, RuleSetBuilder,
};
pub use parsix_parser::{
    any_token, attempt, chain_left_more, chain_right_more, choices, combine2, combine3, combine4,
    combine_many, eof, if_else, lazy, many, many_end_with, many_separated, many_with_limit, more,
    more_end_with, more_separated, more_separated_optional_end, optional, parallel, string, test,
    token, token_literal, translate, trivial, BinaryOp, IntoParser, Parser, DEFAULT_MAX_REPEAT,
};
pub use parsix_source::{
    keyword_kind, quoted_by_kind, ConfigError, ParseFailure, PositionOrder, SourcePosition, Token,
    FLOAT, INTEGER, NUMBER_NO_FOLLOW,
};

/// Builds a lexer over `source` and runs `parser` against it once.
pub fn parse_str<T: 'static>(
    rules: &Arc<RuleSet>,
    source: &str,
    name: &str,
    parser: &Parser<T>,
) -> Result<T, ParseFailure> {
    let mut lexer = Lexer::new(Arc::clone(rules), source, name);
    parser.parse(&mut lexer)
}
