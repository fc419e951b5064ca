pub mod config;
pub mod escape;
pub mod lexer;
mod numbers;
pub mod rules;

pub use config::{Assoc, GuardAction, GuardPattern, NestedComment, NumberRules, OperatorDef, QuoteRule};
pub use escape::decode_escape;
pub use lexer::Lexer;
pub use rules::{PrecedenceTable, RuleSet, RuleSetBuilder};
