pub mod combinators;
pub mod parser;

pub use combinators::{
    any_token, attempt, chain_left_more, chain_right_more, choices, combine2, combine3, combine4,
    combine_many, eof, if_else, many, many_end_with, many_separated, many_with_limit, more,
    more_end_with, more_separated, more_separated_optional_end, optional, parallel, string, test,
    token, token_literal, translate, trivial, BinaryOp, DEFAULT_MAX_REPEAT,
};
pub use parser::{lazy, IntoParser, Parser};
