pub mod error;
pub mod position;
pub mod token;

pub use error::{ConfigError, ParseFailure};
pub use position::{PositionOrder, SourcePosition};
pub use token::{keyword_kind, quoted_by_kind, Token, FLOAT, INTEGER, NUMBER_NO_FOLLOW};
