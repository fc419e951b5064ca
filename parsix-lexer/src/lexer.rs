use std::sync::Arc;

use parsix_source::{ParseFailure, SourcePosition, Token, NUMBER_NO_FOLLOW};

use crate::config::{NestedComment, QuoteRule};
use crate::escape::decode_escape;
use crate::rules::RuleSet;

/// A pull-based tokenizer: a cursor over the source plus a shared compiled
/// rule set. Cloning a lexer clones the cursor and shares the rule set, so
/// speculative branches are cheap; committing a branch is [`Lexer::assign`].
#[derive(Debug, Clone)]
pub struct Lexer {
    position: SourcePosition,
    rules: Arc<RuleSet>,
    iter_failed: bool,
}

impl Lexer {
    pub fn new(rules: Arc<RuleSet>, source: &str, name: &str) -> Self {
        Self::from_position(rules, SourcePosition::new(source, name))
    }

    pub fn from_position(rules: Arc<RuleSet>, position: SourcePosition) -> Self {
        Self {
            position,
            rules,
            iter_failed: false,
        }
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut SourcePosition {
        &mut self.position
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Commits another cursor into this lexer.
    pub fn assign(&mut self, position: &SourcePosition) {
        self.position.assign(position);
    }

    /// Resolves the next token. `Ok(None)` is the peaceful end of input;
    /// lexeme errors surface as `ParseFailure`.
    pub fn next(&mut self) -> Result<Option<Token>, ParseFailure> {
        if self.rules.skip_spaces() {
            self.skip_whites()?;
        }
        if self.position.is_eof() {
            return Ok(None);
        }

        if let Some(quote) = self.rules.quote_for(self.position.rest()) {
            let quote = quote.clone();
            return self.read_quoted(&quote).map(Some);
        }

        let start = self.position.clone();

        let matched = {
            let rest = self.position.rest();
            if let Some((action, lexeme)) = self.rules.match_static(rest) {
                Some((action.clone(), lexeme.to_string()))
            } else {
                self.rules
                    .match_dynamic(rest)
                    .map(|(action, lexeme)| (action.clone(), lexeme.to_string()))
            }
        };

        let (action, lexeme) = match matched {
            Some(found) => found,
            None => return Err(ParseFailure::at(&start, "invalid token")),
        };

        self.position.advance_by(lexeme.chars().count())?;
        let bare = Token::new(
            String::new(),
            lexeme,
            start.shared_name(),
            start.line(),
            start.column(),
        );
        let token = action.apply(bare);

        if token.is_kind(NUMBER_NO_FOLLOW) {
            return Err(ParseFailure::at(
                &start,
                "missing separator between a number and indistinguishable stuff",
            ));
        }
        Ok(Some(token))
    }

    /// Like [`Lexer::next`], but the peaceful end of input becomes an
    /// `UnexpectedEof` failure after running the caller's hook.
    pub fn next_except_eof(
        &mut self,
        on_eof: impl FnOnce(&SourcePosition),
    ) -> Result<Token, ParseFailure> {
        match self.next()? {
            Some(token) => Ok(token),
            None => {
                on_eof(&self.position);
                Err(ParseFailure::unexpected_eof(self.position.name()))
            }
        }
    }

    /// Drains the remaining input into a token vector.
    pub fn all_tokens(&mut self) -> Result<Vec<Token>, ParseFailure> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Consumes whitespace, then a line comment, then a block comment,
    /// repeating until no further progress is made.
    fn skip_whites(&mut self) -> Result<(), ParseFailure> {
        loop {
            let before = self.position.offset();

            while matches!(self.position.current_char(), Some(' ' | '\t' | '\n')) {
                self.position.advance()?;
            }

            if let Some(prefix) = self.rules.line_comment() {
                if self.position.rest().starts_with(prefix) {
                    self.position.advance_by(prefix.chars().count())?;
                    while matches!(self.position.current_char(), Some(c) if c != '\n') {
                        self.position.advance()?;
                    }
                }
            }

            if let Some(nested) = self.rules.nested_comment() {
                if self.position.rest().starts_with(&nested.begin) {
                    let nested = nested.clone();
                    self.skip_nested_comment(&nested)?;
                }
            }

            if self.position.offset() == before {
                return Ok(());
            }
        }
    }

    /// Skips one block comment, entered with the cursor on the begin
    /// sequence. With `nested` set, begin sequences increase a depth
    /// counter; otherwise the first end sequence closes the block.
    fn skip_nested_comment(&mut self, comment: &NestedComment) -> Result<(), ParseFailure> {
        self.position.advance_by(comment.begin.chars().count())?;
        let mut depth = 1usize;
        loop {
            if self.position.is_eof() {
                return Err(ParseFailure::unexpected_eof(self.position.name()));
            }
            if self.position.rest().starts_with(&comment.end) {
                self.position.advance_by(comment.end.chars().count())?;
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            } else if comment.nested && self.position.rest().starts_with(&comment.begin) {
                self.position.advance_by(comment.begin.chars().count())?;
                depth += 1;
            } else {
                self.position.advance()?;
            }
        }
    }

    /// Reads one quoted string, entered with the cursor on the opening
    /// delimiter. Escape sequences are decoded in place; the emitted token
    /// carries the decoded body and the position of the opening delimiter.
    fn read_quoted(&mut self, quote: &QuoteRule) -> Result<Token, ParseFailure> {
        let start_line = self.position.line();
        let start_column = self.position.column();
        let name = self.position.shared_name();
        self.position.advance_by(quote.start.chars().count())?;

        let mut decoded = String::new();
        loop {
            if self.position.rest().starts_with(&quote.stop) {
                self.position.advance_by(quote.stop.chars().count())?;
                return Ok(Token::new(
                    quote.kind.clone(),
                    decoded,
                    name,
                    start_line,
                    start_column,
                ));
            }
            match self.position.current_char() {
                None => return Err(ParseFailure::unexpected_eof(self.position.name())),
                Some('\\') if quote.escape => {
                    self.position.advance()?;
                    decoded.push(decode_escape(&mut self.position)?);
                }
                Some('\n') if !quote.multiline => {
                    return Err(ParseFailure::at(
                        &self.position,
                        "line break inside a single-line string",
                    ));
                }
                Some(c) => {
                    self.position.advance()?;
                    decoded.push(c);
                }
            }
        }
    }
}

/// Lazy token iteration; a failure is yielded once and ends the stream.
impl Iterator for Lexer {
    type Item = Result<Token, ParseFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iter_failed {
            return None;
        }
        match Lexer::next(self) {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(failure) => {
                self.iter_failed = true;
                Some(Err(failure))
            }
        }
    }
}
