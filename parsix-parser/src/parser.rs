use std::rc::Rc;

use once_cell::unsync::OnceCell;

use parsix_lexer::Lexer;
use parsix_source::{ParseFailure, PositionOrder};

use crate::combinators::propagate_ambiguity;

/// A parser: a value wrapping an effectful parse function from a lexer to a
/// result. Parsers are cheap to clone (the function is behind an `Rc`) and
/// are built once during grammar setup, then invoked many times.
///
/// A parser "consumes input" iff it advances the lexer past its entry point
/// before returning, whether it ultimately succeeds or fails. Every
/// combinator's backtracking behavior is defined in terms of consumption:
/// [`crate::if_else`] only retries a branch that failed without consuming,
/// and [`crate::attempt`] is the one way to make an overlapping prefix
/// backtrackable.
pub struct Parser<T> {
    run: Rc<dyn Fn(&mut Lexer) -> Result<T, ParseFailure>>,
    tag: Option<Rc<str>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            run: Rc::clone(&self.run),
            tag: self.tag.clone(),
        }
    }
}

impl<T: 'static> Parser<T> {
    pub fn new(run: impl Fn(&mut Lexer) -> Result<T, ParseFailure> + 'static) -> Self {
        Parser {
            run: Rc::new(run),
            tag: None,
        }
    }

    /// Runs the parser against the lexer. The entry point of every parse.
    pub fn parse(&self, lexer: &mut Lexer) -> Result<T, ParseFailure> {
        (self.run)(lexer)
    }

    /// Attaches a display label, used in look-ahead failure messages.
    pub fn tag(mut self, label: &str) -> Self {
        self.tag = Some(Rc::from(label));
        self
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Monadic bind: feed the success value into `f` and run the parser it
    /// builds. `trivial(v).bind(f)` behaves as `f(v)`, and
    /// `p.bind(trivial)` behaves as `p`.
    pub fn bind<U: 'static>(self, f: impl Fn(T) -> Parser<U> + 'static) -> Parser<U> {
        Parser::new(move |lexer| {
            let value = self.parse(lexer)?;
            f(value).parse(lexer)
        })
    }

    /// Sequencing that discards the left value: `p.then(q)` is
    /// `p.bind(|_| q)`.
    pub fn then<U: 'static>(self, next: impl IntoParser<U>) -> Parser<U> {
        let next = next.into_parser();
        Parser::new(move |lexer| {
            self.parse(lexer)?;
            next.parse(lexer)
        })
    }

    /// Maps the success value.
    pub fn translate<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Parser<U> {
        Parser::new(move |lexer| self.parse(lexer).map(&f))
    }

    /// Replaces the failure message with "expected `what`", but only when
    /// the parser failed without consuming; a failure that consumed input
    /// already points at the real problem and passes through.
    pub fn expect(self, what: &str) -> Parser<T> {
        let what = what.to_string();
        Parser::new(move |lexer| {
            let start = Lexer::position(lexer).clone();
            match self.parse(lexer) {
                Ok(value) => Ok(value),
                Err(failure) => {
                    let failure = propagate_ambiguity(failure)?;
                    if start.compare_to(Lexer::position(lexer)) == PositionOrder::Equal {
                        Err(ParseFailure::at(&start, format!("expected {what}")))
                    } else {
                        Err(failure)
                    }
                }
            }
        })
    }

    /// Runs this parser, then runs `look_ahead` on a cloned lexer: if the
    /// look-ahead succeeds the whole parse fails, otherwise this parser's
    /// value is kept. The look-ahead never consumes.
    pub fn not_followed_by<U: 'static>(self, look_ahead: impl IntoParser<U>) -> Parser<T> {
        let look_ahead = look_ahead.into_parser();
        Parser::new(move |lexer| {
            let value = self.parse(lexer)?;
            let mut probe = lexer.clone();
            match look_ahead.parse(&mut probe) {
                Ok(_) => {
                    let label = look_ahead.tag_name().unwrap_or("the forbidden input");
                    Err(ParseFailure::at(
                        Lexer::position(lexer),
                        format!("expected not to be followed by {label}"),
                    ))
                }
                Err(failure) => {
                    propagate_ambiguity(failure)?;
                    Ok(value)
                }
            }
        })
    }

    /// Requires the input to end after this parser.
    pub fn end(self) -> Parser<T> {
        self.not_followed_by(crate::combinators::any_token())
            .expect("end of file")
    }
}

/// Anything a combinator accepts in a parser position: an eager parser
/// value, or a zero-argument factory for one. Factories make recursive
/// grammars natural: a grammar entry point is just `fn value() ->
/// Parser<Value>`, passed by name. Factories are memoized on first call.
pub trait IntoParser<T> {
    fn into_parser(self) -> Parser<T>;
}

impl<T: 'static> IntoParser<T> for Parser<T> {
    fn into_parser(self) -> Parser<T> {
        self
    }
}

impl<T: 'static, F> IntoParser<T> for F
where
    F: Fn() -> Parser<T> + 'static,
{
    fn into_parser(self) -> Parser<T> {
        lazy(self)
    }
}

/// Defers grammar construction until first use, memoizing the built parser.
/// This is what allows recursive grammars without cyclic ownership.
pub fn lazy<T: 'static>(build: impl Fn() -> Parser<T> + 'static) -> Parser<T> {
    let cell: Rc<OnceCell<Parser<T>>> = Rc::new(OnceCell::new());
    Parser::new(move |lexer| cell.get_or_init(|| build()).parse(lexer))
}
