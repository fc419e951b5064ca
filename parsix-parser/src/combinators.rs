use std::rc::Rc;

use parsix_lexer::Lexer;
use parsix_source::{ParseFailure, PositionOrder, SourcePosition, Token};

use crate::parser::{IntoParser, Parser};

/// Default bound on repetitions of a parser that succeeds without consuming
/// input. Reaching the bound is almost certainly a grammar bug (`many` over
/// something nullable); the repetition logs a warning and returns what it
/// has instead of spinning forever. Use [`many_with_limit`] to tighten or
/// loosen the bound.
pub const DEFAULT_MAX_REPEAT: usize = 1_000_000;

/// A binary fold step for [`chain_left_more`] and [`chain_right_more`].
pub type BinaryOp<T> = Rc<dyn Fn(T, T) -> T>;

fn consumed(start: &SourcePosition, lexer: &Lexer) -> bool {
    start.compare_to(Lexer::position(lexer)) == PositionOrder::Forward
}

/// An ambiguity failure marks a grammar bug and must surface uncaught. Every
/// combinator that retries, combines, or swallows a failure filters it
/// through this first: an `Ambiguous` failure short-circuits out via `?`,
/// anything else is handed back for the ordinary consumption-based handling.
pub(crate) fn propagate_ambiguity(failure: ParseFailure) -> Result<ParseFailure, ParseFailure> {
    if matches!(failure, ParseFailure::Ambiguous { .. }) {
        Err(failure)
    } else {
        Ok(failure)
    }
}

/// Succeeds with `value` without touching the input.
pub fn trivial<T: Clone + 'static>(value: T) -> Parser<T> {
    Parser::new(move |_| Ok(value.clone()))
}

/// Reads the next token, whatever its kind. Fails without consuming at the
/// end of input.
pub fn any_token() -> Parser<Token> {
    Parser::new(|lexer: &mut Lexer| {
        let start = Lexer::position(lexer).clone();
        match lexer.next() {
            Ok(Some(token)) => Ok(token),
            Ok(None) => {
                lexer.assign(&start);
                Err(ParseFailure::at(&start, "unexpected end of input"))
            }
            Err(failure) => {
                lexer.assign(&start);
                Err(failure)
            }
        }
    })
    .tag("any token")
}

/// Reads the next token and requires its kind tag. On any failure (end of
/// input, a lexical error, or a kind mismatch) the lexer is restored to the
/// pre-read position, so `token` never consumes on failure.
pub fn token(kind: &str) -> Parser<Token> {
    let kind = kind.to_string();
    let label = kind.clone();
    Parser::new(move |lexer: &mut Lexer| {
        let start = Lexer::position(lexer).clone();
        match lexer.next() {
            Ok(Some(token)) if token.kind == kind => Ok(token),
            Ok(Some(token)) => {
                lexer.assign(&start);
                Err(ParseFailure::at(
                    &start,
                    format!("expected token `{kind}`, found `{}`", token.literal),
                ))
            }
            Ok(None) => {
                lexer.assign(&start);
                Err(ParseFailure::at(
                    &start,
                    format!("expected token `{kind}`, found end of input"),
                ))
            }
            Err(failure) => {
                lexer.assign(&start);
                Err(failure)
            }
        }
    })
    .tag(&label)
}

/// Like [`token`], additionally requiring the decoded literal.
pub fn token_literal(kind: &str, literal: &str) -> Parser<Token> {
    let kind = kind.to_string();
    let literal = literal.to_string();
    let label = format!("{kind} `{literal}`");
    Parser::new(move |lexer: &mut Lexer| {
        let start = Lexer::position(lexer).clone();
        match lexer.next() {
            Ok(Some(token)) if token.kind == kind && token.literal == literal => Ok(token),
            Ok(Some(token)) => {
                lexer.assign(&start);
                Err(ParseFailure::at(
                    &start,
                    format!("expected `{literal}`, found `{}`", token.literal),
                ))
            }
            Ok(None) => {
                lexer.assign(&start);
                Err(ParseFailure::at(
                    &start,
                    format!("expected `{literal}`, found end of input"),
                ))
            }
            Err(failure) => {
                lexer.assign(&start);
                Err(failure)
            }
        }
    })
    .tag(&label)
}

/// Matches raw characters at the cursor, bypassing the tokenizer entirely.
pub fn string(literal: &str) -> Parser<String> {
    let literal = literal.to_string();
    let label = literal.clone();
    Parser::new(move |lexer: &mut Lexer| {
        let start = Lexer::position(lexer).clone();
        if Lexer::position(lexer).rest().starts_with(&literal) {
            lexer.position_mut().advance_by(literal.chars().count())?;
            Ok(literal.clone())
        } else {
            Err(ParseFailure::at(&start, format!("expected `{literal}`")))
        }
    })
    .tag(&label)
}

/// Succeeds only at the end of input.
pub fn eof() -> Parser<()> {
    trivial(()).end()
}

/// Ordered choice with backtracking: runs `first`; a failure that consumed
/// input is final, a failure that did not retries `second` from the entry
/// point. When both fail without consuming, the failures are combined; when
/// `second` fails after consuming, only its failure is reported.
pub fn if_else<T: 'static>(first: impl IntoParser<T>, second: impl IntoParser<T>) -> Parser<T> {
    let first = first.into_parser();
    let second = second.into_parser();
    Parser::new(move |lexer| {
        let start = Lexer::position(lexer).clone();
        match first.parse(lexer) {
            Ok(value) => Ok(value),
            Err(first_failure) => {
                let first_failure = propagate_ambiguity(first_failure)?;
                if consumed(&start, lexer) {
                    return Err(first_failure);
                }
                lexer.assign(&start);
                match second.parse(lexer) {
                    Ok(value) => Ok(value),
                    Err(second_failure) => {
                        let second_failure = propagate_ambiguity(second_failure)?;
                        if consumed(&start, lexer) {
                            Err(second_failure)
                        } else {
                            Err(first_failure.combine(second_failure))
                        }
                    }
                }
            }
        }
    })
}

/// Runs the parser on a cloned lexer and commits only on success: a failure
/// leaves the caller's lexer untouched, even if the parser consumed input
/// before failing. Wrap a branch in `attempt` when its prefix overlaps with
/// a later alternative of [`if_else`].
pub fn attempt<T: 'static>(parser: impl IntoParser<T>) -> Parser<T> {
    let parser = parser.into_parser();
    Parser::new(move |lexer| {
        let mut speculative = lexer.clone();
        match parser.parse(&mut speculative) {
            Ok(value) => {
                lexer.assign(speculative.position());
                Ok(value)
            }
            Err(failure) => Err(failure),
        }
    })
}

/// Runs the parser on a cloned lexer and never commits, success or not.
pub fn test<T: 'static>(parser: impl IntoParser<T>) -> Parser<T> {
    let parser = parser.into_parser();
    Parser::new(move |lexer| {
        let mut speculative = lexer.clone();
        parser.parse(&mut speculative)
    })
}

/// Unordered choice: both branches run on independent lexer clones. If both
/// fail the failures are combined; if exactly one succeeds it is committed;
/// if both succeed, the branch that consumed strictly more input wins, and
/// identical consumption is an ambiguity error, which signals a grammar bug
/// rather than an input error.
pub fn parallel<T: 'static>(left: impl IntoParser<T>, right: impl IntoParser<T>) -> Parser<T> {
    let left = left.into_parser();
    let right = right.into_parser();
    Parser::new(move |lexer| {
        let mut left_lexer = lexer.clone();
        let mut right_lexer = lexer.clone();
        let left_result = left.parse(&mut left_lexer);
        let right_result = right.parse(&mut right_lexer);
        match (left_result, right_result) {
            (Ok(left_value), Ok(right_value)) => {
                match left_lexer.position().compare_to(right_lexer.position()) {
                    PositionOrder::Behind => {
                        lexer.assign(left_lexer.position());
                        Ok(left_value)
                    }
                    PositionOrder::Forward => {
                        lexer.assign(right_lexer.position());
                        Ok(right_value)
                    }
                    _ => Err(ParseFailure::ambiguous_at(left_lexer.position())),
                }
            }
            (Ok(value), Err(failure)) => {
                propagate_ambiguity(failure)?;
                lexer.assign(left_lexer.position());
                Ok(value)
            }
            (Err(failure), Ok(value)) => {
                propagate_ambiguity(failure)?;
                lexer.assign(right_lexer.position());
                Ok(value)
            }
            (Err(left_failure), Err(right_failure)) => {
                let left_failure = propagate_ambiguity(left_failure)?;
                let right_failure = propagate_ambiguity(right_failure)?;
                Err(left_failure.combine(right_failure))
            }
        }
    })
}

/// Tries each branch in order on a lexer clone and commits the first
/// success. When every branch fails, the failures of the branches that
/// consumed the most input are combined and returned.
pub fn choices<T: 'static>(branches: Vec<Parser<T>>) -> Parser<T> {
    Parser::new(move |lexer| {
        let start = Lexer::position(lexer).clone();
        let mut failures: Vec<(ParseFailure, SourcePosition)> = Vec::new();
        for branch in &branches {
            let mut speculative = lexer.clone();
            match branch.parse(&mut speculative) {
                Ok(value) => {
                    lexer.assign(speculative.position());
                    return Ok(value);
                }
                Err(failure) => {
                    let failure = propagate_ambiguity(failure)?;
                    failures.push((failure, speculative.position().clone()));
                }
            }
        }
        let furthest = failures
            .iter()
            .map(|(_, position)| position.offset())
            .max();
        let furthest = match furthest {
            Some(offset) => offset,
            None => return Err(ParseFailure::at(&start, "no alternatives to try")),
        };
        let mut combined: Option<ParseFailure> = None;
        for (failure, position) in failures {
            if position.offset() == furthest {
                combined = Some(match combined {
                    None => failure,
                    Some(so_far) => so_far.combine(failure),
                });
            }
        }
        Err(combined.unwrap_or_else(|| ParseFailure::at(&start, "no alternatives to try")))
    })
}

fn collect_repeats<T: 'static>(
    parser: &Parser<T>,
    lexer: &mut Lexer,
    items: &mut Vec<T>,
    max_repeat: usize,
) -> Result<(), ParseFailure> {
    loop {
        if items.len() >= max_repeat {
            log::warn!(
                "repetition reached the bound of {max_repeat} iterations; returning a partial result"
            );
            return Ok(());
        }
        let before = Lexer::position(lexer).clone();
        match parser.parse(lexer) {
            Ok(value) => items.push(value),
            Err(failure) => {
                let failure = propagate_ambiguity(failure)?;
                if consumed(&before, lexer) {
                    return Err(failure);
                }
                lexer.assign(&before);
                return Ok(());
            }
        }
    }
}

/// Zero or more repetitions. A failure without consumption ends the
/// repetition; a failure with consumption fails the whole parse.
pub fn many<T: 'static>(parser: impl IntoParser<T>) -> Parser<Vec<T>> {
    many_with_limit(parser, DEFAULT_MAX_REPEAT)
}

/// [`many`] with an explicit repetition bound.
pub fn many_with_limit<T: 'static>(
    parser: impl IntoParser<T>,
    max_repeat: usize,
) -> Parser<Vec<T>> {
    let parser = parser.into_parser();
    Parser::new(move |lexer| {
        let mut items = Vec::new();
        collect_repeats(&parser, lexer, &mut items, max_repeat)?;
        Ok(items)
    })
}

/// One or more repetitions.
pub fn more<T: 'static>(parser: impl IntoParser<T>) -> Parser<Vec<T>> {
    let parser = parser.into_parser();
    Parser::new(move |lexer| {
        let first = parser.parse(lexer)?;
        let mut items = vec![first];
        collect_repeats(&parser, lexer, &mut items, DEFAULT_MAX_REPEAT)?;
        Ok(items)
    })
}

/// Zero or one occurrence; a failure with consumption still fails.
pub fn optional<T: 'static>(parser: impl IntoParser<T>) -> Parser<Option<T>> {
    let parser = parser.into_parser();
    Parser::new(move |lexer| {
        let start = Lexer::position(lexer).clone();
        match parser.parse(lexer) {
            Ok(value) => Ok(Some(value)),
            Err(failure) => {
                let failure = propagate_ambiguity(failure)?;
                if consumed(&start, lexer) {
                    Err(failure)
                } else {
                    lexer.assign(&start);
                    Ok(None)
                }
            }
        }
    })
}

/// One or more `item`s separated by `separator`: `p ≫ many(sep ≫ p)`.
pub fn more_separated<T: 'static, S: 'static>(
    item: impl IntoParser<T>,
    separator: impl IntoParser<S>,
) -> Parser<Vec<T>> {
    let item = item.into_parser();
    let separator = separator.into_parser();
    Parser::new(move |lexer| {
        let first = item.parse(lexer)?;
        let mut items = vec![first];
        loop {
            if items.len() >= DEFAULT_MAX_REPEAT {
                log::warn!(
                    "separated repetition reached the bound of {DEFAULT_MAX_REPEAT} iterations; returning a partial result"
                );
                return Ok(items);
            }
            let before = Lexer::position(lexer).clone();
            match separator.parse(lexer).and_then(|_| item.parse(lexer)) {
                Ok(value) => items.push(value),
                Err(failure) => {
                    let failure = propagate_ambiguity(failure)?;
                    if consumed(&before, lexer) {
                        return Err(failure);
                    }
                    lexer.assign(&before);
                    return Ok(items);
                }
            }
        }
    })
}

/// Zero or more `item`s separated by `separator`.
pub fn many_separated<T: 'static, S: 'static>(
    item: impl IntoParser<T>,
    separator: impl IntoParser<S>,
) -> Parser<Vec<T>> {
    let non_empty = more_separated(item, separator);
    Parser::new(move |lexer| {
        let start = Lexer::position(lexer).clone();
        match non_empty.parse(lexer) {
            Ok(items) => Ok(items),
            Err(failure) => {
                let failure = propagate_ambiguity(failure)?;
                if consumed(&start, lexer) {
                    Err(failure)
                } else {
                    lexer.assign(&start);
                    Ok(Vec::new())
                }
            }
        }
    })
}

/// Like [`more_separated`], but each trailing `separator ≫ item` step is
/// attempted as a unit, so a dangling separator before something that is
/// not an item does not commit; a single trailing separator is then
/// consumed if present.
pub fn more_separated_optional_end<T: 'static, S: 'static>(
    item: impl IntoParser<T>,
    separator: impl IntoParser<S>,
) -> Parser<Vec<T>> {
    let item = item.into_parser();
    let separator = separator.into_parser();
    Parser::new(move |lexer| {
        let first = item.parse(lexer)?;
        let mut items = vec![first];
        loop {
            if items.len() >= DEFAULT_MAX_REPEAT {
                log::warn!(
                    "separated repetition reached the bound of {DEFAULT_MAX_REPEAT} iterations; returning a partial result"
                );
                break;
            }
            let mut speculative = lexer.clone();
            match separator
                .parse(&mut speculative)
                .and_then(|_| item.parse(&mut speculative))
            {
                Ok(value) => {
                    lexer.assign(speculative.position());
                    items.push(value);
                }
                Err(failure) => {
                    propagate_ambiguity(failure)?;
                    break;
                }
            }
        }
        let mut speculative = lexer.clone();
        match separator.parse(&mut speculative) {
            Ok(_) => lexer.assign(speculative.position()),
            Err(failure) => {
                propagate_ambiguity(failure)?;
            }
        }
        Ok(items)
    })
}

/// One or more `item`s, each followed by `end`; the item values are kept.
pub fn more_end_with<T: 'static, E: 'static>(
    item: impl IntoParser<T>,
    end: impl IntoParser<E>,
) -> Parser<Vec<T>> {
    let item = item.into_parser();
    let end = end.into_parser();
    Parser::new(move |lexer| {
        let mut items = Vec::new();
        loop {
            let before = Lexer::position(lexer).clone();
            match item.parse(lexer).and_then(|value| {
                end.parse(lexer)?;
                Ok(value)
            }) {
                Ok(value) => items.push(value),
                Err(failure) => {
                    let failure = propagate_ambiguity(failure)?;
                    if consumed(&before, lexer) {
                        return Err(failure);
                    }
                    lexer.assign(&before);
                    if items.is_empty() {
                        return Err(failure);
                    }
                    return Ok(items);
                }
            }
        }
    })
}

/// Zero or more `item`s, each followed by `end`.
pub fn many_end_with<T: 'static, E: 'static>(
    item: impl IntoParser<T>,
    end: impl IntoParser<E>,
) -> Parser<Vec<T>> {
    let non_empty = more_end_with(item, end);
    Parser::new(move |lexer| {
        let start = Lexer::position(lexer).clone();
        match non_empty.parse(lexer) {
            Ok(items) => Ok(items),
            Err(failure) => {
                let failure = propagate_ambiguity(failure)?;
                if consumed(&start, lexer) {
                    Err(failure)
                } else {
                    lexer.assign(&start);
                    Ok(Vec::new())
                }
            }
        }
    })
}

/// Runs two parsers in sequence and pairs their results.
pub fn combine2<A: 'static, B: 'static>(
    a: impl IntoParser<A>,
    b: impl IntoParser<B>,
) -> Parser<(A, B)> {
    let a = a.into_parser();
    let b = b.into_parser();
    Parser::new(move |lexer| Ok((a.parse(lexer)?, b.parse(lexer)?)))
}

/// Runs three parsers in sequence and bundles their results.
pub fn combine3<A: 'static, B: 'static, C: 'static>(
    a: impl IntoParser<A>,
    b: impl IntoParser<B>,
    c: impl IntoParser<C>,
) -> Parser<(A, B, C)> {
    let a = a.into_parser();
    let b = b.into_parser();
    let c = c.into_parser();
    Parser::new(move |lexer| Ok((a.parse(lexer)?, b.parse(lexer)?, c.parse(lexer)?)))
}

/// Runs four parsers in sequence and bundles their results.
pub fn combine4<A: 'static, B: 'static, C: 'static, D: 'static>(
    a: impl IntoParser<A>,
    b: impl IntoParser<B>,
    c: impl IntoParser<C>,
    d: impl IntoParser<D>,
) -> Parser<(A, B, C, D)> {
    let a = a.into_parser();
    let b = b.into_parser();
    let c = c.into_parser();
    let d = d.into_parser();
    Parser::new(move |lexer| {
        Ok((
            a.parse(lexer)?,
            b.parse(lexer)?,
            c.parse(lexer)?,
            d.parse(lexer)?,
        ))
    })
}

/// Runs every parser in sequence and collects the results.
pub fn combine_many<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<Vec<T>> {
    Parser::new(move |lexer| {
        let mut items = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            items.push(parser.parse(lexer)?);
        }
        Ok(items)
    })
}

/// Maps the success value of a parser; `translate(f, p)` is `p.translate(f)`.
pub fn translate<T: 'static, U: 'static>(
    f: impl Fn(T) -> U + 'static,
    parser: impl IntoParser<T>,
) -> Parser<U> {
    parser.into_parser().translate(f)
}

/// Parses `operand (op operand)*`, left-folding as it goes: each parsed
/// operator yields the fold step applied to the accumulated value and the
/// next operand. A failed `op operand` attempt ends the chain and returns
/// the accumulated value.
pub fn chain_left_more<T: 'static>(
    operand: impl IntoParser<T>,
    operator: impl IntoParser<BinaryOp<T>>,
) -> Parser<T> {
    let operand = operand.into_parser();
    let operator = operator.into_parser();
    Parser::new(move |lexer| {
        let mut accumulated = operand.parse(lexer)?;
        let mut steps = 0usize;
        loop {
            if steps >= DEFAULT_MAX_REPEAT {
                log::warn!(
                    "operator chain reached the bound of {DEFAULT_MAX_REPEAT} iterations; returning a partial result"
                );
                return Ok(accumulated);
            }
            let mut speculative = lexer.clone();
            match operator
                .parse(&mut speculative)
                .and_then(|op| operand.parse(&mut speculative).map(|rhs| (op, rhs)))
            {
                Ok((op, rhs)) => {
                    lexer.assign(speculative.position());
                    accumulated = op(accumulated, rhs);
                    steps += 1;
                }
                Err(failure) => {
                    propagate_ambiguity(failure)?;
                    return Ok(accumulated);
                }
            }
        }
    })
}

/// The right-associative sibling of [`chain_left_more`]:
/// `a ⊕ b ⊕ c` folds as `a ⊕ (b ⊕ c)`.
pub fn chain_right_more<T: 'static>(
    operand: impl IntoParser<T>,
    operator: impl IntoParser<BinaryOp<T>>,
) -> Parser<T> {
    let operand = operand.into_parser();
    let operator = operator.into_parser();
    Parser::new(move |lexer| {
        let mut operands = vec![operand.parse(lexer)?];
        let mut operators: Vec<BinaryOp<T>> = Vec::new();
        loop {
            if operators.len() >= DEFAULT_MAX_REPEAT {
                log::warn!(
                    "operator chain reached the bound of {DEFAULT_MAX_REPEAT} iterations; returning a partial result"
                );
                break;
            }
            let mut speculative = lexer.clone();
            match operator
                .parse(&mut speculative)
                .and_then(|op| operand.parse(&mut speculative).map(|rhs| (op, rhs)))
            {
                Ok((op, rhs)) => {
                    lexer.assign(speculative.position());
                    operators.push(op);
                    operands.push(rhs);
                }
                Err(failure) => {
                    propagate_ambiguity(failure)?;
                    break;
                }
            }
        }
        let mut accumulated = operands.pop().expect("at least one operand");
        while let Some(op) = operators.pop() {
            let lhs = operands.pop().expect("one operand per operator");
            accumulated = op(lhs, accumulated);
        }
        Ok(accumulated)
    })
}
