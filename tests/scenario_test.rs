//! End-to-end scenarios exercising backtracking, lexical guards and chains
//! through the full lexer + combinator stack.

use std::rc::Rc;
use std::sync::Arc;

use parsix::{
    attempt, chain_left_more, if_else, token, BinaryOp, Lexer, NumberRules, ParseFailure, Parser,
    RuleSet, INTEGER,
};

#[test]
fn test_ordered_choice_with_attempt_backtracks_shared_prefix() {
    // Grammar `aa | ab` over single-letter tokens.
    let rules = Arc::new(
        RuleSet::builder()
            .rule("a", "a")
            .rule("b", "b")
            .build()
            .unwrap(),
    );
    let grammar = if_else(
        attempt(token("a").then(token("a"))),
        token("a").then(token("b")),
    );
    let mut lexer = Lexer::new(rules, "ab", "scenario");
    let result = grammar.parse(&mut lexer).unwrap();
    assert_eq!(result.kind, "b");
    assert_eq!(result.literal, "b");
}

#[test]
fn test_number_glued_to_word_is_a_lex_failure() {
    let rules = Arc::new(
        RuleSet::builder()
            .numbers(NumberRules::integers_only())
            .build()
            .unwrap(),
    );
    let mut lexer = Lexer::new(rules, "123abc", "scenario");
    match lexer.next() {
        Err(ParseFailure::Syntax { msg, line, column, .. }) => {
            assert_eq!(
                msg,
                "missing separator between a number and indistinguishable stuff"
            );
            assert_eq!((line, column), (1, 1));
        }
        other => panic!("expected a no-follow failure, got {other:?}"),
    }
}

#[test]
fn test_escape_decoding_in_string_literal() {
    let rules = Arc::new(RuleSet::builder().quote("\"").build().unwrap());
    let mut lexer = Lexer::new(rules, "\"a\\n\\x41\\u0042\"", "scenario");
    let token = lexer.next().unwrap().unwrap();
    assert_eq!(token.literal, "a\nAB");
}

#[test]
fn test_nested_comment_skipped_before_token() {
    let rules = Arc::new(
        RuleSet::builder()
            .numbers(NumberRules::default())
            .nested_comment("/*", "*/", true)
            .build()
            .unwrap(),
    );
    let mut lexer = Lexer::new(rules, "/* a /* b */ c */1", "scenario");
    let token = lexer.next().unwrap().unwrap();
    assert_eq!(token.kind, INTEGER);
    assert_eq!(token.literal, "1");
}

#[test]
fn test_left_associative_subtraction_chain() {
    let rules = Arc::new(
        RuleSet::builder()
            .numbers(NumberRules::integers_only())
            .rule("-", "-")
            .build()
            .unwrap(),
    );
    let integer: Parser<i64> = token(INTEGER).translate(|t| t.literal.parse().unwrap());
    let subtract: Parser<BinaryOp<i64>> =
        token("-").translate(|_| Rc::new(|x: i64, y: i64| x - y) as BinaryOp<i64>);
    let mut lexer = Lexer::new(rules, "10 - 3 - 4", "scenario");
    let result = chain_left_more(integer, subtract).parse(&mut lexer).unwrap();
    assert_eq!(result, 3);
}
