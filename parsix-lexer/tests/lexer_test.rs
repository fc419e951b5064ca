use std::sync::Arc;

use parsix_lexer::{Lexer, NumberRules, QuoteRule, RuleSet};
use parsix_source::{keyword_kind, quoted_by_kind, ParseFailure, FLOAT, INTEGER};

fn lexer_for(rules: RuleSet, source: &str) -> Lexer {
    Lexer::new(Arc::new(rules), source, "test")
}

fn kinds(lexer: &mut Lexer) -> Vec<String> {
    lexer
        .all_tokens()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_keywords_and_numbers() {
    let rules = RuleSet::builder()
        .keywords(["let", "in"])
        .numbers(NumberRules::default())
        .rule("=", "=")
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "let x = 42 in");
    // "x" has no rule: keywords and numbers only.
    let first = lexer.next().unwrap().unwrap();
    assert_eq!(first.kind, keyword_kind("let"));
    assert_eq!(first.literal, "let");
    assert_eq!((first.line, first.column), (1, 1));
    assert!(matches!(lexer.next(), Err(ParseFailure::Syntax { .. })));
}

#[test]
fn test_token_positions() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "1\n 23");
    let one = lexer.next().unwrap().unwrap();
    assert_eq!((one.line, one.column), (1, 1));
    let twenty_three = lexer.next().unwrap().unwrap();
    assert_eq!((twenty_three.line, twenty_three.column), (2, 2));
    assert_eq!(twenty_three.literal, "23");
    assert_eq!(lexer.next().unwrap(), None);
}

#[test]
fn test_longest_operator_wins() {
    let rules = RuleSet::builder()
        .rule("<", "<")
        .rule("<=", "<=")
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "<= <");
    assert_eq!(kinds(&mut lexer), vec!["<=", "<"]);
}

#[test]
fn test_line_comment() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .line_comment("//")
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "1 // trailing words\n2");
    let literals: Vec<String> = lexer
        .all_tokens()
        .unwrap()
        .into_iter()
        .map(|t| t.literal)
        .collect();
    assert_eq!(literals, vec!["1", "2"]);
}

#[test]
fn test_nested_comment_tracks_depth() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .nested_comment("/*", "*/", true)
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "/* a /* b */ c */1");
    let token = lexer.next().unwrap().unwrap();
    assert_eq!(token.kind, INTEGER);
    assert_eq!(token.literal, "1");
}

#[test]
fn test_flat_comment_closes_at_first_end() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .nested_comment("/*", "*/", false)
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "/* a /* b */ c */ 1");
    // Flat matching: the first */ closes, so "c" is plain input again.
    assert!(lexer.next().is_err());
}

#[test]
fn test_unterminated_comment_is_eof_failure() {
    let rules = RuleSet::builder()
        .nested_comment("/*", "*/", true)
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "/* never closed");
    assert!(matches!(
        lexer.next(),
        Err(ParseFailure::UnexpectedEof { .. })
    ));
}

#[test]
fn test_quoted_string_with_escapes() {
    let rules = RuleSet::builder().quote("\"").build().unwrap();
    let mut lexer = lexer_for(rules, "\"a\\n\\x41\\u0042\"");
    let token = lexer.next().unwrap().unwrap();
    assert_eq!(token.kind, quoted_by_kind("\""));
    assert_eq!(token.literal, "a\nAB");
    assert_eq!((token.line, token.column), (1, 1));
    assert_eq!(lexer.next().unwrap(), None);
}

#[test]
fn test_string_kinds_per_delimiter() {
    let rules = RuleSet::builder()
        .quote_rule(QuoteRule::symmetric("\"").kind("string"))
        .quote_rule(QuoteRule::symmetric("`").kind("raw").escape(false))
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "\"a\\tb\" `a\\tb`");
    let escaped = lexer.next().unwrap().unwrap();
    assert_eq!(escaped.kind, "string");
    assert_eq!(escaped.literal, "a\tb");
    let raw = lexer.next().unwrap().unwrap();
    assert_eq!(raw.kind, "raw");
    assert_eq!(raw.literal, "a\\tb");
}

#[test]
fn test_newline_rejected_in_single_line_string() {
    let rules = RuleSet::builder().quote("\"").build().unwrap();
    let mut lexer = lexer_for(rules, "\"a\nb\"");
    assert!(matches!(lexer.next(), Err(ParseFailure::Syntax { .. })));
}

#[test]
fn test_multiline_string() {
    let rules = RuleSet::builder()
        .quote_rule(QuoteRule::symmetric("\"").multiline(true))
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "\"a\nb\"");
    assert_eq!(lexer.next().unwrap().unwrap().literal, "a\nb");
}

#[test]
fn test_unterminated_string() {
    let rules = RuleSet::builder().quote("\"").build().unwrap();
    let mut lexer = lexer_for(rules, "\"abc");
    assert!(matches!(
        lexer.next(),
        Err(ParseFailure::UnexpectedEof { .. })
    ));
}

#[test]
fn test_number_no_follow_failure() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::integers_only())
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "123abc");
    match lexer.next() {
        Err(ParseFailure::Syntax { msg, line, column, .. }) => {
            assert_eq!(
                msg,
                "missing separator between a number and indistinguishable stuff"
            );
            assert_eq!((line, column), (1, 1));
        }
        other => panic!("expected no-follow failure, got {other:?}"),
    }
}

#[test]
fn test_integer_and_float_disambiguation() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "1 1.5 0x1F 2.");
    let tokens = lexer.all_tokens().unwrap();
    let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();
    assert_eq!(kinds, vec![INTEGER, FLOAT, INTEGER, FLOAT]);
}

#[test]
fn test_invalid_token() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "§");
    match lexer.next() {
        Err(ParseFailure::Syntax { msg, .. }) => assert_eq!(msg, "invalid token"),
        other => panic!("expected invalid token failure, got {other:?}"),
    }
}

#[test]
fn test_skip_spaces_disabled() {
    let rules = RuleSet::builder()
        .skip_spaces(false)
        .rule(" ", "space")
        .rule("a", "a")
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "a a");
    assert_eq!(kinds(&mut lexer), vec!["a", "space", "a"]);
}

#[test]
fn test_clone_yields_same_tokens() {
    let rules = RuleSet::builder()
        .keywords(["true", "false"])
        .numbers(NumberRules::default())
        .parentheses(false, true, false)
        .build()
        .unwrap();
    let lexer = lexer_for(rules, "[true 1 2.5 false]");
    let mut original = lexer.clone();
    let mut cloned = lexer.clone();
    assert_eq!(original.all_tokens().unwrap(), cloned.all_tokens().unwrap());
}

#[test]
fn test_iterator_yields_lazily() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .build()
        .unwrap();
    let lexer = lexer_for(rules, "1 2 3");
    let literals: Vec<String> = lexer.map(|r| r.unwrap().literal).collect();
    assert_eq!(literals, vec!["1", "2", "3"]);
}

#[test]
fn test_iterator_stops_after_failure() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .build()
        .unwrap();
    let lexer = lexer_for(rules, "1 §");
    let results: Vec<Result<_, _>> = lexer.collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

#[test]
fn test_next_except_eof() {
    let rules = RuleSet::builder()
        .numbers(NumberRules::default())
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "");
    let mut saw_eof_at = None;
    let result = lexer.next_except_eof(|pos| saw_eof_at = Some((pos.line(), pos.column())));
    assert!(matches!(result, Err(ParseFailure::UnexpectedEof { .. })));
    assert_eq!(saw_eof_at, Some((1, 1)));
}

#[test]
fn test_transformer_rule() {
    let rules = RuleSet::builder()
        .rule_pattern_transform("[a-z]+", |tok| {
            let upper = tok.literal.to_uppercase();
            parsix_source::Token {
                kind: "word".to_string(),
                literal: upper,
                ..tok
            }
        })
        .build()
        .unwrap();
    let mut lexer = lexer_for(rules, "abc");
    let token = lexer.next().unwrap().unwrap();
    assert_eq!(token.kind, "word");
    assert_eq!(token.literal, "ABC");
}
