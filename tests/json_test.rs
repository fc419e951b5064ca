//! End-to-end test: a small JSON parser built from the library surface.

use std::sync::Arc;

use rstest::rstest;

use parsix::{
    choices, combine3, keyword_kind, many_separated, parse_str, quoted_by_kind, token, NumberRules,
    Parser, RuleSet, FLOAT, INTEGER,
};

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

fn json_rules() -> Arc<RuleSet> {
    Arc::new(
        RuleSet::builder()
            .parentheses(false, true, true)
            .rule(":", ":")
            .rule(",", ",")
            .keywords(["true", "false", "null"])
            .numbers(NumberRules::default().signed(true))
            .quote("\"")
            .build()
            .unwrap(),
    )
}

fn string_literal() -> Parser<String> {
    token(&quoted_by_kind("\"")).translate(|t| t.literal)
}

fn value() -> Parser<Value> {
    choices(vec![
        token(&keyword_kind("true")).translate(|_| Value::Bool(true)),
        token(&keyword_kind("false")).translate(|_| Value::Bool(false)),
        token(&keyword_kind("null")).translate(|_| Value::Null),
        token(FLOAT).translate(|t| Value::Float(t.literal.parse().unwrap())),
        token(INTEGER).translate(|t| Value::Int(t.literal.parse().unwrap())),
        string_literal().translate(Value::Str),
        array(),
        object(),
    ])
}

fn array() -> Parser<Value> {
    combine3(token("["), many_separated(value, token(",")), token("]"))
        .translate(|(_, items, _)| Value::Array(items))
}

fn member() -> Parser<(String, Value)> {
    combine3(string_literal(), token(":"), value)
        .translate(|(key, _, value)| (key, value))
}

fn object() -> Parser<Value> {
    combine3(token("{"), many_separated(member, token(",")), token("}"))
        .translate(|(_, members, _)| Value::Object(members))
}

fn parse(source: &str) -> Result<Value, parsix::ParseFailure> {
    let document = value().end();
    parse_str(&json_rules(), source, "json", &document)
}

#[rstest]
#[case("true", Value::Bool(true))]
#[case("false", Value::Bool(false))]
#[case("null", Value::Null)]
#[case("42", Value::Int(42))]
#[case("-1.5", Value::Float(-1.5))]
#[case("\"hi\"", Value::Str("hi".to_string()))]
fn test_primitive(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(parse(source).unwrap(), expected);
}

#[test]
fn test_array_of_integers() {
    assert_eq!(
        parse("[1,2,3]").unwrap(),
        Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn test_empty_containers() {
    assert_eq!(parse("[]").unwrap(), Value::Array(vec![]));
    assert_eq!(parse("{}").unwrap(), Value::Object(vec![]));
}

#[test]
fn test_nested_document() {
    let parsed = parse("{\"a\":1,\"b\":[true,null]}").unwrap();
    assert_eq!(
        parsed,
        Value::Object(vec![
            ("a".to_string(), Value::Int(1)),
            (
                "b".to_string(),
                Value::Array(vec![Value::Bool(true), Value::Null])
            ),
        ])
    );
}

#[test]
fn test_whitespace_insensitivity() {
    let parsed = parse(" {\n  \"a\" : [ 1 , 2 ] \n} ").unwrap();
    assert_eq!(
        parsed,
        Value::Object(vec![(
            "a".to_string(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        )])
    );
}

#[test]
fn test_escapes_decode_into_values() {
    assert_eq!(
        parse("\"a\\n\\x41\\u0042\"").unwrap(),
        Value::Str("a\nAB".to_string())
    );
}

#[test]
fn test_trailing_garbage_rejected() {
    let failure = parse("1 2").unwrap_err();
    assert!(failure.to_string().contains("parse error"));
}

#[test]
fn test_malformed_document_rejected() {
    assert!(parse("[1,").is_err());
    assert!(parse("{\"a\"}").is_err());
    assert!(parse(",").is_err());
}
