//! JSON demo: a complete JSON reader built from the rule-driven lexer and
//! the combinator surface. Pass a document as the first argument, or run
//! without arguments to parse a built-in sample.

use std::sync::Arc;

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
            .expect("the JSON rule set is well-formed"),
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
        token(FLOAT).translate(|t| Value::Float(t.literal.parse().unwrap_or(f64::NAN))),
        token(INTEGER).translate(|t| Value::Int(t.literal.parse().unwrap_or(0))),
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
    combine3(string_literal(), token(":"), value).translate(|(key, _, value)| (key, value))
}

fn object() -> Parser<Value> {
    combine3(token("{"), many_separated(member, token(",")), token("}"))
        .translate(|(_, members, _)| Value::Object(members))
}

const SAMPLE: &str = r#"{
    "name": "parsix",
    "stable": true,
    "versions": [1, 2, 3],
    "ratio": 0.5,
    "nested": {"inner": null}
}"#;

fn main() {
    let document = std::env::args().nth(1).unwrap_or_else(|| SAMPLE.to_string());
    let parser = value().end();
    match parse_str(&json_rules(), &document, "<argument>", &parser) {
        Ok(parsed) => println!("{parsed:#?}"),
        Err(failure) => {
            eprintln!("{failure}");
            std::process::exit(1);
        }
    }
}
