//! Calculator demo: integer expressions with two precedence levels, built
//! from `chain_left_more` and a recursive grammar. The operator table also
//! shows the exported precedence metadata.

use std::rc::Rc;
use std::sync::Arc;

use parsix::{
    chain_left_more, choices, combine3, parse_str, token, Assoc, BinaryOp, NumberRules,
    OperatorDef, Parser, RuleSet, INTEGER,
};

fn calc_rules() -> Arc<RuleSet> {
    Arc::new(
        RuleSet::builder()
            .parentheses(true, false, false)
            .numbers(NumberRules::integers_only())
            .operator_level(vec![
                OperatorDef::literal("+").assoc(Assoc::Left),
                OperatorDef::literal("-").assoc(Assoc::Left),
            ])
            .operator_level(vec![
                OperatorDef::literal("*").assoc(Assoc::Left),
                OperatorDef::literal("/").assoc(Assoc::Left),
            ])
            .build()
            .expect("the calculator rule set is well-formed"),
    )
}

fn factor() -> Parser<i64> {
    choices(vec![
        token(INTEGER).translate(|t| t.literal.parse().unwrap_or(0)),
        combine3(token("("), expression, token(")")).translate(|(_, value, _)| value),
    ])
}

fn term() -> Parser<i64> {
    let operator: Parser<BinaryOp<i64>> = choices(vec![
        token("*").translate(|_| Rc::new(|x: i64, y: i64| x * y) as BinaryOp<i64>),
        token("/").translate(|_| Rc::new(|x: i64, y: i64| x / y) as BinaryOp<i64>),
    ]);
    chain_left_more(factor, operator)
}

fn expression() -> Parser<i64> {
    let operator: Parser<BinaryOp<i64>> = choices(vec![
        token("+").translate(|_| Rc::new(|x: i64, y: i64| x + y) as BinaryOp<i64>),
        token("-").translate(|_| Rc::new(|x: i64, y: i64| x - y) as BinaryOp<i64>),
    ]);
    chain_left_more(term, operator)
}

fn main() {
    let rules = calc_rules();

    println!("operator precedence table ({} levels):", rules.precedence().levels());
    for op in ["+", "-", "*", "/"] {
        if let Some((level, assoc)) = rules.precedence().lookup(op) {
            println!("  {op}  level {level}, {assoc:?}-associative");
        }
    }
    println!();

    let inputs: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            ["10 - 3 - 4", "2 + 3 * 4", "(2 + 3) * 4", "100 / 5 / 2"]
                .into_iter()
                .map(String::from)
                .collect()
        } else {
            args
        }
    };

    let parser = expression().end();
    for input in inputs {
        match parse_str(&rules, &input, "<argument>", &parser) {
            Ok(result) => println!("{input} = {result}"),
            Err(failure) => eprintln!("{failure}"),
        }
    }
}
