use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use parsix_source::{keyword_kind, ConfigError, Token};

use crate::config::{
    Assoc, GuardAction, GuardPattern, NestedComment, NumberRules, OperatorDef, QuoteRule,
};
use crate::numbers::number_guards;

/// A compiled dynamic guard: an anchored regex tried in declared order.
#[derive(Debug)]
pub(crate) struct DynamicGuard {
    pub(crate) regex: Regex,
    pub(crate) action: GuardAction,
}

/// Operator precedence and associativity tables, populated by declaration
/// order: the index of the outer operator list is the precedence level
/// (0 = lowest). Exported for consumers implementing precedence climbing;
/// the lexer itself never consults these tables.
#[derive(Debug, Default)]
pub struct PrecedenceTable {
    static_ops: HashMap<String, (usize, Assoc)>,
    dynamic_ops: Vec<(Regex, usize, Assoc)>,
    levels: usize,
}

impl PrecedenceTable {
    /// Looks up the precedence level and associativity of an operator
    /// lexeme. Literal declarations are preferred; regex declarations are
    /// tried in declared order and must match the whole lexeme.
    pub fn lookup(&self, literal: &str) -> Option<(usize, Assoc)> {
        if let Some(entry) = self.static_ops.get(literal) {
            return Some(*entry);
        }
        self.dynamic_ops
            .iter()
            .find(|(regex, _, _)| regex.is_match(literal))
            .map(|(_, level, assoc)| (*level, *assoc))
    }

    /// Number of declared precedence levels.
    pub fn levels(&self) -> usize {
        self.levels
    }
}

/// An immutable compiled rule set. Construction happens through
/// [`RuleSet::builder`]; afterwards the set is shared across lexers via
/// `Arc` and never mutated.
#[derive(Debug)]
pub struct RuleSet {
    skip_spaces: bool,
    static_guard: HashMap<String, GuardAction>,
    static_keys: Vec<String>,
    dynamic_guard: Vec<DynamicGuard>,
    line_comment: Option<String>,
    nested_comment: Option<NestedComment>,
    quotes: Vec<QuoteRule>,
    precedence: PrecedenceTable,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    pub fn skip_spaces(&self) -> bool {
        self.skip_spaces
    }

    pub fn line_comment(&self) -> Option<&str> {
        self.line_comment.as_deref()
    }

    pub fn nested_comment(&self) -> Option<&NestedComment> {
        self.nested_comment.as_ref()
    }

    pub fn precedence(&self) -> &PrecedenceTable {
        &self.precedence
    }

    /// The quote rule whose opening delimiter prefixes `rest`, if any.
    /// Longer delimiters win, so a `"""` rule shadows a `"` rule.
    pub(crate) fn quote_for(&self, rest: &str) -> Option<&QuoteRule> {
        self.quotes.iter().find(|q| rest.starts_with(&q.start))
    }

    /// Static guard lookup: first the whole space-delimited word, then a
    /// prefix scan over the literals in decreasing length, so the longest
    /// literal wins.
    pub(crate) fn match_static<'r>(&self, rest: &'r str) -> Option<(&GuardAction, &'r str)> {
        let word = rest.split([' ', '\t', '\n']).next().unwrap_or("");
        if !word.is_empty() {
            if let Some(action) = self.static_guard.get(word) {
                return Some((action, word));
            }
        }
        for key in &self.static_keys {
            if rest.starts_with(key.as_str()) {
                let action = self.static_guard.get(key)?;
                return Some((action, &rest[..key.len()]));
            }
        }
        None
    }

    /// Dynamic guard scan in declared order; the first regex match wins and
    /// the whole match is consumed.
    pub(crate) fn match_dynamic<'r>(&self, rest: &'r str) -> Option<(&GuardAction, &'r str)> {
        for guard in &self.dynamic_guard {
            if let Some(m) = guard.regex.find(rest) {
                return Some((&guard.action, m.as_str()));
            }
        }
        None
    }
}

/// Accumulates declarative lexer configuration and compiles it into a
/// [`RuleSet`].
pub struct RuleSetBuilder {
    skip_spaces: bool,
    free_rules: Vec<(GuardPattern, GuardAction)>,
    parens_round: bool,
    parens_square: bool,
    parens_curly: bool,
    keywords: Vec<GuardPattern>,
    numbers: Option<NumberRules>,
    quotes: Vec<QuoteRule>,
    line_comment: Option<String>,
    nested_comment: Option<NestedComment>,
    operators: Vec<Vec<OperatorDef>>,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self {
            skip_spaces: true,
            free_rules: Vec::new(),
            parens_round: false,
            parens_square: false,
            parens_curly: false,
            keywords: Vec::new(),
            numbers: None,
            quotes: Vec::new(),
            line_comment: None,
            nested_comment: None,
            operators: Vec::new(),
        }
    }

    pub fn skip_spaces(mut self, skip: bool) -> Self {
        self.skip_spaces = skip;
        self
    }

    /// A free rule: the literal lexeme tagged with the given kind.
    pub fn rule(mut self, literal: &str, kind: &str) -> Self {
        self.free_rules.push((
            GuardPattern::Literal(literal.to_string()),
            GuardAction::Kind(kind.to_string()),
        ));
        self
    }

    /// A free rule whose matched token is rewritten by `transform`.
    pub fn rule_transform(
        mut self,
        literal: &str,
        transform: impl Fn(Token) -> Token + Send + Sync + 'static,
    ) -> Self {
        self.free_rules.push((
            GuardPattern::Literal(literal.to_string()),
            GuardAction::Transform(Arc::new(transform)),
        ));
        self
    }

    /// A free regex rule, tried in declared order after all literals.
    pub fn rule_pattern(mut self, pattern: &str, kind: &str) -> Self {
        self.free_rules.push((
            GuardPattern::Regex(pattern.to_string()),
            GuardAction::Kind(kind.to_string()),
        ));
        self
    }

    /// A free regex rule whose matched token is rewritten by `transform`.
    pub fn rule_pattern_transform(
        mut self,
        pattern: &str,
        transform: impl Fn(Token) -> Token + Send + Sync + 'static,
    ) -> Self {
        self.free_rules.push((
            GuardPattern::Regex(pattern.to_string()),
            GuardAction::Transform(Arc::new(transform)),
        ));
        self
    }

    /// Installs literal guards for the enabled bracket pairs. The token
    /// kind of each bracket equals its literal.
    pub fn parentheses(mut self, round: bool, square: bool, curly: bool) -> Self {
        self.parens_round = round;
        self.parens_square = square;
        self.parens_curly = curly;
        self
    }

    /// A literal keyword, tagged `__kw_<word>`.
    pub fn keyword(mut self, word: &str) -> Self {
        self.keywords.push(GuardPattern::Literal(word.to_string()));
        self
    }

    pub fn keywords<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        for word in words {
            self.keywords.push(GuardPattern::Literal(word.to_string()));
        }
        self
    }

    /// A keyword regex; every match is tagged `__kw_<match>`.
    pub fn keyword_pattern(mut self, pattern: &str) -> Self {
        self.keywords.push(GuardPattern::Regex(pattern.to_string()));
        self
    }

    pub fn numbers(mut self, numbers: NumberRules) -> Self {
        self.numbers = Some(numbers);
        self
    }

    /// A single-line escaped string delimited by `delim`, tagged
    /// `__quoted_by_<delim>`.
    pub fn quote(mut self, delim: &str) -> Self {
        self.quotes.push(QuoteRule::symmetric(delim));
        self
    }

    pub fn quote_pair(mut self, start: &str, stop: &str) -> Self {
        self.quotes.push(QuoteRule::pair(start, stop));
        self
    }

    pub fn quote_rule(mut self, rule: QuoteRule) -> Self {
        self.quotes.push(rule);
        self
    }

    pub fn line_comment(mut self, prefix: &str) -> Self {
        self.line_comment = Some(prefix.to_string());
        self
    }

    /// A flat block comment where `delim` both opens and closes.
    pub fn block_comment(mut self, delim: &str) -> Self {
        self.nested_comment = Some(NestedComment {
            begin: delim.to_string(),
            end: delim.to_string(),
            nested: false,
        });
        self
    }

    pub fn nested_comment(mut self, begin: &str, end: &str, nested: bool) -> Self {
        self.nested_comment = Some(NestedComment {
            begin: begin.to_string(),
            end: end.to_string(),
            nested,
        });
        self
    }

    /// Appends one precedence level of operators; earlier calls declare
    /// lower levels. Operator lexemes also become ordinary guards whose
    /// token kind equals the matched lexeme.
    pub fn operator_level(mut self, level: Vec<OperatorDef>) -> Self {
        self.operators.push(level);
        self
    }

    pub fn operators(mut self, levels: Vec<Vec<OperatorDef>>) -> Self {
        self.operators = levels;
        self
    }

    pub fn build(self) -> Result<RuleSet, ConfigError> {
        let mut static_guard: HashMap<String, GuardAction> = HashMap::new();
        let mut dynamic_sources: Vec<(String, GuardAction)> = Vec::new();

        let mut install_static = |literal: String, action: GuardAction| {
            static_guard.entry(literal).or_insert(action);
        };

        for (pattern, action) in self.free_rules {
            match pattern {
                GuardPattern::Literal(lit) => install_static(lit, action),
                GuardPattern::Regex(src) => dynamic_sources.push((src, action)),
            }
        }

        let pairs: &[(bool, [&str; 2])] = &[
            (self.parens_round, ["(", ")"]),
            (self.parens_square, ["[", "]"]),
            (self.parens_curly, ["{", "}"]),
        ];
        for (enabled, brackets) in pairs {
            if *enabled {
                for bracket in brackets {
                    install_static(
                        bracket.to_string(),
                        GuardAction::Kind(bracket.to_string()),
                    );
                }
            }
        }

        for keyword in self.keywords {
            match keyword {
                GuardPattern::Literal(word) => {
                    let kind = keyword_kind(&word);
                    install_static(word, GuardAction::Kind(kind));
                }
                GuardPattern::Regex(src) => {
                    dynamic_sources.push((
                        src,
                        GuardAction::Transform(Arc::new(|tok: Token| {
                            let kind = keyword_kind(&tok.literal);
                            tok.with_kind(kind)
                        })),
                    ));
                }
            }
        }

        let mut precedence = PrecedenceTable {
            levels: self.operators.len(),
            ..PrecedenceTable::default()
        };
        for (level, defs) in self.operators.into_iter().enumerate() {
            for def in defs {
                match def.pattern {
                    GuardPattern::Literal(op) => {
                        precedence
                            .static_ops
                            .entry(op.clone())
                            .or_insert((level, def.assoc));
                        install_static(op.clone(), GuardAction::Kind(op));
                    }
                    GuardPattern::Regex(src) => {
                        precedence.dynamic_ops.push((
                            compile(&src, "^(?:", ")$")?,
                            level,
                            def.assoc,
                        ));
                        dynamic_sources.push((
                            src,
                            GuardAction::Transform(Arc::new(|tok: Token| {
                                let kind = tok.literal.clone();
                                tok.with_kind(kind)
                            })),
                        ));
                    }
                }
            }
        }

        if let Some(numbers) = &self.numbers {
            for guard in number_guards(numbers)? {
                dynamic_sources.push((guard.pattern, GuardAction::Kind(guard.kind.to_string())));
            }
        }

        for quote in &self.quotes {
            if quote.start.is_empty() || quote.stop.is_empty() {
                return Err(ConfigError::EmptyQuote);
            }
        }
        let mut quotes = self.quotes;
        quotes.sort_by_key(|q| Reverse(q.start.len()));

        let dynamic_guard = dynamic_sources
            .into_iter()
            .map(|(src, action)| {
                Ok(DynamicGuard {
                    regex: compile(&src, "^(?:", ")")?,
                    action,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut static_keys: Vec<String> = static_guard.keys().cloned().collect();
        static_keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        log::debug!(
            "compiled rule set: {} static guards, {} dynamic guards, {} quote rules, {} precedence levels",
            static_keys.len(),
            dynamic_guard.len(),
            quotes.len(),
            precedence.levels
        );

        Ok(RuleSet {
            skip_spaces: self.skip_spaces,
            static_guard,
            static_keys,
            dynamic_guard,
            line_comment: self.line_comment,
            nested_comment: self.nested_comment,
            quotes,
            precedence,
        })
    }
}

fn compile(source: &str, open: &str, close: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("{open}{source}{close}")).map_err(|e| ConfigError::BadPattern {
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}
