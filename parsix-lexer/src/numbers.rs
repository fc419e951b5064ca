use parsix_source::{ConfigError, FLOAT, INTEGER, NUMBER_NO_FOLLOW};

use crate::config::NumberRules;

/// A generated numeric guard: a regex source and the kind it tags.
pub(crate) struct NumberGuard {
    pub pattern: String,
    pub kind: &'static str,
}

/// Generates the dynamic guards for the numbers preset, in match order.
///
/// For every accepted family a "no-follow" guard precedes the accepting
/// guard: it matches the number glued to a character that may not follow it
/// (a letter, a dangling exponent marker, a dangling separator) and tags the
/// result `__number_nofollow`, which the lexer turns into a failure. The
/// prefixed integer families (`0x`/`0o`/`0b`) carry their own no-follow
/// guards and are accepted before the decimal no-follow guard runs, so that
/// `0x1f` is never mistaken for the decimal `0` glued to `x1f`.
pub(crate) fn number_guards(rules: &NumberRules) -> Result<Vec<NumberGuard>, ConfigError> {
    let separator = validate_separator(rules.separator.as_deref())?;
    let sign = if rules.signed { "[+-]?" } else { "" };

    let dec = digit_run("0-9", separator);
    let hex = digit_run("0-9a-fA-F", separator);
    let oct = digit_run("0-7", separator);
    let bin = digit_run("01", separator);

    let mut guards = Vec::new();

    if rules.float {
        let core = format!("{sign}{dec}\\.(?:{dec})?");
        if rules.no_follow {
            let after_digits = forbidden_suffix(|c| c.is_ascii_digit(), "0-9", separator);
            let after_mantissa =
                forbidden_suffix(|c| c.is_ascii_digit() || matches!(c, 'e' | 'E'), "0-9", separator);
            let pattern = format!(
                "{core}(?:(?:[eE][+-]?{dec}){after_digits}|[eE][+-]?(?:[^0-9+\\-]|$)|{after_mantissa})"
            );
            guards.push(NumberGuard {
                pattern,
                kind: NUMBER_NO_FOLLOW,
            });
        }
        guards.push(NumberGuard {
            pattern: format!("{core}(?:[eE][+-]?{dec})?"),
            kind: FLOAT,
        });
    }

    if rules.integer {
        if rules.no_follow {
            let after_hex = forbidden_suffix(|c| c.is_ascii_hexdigit(), "0-9a-fA-F", separator);
            let after_oct = forbidden_suffix(|c| ('0'..='7').contains(&c), "0-7", separator);
            let after_bin = forbidden_suffix(|c| c == '0' || c == '1', "01", separator);
            guards.push(NumberGuard {
                pattern: format!("{sign}0[xX]{hex}{after_hex}"),
                kind: NUMBER_NO_FOLLOW,
            });
            guards.push(NumberGuard {
                pattern: format!("{sign}0[oO]{oct}{after_oct}"),
                kind: NUMBER_NO_FOLLOW,
            });
            guards.push(NumberGuard {
                pattern: format!("{sign}0[bB]{bin}{after_bin}"),
                kind: NUMBER_NO_FOLLOW,
            });
        }
        guards.push(NumberGuard {
            pattern: format!("{sign}0(?:[xX]{hex}|[oO]{oct}|[bB]{bin})"),
            kind: INTEGER,
        });
        if rules.no_follow {
            let after_dec = forbidden_suffix(|c| c.is_ascii_digit(), "0-9", separator);
            guards.push(NumberGuard {
                pattern: format!("{sign}{dec}{after_dec}"),
                kind: NUMBER_NO_FOLLOW,
            });
        }
        guards.push(NumberGuard {
            pattern: format!("{sign}{dec}"),
            kind: INTEGER,
        });
    }

    Ok(guards)
}

fn validate_separator(separator: Option<&str>) -> Result<Option<char>, ConfigError> {
    match separator {
        None => Ok(None),
        Some(s) => {
            let mut chars = s.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(ConfigError::InvalidSeparator(s.to_string())),
            };
            if c.is_ascii_hexdigit() {
                return Err(ConfigError::SeparatorIsHexDigit(c));
            }
            Ok(Some(c))
        }
    }
}

/// A run of at least one digit of `class`, with optional single separators
/// between digits (never leading or trailing).
fn digit_run(class: &str, separator: Option<char>) -> String {
    match separator {
        Some(sep) => {
            let sep = regex::escape(&sep.to_string());
            format!("[{class}](?:{sep}?[{class}])*")
        }
        None => format!("[{class}]+"),
    }
}

/// The character class of word characters that may not follow a number of
/// the given digit family, written without look-ahead: either a forbidden
/// word character outright, or the separator glued to something that is not
/// a digit of the family (covering dangling separators like `123_x`).
fn forbidden_suffix(
    family: impl Fn(char) -> bool,
    family_class: &str,
    separator: Option<char>,
) -> String {
    let base: String = ('0'..='9')
        .chain('A'..='Z')
        .chain('a'..='z')
        .chain(std::iter::once('_'))
        .filter(|c| !family(*c) && Some(*c) != separator)
        .collect();
    match separator {
        Some(sep) => {
            let sep = regex::escape(&sep.to_string());
            format!("(?:[{base}]|{sep}(?:[^{family_class}]|$))")
        }
        None => format!("[{base}]"),
    }
}
