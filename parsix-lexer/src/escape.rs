use parsix_source::{ParseFailure, SourcePosition};

/// Decodes one escape sequence, entered with the cursor just past the
/// backslash. The cursor is left after the last character of the sequence.
///
/// Recognized forms:
/// - `a b f n r t v \ ' " ?` for the conventional ASCII controls / literal;
/// - `o`/`O` + exactly 3 octal digits;
/// - `x`/`X` + exactly 2 hex digits;
/// - `u`/`U` + exactly 4 hex digits (BMP code point);
/// - `w`/`W` + 1 to 6 hex digits (any Unicode scalar value);
/// - a decimal digit starts a run of 1 to 3 decimal digits, read greedily.
pub fn decode_escape(pos: &mut SourcePosition) -> Result<char, ParseFailure> {
    let at = pos.clone();
    let lead = match pos.current_char() {
        Some(c) => c,
        None => return Err(ParseFailure::unexpected_eof(pos.name())),
    };
    pos.advance()?;

    match lead {
        'a' => Ok('\x07'),
        'b' => Ok('\x08'),
        'f' => Ok('\x0C'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        't' => Ok('\t'),
        'v' => Ok('\x0B'),
        '\\' => Ok('\\'),
        '\'' => Ok('\''),
        '"' => Ok('"'),
        '?' => Ok('?'),
        'o' | 'O' => {
            let value = read_digits(pos, 8, 3, 3)?;
            char_of(value, &at)
        }
        'x' | 'X' => {
            let value = read_digits(pos, 16, 2, 2)?;
            char_of(value, &at)
        }
        'u' | 'U' => {
            let value = read_digits(pos, 16, 4, 4)?;
            char_of(value, &at)
        }
        'w' | 'W' => {
            let value = read_digits(pos, 16, 1, 6)?;
            char_of(value, &at)
        }
        '0'..='9' => {
            let mut value = lead.to_digit(10).unwrap_or(0);
            for _ in 0..2 {
                match pos.current_char().and_then(|c| c.to_digit(10)) {
                    Some(digit) => {
                        pos.advance()?;
                        value = value * 10 + digit;
                    }
                    None => break,
                }
            }
            char_of(value, &at)
        }
        other => Err(ParseFailure::at(
            &at,
            format!("invalid escape character '{other}'"),
        )),
    }
}

/// Reads between `min` and `max` digits of the given radix, greedily.
fn read_digits(
    pos: &mut SourcePosition,
    radix: u32,
    min: usize,
    max: usize,
) -> Result<u32, ParseFailure> {
    let mut value = 0u32;
    let mut count = 0usize;
    while count < max {
        match pos.current_char() {
            Some(c) => match c.to_digit(radix) {
                Some(digit) => {
                    pos.advance()?;
                    value = value * radix + digit;
                    count += 1;
                }
                None => break,
            },
            None => {
                if count < min {
                    return Err(ParseFailure::unexpected_eof(pos.name()));
                }
                break;
            }
        }
    }
    if count < min {
        return Err(ParseFailure::at(
            pos,
            format!("expected {min} base-{radix} digits in escape sequence"),
        ));
    }
    Ok(value)
}

fn char_of(value: u32, at: &SourcePosition) -> Result<char, ParseFailure> {
    char::from_u32(value).ok_or_else(|| {
        ParseFailure::at(at, format!("escape sequence denotes invalid code point {value:#x}"))
    })
}
