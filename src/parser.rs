// ABOUTME: Parser — turns source text into `Value` trees using nom combinators
// Integers, booleans, symbols, strings (desugared to `(q "...")`), backtick-
// delimited extended symbol tokens, lists, and nested block comments.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use crate::error::EvalError;
use crate::value::Value;

fn line_comment(input: &str) -> IResult<&str, ()> {
    value((), (char(';'), nom::bytes::complete::take_while(|c| c != '\n'))).parse(input)
}

/// `(; ... )`, paren-matched so block comments nest with ordinary
/// parens inside them.
fn block_comment(input: &str) -> IResult<&str, ()> {
    let (mut input, _) = tag("(;")(input)?;
    let mut depth = 1usize;
    loop {
        match input.chars().next() {
            Some('(') => {
                depth += 1;
                input = &input[1..];
            }
            Some(')') => {
                depth -= 1;
                input = &input[1..];
                if depth == 0 {
                    return Ok((input, ()));
                }
            }
            Some(c) => input = &input[c.len_utf8()..],
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Eof)))
            }
        }
    }
}

fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((value((), multispace1), line_comment, block_comment)))).parse(input)
}

fn parse_int(input: &str) -> IResult<&str, Value> {
    map(
        recognize((opt(char('-')), digit1)),
        |s: &str| Value::Int(s.parse().unwrap_or(0)),
    )
    .parse(input)
}

/// `true`/`false` are reserved literal tokens, but only as whole
/// tokens: `tag` alone would also match the first four/five
/// characters of an ordinary symbol like `truest` or `falsehood`,
/// leaving the rest as corrupt trailing input. Require the match not
/// be followed by another symbol character.
fn parse_bool(input: &str) -> IResult<&str, Value> {
    let (rest, word) = alt((tag("true"), tag("false"))).parse(input)?;
    if rest.chars().next().is_some_and(is_symbol_char) {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }
    Ok((rest, Value::Bool(word == "true")))
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';' | '\'' | '`')
}

fn parse_symbol(input: &str) -> IResult<&str, Value> {
    map(take_while1(is_symbol_char), Value::symbol).parse(input)
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, content) = delimited(
        char('"'),
        opt(escaped_transform(
            none_of("\\\""),
            '\\',
            alt((
                value("\\", char('\\')),
                value("\"", char('"')),
                value("\n", char('n')),
                value("\t", char('t')),
            )),
        )),
        char('"'),
    )
    .parse(input)?;
    let text = content.unwrap_or_default();
    Ok((input, Value::cons(Value::symbol("q"), Value::cons(Value::string(text), Value::Nil))))
}

/// `` `…` ``: a symbol token that may contain characters (spaces,
/// parens, quotes) that would otherwise end a bare symbol. A doubled
/// backtick inside is a literal backtick.
fn parse_backtick_symbol(input: &str) -> IResult<&str, Value> {
    let (mut input, _) = char('`')(input)?;
    let mut text = String::new();
    loop {
        match input.chars().next() {
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Eof)))
            }
            Some('`') => {
                let rest = &input[1..];
                if rest.starts_with('`') {
                    text.push('`');
                    input = &rest[1..];
                } else {
                    return Ok((rest, Value::symbol(text)));
                }
            }
            Some(c) => {
                text.push(c);
                input = &input[c.len_utf8()..];
            }
        }
    }
}

fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, items) = many0((parse_value, ws).map(|(v, _)| v)).parse(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, Value::list_from(items)))
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((
        parse_list,
        parse_string,
        parse_backtick_symbol,
        parse_bool,
        parse_int,
        parse_symbol,
    ))
    .parse(input)
}

/// Parses exactly one top-level form, returning the remaining input.
pub fn parse_one(input: &str) -> Result<(Value, &str), EvalError> {
    let (input, _) = ws(input).map_err(|_| EvalError::parse("unexpected input"))?;
    let (rest, value) = parse_value(input).map_err(|e| EvalError::parse(format!("parse error: {e}")))?;
    Ok((value, rest))
}

/// Parses every top-level form in `input`.
pub fn parse_program(input: &str) -> Result<Vec<Value>, EvalError> {
    let mut forms = Vec::new();
    let mut rest = input;
    loop {
        let (after_ws, _) = ws(rest).map_err(|_| EvalError::parse("unexpected input"))?;
        if after_ws.trim().is_empty() {
            return Ok(forms);
        }
        let (value, next_rest) = parse_one(after_ws)?;
        forms.push(value);
        rest = next_rest;
    }
}

/// True if `input` has balanced parens and no unterminated string — used
/// by the REPL to decide whether to keep reading more lines.
pub fn is_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => {}
        }
    }
    depth <= 0 && !in_string
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::cons_iter;

    #[test]
    fn parses_integers_and_negatives() {
        assert_eq!(parse_one("42").unwrap().0, Value::Int(42));
        assert_eq!(parse_one("-7").unwrap().0, Value::Int(-7));
    }

    #[test]
    fn parses_a_list_of_mixed_atoms() {
        let (v, _) = parse_one("(add 1 2)").unwrap();
        let items: Vec<Value> = cons_iter(v).collect();
        assert_eq!(items, vec![Value::symbol("add"), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn string_literal_desugars_to_quote_form() {
        let (v, _) = parse_one("\"hi\"").unwrap();
        let items: Vec<Value> = cons_iter(v).collect();
        assert_eq!(items, vec![Value::symbol("q"), Value::string("hi")]);
    }

    #[test]
    fn backtick_symbol_can_contain_otherwise_illegal_chars() {
        let (v, _) = parse_one("`hello world`").unwrap();
        assert_eq!(v, Value::symbol("hello world"));
    }

    #[test]
    fn doubled_backtick_is_a_literal_backtick() {
        let (v, _) = parse_one("`a``b`").unwrap();
        assert_eq!(v, Value::symbol("a`b"));
    }

    #[test]
    fn nested_block_comments_are_skipped() {
        let (v, _) = parse_one("(; outer (; inner ;) still ;) 1").unwrap();
        assert_eq!(v, Value::Int(1));
    }

    #[test]
    fn is_complete_tracks_paren_depth() {
        assert!(!is_complete("(add 1"));
        assert!(is_complete("(add 1 2)"));
        assert!(!is_complete("\"unterminated"));
    }

    #[test]
    fn bare_true_and_false_are_boolean_literals() {
        assert_eq!(parse_one("true").unwrap().0, Value::Bool(true));
        assert_eq!(parse_one("false").unwrap().0, Value::Bool(false));
    }

    #[test]
    fn a_symbol_merely_prefixed_by_true_or_false_is_not_a_boolean() {
        assert_eq!(parse_one("truest").unwrap().0, Value::symbol("truest"));
        assert_eq!(parse_one("falsehood").unwrap().0, Value::symbol("falsehood"));
        assert_eq!(parse_one("trueValue").unwrap().0, Value::symbol("trueValue"));
    }
}
