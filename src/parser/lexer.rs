// Token-level parsers shared by the interaction script commands

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{map, recognize, value},
    multi::{many0_count, many1_count},
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser to skip surrounding whitespace (newlines included)
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Column or category name: letter or underscore, then letters, digits, `_`, `-` or `.`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_"), tag("-"), tag(".")))),
        )),
        |s: &str| s.to_string(),
    )(input)
}

/// Double-quoted string with `\"` and `\\` escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        value(String::new(), tag("\"\"")),
        delimited(
            char('"'),
            escaped_transform(
                is_not("\\\""),
                '\\',
                alt((value("\\", tag("\\")), value("\"", tag("\"")))),
            ),
            char('"'),
        ),
    ))(input)
}

pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// Bare key that may start with a digit: `2006`, `3DS`, `1.5`
pub fn bare_key(input: &str) -> IResult<&str, String> {
    map(
        recognize(many1_count(alt((alphanumeric1, tag("_"), tag("-"), tag("."))))),
        |s: &str| s.to_string(),
    )(input)
}

/// A bare key or a quoted string, for values that may contain spaces
pub fn word(input: &str) -> IResult<&str, String> {
    alt((string_literal, bare_key))(input)
}
