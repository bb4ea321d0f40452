// Script parser: events separated by `|`

use super::ast::Script;
use super::command::parse_event;
use super::lexer::ws;
use anyhow::{anyhow, Result};
use nom::{
    bytes::complete::tag,
    combinator::{eof, opt},
    multi::separated_list1,
    IResult,
};

/// Parse a complete script
/// Format: event | event | ...
pub fn parse_script(input: &str) -> IResult<&str, Script> {
    // a leading pipe is allowed
    let (input, _) = opt(ws(tag("|")))(input)?;
    let (input, events) = separated_list1(ws(tag("|")), parse_event)(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, Script { events }))
}

/// Parse `source`, reporting where parsing stopped on failure
pub fn parse(source: &str) -> Result<Script> {
    match parse_script(source) {
        Ok((_, script)) => Ok(script),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = source.len() - e.input.len();
            let snippet: String = e.input.chars().take(30).collect();
            Err(anyhow!("Invalid script at offset {}: '{}'", offset, snippet.trim_end()))
        }
        Err(nom::Err::Incomplete(_)) => Err(anyhow!("Incomplete script")),
    }
}
