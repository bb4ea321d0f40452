// Parsers for individual interaction commands

use super::ast::{ControlChange, Event};
use super::lexer::{identifier, number_literal, word, ws};
use crate::aggregate::{Aggregation, SortOrder};
use crate::tooltip::HoverTarget;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, map_res},
    multi::separated_list0,
    sequence::{preceded, separated_pair},
    IResult,
};

enum ControlArg {
    X(String),
    Y(String),
    Aggregation(Aggregation),
    Sort(SortOrder),
}

fn parse_control_arg(input: &str) -> IResult<&str, ControlArg> {
    alt((
        map(preceded(ws(tag("x:")), ws(word)), ControlArg::X),
        map(preceded(ws(tag("y:")), ws(word)), ControlArg::Y),
        map(
            preceded(ws(tag("aggregation:")), ws(map_res(identifier, |s| s.parse::<Aggregation>()))),
            ControlArg::Aggregation,
        ),
        map(
            preceded(ws(tag("sort:")), ws(map_res(identifier, |s| s.parse::<SortOrder>()))),
            ControlArg::Sort,
        ),
    ))(input)
}

/// Parse a controls command
/// Format: controls(x: Genre, y: NA_Sales, aggregation: count, sort: asc), every argument optional
pub fn parse_controls(input: &str) -> IResult<&str, Event> {
    let (input, _) = ws(tag("controls"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), parse_control_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    // later arguments override earlier ones
    let mut change = ControlChange::default();
    for arg in args {
        match arg {
            ControlArg::X(x) => change.x = Some(x),
            ControlArg::Y(y) => change.y = Some(y),
            ControlArg::Aggregation(a) => change.aggregation = Some(a),
            ControlArg::Sort(s) => change.sort = Some(s),
        }
    }
    Ok((input, Event::Controls(change)))
}

/// Parse a hover command
/// Format: hover(Action), hover("Take-Two Interactive") or hover(x: 120, y: 300)
pub fn parse_hover(input: &str) -> IResult<&str, Event> {
    let (input, _) = ws(tag("hover"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, target) = alt((
        map(
            separated_pair(
                preceded(ws(tag("x:")), ws(number_literal)),
                ws(char(',')),
                preceded(ws(tag("y:")), ws(number_literal)),
            ),
            |(x, y)| HoverTarget::Point { x, y },
        ),
        map(ws(word), HoverTarget::Key),
    ))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Event::Hover(target)))
}

/// Parse a toggle command
/// Format: toggle(Easy)
pub fn parse_toggle(input: &str) -> IResult<&str, Event> {
    let (input, _) = ws(tag("toggle"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, category) = ws(word)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Event::Toggle(category)))
}

/// Parse a clear command
/// Format: clear()
pub fn parse_clear(input: &str) -> IResult<&str, Event> {
    let (input, _) = ws(tag("clear"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Event::Clear))
}

pub fn parse_event(input: &str) -> IResult<&str, Event> {
    alt((parse_controls, parse_hover, parse_toggle, parse_clear))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_controls_all_args() {
        let (_, event) = parse_controls("controls(x: Genre, y: NA_Sales, aggregation: count, sort: asc)").unwrap();
        assert_eq!(
            event,
            Event::Controls(ControlChange {
                x: Some("Genre".into()),
                y: Some("NA_Sales".into()),
                aggregation: Some(Aggregation::Count),
                sort: Some(SortOrder::Asc),
            })
        );
    }

    #[test]
    fn test_parse_controls_partial_and_reordered() {
        let (_, event) = parse_controls("controls( sort: desc , x: Year )").unwrap();
        match event {
            Event::Controls(change) => {
                assert_eq!(change.x.as_deref(), Some("Year"));
                assert_eq!(change.sort, Some(SortOrder::Desc));
                assert!(change.y.is_none());
                assert!(change.aggregation.is_none());
            }
            _ => panic!("Expected Controls event"),
        }
    }

    #[test]
    fn test_parse_controls_rejects_unknown_aggregation() {
        assert!(parse_controls("controls(aggregation: mean)").is_err());
    }

    #[test]
    fn test_parse_hover_forms() {
        assert_eq!(
            parse_hover("hover(Action)").unwrap().1,
            Event::Hover(HoverTarget::Key("Action".into()))
        );
        assert_eq!(
            parse_hover(r#"hover("Take-Two Interactive")"#).unwrap().1,
            Event::Hover(HoverTarget::Key("Take-Two Interactive".into()))
        );
        assert_eq!(
            parse_hover("hover(x: 120, y: 300.5)").unwrap().1,
            Event::Hover(HoverTarget::Point { x: 120.0, y: 300.5 })
        );
    }

    #[test]
    fn test_parse_numeric_keys() {
        assert_eq!(
            parse_hover("hover(2006)").unwrap().1,
            Event::Hover(HoverTarget::Key("2006".into()))
        );
        assert_eq!(parse_toggle("toggle(3DS)").unwrap().1, Event::Toggle("3DS".into()));
    }

    #[test]
    fn test_parse_toggle_and_clear() {
        assert_eq!(parse_event("toggle(Easy)").unwrap().1, Event::Toggle("Easy".into()));
        assert_eq!(parse_event("clear()").unwrap().1, Event::Clear);
        assert!(parse_event("toggle()").is_err());
    }
}
