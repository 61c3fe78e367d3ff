// Pipeline parser for the shelf DSL

use super::ast::{FieldRef, ShelfSpec};
use super::lexer::{bool_literal, identifier, string_literal, ws};
use crate::ir::{ChartType, ColorScheme, Role};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alphanumeric1, char},
    combinator::{eof, map, map_res, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, preceded},
    IResult,
};

#[derive(Debug)]
enum PipelineComponent {
    Columns(Vec<FieldRef>),
    Rows(Vec<FieldRef>),
    Legend(bool),
    Grid(bool),
    Scheme(ColorScheme),
}

/// Chart type name, e.g. `bar` or `bar-stacked`
fn parse_chart_type(input: &str) -> IResult<&str, ChartType> {
    map_res(
        recognize(many1(alt((alphanumeric1, tag("-"))))),
        |s: &str| s.parse::<ChartType>(),
    )(input)
}

fn parse_role(input: &str) -> IResult<&str, Role> {
    alt((
        value(Role::Dimension, tag("dimension")),
        value(Role::Dimension, tag("dim")),
        value(Role::Measure, tag("measure")),
    ))(input)
}

/// Field reference
/// Format: name | "quoted name" | name:dim | name:measure
fn parse_field_ref(input: &str) -> IResult<&str, FieldRef> {
    map(
        pair(
            ws(alt((string_literal, identifier))),
            opt(preceded(ws(char(':')), ws(parse_role))),
        ),
        |(name, role)| FieldRef { name, role },
    )(input)
}

fn parse_field_list<'a>(keyword: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<FieldRef>> {
    preceded(
        ws(tag(keyword)),
        delimited(
            ws(char('(')),
            separated_list0(ws(char(',')), parse_field_ref),
            ws(char(')')),
        ),
    )
}

fn parse_flag<'a>(keyword: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, bool> {
    preceded(
        ws(tag(keyword)),
        delimited(ws(char('(')), ws(bool_literal), ws(char(')'))),
    )
}

fn parse_scheme(input: &str) -> IResult<&str, ColorScheme> {
    preceded(
        ws(tag("scheme")),
        delimited(
            ws(char('(')),
            ws(map_res(identifier, |s| s.parse::<ColorScheme>())),
            ws(char(')')),
        ),
    )(input)
}

fn parse_pipeline_component(input: &str) -> IResult<&str, PipelineComponent> {
    alt((
        map(parse_field_list("columns"), PipelineComponent::Columns),
        map(parse_field_list("rows"), PipelineComponent::Rows),
        map(parse_flag("legend"), PipelineComponent::Legend),
        map(parse_flag("grid"), PipelineComponent::Grid),
        map(parse_scheme, PipelineComponent::Scheme),
    ))(input)
}

/// Parse a complete shelf specification
/// Format: chart_type | columns(...) | rows(...) [| legend(bool)] [| grid(bool)] [| scheme(name)]
pub fn parse_shelf_spec(input: &str) -> IResult<&str, ShelfSpec> {
    let (input, chart_type) = ws(parse_chart_type)(input)?;
    let (input, components) = many0(preceded(ws(tag("|")), parse_pipeline_component))(input)?;
    let (input, _) = ws(eof)(input)?;

    let mut columns = None;
    let mut rows = None;
    let mut show_legend = None;
    let mut show_grid = None;
    let mut color_scheme = None;

    for comp in components {
        match comp {
            PipelineComponent::Columns(c) => {
                if columns.replace(c).is_some() {
                    return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
                }
            }
            PipelineComponent::Rows(r) => {
                if rows.replace(r).is_some() {
                    return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
                }
            }
            PipelineComponent::Legend(b) => show_legend = Some(b),
            PipelineComponent::Grid(b) => show_grid = Some(b),
            PipelineComponent::Scheme(s) => color_scheme = Some(s),
        }
    }

    // Both shelves must be present, even if empty
    let (Some(columns), Some(rows)) = (columns, rows) else {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    };

    Ok((
        input,
        ShelfSpec {
            chart_type,
            columns,
            rows,
            show_legend,
            show_grid,
            color_scheme,
        },
    ))
}
