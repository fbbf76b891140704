//! Availability condition expressions
//!
//! Each participant profile may carry a small boolean expression over world
//! flags, read once from configuration, e.g. `"!surge && (cordon_open || army_left)"`.
//! The identifier `surge` is answered by the world clock; every other
//! identifier is a world-state flag.

use ahash::AHashMap;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, multispace0};
use nom::combinator::{all_consuming, map, recognize};
use nom::error::ParseError;
use nom::multi::{many0, many0_count};
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};

use crate::core::error::{DirectorError, Result};
use crate::world::flags::FlagQuery;
use crate::world::oracle::WorldClock;

/// Identifier that reads the global hazard flag from the clock
pub const SURGE_FLAG: &str = "surge";

/// Binary logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Condition AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `true` or `false`
    Literal(bool),
    /// A world-state flag reference (e.g. `"cordon_open"`)
    Flag(String),
    /// Negation (`!cond`)
    Not(Box<Condition>),
    /// `left && right` / `left || right`
    Logic {
        op: LogicOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

impl Condition {
    /// Parse a condition expression
    pub fn parse(input: &str) -> Result<Self> {
        all_consuming(ws(or_expr))
            .parse(input)
            .map(|(_, cond)| cond)
            .map_err(|e| DirectorError::Condition(format!("'{}': {:?}", input, e)))
    }

    /// Evaluate against a read-only flag view
    pub fn eval(&self, flags: &dyn FlagQuery) -> bool {
        match self {
            Condition::Literal(value) => *value,
            Condition::Flag(name) => flags.flag(name),
            Condition::Not(inner) => !inner.eval(flags),
            Condition::Logic { op, left, right } => match op {
                LogicOp::And => left.eval(flags) && right.eval(flags),
                LogicOp::Or => left.eval(flags) || right.eval(flags),
            },
        }
    }

    /// All flag names this condition reads
    pub fn referenced_flags(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_flags(&mut out);
        out
    }

    fn collect_flags<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Literal(_) => {}
            Condition::Flag(name) => out.push(name),
            Condition::Not(inner) => inner.collect_flags(out),
            Condition::Logic { left, right, .. } => {
                left.collect_flags(out);
                right.collect_flags(out);
            }
        }
    }
}

/// Flag view that answers [`SURGE_FLAG`] from the clock
pub struct ConditionScope<'a> {
    pub flags: &'a dyn FlagQuery,
    pub clock: &'a dyn WorldClock,
}

impl FlagQuery for ConditionScope<'_> {
    fn flag(&self, name: &str) -> bool {
        if name == SURGE_FLAG {
            self.clock.surge_active()
        } else {
            self.flags.flag(name)
        }
    }
}

/// Availability conditions keyed by participant profile
#[derive(Debug, Clone, Default)]
pub struct AvailabilityConditions {
    conditions: AHashMap<String, Condition>,
}

impl AvailabilityConditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: impl Into<String>, condition: Condition) {
        self.conditions.insert(profile.into(), condition);
    }

    pub fn get(&self, profile: &str) -> Option<&Condition> {
        self.conditions.get(profile)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag(".")))),
    ))
    .parse(input)
}

fn atom(input: &str) -> IResult<&str, Condition> {
    let (rest, name) = identifier(input)?;
    let cond = match name {
        "true" => Condition::Literal(true),
        "false" => Condition::Literal(false),
        _ => Condition::Flag(name.to_string()),
    };
    Ok((rest, cond))
}

fn parens(input: &str) -> IResult<&str, Condition> {
    delimited(char('('), ws(or_expr), char(')')).parse(input)
}

fn primary(input: &str) -> IResult<&str, Condition> {
    ws(alt((parens, atom))).parse(input)
}

fn unary(input: &str) -> IResult<&str, Condition> {
    alt((
        map(preceded(ws(char('!')), unary), |c| Condition::Not(Box::new(c))),
        primary,
    ))
    .parse(input)
}

fn fold_logic(first: Condition, rest: Vec<Condition>, op: LogicOp) -> Condition {
    rest.into_iter().fold(first, |left, right| Condition::Logic {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn and_expr(input: &str) -> IResult<&str, Condition> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(ws(tag("&&")), unary)).parse(input)?;
    Ok((input, fold_logic(first, rest, LogicOp::And)))
}

fn or_expr(input: &str) -> IResult<&str, Condition> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(ws(tag("||")), and_expr)).parse(input)?;
    Ok((input, fold_logic(first, rest, LogicOp::Or)))
}
