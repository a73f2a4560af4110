use vela_value::{Value, ValueType};

use crate::context::ParseContext;
use crate::issue::{Bound, IssueData, IssueKind, SizeOrigin};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn, Status};

use super::primitive::reject_type;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, PartialEq)]
enum NumberCheckKind {
    Min { value: f64, inclusive: bool },
    Max { value: f64, inclusive: bool },
    Int,
    MultipleOf(f64),
    Finite,
}

#[derive(Debug, Clone, PartialEq)]
struct NumberCheck {
    kind: NumberCheckKind,
    message: Option<String>,
}

/// Accepts non-NaN numbers.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    checks: Vec<NumberCheck>,
    coerce: bool,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the input numerically before checking it.
    pub fn coerced() -> Self {
        Self {
            coerce: true,
            ..Self::default()
        }
    }

    fn with_check(&self, kind: NumberCheckKind) -> Self {
        let mut schema = self.clone();
        schema.checks.push(NumberCheck {
            kind,
            message: None,
        });
        schema
    }

    pub fn gt(&self, value: f64) -> Self {
        self.with_check(NumberCheckKind::Min {
            value,
            inclusive: false,
        })
    }

    pub fn gte(&self, value: f64) -> Self {
        self.with_check(NumberCheckKind::Min {
            value,
            inclusive: true,
        })
    }

    pub fn min(&self, value: f64) -> Self {
        self.gte(value)
    }

    pub fn lt(&self, value: f64) -> Self {
        self.with_check(NumberCheckKind::Max {
            value,
            inclusive: false,
        })
    }

    pub fn lte(&self, value: f64) -> Self {
        self.with_check(NumberCheckKind::Max {
            value,
            inclusive: true,
        })
    }

    pub fn max(&self, value: f64) -> Self {
        self.lte(value)
    }

    pub fn int(&self) -> Self {
        self.with_check(NumberCheckKind::Int)
    }

    pub fn positive(&self) -> Self {
        self.gt(0.0)
    }

    pub fn nonnegative(&self) -> Self {
        self.gte(0.0)
    }

    pub fn negative(&self) -> Self {
        self.lt(0.0)
    }

    pub fn nonpositive(&self) -> Self {
        self.lte(0.0)
    }

    pub fn multiple_of(&self, step: f64) -> Self {
        self.with_check(NumberCheckKind::MultipleOf(step))
    }

    pub fn step(&self, step: f64) -> Self {
        self.multiple_of(step)
    }

    pub fn finite(&self) -> Self {
        self.with_check(NumberCheckKind::Finite)
    }

    /// Restricts to the range exactly representable as integers.
    pub fn safe(&self) -> Self {
        self.gte(-MAX_SAFE_INTEGER).lte(MAX_SAFE_INTEGER)
    }

    /// Sets the message of the most recently added check.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let mut schema = self.clone();
        if let Some(check) = schema.checks.last_mut() {
            check.message = Some(message.into());
        }
        schema
    }

    /// The tightest lower bound.
    pub fn min_value(&self) -> Option<f64> {
        self.checks
            .iter()
            .filter_map(|check| match check.kind {
                NumberCheckKind::Min { value, .. } => Some(value),
                _ => None,
            })
            .reduce(f64::max)
    }

    /// The tightest upper bound.
    pub fn max_value(&self) -> Option<f64> {
        self.checks
            .iter()
            .filter_map(|check| match check.kind {
                NumberCheckKind::Max { value, .. } => Some(value),
                _ => None,
            })
            .reduce(f64::min)
    }

    pub fn is_int(&self) -> bool {
        self.checks.iter().any(|check| {
            check.kind == NumberCheckKind::Int
                || matches!(check.kind, NumberCheckKind::MultipleOf(step) if step.fract() == 0.0)
        })
    }
}

impl TypeParser for NumberSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let input = if self.coerce {
            Value::Number(input.to_number())
        } else {
            input
        };
        let n = match input.value_type() {
            ValueType::Number => input.as_f64().unwrap_or(f64::NAN),
            _ => return reject_type(input, ctx, ValueType::Number),
        };

        let mut status = Status::Valid;
        for check in &self.checks {
            let kind = match check.kind {
                NumberCheckKind::Int if !(n.is_finite() && n.fract() == 0.0) => Some(
                    IssueKind::invalid_type(ValueType::Integer, ValueType::Float),
                ),
                NumberCheckKind::Min { value, inclusive }
                    if (inclusive && n < value) || (!inclusive && n <= value) =>
                {
                    Some(IssueKind::too_small(value, inclusive, SizeOrigin::Number))
                }
                NumberCheckKind::Max { value, inclusive }
                    if (inclusive && n > value) || (!inclusive && n >= value) =>
                {
                    Some(IssueKind::too_big(value, inclusive, SizeOrigin::Number))
                }
                NumberCheckKind::MultipleOf(step) if float_safe_remainder(n, step) != 0.0 => {
                    Some(IssueKind::NotMultipleOf {
                        multiple_of: Bound::Number(step),
                    })
                }
                NumberCheckKind::Finite if !n.is_finite() => Some(IssueKind::NotFinite),
                _ => None,
            };
            if let Some(kind) = kind {
                ctx.add_issue(
                    &input,
                    IssueData::new(kind).with_message_opt(check.message.clone()),
                );
                status.dirty();
            }
        }
        ParseReturn::Ready(ParseResult::with_status(status, input))
    }
}

impl From<NumberSchema> for Schema {
    fn from(schema: NumberSchema) -> Self {
        Schema::new(SchemaKind::Number(schema))
    }
}

fn decimal_places(n: f64) -> usize {
    let text = format!("{n}");
    text.split_once('.').map_or(0, |(_, fraction)| fraction.len())
}

/// `value % step` computed on the decimal representations, so that e.g.
/// `0.3 % 0.1` is exactly zero.
fn float_safe_remainder(value: f64, step: f64) -> f64 {
    let decimals = decimal_places(value).max(decimal_places(step));
    let scaled = |n: f64| {
        format!("{n:.decimals$}")
            .replace('.', "")
            .parse::<i128>()
            .ok()
    };
    match (scaled(value), scaled(step)) {
        (Some(value), Some(step)) if step != 0 => {
            (value % step) as f64 / 10f64.powi(decimals as i32)
        }
        _ => value % step,
    }
}
