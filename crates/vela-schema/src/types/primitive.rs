//! Type-tag, boolean, date and literal nodes.

use vela_value::{Date, Value, ValueType};

use crate::context::ParseContext;
use crate::issue::{Expected, IssueData, IssueKind, SizeOrigin};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn, Status};

/// Reports `invalid_type` for `input` and aborts.
pub(crate) fn reject_type(
    input: Value,
    ctx: &ParseContext,
    expected: impl Into<Expected>,
) -> ParseReturn {
    let received = input.value_type();
    ctx.add_issue(&input, IssueKind::invalid_type(expected, received));
    ParseReturn::aborted()
}

/// Accepts `input` when it has type `expected`. `void` accepts `undefined`
/// and `never` accepts nothing.
pub(crate) fn expect_type(input: Value, ctx: &ParseContext, expected: ValueType) -> ParseReturn {
    let matches = match expected {
        ValueType::Void => input.is_undefined(),
        ValueType::Never => false,
        other => input.value_type() == other,
    };
    if matches {
        ParseReturn::valid(input)
    } else {
        reject_type(input, ctx, expected)
    }
}

// =============================================================================
// BooleanSchema
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    coerce: bool,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the input by truthiness before checking it.
    pub fn coerced() -> Self {
        Self { coerce: true }
    }
}

impl TypeParser for BooleanSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let input = if self.coerce {
            Value::Bool(input.is_truthy())
        } else {
            input
        };
        expect_type(input, ctx, ValueType::Boolean)
    }
}

impl From<BooleanSchema> for Schema {
    fn from(schema: BooleanSchema) -> Self {
        Schema::new(SchemaKind::Boolean(schema))
    }
}

// =============================================================================
// DateSchema
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum DateBound {
    Min(Date),
    Max(Date),
}

#[derive(Debug, Clone, PartialEq)]
struct DateCheck {
    bound: DateBound,
    message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DateSchema {
    checks: Vec<DateCheck>,
    coerce: bool,
}

impl DateSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts numbers and strings to dates before checking them.
    pub fn coerced() -> Self {
        Self {
            coerce: true,
            ..Self::default()
        }
    }

    fn with_check(&self, bound: DateBound) -> Self {
        let mut schema = self.clone();
        schema.checks.push(DateCheck {
            bound,
            message: None,
        });
        schema
    }

    /// Rejects instants before `date`.
    pub fn min(&self, date: Date) -> Self {
        self.with_check(DateBound::Min(date))
    }

    /// Rejects instants after `date`.
    pub fn max(&self, date: Date) -> Self {
        self.with_check(DateBound::Max(date))
    }

    /// Sets the message of the most recently added check.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let mut schema = self.clone();
        if let Some(check) = schema.checks.last_mut() {
            check.message = Some(message.into());
        }
        schema
    }

    pub fn min_date(&self) -> Option<Date> {
        self.checks
            .iter()
            .filter_map(|check| match check.bound {
                DateBound::Min(date) => Some(date),
                DateBound::Max(_) => None,
            })
            .reduce(|a, b| if b > a { b } else { a })
    }

    pub fn max_date(&self) -> Option<Date> {
        self.checks
            .iter()
            .filter_map(|check| match check.bound {
                DateBound::Max(date) => Some(date),
                DateBound::Min(_) => None,
            })
            .reduce(|a, b| if b < a { b } else { a })
    }
}

impl TypeParser for DateSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let input = if self.coerce {
            Value::Date(input.to_date())
        } else {
            input
        };
        let date = match &input {
            Value::Date(date) => *date,
            _ => return reject_type(input, ctx, ValueType::Date),
        };
        if !date.is_valid() {
            ctx.add_issue(&input, IssueKind::InvalidDate);
            return ParseReturn::aborted();
        }

        let mut status = Status::Valid;
        let time = date.timestamp_millis();
        for check in &self.checks {
            let kind = match check.bound {
                DateBound::Min(min) if time < min.timestamp_millis() => Some(IssueKind::too_small(
                    min.timestamp_millis(),
                    true,
                    SizeOrigin::Date,
                )),
                DateBound::Max(max) if time > max.timestamp_millis() => Some(IssueKind::too_big(
                    max.timestamp_millis(),
                    true,
                    SizeOrigin::Date,
                )),
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

impl From<DateSchema> for Schema {
    fn from(schema: DateSchema) -> Self {
        Schema::new(SchemaKind::Date(schema))
    }
}

// =============================================================================
// LiteralSchema
// =============================================================================

/// Accepts exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralSchema {
    value: Value,
}

impl LiteralSchema {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl TypeParser for LiteralSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        if input == self.value {
            return ParseReturn::valid(input);
        }
        ctx.add_issue(
            &input,
            IssueKind::InvalidLiteral {
                expected: self.value.clone(),
                received: input.clone(),
            },
        );
        ParseReturn::aborted()
    }
}

impl From<LiteralSchema> for Schema {
    fn from(schema: LiteralSchema) -> Self {
        Schema::new(SchemaKind::Literal(schema))
    }
}
