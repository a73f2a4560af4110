use num_bigint::BigInt;
use num_traits::Zero;
use vela_value::{Value, ValueType};

use crate::context::ParseContext;
use crate::issue::{Bound, IssueData, IssueKind, SizeOrigin};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn, Status};

use super::primitive::reject_type;

#[derive(Debug, Clone, PartialEq)]
enum BigIntCheckKind {
    Min { value: BigInt, inclusive: bool },
    Max { value: BigInt, inclusive: bool },
    MultipleOf(BigInt),
}

#[derive(Debug, Clone, PartialEq)]
struct BigIntCheck {
    kind: BigIntCheckKind,
    message: Option<String>,
}

/// Accepts arbitrary-precision integers.
#[derive(Debug, Clone, Default)]
pub struct BigIntSchema {
    checks: Vec<BigIntCheck>,
    coerce: bool,
}

impl BigIntSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts integral numbers, numeric strings and booleans before
    /// checking them.
    pub fn coerced() -> Self {
        Self {
            coerce: true,
            ..Self::default()
        }
    }

    fn with_check(&self, kind: BigIntCheckKind) -> Self {
        let mut schema = self.clone();
        schema.checks.push(BigIntCheck {
            kind,
            message: None,
        });
        schema
    }

    pub fn gt(&self, value: impl Into<BigInt>) -> Self {
        self.with_check(BigIntCheckKind::Min {
            value: value.into(),
            inclusive: false,
        })
    }

    pub fn gte(&self, value: impl Into<BigInt>) -> Self {
        self.with_check(BigIntCheckKind::Min {
            value: value.into(),
            inclusive: true,
        })
    }

    pub fn lt(&self, value: impl Into<BigInt>) -> Self {
        self.with_check(BigIntCheckKind::Max {
            value: value.into(),
            inclusive: false,
        })
    }

    pub fn lte(&self, value: impl Into<BigInt>) -> Self {
        self.with_check(BigIntCheckKind::Max {
            value: value.into(),
            inclusive: true,
        })
    }

    pub fn positive(&self) -> Self {
        self.gt(0)
    }

    pub fn nonnegative(&self) -> Self {
        self.gte(0)
    }

    pub fn negative(&self) -> Self {
        self.lt(0)
    }

    pub fn nonpositive(&self) -> Self {
        self.lte(0)
    }

    pub fn multiple_of(&self, value: impl Into<BigInt>) -> Self {
        self.with_check(BigIntCheckKind::MultipleOf(value.into()))
    }

    /// Sets the message of the most recently added check.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let mut schema = self.clone();
        if let Some(check) = schema.checks.last_mut() {
            check.message = Some(message.into());
        }
        schema
    }
}

impl TypeParser for BigIntSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let input = if self.coerce {
            match input.to_bigint() {
                Some(n) => Value::BigInt(n),
                None => return reject_type(input, ctx, ValueType::BigInt),
            }
        } else {
            input
        };
        let n = match &input {
            Value::BigInt(n) => n.clone(),
            _ => return reject_type(input, ctx, ValueType::BigInt),
        };

        let mut status = Status::Valid;
        for check in &self.checks {
            let kind = match &check.kind {
                BigIntCheckKind::Min { value, inclusive }
                    if (*inclusive && n < *value) || (!*inclusive && n <= *value) =>
                {
                    Some(IssueKind::too_small(value.clone(), *inclusive, SizeOrigin::BigInt))
                }
                BigIntCheckKind::Max { value, inclusive }
                    if (*inclusive && n > *value) || (!*inclusive && n >= *value) =>
                {
                    Some(IssueKind::too_big(value.clone(), *inclusive, SizeOrigin::BigInt))
                }
                BigIntCheckKind::MultipleOf(step) if step.is_zero() || !(&n % step).is_zero() => {
                    Some(IssueKind::NotMultipleOf {
                        multiple_of: Bound::BigInt(step.clone()),
                    })
                }
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

impl From<BigIntSchema> for Schema {
    fn from(schema: BigIntSchema) -> Self {
        Schema::new(SchemaKind::BigInt(schema))
    }
}
