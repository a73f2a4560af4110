use std::sync::Arc;

use vela_value::{Value, ValueType};

use crate::context::ParseContext;
use crate::issue::{IssueData, IssueKind, SizeOrigin};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseReturn, Status, gather, merge_array};

use super::primitive::reject_type;

// =============================================================================
// Size checks (shared with sets)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SizeBound {
    Exact,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
struct SizeCheck {
    bound: SizeBound,
    len: usize,
    message: Option<String>,
}

/// Element-count checks. Exact lengths are checked first, then minimums,
/// then maximums.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct SizeChecks(Vec<SizeCheck>);

impl SizeChecks {
    fn push(&mut self, bound: SizeBound, len: usize) {
        self.0.push(SizeCheck {
            bound,
            len,
            message: None,
        });
    }

    pub(super) fn min(&mut self, len: usize) {
        self.push(SizeBound::Min, len);
    }

    pub(super) fn max(&mut self, len: usize) {
        self.push(SizeBound::Max, len);
    }

    pub(super) fn exact(&mut self, len: usize) {
        self.push(SizeBound::Exact, len);
    }

    pub(super) fn set_message(&mut self, message: String) {
        if let Some(check) = self.0.last_mut() {
            check.message = Some(message);
        }
    }

    pub(super) fn lower(&self) -> Option<usize> {
        self.0
            .iter()
            .filter(|check| check.bound != SizeBound::Max)
            .map(|check| check.len)
            .max()
    }

    pub(super) fn upper(&self) -> Option<usize> {
        self.0
            .iter()
            .filter(|check| check.bound != SizeBound::Min)
            .map(|check| check.len)
            .min()
    }

    /// Reports every violated bound against `input` and returns the status.
    pub(super) fn check(
        &self,
        len: usize,
        origin: SizeOrigin,
        input: &Value,
        ctx: &ParseContext,
    ) -> Status {
        let mut status = Status::Valid;
        for bound in [SizeBound::Exact, SizeBound::Min, SizeBound::Max] {
            for check in self.0.iter().filter(|check| check.bound == bound) {
                let kind = match bound {
                    SizeBound::Exact if len > check.len => Some(IssueKind::TooBig {
                        maximum: check.len.into(),
                        inclusive: true,
                        exact: true,
                        origin,
                    }),
                    SizeBound::Exact if len < check.len => Some(IssueKind::TooSmall {
                        minimum: check.len.into(),
                        inclusive: true,
                        exact: true,
                        origin,
                    }),
                    SizeBound::Min if len < check.len => {
                        Some(IssueKind::too_small(check.len, true, origin))
                    }
                    SizeBound::Max if len > check.len => {
                        Some(IssueKind::too_big(check.len, true, origin))
                    }
                    _ => None,
                };
                if let Some(kind) = kind {
                    ctx.add_issue(input, IssueData::new(kind).with_message_opt(check.message.clone()));
                    status.dirty();
                }
            }
        }
        status
    }
}

// =============================================================================
// ArraySchema
// =============================================================================

/// Accepts arrays whose elements all satisfy one schema.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    element: Schema,
    sizes: SizeChecks,
}

impl ArraySchema {
    pub fn new(element: impl Into<Schema>) -> Self {
        Self {
            element: element.into(),
            sizes: SizeChecks::default(),
        }
    }

    pub fn element(&self) -> &Schema {
        &self.element
    }

    fn with_sizes(&self, f: impl FnOnce(&mut SizeChecks)) -> Self {
        let mut schema = self.clone();
        f(&mut schema.sizes);
        schema
    }

    pub fn min(&self, len: usize) -> Self {
        self.with_sizes(|sizes| sizes.min(len))
    }

    pub fn max(&self, len: usize) -> Self {
        self.with_sizes(|sizes| sizes.max(len))
    }

    pub fn length(&self, len: usize) -> Self {
        self.with_sizes(|sizes| sizes.exact(len))
    }

    pub fn nonempty(&self) -> Self {
        self.min(1)
    }

    /// Sets the message of the most recently added size check.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        self.with_sizes(|sizes| sizes.set_message(message.into()))
    }

    pub fn min_length(&self) -> Option<usize> {
        self.sizes.lower()
    }

    pub fn max_length(&self) -> Option<usize> {
        self.sizes.upper()
    }
}

impl TypeParser for ArraySchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let status = match &input {
            Value::Array(items) => self.sizes.check(items.len(), SizeOrigin::Array, &input, ctx),
            _ => return reject_type(input, ctx, ValueType::Array),
        };
        let Value::Array(items) = input else {
            return ParseReturn::aborted();
        };
        let returns = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| self.element.parse_input(item, &ctx.child(index)))
            .collect();
        gather(returns, move |results| merge_array(status, results))
    }
}

impl From<ArraySchema> for Schema {
    fn from(schema: ArraySchema) -> Self {
        Schema::new(SchemaKind::Array(schema))
    }
}

// =============================================================================
// TupleSchema
// =============================================================================

/// Accepts fixed-position arrays, optionally followed by a variadic rest.
#[derive(Debug, Clone)]
pub struct TupleSchema {
    items: Arc<Vec<Schema>>,
    rest: Option<Schema>,
}

impl TupleSchema {
    pub fn new<S: Into<Schema>>(items: impl IntoIterator<Item = S>) -> Self {
        Self {
            items: Arc::new(items.into_iter().map(Into::into).collect()),
            rest: None,
        }
    }

    pub fn items(&self) -> &[Schema] {
        &self.items
    }

    /// Validates surplus elements against `schema` instead of rejecting them.
    pub fn rest(&self, schema: impl Into<Schema>) -> Self {
        Self {
            rest: Some(schema.into()),
            ..self.clone()
        }
    }
}

impl TypeParser for TupleSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let items = match input {
            Value::Array(items) => items,
            other => return reject_type(other, ctx, ValueType::Array),
        };
        let arity = self.items.len();
        if items.len() < arity {
            ctx.add_issue(
                &Value::Array(items),
                IssueKind::too_small(arity, true, SizeOrigin::Array),
            );
            return ParseReturn::aborted();
        }

        let mut status = Status::Valid;
        if self.rest.is_none() && items.len() > arity {
            ctx.add_issue(
                &Value::Array(items.clone()),
                IssueKind::too_big(arity, true, SizeOrigin::Array),
            );
            status.dirty();
        }

        let returns = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let schema = self.items.get(index).or(self.rest.as_ref())?;
                Some(schema.parse_input(item, &ctx.child(index)))
            })
            .collect();
        gather(returns, move |results| merge_array(status, results))
    }
}

impl From<TupleSchema> for Schema {
    fn from(schema: TupleSchema) -> Self {
        Schema::new(SchemaKind::Tuple(schema))
    }
}
