//! Union nodes
//!
//! A plain union tries every branch against an isolated issue log and keeps
//! the first valid result, else the first dirty one. A discriminated union
//! dispatches on one literal property instead of trying branches.

use std::sync::Arc;

use indexmap::IndexMap;
use num_bigint::BigInt;
use tracing::{debug, trace};
use vela_value::{Path, Value, ValueType};

use crate::context::ParseContext;
use crate::error::SchemaError;
use crate::issue::{IssueData, IssueKind};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn, gather};

use super::object::ObjectSchema;
use super::primitive::reject_type;

// =============================================================================
// UnionSchema
// =============================================================================

#[derive(Debug, Clone)]
pub struct UnionSchema {
    options: Arc<Vec<Schema>>,
}

impl UnionSchema {
    pub fn new<S: Into<Schema>>(options: impl IntoIterator<Item = S>) -> Self {
        Self {
            options: Arc::new(options.into_iter().map(Into::into).collect()),
        }
    }

    pub fn options(&self) -> &[Schema] {
        &self.options
    }
}

impl TypeParser for UnionSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let mut branches: Vec<ParseContext> = Vec::with_capacity(self.options.len());
        let mut returns: Vec<ParseReturn> = Vec::with_capacity(self.options.len());
        for (index, option) in self.options.iter().enumerate() {
            let branch = ctx.isolated();
            let ret = option.parse_input(input.clone(), &branch);
            let settled = returns.iter().all(ParseReturn::is_ready);
            if settled && matches!(ret, ParseReturn::Ready(ParseResult::Valid(_))) {
                trace!(index, "union branch matched");
                return ret;
            }
            branches.push(branch);
            returns.push(ret);
        }
        let ctx = ctx.clone();
        gather(returns, move |results| select(results, &branches, &ctx, &input))
    }
}

fn select(
    results: Vec<ParseResult>,
    branches: &[ParseContext],
    ctx: &ParseContext,
    input: &Value,
) -> ParseResult {
    let mut dirty = None;
    for (index, result) in results.into_iter().enumerate() {
        match result {
            ParseResult::Valid(_) => {
                trace!(index, "union branch matched");
                return result;
            }
            ParseResult::Dirty(_) if dirty.is_none() => dirty = Some((index, result)),
            _ => {}
        }
    }
    if let Some((index, result)) = dirty {
        trace!(index, "union settled on dirty branch");
        ctx.extend_issues(branches[index].take_issues());
        return result;
    }
    let union_errors = branches.iter().map(ParseContext::finish).collect();
    ctx.add_issue(input, IssueKind::InvalidUnion { union_errors });
    ParseResult::Aborted
}

impl From<UnionSchema> for Schema {
    fn from(schema: UnionSchema) -> Self {
        Schema::new(SchemaKind::Union(schema))
    }
}

// =============================================================================
// DiscriminatedUnionSchema
// =============================================================================

/// Hashable form of a discriminator value. Numbers compare by value with
/// `-0 == 0` and `NaN == NaN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DiscriminatorKey {
    Undefined,
    Null,
    Bool(bool),
    Number(u64),
    BigInt(BigInt),
    String(String),
    Symbol(u64),
}

impl DiscriminatorKey {
    fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Undefined => DiscriminatorKey::Undefined,
            Value::Null => DiscriminatorKey::Null,
            Value::Bool(b) => DiscriminatorKey::Bool(*b),
            Value::Number(n) if n.is_nan() => DiscriminatorKey::Number(f64::NAN.to_bits()),
            Value::Number(n) if *n == 0.0 => DiscriminatorKey::Number(0f64.to_bits()),
            Value::Number(n) => DiscriminatorKey::Number(n.to_bits()),
            Value::BigInt(n) => DiscriminatorKey::BigInt(n.clone()),
            Value::String(s) => DiscriminatorKey::String(s.clone()),
            Value::Symbol(s) => DiscriminatorKey::Symbol(s.id()),
            _ => return None,
        })
    }
}

/// The literal values a discriminator field can take, or empty when the
/// field is not literal-valued.
fn discriminator_values(schema: &Schema) -> Vec<Value> {
    match schema.kind() {
        SchemaKind::Lazy(lazy) => discriminator_values(&lazy.schema()),
        SchemaKind::Effects(effects) => discriminator_values(effects.inner()),
        SchemaKind::Literal(literal) => vec![literal.value().clone()],
        SchemaKind::Enum(options) => options
            .options()
            .iter()
            .map(|option| Value::from(option.as_str()))
            .collect(),
        SchemaKind::NativeEnum(native) => native.values().to_vec(),
        SchemaKind::Default(default) => discriminator_values(default.inner()),
        SchemaKind::Undefined => vec![Value::Undefined],
        SchemaKind::Null => vec![Value::Null],
        SchemaKind::Optional(optional) => {
            let mut values = vec![Value::Undefined];
            values.extend(discriminator_values(optional.inner()));
            values
        }
        SchemaKind::Nullable(nullable) => {
            let mut values = vec![Value::Null];
            values.extend(discriminator_values(nullable.inner()));
            values
        }
        SchemaKind::Branded(branded) => discriminator_values(branded.inner()),
        SchemaKind::Readonly(readonly) => discriminator_values(readonly.inner()),
        SchemaKind::Catch(catch) => discriminator_values(catch.inner()),
        SchemaKind::Pipeline(pipeline) => discriminator_values(pipeline.input()),
        _ => Vec::new(),
    }
}

/// Object union selected by the value of one property.
#[derive(Debug, Clone)]
pub struct DiscriminatedUnionSchema {
    discriminator: String,
    options: Arc<Vec<ObjectSchema>>,
    lookup: Arc<IndexMap<DiscriminatorKey, (Value, usize)>>,
}

impl DiscriminatedUnionSchema {
    /// Fails when an option lacks a literal discriminator, uses a value that
    /// cannot be looked up (dates and containers), or shares a value with
    /// another option.
    pub fn new(
        discriminator: impl Into<String>,
        options: impl IntoIterator<Item = ObjectSchema>,
    ) -> Result<Self, SchemaError> {
        let discriminator = discriminator.into();
        let options: Vec<ObjectSchema> = options.into_iter().collect();
        let mut lookup = IndexMap::new();
        for (index, option) in options.iter().enumerate() {
            let values = option
                .get(&discriminator)
                .map(discriminator_values)
                .unwrap_or_default();
            if values.is_empty() {
                return Err(SchemaError::MissingDiscriminator {
                    key: discriminator,
                    index,
                });
            }
            for value in values {
                let Some(key) = DiscriminatorKey::from_value(&value) else {
                    return Err(SchemaError::UnsupportedDiscriminator {
                        key: discriminator,
                        value: value.to_string(),
                    });
                };
                if lookup.contains_key(&key) {
                    return Err(SchemaError::DuplicateDiscriminator {
                        key: discriminator,
                        value: value.to_string(),
                    });
                }
                lookup.insert(key, (value, index));
            }
        }
        debug!(
            discriminator = discriminator.as_str(),
            options = options.len(),
            values = lookup.len(),
            "built discriminated union"
        );
        Ok(Self {
            discriminator,
            options: Arc::new(options),
            lookup: Arc::new(lookup),
        })
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn options(&self) -> &[ObjectSchema] {
        &self.options
    }

    /// Every accepted discriminator value in declaration order.
    pub fn discriminator_values(&self) -> Vec<Value> {
        self.lookup.values().map(|(value, _)| value.clone()).collect()
    }

    /// The option selected by `value`.
    pub fn option_for(&self, value: &Value) -> Option<&ObjectSchema> {
        let key = DiscriminatorKey::from_value(value)?;
        let (_, index) = self.lookup.get(&key)?;
        self.options.get(*index)
    }
}

impl TypeParser for DiscriminatedUnionSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let Value::Object(object) = &input else {
            return reject_type(input, ctx, ValueType::Object);
        };
        let value = object.get(&self.discriminator).cloned().unwrap_or_default();
        match self.option_for(&value) {
            Some(option) => {
                trace!(discriminator = %value, "discriminated union dispatch");
                option.parse_value(input, ctx)
            }
            None => {
                let issue = IssueData::new(IssueKind::InvalidUnionDiscriminator {
                    options: self.discriminator_values(),
                })
                .at(Path::from_segments([self.discriminator.as_str()]));
                ctx.add_issue(&input, issue);
                ParseReturn::aborted()
            }
        }
    }
}

impl From<DiscriminatedUnionSchema> for Schema {
    fn from(schema: DiscriminatedUnionSchema) -> Self {
        Schema::new(SchemaKind::DiscriminatedUnion(schema))
    }
}
