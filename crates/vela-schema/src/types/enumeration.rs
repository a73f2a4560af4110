use std::sync::Arc;

use ahash::AHashSet;
use vela_value::Value;

use crate::context::ParseContext;
use crate::issue::{Expected, IssueKind};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::ParseReturn;

use super::primitive::reject_type;

/// Reports `invalid_enum_value` and aborts.
fn reject_member(input: Value, ctx: &ParseContext, options: Vec<Value>) -> ParseReturn {
    ctx.add_issue(
        &input,
        IssueKind::InvalidEnumValue {
            options,
            received: input.clone(),
        },
    );
    ParseReturn::aborted()
}

// =============================================================================
// EnumSchema
// =============================================================================

/// Accepts one of a fixed list of strings.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    options: Arc<Vec<String>>,
    lookup: Arc<AHashSet<String>>,
}

impl EnumSchema {
    pub fn new<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Self {
        let mut seen = AHashSet::new();
        let options: Vec<String> = options
            .into_iter()
            .map(Into::into)
            .filter(|option| seen.insert(option.clone()))
            .collect();
        Self {
            options: Arc::new(options),
            lookup: Arc::new(seen),
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn contains(&self, option: &str) -> bool {
        self.lookup.contains(option)
    }

    /// A new enum with only the listed options, in their original order.
    pub fn extract<'a>(&self, keep: impl IntoIterator<Item = &'a str>) -> Self {
        let keep: AHashSet<&str> = keep.into_iter().collect();
        Self::new(
            self.options
                .iter()
                .filter(|option| keep.contains(option.as_str()))
                .cloned(),
        )
    }

    /// A new enum without the listed options.
    pub fn exclude<'a>(&self, drop: impl IntoIterator<Item = &'a str>) -> Self {
        let drop: AHashSet<&str> = drop.into_iter().collect();
        Self::new(
            self.options
                .iter()
                .filter(|option| !drop.contains(option.as_str()))
                .cloned(),
        )
    }

    fn option_values(&self) -> Vec<Value> {
        self.options.iter().map(|option| Value::from(option.as_str())).collect()
    }
}

impl TypeParser for EnumSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        match &input {
            Value::String(s) if self.lookup.contains(s) => ParseReturn::valid(input),
            Value::String(_) => reject_member(input, ctx, self.option_values()),
            _ => reject_type(input, ctx, Expected::OneOf(self.option_values())),
        }
    }
}

impl From<EnumSchema> for Schema {
    fn from(schema: EnumSchema) -> Self {
        Schema::new(SchemaKind::Enum(schema))
    }
}

// =============================================================================
// NativeEnumSchema
// =============================================================================

/// Accepts the values of a name-to-value table whose values are strings or
/// numbers.
#[derive(Debug, Clone)]
pub struct NativeEnumSchema {
    entries: Arc<Vec<(String, Value)>>,
    values: Arc<Vec<Value>>,
}

impl NativeEnumSchema {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let entries: Vec<(String, Value)> = entries
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        let mut values: Vec<Value> = Vec::with_capacity(entries.len());
        for (_, value) in &entries {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        Self {
            entries: Arc::new(entries),
            values: Arc::new(values),
        }
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Distinct member values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }
}

impl TypeParser for NativeEnumSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        if !matches!(input, Value::String(_) | Value::Number(_)) {
            return reject_type(input, ctx, Expected::OneOf(self.values.to_vec()));
        }
        if self.values.contains(&input) {
            ParseReturn::valid(input)
        } else {
            reject_member(input, ctx, self.values.to_vec())
        }
    }
}

impl From<NativeEnumSchema> for Schema {
    fn from(schema: NativeEnumSchema) -> Self {
        Schema::new(SchemaKind::NativeEnum(schema))
    }
}
