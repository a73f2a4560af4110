//! Keyed collections: records, maps and sets.

use vela_value::{Value, ValueMap, ValueSet, ValueType};

use crate::context::ParseContext;
use crate::issue::SizeOrigin;
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ObjectField, ParseResult, ParseReturn, Status, gather, merge_object};

use super::compound::SizeChecks;
use super::primitive::reject_type;

// =============================================================================
// RecordSchema
// =============================================================================

/// Accepts objects with arbitrary keys; every key and value is checked.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    key: Schema,
    value: Schema,
}

impl RecordSchema {
    pub fn new(key: impl Into<Schema>, value: impl Into<Schema>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key_schema(&self) -> &Schema {
        &self.key
    }

    pub fn value_schema(&self) -> &Schema {
        &self.value
    }
}

impl TypeParser for RecordSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let object = match input {
            Value::Object(object) => object,
            other => return reject_type(other, ctx, ValueType::Object),
        };
        let len = object.len();
        let mut returns = Vec::with_capacity(len * 2);
        for (key, value) in object {
            let child = ctx.child(key.as_str());
            returns.push(self.key.parse_input(Value::String(key), &child));
            returns.push(self.value.parse_input(value, &child));
        }
        gather(returns, move |results| {
            let mut results = results.into_iter();
            let mut fields = Vec::with_capacity(len);
            while let (Some(key), Some(value)) = (results.next(), results.next()) {
                fields.push(ObjectField {
                    key,
                    value,
                    always_set: false,
                });
            }
            merge_object(Status::Valid, fields)
        })
    }
}

impl From<RecordSchema> for Schema {
    fn from(schema: RecordSchema) -> Self {
        Schema::new(SchemaKind::Record(schema))
    }
}

// =============================================================================
// MapSchema
// =============================================================================

/// Accepts maps; keys are reported at `[i, "key"]` and values at
/// `[i, "value"]`.
#[derive(Debug, Clone)]
pub struct MapSchema {
    key: Schema,
    value: Schema,
}

impl MapSchema {
    pub fn new(key: impl Into<Schema>, value: impl Into<Schema>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key_schema(&self) -> &Schema {
        &self.key
    }

    pub fn value_schema(&self) -> &Schema {
        &self.value
    }
}

impl TypeParser for MapSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let map = match input {
            Value::Map(map) => map,
            other => return reject_type(other, ctx, ValueType::Map),
        };
        let mut returns = Vec::with_capacity(map.len() * 2);
        for (index, (key, value)) in map.into_iter().enumerate() {
            let entry = ctx.child(index);
            returns.push(self.key.parse_input(key, &entry.child("key")));
            returns.push(self.value.parse_input(value, &entry.child("value")));
        }
        gather(returns, |results| {
            let mut status = Status::Valid;
            let mut map = ValueMap::new();
            let mut results = results.into_iter();
            while let (Some(key), Some(value)) = (results.next(), results.next()) {
                status.absorb(key.status());
                status.absorb(value.status());
                match (key.into_value(), value.into_value()) {
                    (Some(key), Some(value)) => map.insert(key, value),
                    _ => return ParseResult::Aborted,
                }
            }
            ParseResult::with_status(status, Value::Map(map))
        })
    }
}

impl From<MapSchema> for Schema {
    fn from(schema: MapSchema) -> Self {
        Schema::new(SchemaKind::Map(schema))
    }
}

// =============================================================================
// SetSchema
// =============================================================================

/// Accepts sets whose members all satisfy one schema.
#[derive(Debug, Clone)]
pub struct SetSchema {
    element: Schema,
    sizes: SizeChecks,
}

impl SetSchema {
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

    pub fn min(&self, size: usize) -> Self {
        self.with_sizes(|sizes| sizes.min(size))
    }

    pub fn max(&self, size: usize) -> Self {
        self.with_sizes(|sizes| sizes.max(size))
    }

    /// Exactly `size` members, reported as separate lower and upper bounds.
    pub fn size(&self, size: usize) -> Self {
        self.min(size).max(size)
    }

    pub fn nonempty(&self) -> Self {
        self.min(1)
    }

    /// Sets the message of the most recently added size check.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        self.with_sizes(|sizes| sizes.set_message(message.into()))
    }
}

impl TypeParser for SetSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let status = match &input {
            Value::Set(set) => self.sizes.check(set.len(), SizeOrigin::Set, &input, ctx),
            _ => return reject_type(input, ctx, ValueType::Set),
        };
        let Value::Set(set) = input else {
            return ParseReturn::aborted();
        };
        let returns = set
            .into_iter()
            .enumerate()
            .map(|(index, member)| self.element.parse_input(member, &ctx.child(index)))
            .collect();
        gather(returns, move |results| {
            let mut status = status;
            let mut set = ValueSet::new();
            for result in results {
                status.absorb(result.status());
                match result.into_value() {
                    Some(member) => {
                        set.insert(member);
                    }
                    None => return ParseResult::Aborted,
                }
            }
            ParseResult::with_status(status, Value::Set(set))
        })
    }
}

impl From<SetSchema> for Schema {
    fn from(schema: SetSchema) -> Self {
        Schema::new(SchemaKind::Set(schema))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vela_value::value;

    use super::*;
    use crate::issue::IssueCode;
    use crate::{SchemaExt, map, number, record, record_of, set, string};

    #[test]
    fn test_record_values() {
        let scores = record_of(number());
        assert_eq!(
            scores.parse(value!({"a": 1, "b": 2})).unwrap(),
            value!({"a": 1, "b": 2})
        );
        let outcome = scores.safe_parse(value!({"a": 1, "b": "x"})).unwrap();
        assert_eq!(outcome.error().unwrap().issues()[0].path.to_string(), "b");
    }

    #[test]
    fn test_record_keys() {
        let schema = record(string().min(2), number());
        let outcome = schema.safe_parse(value!({"a": 1})).unwrap();
        let issue = &outcome.error().unwrap().issues()[0];
        assert_eq!(issue.code(), IssueCode::TooSmall);
        assert_eq!(issue.path.to_string(), "a");
    }

    #[test]
    fn test_record_drops_undefined_values() {
        let schema = record_of(number().optional());
        let data = schema.parse(value!({"a": undefined, "b": 2})).unwrap();
        assert_eq!(data, value!({"b": 2}));
    }

    #[test]
    fn test_map_paths() {
        let schema = map(string(), number());
        let input: ValueMap = [
            (Value::from("a"), Value::from(1)),
            (Value::from(2), Value::from("x")),
        ]
        .into_iter()
        .collect();
        let outcome = schema.safe_parse(input).unwrap();
        let paths: Vec<String> = outcome
            .error()
            .unwrap()
            .issues()
            .iter()
            .map(|issue| issue.path.to_string())
            .collect();
        assert_eq!(paths, vec!["[1].key", "[1].value"]);
    }

    #[test]
    fn test_map_output() {
        let schema = map(string(), number());
        let input: ValueMap = [(Value::from("a"), Value::from(1))].into_iter().collect();
        assert_eq!(schema.parse(input.clone()).unwrap(), Value::Map(input));
    }

    #[test]
    fn test_set_sizes_and_members() {
        let schema = set(number()).min(2);
        let input: ValueSet = [Value::from(1)].into_iter().collect();
        let outcome = schema.safe_parse(input).unwrap();
        assert_eq!(
            outcome.error().unwrap().issues()[0].message,
            "Set must contain at least 2 element(s)"
        );

        let input: ValueSet = [Value::from(1), Value::from("x")].into_iter().collect();
        let outcome = set(number()).safe_parse(input).unwrap();
        assert_eq!(outcome.error().unwrap().issues()[0].path.to_string(), "[1]");
    }

    #[test]
    fn test_set_type() {
        let outcome = set(number()).safe_parse(value!([1])).unwrap();
        assert_eq!(
            outcome.error().unwrap().issues()[0].message,
            "Expected set, received array"
        );
    }
}
