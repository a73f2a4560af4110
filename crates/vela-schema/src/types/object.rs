//! Object node and its shape-derivation helpers.

use std::sync::Arc;

use indexmap::IndexMap;
use vela_value::{Value, ValueType};

use crate::context::ParseContext;
use crate::issue::{IssueData, IssueKind};
use crate::schema::{Schema, SchemaExt, SchemaKind, TypeParser};
use crate::status::{ObjectField, ParseResult, ParseReturn, Status, gather, merge_object};

use super::enumeration::EnumSchema;
use super::primitive::reject_type;

/// Policy for input keys absent from the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnknownKeys {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Report `unrecognized_keys`.
    Strict,
    /// Copy them to the output unvalidated.
    Passthrough,
}

#[derive(Debug, Clone)]
pub struct ObjectSchema {
    shape: Arc<IndexMap<String, Schema>>,
    unknown_keys: UnknownKeys,
    catchall: Option<Schema>,
    strict_message: Option<String>,
}

impl ObjectSchema {
    pub fn new<K, S>(shape: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<Schema>,
    {
        Self::from_shape(
            shape
                .into_iter()
                .map(|(key, schema)| (key.into(), schema.into()))
                .collect(),
        )
    }

    fn from_shape(shape: IndexMap<String, Schema>) -> Self {
        Self {
            shape: Arc::new(shape),
            unknown_keys: UnknownKeys::default(),
            catchall: None,
            strict_message: None,
        }
    }

    fn with_shape(&self, shape: IndexMap<String, Schema>) -> Self {
        Self {
            shape: Arc::new(shape),
            ..self.clone()
        }
    }

    pub fn shape(&self) -> &IndexMap<String, Schema> {
        &self.shape
    }

    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.shape.get(key)
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn catchall_schema(&self) -> Option<&Schema> {
        self.catchall.as_ref()
    }

    pub fn strict(&self) -> Self {
        Self {
            unknown_keys: UnknownKeys::Strict,
            ..self.clone()
        }
    }

    /// Strict, with a literal message for the `unrecognized_keys` issue.
    pub fn strict_with_message(&self, message: impl Into<String>) -> Self {
        Self {
            unknown_keys: UnknownKeys::Strict,
            strict_message: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn strip(&self) -> Self {
        Self {
            unknown_keys: UnknownKeys::Strip,
            ..self.clone()
        }
    }

    pub fn passthrough(&self) -> Self {
        Self {
            unknown_keys: UnknownKeys::Passthrough,
            ..self.clone()
        }
    }

    /// Validates every unknown key against `schema`, overriding the unknown
    /// key policy.
    pub fn catchall(&self, schema: impl Into<Schema>) -> Self {
        Self {
            catchall: Some(schema.into()),
            ..self.clone()
        }
    }

    /// Adds or replaces fields.
    pub fn extend<K, S>(&self, fields: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<Schema>,
    {
        let mut shape = (*self.shape).clone();
        for (key, schema) in fields {
            shape.insert(key.into(), schema.into());
        }
        self.with_shape(shape)
    }

    /// Combines both shapes. Fields and policies of `other` win.
    pub fn merge(&self, other: &ObjectSchema) -> Self {
        let mut shape = (*self.shape).clone();
        for (key, schema) in other.shape.iter() {
            shape.insert(key.clone(), schema.clone());
        }
        Self {
            shape: Arc::new(shape),
            unknown_keys: other.unknown_keys,
            catchall: other.catchall.clone(),
            strict_message: other.strict_message.clone(),
        }
    }

    /// Keeps only the listed fields.
    pub fn pick<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        let shape = self
            .shape
            .iter()
            .filter(|(key, _)| keys.contains(&key.as_str()))
            .map(|(key, schema)| (key.clone(), schema.clone()))
            .collect();
        self.with_shape(shape)
    }

    /// Drops the listed fields.
    pub fn omit<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        let shape = self
            .shape
            .iter()
            .filter(|(key, _)| !keys.contains(&key.as_str()))
            .map(|(key, schema)| (key.clone(), schema.clone()))
            .collect();
        self.with_shape(shape)
    }

    /// Makes every field optional.
    pub fn partial(&self) -> Self {
        let shape = self
            .shape
            .iter()
            .map(|(key, schema)| (key.clone(), schema.optional()))
            .collect();
        self.with_shape(shape)
    }

    /// Makes only the listed fields optional.
    pub fn partial_keys<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        let shape = self
            .shape
            .iter()
            .map(|(key, schema)| {
                let schema = if keys.contains(&key.as_str()) {
                    schema.optional()
                } else {
                    schema.clone()
                };
                (key.clone(), schema)
            })
            .collect();
        self.with_shape(shape)
    }

    /// Strips every `optional` wrapper from the fields.
    pub fn required(&self) -> Self {
        let shape = self
            .shape
            .iter()
            .map(|(key, schema)| (key.clone(), unwrap_optional(schema)))
            .collect();
        self.with_shape(shape)
    }

    /// Strips `optional` wrappers from the listed fields only.
    pub fn required_keys<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        let shape = self
            .shape
            .iter()
            .map(|(key, schema)| {
                let schema = if keys.contains(&key.as_str()) {
                    unwrap_optional(schema)
                } else {
                    schema.clone()
                };
                (key.clone(), schema)
            })
            .collect();
        self.with_shape(shape)
    }

    /// An enum of the shape's keys.
    pub fn keyof(&self) -> EnumSchema {
        EnumSchema::new(self.shape.keys().cloned())
    }
}

fn unwrap_optional(schema: &Schema) -> Schema {
    let mut schema = schema.clone();
    while let SchemaKind::Optional(optional) = schema.kind() {
        schema = optional.inner().clone();
    }
    schema
}

impl TypeParser for ObjectSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let object = match input {
            Value::Object(object) => object,
            other => return reject_type(other, ctx, ValueType::Object),
        };

        let mut keys = Vec::with_capacity(object.len());
        let mut returns = Vec::with_capacity(object.len());
        let mut present = Vec::with_capacity(object.len());
        for (key, schema) in self.shape.iter() {
            let value = object.get(key).cloned().unwrap_or_default();
            returns.push(schema.parse_input(value, &ctx.child(key.as_str())));
            present.push(object.contains_key(key));
            keys.push(key.clone());
        }

        let mut status = Status::Valid;
        let extras = object.iter().filter(|(key, _)| !self.shape.contains_key(*key));
        match (&self.catchall, self.unknown_keys) {
            (Some(catchall), _) => {
                for (key, value) in extras {
                    returns.push(catchall.parse_input(value.clone(), &ctx.child(key.as_str())));
                    present.push(true);
                    keys.push(key.clone());
                }
            }
            (None, UnknownKeys::Passthrough) => {
                for (key, value) in extras {
                    returns.push(ParseReturn::valid(value.clone()));
                    present.push(true);
                    keys.push(key.clone());
                }
            }
            (None, UnknownKeys::Strict) => {
                let unrecognized: Vec<String> = extras.map(|(key, _)| key.clone()).collect();
                if !unrecognized.is_empty() {
                    let issue = IssueData::new(IssueKind::UnrecognizedKeys { keys: unrecognized })
                        .with_message_opt(self.strict_message.clone());
                    ctx.add_issue(&Value::Object(object.clone()), issue);
                    status.dirty();
                }
            }
            (None, UnknownKeys::Strip) => {}
        }

        gather(returns, move |results| {
            let fields = keys
                .into_iter()
                .zip(results)
                .zip(present)
                .map(|((key, value), always_set)| ObjectField {
                    key: ParseResult::Valid(Value::String(key)),
                    value,
                    always_set,
                })
                .collect();
            merge_object(status, fields)
        })
    }
}

impl From<ObjectSchema> for Schema {
    fn from(schema: ObjectSchema) -> Self {
        Schema::new(SchemaKind::Object(schema))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vela_value::value;

    use super::*;
    use crate::issue::IssueCode;
    use crate::{SafeParse, number, object, string};

    fn person() -> ObjectSchema {
        object([("name", string().schema()), ("age", number().optional())])
    }

    fn codes(outcome: &SafeParse) -> Vec<IssueCode> {
        outcome
            .error()
            .map(|error| error.issues().iter().map(|issue| issue.code()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_optional_key_omitted() {
        let data = person().parse(value!({"name": "Ada"})).unwrap();
        assert_eq!(data, value!({"name": "Ada"}));
        assert!(!data.as_object().unwrap().contains_key("age"));
    }

    #[test]
    fn test_present_undefined_is_kept() {
        let data = person()
            .parse(value!({"name": "Ada", "age": undefined}))
            .unwrap();
        assert_eq!(data.as_object().unwrap().get("age"), Some(&Value::Undefined));
    }

    #[test]
    fn test_missing_required_key() {
        let outcome = person().safe_parse(value!({})).unwrap();
        let issue = &outcome.error().unwrap().issues()[0];
        assert_eq!(issue.message, "Required");
        assert_eq!(issue.path.to_string(), "name");
    }

    #[test]
    fn test_unknown_key_policies() {
        let input = value!({"name": "Ada", "extra": 1});
        assert_eq!(person().parse(input.clone()).unwrap(), value!({"name": "Ada"}));
        assert_eq!(person().passthrough().parse(input.clone()).unwrap(), input);

        let outcome = person().strict().safe_parse(input).unwrap();
        assert_eq!(codes(&outcome), vec![IssueCode::UnrecognizedKeys]);
        assert_eq!(
            outcome.error().unwrap().issues()[0].message,
            "Unrecognized key(s) in object: 'extra'"
        );
    }

    #[test]
    fn test_catchall() {
        let schema = person().catchall(number());
        let data = schema.parse(value!({"name": "Ada", "score": 3})).unwrap();
        assert_eq!(data, value!({"name": "Ada", "score": 3}));

        let outcome = schema.safe_parse(value!({"name": "Ada", "score": "x"})).unwrap();
        assert_eq!(outcome.error().unwrap().issues()[0].path.to_string(), "score");
    }

    #[test]
    fn test_not_an_object() {
        let outcome = person().safe_parse(value!([1])).unwrap();
        assert_eq!(
            outcome.error().unwrap().issues()[0].message,
            "Expected object, received array"
        );
    }

    #[test]
    fn test_shape_helpers() {
        let base = person();
        assert_eq!(base.pick(["name"]).shape().len(), 1);
        assert_eq!(base.omit(["name"]).shape().keys().collect::<Vec<_>>(), ["age"]);

        let extended = base.extend([("email", string().email())]);
        assert_eq!(extended.shape().len(), 3);
        assert_eq!(base.shape().len(), 2);

        assert!(base.partial().parse(value!({})).is_ok());
        assert!(base.partial_keys(["age"]).parse(value!({})).is_err());
        assert!(base.required().parse(value!({"name": "Ada"})).is_err());
        assert_eq!(base.keyof().options(), ["name", "age"]);
    }

    #[test]
    fn test_merge_prefers_other() {
        let left = person();
        let right = object([("age", string().schema())]).strict();
        let merged = left.merge(&right);
        assert_eq!(merged.unknown_keys(), UnknownKeys::Strict);
        assert!(merged.parse(value!({"name": "Ada", "age": "old"})).is_ok());
    }

    #[test]
    fn test_dirty_fields_keep_going() {
        let schema = object([("a", string().min(3)), ("b", string().min(3))]);
        let outcome = schema.safe_parse(value!({"a": "x", "b": "y"})).unwrap();
        let paths: Vec<String> = outcome
            .error()
            .unwrap()
            .issues()
            .iter()
            .map(|issue| issue.path.to_string())
            .collect();
        assert_eq!(paths, vec!["a", "b"]);
    }
}
