use vela_value::{Object, Value};

use crate::context::ParseContext;
use crate::issue::IssueKind;
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn, Status, gather};

/// Structurally merges the outputs of both sides of an intersection.
///
/// Equal values merge to themselves, objects merge key-wise, arrays of equal
/// length merge element-wise and dates merge when they denote the same
/// instant. Anything else is a conflict.
fn merge_values(left: &Value, right: &Value) -> Option<Value> {
    if left == right {
        return Some(left.clone());
    }
    match (left, right) {
        (Value::Object(left), Value::Object(right)) => {
            let mut merged: Object = left.clone();
            for (key, value) in right {
                let value = match left.get(key) {
                    Some(existing) => merge_values(existing, value)?,
                    None => value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Some(Value::Object(merged))
        }
        (Value::Array(left), Value::Array(right)) if left.len() == right.len() => left
            .iter()
            .zip(right)
            .map(|(left, right)| merge_values(left, right))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (Value::Date(l), Value::Date(r)) if l.timestamp_millis() == r.timestamp_millis() => {
            Some(left.clone())
        }
        _ => None,
    }
}

/// Input must satisfy both sides; the outputs are merged.
#[derive(Debug, Clone)]
pub struct IntersectionSchema {
    left: Schema,
    right: Schema,
}

impl IntersectionSchema {
    pub fn new(left: impl Into<Schema>, right: impl Into<Schema>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn left(&self) -> &Schema {
        &self.left
    }

    pub fn right(&self) -> &Schema {
        &self.right
    }
}

impl TypeParser for IntersectionSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let left = self.left.parse_input(input.clone(), ctx);
        let right = self.right.parse_input(input.clone(), ctx);
        let ctx = ctx.clone();
        gather(vec![left, right], move |results| {
            let mut results = results.into_iter();
            let (Some(left), Some(right)) = (results.next(), results.next()) else {
                return ParseResult::Aborted;
            };
            let mut status = Status::Valid;
            status.absorb(left.status());
            status.absorb(right.status());
            let (Some(left), Some(right)) = (left.value(), right.value()) else {
                return ParseResult::Aborted;
            };
            match merge_values(left, right) {
                Some(merged) => ParseResult::with_status(status, merged),
                None => {
                    ctx.add_issue(&input, IssueKind::InvalidIntersectionTypes);
                    ParseResult::Aborted
                }
            }
        })
    }
}

impl From<IntersectionSchema> for Schema {
    fn from(schema: IntersectionSchema) -> Self {
        Schema::new(SchemaKind::Intersection(schema))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vela_value::{Date, value};

    use super::*;
    use crate::issue::IssueCode;
    use crate::{SchemaExt, intersection, number, object, string};

    #[test]
    fn test_merge_objects() {
        let merged = merge_values(&value!({"a": 1, "b": {"c": 2}}), &value!({"b": {"d": 3}}));
        assert_eq!(merged, Some(value!({"a": 1, "b": {"c": 2, "d": 3}})));
    }

    #[test]
    fn test_merge_conflicts() {
        assert_eq!(merge_values(&value!(1), &value!(2)), None);
        assert_eq!(merge_values(&value!([1]), &value!([1, 2])), None);
        assert_eq!(
            merge_values(&Value::from(Date::from_millis(5.0)), &Value::from(Date::from_millis(5.0))),
            Some(Value::from(Date::from_millis(5.0)))
        );
    }

    #[test]
    fn test_object_intersection() {
        let schema = intersection(
            object([("name", string())]).passthrough(),
            object([("age", number())]).passthrough(),
        );
        let data = schema.parse(value!({"name": "Ada", "age": 36})).unwrap();
        assert_eq!(data, value!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn test_both_sides_report() {
        let schema = intersection(object([("name", string())]), object([("age", number())]));
        let outcome = schema.safe_parse(value!({})).unwrap();
        let paths: Vec<String> = outcome
            .error()
            .unwrap()
            .issues()
            .iter()
            .map(|issue| issue.path.to_string())
            .collect();
        assert_eq!(paths, vec!["name", "age"]);
    }

    #[test]
    fn test_unmergeable_outputs() {
        let schema = string().transform(|_| Value::from("a")).and(string());
        let outcome = schema.safe_parse("b").unwrap();
        assert_eq!(
            outcome.error().unwrap().issues()[0].code(),
            IssueCode::InvalidIntersectionTypes
        );
    }
}
