use pretty_assertions::assert_eq;
use vela_schema::prelude::*;
use vela_schema::{IssueCode, IssueKind, RawIssue, ValidationError};
use vela_value::{Value, value};

fn first_message(outcome: SafeParse) -> String {
    outcome.error().unwrap().issues()[0].message.clone()
}

fn invalid_type_map(issue: &RawIssue, _default: &str) -> Option<String> {
    matches!(issue.kind, IssueKind::InvalidType { .. }).then(|| "contextual".to_string())
}

#[test]
fn contextual_map_applies_per_call() {
    let schema = string();
    let params = ParseParams::new().error_map(invalid_type_map);
    assert_eq!(first_message(schema.safe_parse_with(1, params).unwrap()), "contextual");
    assert_eq!(
        first_message(schema.safe_parse(1).unwrap()),
        "Expected string, received number"
    );
}

#[test]
fn node_map_beats_contextual_map() {
    let schema = string().error_map(|_, _| Some("node".to_string()));
    let params = ParseParams::new().error_map(invalid_type_map);
    assert_eq!(first_message(schema.safe_parse_with(1, params).unwrap()), "node");
}

#[test]
fn literal_message_beats_every_map() {
    let schema = string()
        .min(3)
        .with_message("too short")
        .error_map(|_, _| Some("node".to_string()));
    let params = ParseParams::new().error_map(|_, _| Some("contextual".to_string()));
    assert_eq!(first_message(schema.safe_parse_with("a", params).unwrap()), "too short");
}

#[test]
fn node_map_does_not_reach_children() {
    let schema = object([("a", number())]).error_map(|_, _| Some("parent".to_string()));
    let error: ValidationError = schema
        .safe_parse(value!({"a": "x"}))
        .unwrap()
        .error()
        .cloned()
        .unwrap();
    assert_eq!(error.issues()[0].message, "Expected number, received string");

    assert_eq!(first_message(schema.safe_parse(1).unwrap()), "parent");
}

#[test]
fn map_returning_none_falls_through() {
    let schema = number().error_map(|issue, _| {
        (issue.code() == IssueCode::TooSmall).then(|| "small".to_string())
    });
    assert_eq!(
        first_message(schema.safe_parse("x").unwrap()),
        "Expected number, received string"
    );
}

#[test]
fn map_sees_default_message_and_input() {
    let params = ParseParams::new()
        .error_map(|issue, default| Some(format!("{default} ({})", issue.input.to_js_string())));
    let outcome = boolean().safe_parse_with("yes", params).unwrap();
    assert_eq!(first_message(outcome), "Expected boolean, received string (yes)");
}

#[test]
fn error_params_shorthands() {
    let params = ErrorParams::new()
        .required_error("name is required")
        .invalid_type_error("name must be text");
    let schema = object([("name", string().with_params(params))]);

    let missing = schema.safe_parse(value!({})).unwrap();
    assert_eq!(first_message(missing), "name is required");

    let wrong = schema.safe_parse(value!({"name": 3})).unwrap();
    assert_eq!(first_message(wrong), "name must be text");

    let catch_all = enumeration(["a", "b"]).with_params(ErrorParams::new().message("pick a or b"));
    assert_eq!(first_message(catch_all.safe_parse("c").unwrap()), "pick a or b");
    assert_eq!(first_message(catch_all.safe_parse(Value::Undefined).unwrap()), "pick a or b");
}

#[test]
fn description_is_kept() {
    let schema = string().describe("display name");
    assert_eq!(schema.description(), Some("display name"));
    let described = number().with_params(ErrorParams::new().description("age"));
    assert_eq!(described.description(), Some("age"));
}
