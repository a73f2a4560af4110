use futures::executor::block_on;
use pretty_assertions::assert_eq;
use regex::Regex;
use vela_schema::prelude::*;
use vela_schema::{IssueCode, IssueKind, SchemaError, ValidationError};
use vela_value::{Value, value};

fn codes(error: &ValidationError) -> Vec<IssueCode> {
    error.issues().iter().map(|issue| issue.code()).collect()
}

fn failure(schema: &impl SchemaExt, input: Value) -> ValidationError {
    match schema.safe_parse(input).unwrap() {
        SafeParse::Failure { error } => error,
        SafeParse::Success { data } => panic!("expected failure, got {data}"),
    }
}

#[test]
fn success_is_idempotent() {
    let schema = object([
        ("id", string().uuid().schema()),
        ("tags", array(string().trim()).schema()),
        ("score", number().default_value(0)),
    ]);
    let input = value!({
        "id": "123e4567-e89b-12d3-a456-426614174000",
        "tags": [" a ", "b"],
        "extra": true,
    });
    let once = schema.parse(input).unwrap();
    let twice = schema.parse(once.clone()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(
        once,
        value!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "tags": ["a", "b"],
            "score": 0,
        })
    );
}

#[test]
fn checks_accumulate_without_short_circuit() {
    let schema = string().min(5).regex(Regex::new("^[a-z]+$").unwrap());
    let error = failure(&schema, Value::from("AB"));
    assert_eq!(codes(&error), vec![IssueCode::TooSmall, IssueCode::InvalidString]);
    assert_eq!(
        error.issues()[0].message,
        "String must contain at least 5 character(s)"
    );
    assert_eq!(error.issues()[1].message, "Invalid");
}

#[test]
fn optional_keys_are_omitted() {
    let schema = object([("a", string().schema()), ("b", number().optional())]);
    let data = schema.parse(value!({"a": "x"})).unwrap();
    let object = data.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(!object.contains_key("b"));
}

#[test]
fn unknown_key_policies() {
    let base = object([("a", string())]);
    let input = value!({"a": "x", "b": 1, "c": 2});

    assert_eq!(base.parse(input.clone()).unwrap(), value!({"a": "x"}));
    assert_eq!(base.passthrough().parse(input.clone()).unwrap(), input);

    let error = failure(&base.strict(), input);
    assert_eq!(error.len(), 1);
    match &error.issues()[0].kind {
        IssueKind::UnrecognizedKeys { keys } => assert_eq!(keys, &["b", "c"]),
        other => panic!("unexpected issue {other:?}"),
    }
}

#[test]
fn union_prefers_earliest_valid_branch() {
    let schema = union([
        string().transform(|_| Value::from("first")),
        string().transform(|_| Value::from("second")),
    ]);
    assert_eq!(schema.parse("x").unwrap(), Value::from("first"));
}

#[test]
fn union_reports_every_failed_branch() {
    let schema = union([string().schema(), number().schema(), boolean().schema()]);
    let error = failure(&schema, Value::Null);
    let IssueKind::InvalidUnion { union_errors } = &error.issues()[0].kind else {
        panic!("expected invalid_union");
    };
    assert_eq!(union_errors.len(), 3);

    let tree = error.format();
    assert_eq!(tree.errors.len(), 3);
}

#[test]
fn discriminated_union_construction_and_dispatch() {
    let duplicate = discriminated_union(
        "type",
        [
            object([("type", literal("a"))]),
            object([("type", literal("a"))]),
        ],
    );
    assert!(matches!(
        duplicate,
        Err(SchemaError::DuplicateDiscriminator { .. })
    ));

    let schema = discriminated_union(
        "type",
        [
            object([("type", literal("a").schema()), ("value", string().schema())]),
            object([("type", literal("b").schema()), ("value", number().schema())]),
        ],
    )
    .unwrap();
    let error = failure(&schema, value!({"type": "c"}));
    assert_eq!(codes(&error), vec![IssueCode::InvalidUnionDiscriminator]);
    assert_eq!(error.issues()[0].path.to_string(), "type");

    let error = failure(&schema, Value::from("a"));
    assert_eq!(error.issues()[0].message, "Expected object, received string");
}

#[test]
fn decimal_multiple_of() {
    assert!(number().multiple_of(0.1).parse(0.3).is_ok());
    let error = failure(&number().multiple_of(0.1), Value::from(0.35));
    assert_eq!(error.issues()[0].message, "Number must be a multiple of 0.1");
}

#[test]
fn nested_paths_and_flatten() {
    let schema = object([
        ("user", object([("email", string().email())]).schema()),
        ("items", array(number()).schema()),
    ]);
    let error = failure(
        &schema,
        value!({"user": {"email": "nope"}, "items": [1, "x", 3]}),
    );
    let paths: Vec<String> = error.issues().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["user.email", "items[1]"]);

    let flattened = error.flatten();
    assert!(flattened.form_errors.is_empty());
    assert_eq!(flattened.field_errors["user"], vec!["Invalid email"]);
    assert_eq!(
        flattened.field_errors["items"],
        vec!["Expected number, received string"]
    );

    let tree = error.format();
    assert_eq!(
        tree.get("user").and_then(|user| user.get("email")).unwrap().errors,
        vec!["Invalid email"]
    );
}

#[test]
fn parse_error_display_lists_issues() {
    let err = object([("a", number())]).parse(value!({})).unwrap_err();
    assert_eq!(err.to_string(), "1 validation issue(s)\n  - invalid_type at a: Required");
}

#[test]
fn json_input_round_trip() {
    let json = serde_json::json!({"name": "Ada", "langs": ["en", "fr"]});
    let schema = object([
        ("name", string().schema()),
        ("langs", array(enumeration(["en", "fr", "de"])).nonempty().schema()),
    ]);
    let data = schema.parse(Value::from(json.clone())).unwrap();
    assert_eq!(data.to_json().unwrap(), json);
}

#[test]
fn panicking_refinement_aborts_without_issues() {
    let schema = number().super_refine(|_, _| panic!("refinement failed hard"));
    match schema.safe_parse(1) {
        Ok(SafeParse::Failure { error }) => assert!(error.is_empty()),
        other => panic!("expected an aborted failure, got {other:?}"),
    }
}

#[test]
fn panicking_async_transform_aborts() {
    let schema = number().transform_async(|value, _| async move {
        if !value.is_undefined() {
            panic!("transform failed hard");
        }
        value
    });
    let outcome = block_on(schema.safe_parse_async(1));
    assert!(outcome.error().is_some_and(ValidationError::is_empty));
}

#[test]
fn union_keeps_first_clean_branch_over_earlier_dirty_one() {
    let schema = union([string().min(5).schema(), string().schema()]);
    assert_eq!(
        schema.safe_parse("ab").unwrap(),
        SafeParse::Success {
            data: Value::from("ab")
        }
    );
}

#[test]
fn union_tie_break_holds_when_branches_suspend() {
    let schema = union([
        string().min(5).refine_async(|_| async { true }, "unreachable"),
        string().refine_async(|_| async { true }, "unreachable"),
    ]);
    assert_eq!(block_on(schema.parse_async("ab")).unwrap(), Value::from("ab"));
}
