//! Kept in its own test binary: the process-wide map affects every parse.

use pretty_assertions::assert_eq;
use vela_schema::prelude::*;
use vela_schema::{IssueKind, reset_error_map, set_error_map};

#[test]
fn global_map_is_last_resort_before_default() {
    set_error_map(|issue, _| match issue.kind {
        IssueKind::InvalidType { .. } => Some("global".to_string()),
        _ => None,
    });

    let outcome = number().safe_parse("x").unwrap();
    assert_eq!(outcome.error().unwrap().issues()[0].message, "global");

    let params = ParseParams::new().error_map(|_, _| Some("contextual".to_string()));
    let outcome = number().safe_parse_with("x", params).unwrap();
    assert_eq!(outcome.error().unwrap().issues()[0].message, "contextual");

    let outcome = number().min(1.0).safe_parse(0).unwrap();
    assert_eq!(
        outcome.error().unwrap().issues()[0].message,
        "Number must be greater than or equal to 1"
    );

    reset_error_map();
    let outcome = number().safe_parse("x").unwrap();
    assert_eq!(
        outcome.error().unwrap().issues()[0].message,
        "Expected number, received string"
    );
}
