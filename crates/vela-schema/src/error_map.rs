//! Message resolution
//!
//! A finalized message is the first non-empty result of, in order:
//! 1. the literal message attached to the issue
//! 2. the reporting node's error map
//! 3. the per-call contextual error map
//! 4. the process-wide error map
//! 5. the built-in English message

use std::sync::Arc;

use parking_lot::RwLock;

use crate::issue::{Issue, IssueKind, RawIssue};
use crate::locale::default_message;

/// Maps an issue to a message. Receives the built-in message as its second
/// argument; returning `None` defers to the next resolver.
pub type ErrorMap = Arc<dyn Fn(&RawIssue, &str) -> Option<String> + Send + Sync>;

static GLOBAL_ERROR_MAP: RwLock<Option<ErrorMap>> = RwLock::new(None);

/// Installs the process-wide error map used by every subsequent parse.
pub fn set_error_map(map: impl Fn(&RawIssue, &str) -> Option<String> + Send + Sync + 'static) {
    tracing::debug!("installing process-wide error map");
    *GLOBAL_ERROR_MAP.write() = Some(Arc::new(map));
}

/// Removes the process-wide error map.
pub fn reset_error_map() {
    *GLOBAL_ERROR_MAP.write() = None;
}

/// The current process-wide error map, if any.
pub fn error_map() -> Option<ErrorMap> {
    GLOBAL_ERROR_MAP.read().clone()
}

pub(crate) fn finalize(raw: RawIssue, contextual: Option<&ErrorMap>) -> Issue {
    let default = default_message(&raw.kind);
    let resolvers = [raw.schema_error_map.clone(), contextual.cloned(), error_map()];
    let message = raw
        .message
        .clone()
        .filter(|message| !message.is_empty())
        .or_else(|| {
            resolvers
                .iter()
                .flatten()
                .find_map(|map| map(&raw, &default).filter(|message| !message.is_empty()))
        })
        .unwrap_or(default);
    Issue {
        kind: raw.kind,
        path: raw.path,
        message,
    }
}

/// Shorthand messages attached to a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorParams {
    /// Used for every `invalid_type` and `invalid_enum_value` issue of the node.
    pub message: Option<String>,
    /// Used for `invalid_type` when the input is present.
    pub invalid_type_error: Option<String>,
    /// Used when the input is `undefined`.
    pub required_error: Option<String>,
    pub description: Option<String>,
}

impl ErrorParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn invalid_type_error(mut self, message: impl Into<String>) -> Self {
        self.invalid_type_error = Some(message.into());
        self
    }

    pub fn required_error(mut self, message: impl Into<String>) -> Self {
        self.required_error = Some(message.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn to_error_map(&self) -> Option<ErrorMap> {
        if self.message.is_none() && self.invalid_type_error.is_none() && self.required_error.is_none()
        {
            return None;
        }
        let message = self.message.clone();
        let invalid_type_error = self.invalid_type_error.clone();
        let required_error = self.required_error.clone();
        Some(Arc::new(move |issue: &RawIssue, _default: &str| {
            if let IssueKind::InvalidEnumValue { .. } = issue.kind {
                return message.clone();
            }
            if issue.input.is_undefined() {
                return message.clone().or_else(|| required_error.clone());
            }
            match issue.kind {
                IssueKind::InvalidType { .. } => {
                    message.clone().or_else(|| invalid_type_error.clone())
                }
                _ => None,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use vela_value::{Path, Value, ValueType};

    use super::*;

    fn raw(kind: IssueKind, input: Value, map: Option<ErrorMap>) -> RawIssue {
        RawIssue {
            kind,
            path: Path::root(),
            message: None,
            input,
            fatal: false,
            schema_error_map: map,
        }
    }

    #[test]
    fn test_literal_message_wins() {
        let mut issue = raw(IssueKind::custom(), Value::Null, None);
        issue.message = Some("literal".to_string());
        let contextual: ErrorMap = Arc::new(|_, _| Some("contextual".to_string()));
        assert_eq!(finalize(issue, Some(&contextual)).message, "literal");
    }

    #[test]
    fn test_node_map_before_contextual() {
        let node: ErrorMap = Arc::new(|_, _| Some("node".to_string()));
        let contextual: ErrorMap = Arc::new(|_, _| Some("contextual".to_string()));
        let issue = raw(IssueKind::custom(), Value::Null, Some(node));
        assert_eq!(finalize(issue, Some(&contextual)).message, "node");
    }

    #[test]
    fn test_empty_result_defers() {
        let node: ErrorMap = Arc::new(|_, _| Some(String::new()));
        let issue = raw(IssueKind::custom(), Value::Null, Some(node));
        assert_eq!(finalize(issue, None).message, "Invalid input");
    }

    #[test]
    fn test_required_error() {
        let map = ErrorParams::new()
            .required_error("name is required")
            .invalid_type_error("name must be text")
            .to_error_map();
        let kind = IssueKind::invalid_type(ValueType::String, ValueType::Undefined);
        let missing = raw(kind, Value::Undefined, map.clone());
        assert_eq!(finalize(missing, None).message, "name is required");

        let kind = IssueKind::invalid_type(ValueType::String, ValueType::Number);
        let wrong = raw(kind, Value::from(1), map);
        assert_eq!(finalize(wrong, None).message, "name must be text");
    }

    #[test]
    fn test_empty_params_have_no_map() {
        assert!(ErrorParams::new().description("d").to_error_map().is_none());
    }
}
