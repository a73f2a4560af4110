//! Per-call parse state
//!
//! `ParseCommon` is created once per top-level call and shared by every
//! context of that call. Contexts themselves are cheap owned values, so they
//! can move into deferred work.

use std::sync::Arc;

use parking_lot::Mutex;
use vela_value::{Path, PathSegment, Value};

use crate::error::ValidationError;
use crate::error_map::{ErrorMap, finalize};
use crate::issue::{IssueData, RawIssue};

/// Per-call options.
#[derive(Clone, Default)]
pub struct ParseParams {
    /// Contextual error map for this call.
    pub error_map: Option<ErrorMap>,
    /// Prefix for every reported path.
    pub path: Path,
}

impl ParseParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_map(
        mut self,
        map: impl Fn(&RawIssue, &str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.error_map = Some(Arc::new(map));
        self
    }

    pub fn path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }
}

impl core::fmt::Debug for ParseParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParseParams")
            .field("error_map", &self.error_map.is_some())
            .field("path", &self.path)
            .finish()
    }
}

pub(crate) struct ParseCommon {
    issues: Mutex<Vec<RawIssue>>,
    contextual_error_map: Option<ErrorMap>,
}

impl ParseCommon {
    fn new(contextual_error_map: Option<ErrorMap>) -> Self {
        Self {
            issues: Mutex::new(Vec::new()),
            contextual_error_map,
        }
    }
}

#[derive(Clone)]
pub(crate) struct ParseContext {
    common: Arc<ParseCommon>,
    path: Path,
    schema_error_map: Option<ErrorMap>,
}

impl ParseContext {
    pub(crate) fn root(params: ParseParams) -> Self {
        Self {
            common: Arc::new(ParseCommon::new(params.error_map)),
            path: params.path,
            schema_error_map: None,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Context for a child value one segment below this one.
    pub(crate) fn child(&self, segment: impl Into<PathSegment>) -> Self {
        Self {
            common: self.common.clone(),
            path: self.path.join(segment),
            schema_error_map: None,
        }
    }

    /// Same position, owned by the node carrying `map`.
    pub(crate) fn for_node(&self, map: Option<ErrorMap>) -> Self {
        Self {
            common: self.common.clone(),
            path: self.path.clone(),
            schema_error_map: map,
        }
    }

    /// Same position with a fresh, unshared issue log.
    pub(crate) fn isolated(&self) -> Self {
        Self {
            common: Arc::new(ParseCommon::new(self.common.contextual_error_map.clone())),
            path: self.path.clone(),
            schema_error_map: self.schema_error_map.clone(),
        }
    }

    /// Appends an issue located relative to this context.
    pub(crate) fn add_issue(&self, input: &Value, data: impl Into<IssueData>) {
        let data = data.into();
        let path = if data.path.is_root() {
            self.path.clone()
        } else {
            self.path.concat(&data.path)
        };
        self.common.issues.lock().push(RawIssue {
            kind: data.kind,
            path,
            message: data.message,
            input: input.clone(),
            fatal: data.fatal,
            schema_error_map: self.schema_error_map.clone(),
        });
    }

    pub(crate) fn issue_count(&self) -> usize {
        self.common.issues.lock().len()
    }

    pub(crate) fn take_issues(&self) -> Vec<RawIssue> {
        std::mem::take(&mut *self.common.issues.lock())
    }

    pub(crate) fn extend_issues(&self, issues: Vec<RawIssue>) {
        self.common.issues.lock().extend(issues);
    }

    /// Drains the log into a finalized aggregate.
    pub(crate) fn finish(&self) -> ValidationError {
        let contextual = self.common.contextual_error_map.as_ref();
        let issues = self
            .take_issues()
            .into_iter()
            .map(|raw| finalize(raw, contextual))
            .collect();
        ValidationError::new(issues)
    }
}

#[cfg(test)]
mod tests {
    use vela_value::ValueType;

    use super::*;
    use crate::issue::IssueKind;

    #[test]
    fn test_child_paths_share_log() {
        let root = ParseContext::root(ParseParams::new());
        let child = root.child("items").child(2usize);
        child.add_issue(
            &Value::Null,
            IssueKind::invalid_type(ValueType::String, ValueType::Null),
        );
        assert_eq!(root.issue_count(), 1);
        let error = root.finish();
        assert_eq!(error.issues()[0].path.to_string(), "items[2]");
    }

    #[test]
    fn test_relative_issue_path() {
        let root = ParseContext::root(ParseParams::new());
        let ctx = root.child("a");
        ctx.add_issue(
            &Value::Null,
            IssueData::custom("x").at(Path::from_segments(["b"])),
        );
        assert_eq!(root.finish().issues()[0].path.to_string(), "a.b");
    }

    #[test]
    fn test_isolated_log() {
        let root = ParseContext::root(ParseParams::new());
        let branch = root.isolated();
        branch.add_issue(&Value::Null, IssueData::custom("x"));
        assert_eq!(root.issue_count(), 0);
        assert_eq!(branch.issue_count(), 1);
        root.extend_issues(branch.take_issues());
        assert_eq!(root.issue_count(), 1);
        assert_eq!(branch.issue_count(), 0);
    }

    #[test]
    fn test_path_prefix() {
        let root = ParseContext::root(ParseParams::new().path(Path::from_segments(["body"])));
        root.child("name").add_issue(&Value::Null, IssueData::custom("x"));
        assert_eq!(root.finish().issues()[0].path.to_string(), "body.name");
    }
}
