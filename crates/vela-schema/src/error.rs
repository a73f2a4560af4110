//! Error types
//!
//! Two categories:
//! - `SchemaError`: programmer errors (bad schema construction, sync entry
//!   point on async work) that fail fast
//! - `ValidationError`: the aggregate of issues found in the data

use core::fmt;

use indexmap::IndexMap;
use thiserror::Error;
use vela_value::PathSegment;

use crate::issue::{Issue, IssueKind};

// =============================================================================
// SchemaError (fail-fast usage errors)
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    /// A synchronous entry point received deferred work.
    #[error("asynchronous refinement or transform encountered during synchronous parse, use parse_async")]
    AsyncInSync,

    #[error("discriminator property '{key}' has no literal value in option {index}")]
    MissingDiscriminator { key: String, index: usize },

    #[error("discriminator property '{key}' has duplicate value {value}")]
    DuplicateDiscriminator { key: String, value: String },

    #[error("discriminator property '{key}' has value {value}, which cannot select an option")]
    UnsupportedDiscriminator { key: String, value: String },

    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),
}

// =============================================================================
// ValidationError (issue aggregate)
// =============================================================================

/// Every issue found during one parse call.
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{}", summarize(.issues))]
pub struct ValidationError {
    issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    let mut summary = format!("{} validation issue(s)", issues.len());
    for issue in issues {
        summary.push_str(&format!(
            "\n  - {} at {}: {}",
            issue.code(),
            issue.path,
            issue.message
        ));
    }
    summary
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Groups messages into a tree following issue paths. Issues nested in
    /// union branches are included.
    pub fn format(&self) -> ErrorTree {
        let mut tree = ErrorTree::default();
        self.collect_into(&mut tree);
        tree
    }

    fn collect_into(&self, tree: &mut ErrorTree) {
        for issue in &self.issues {
            match &issue.kind {
                IssueKind::InvalidUnion { union_errors } => {
                    for branch in union_errors {
                        branch.collect_into(tree);
                    }
                }
                _ => {
                    let mut node = &mut *tree;
                    for segment in issue.path.segments() {
                        node = node.children.entry(segment.clone()).or_default();
                    }
                    node.errors.push(issue.message.clone());
                }
            }
        }
    }

    /// Splits messages into root-level errors and errors keyed by the first
    /// path segment.
    pub fn flatten(&self) -> FlattenedError {
        let mut flattened = FlattenedError::default();
        for issue in &self.issues {
            match issue.path.first() {
                Some(segment) => flattened
                    .field_errors
                    .entry(segment.to_string())
                    .or_default()
                    .push(issue.message.clone()),
                None => flattened.form_errors.push(issue.message.clone()),
            }
        }
        flattened
    }
}

impl From<Vec<Issue>> for ValidationError {
    fn from(issues: Vec<Issue>) -> Self {
        Self::new(issues)
    }
}

/// Path-keyed view of a [`ValidationError`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorTree {
    /// Messages of issues located exactly here.
    pub errors: Vec<String>,
    pub children: IndexMap<PathSegment, ErrorTree>,
}

impl ErrorTree {
    pub fn get(&self, segment: impl Into<PathSegment>) -> Option<&ErrorTree> {
        self.children.get(&segment.into())
    }
}

/// Root-level and per-field messages of a [`ValidationError`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedError {
    pub form_errors: Vec<String>,
    pub field_errors: IndexMap<String, Vec<String>>,
}

// =============================================================================
// ParseError (returned by `parse`)
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ParseError {
    pub fn as_validation_error(&self) -> Option<&ValidationError> {
        match self {
            ParseError::Invalid(error) => Some(error),
            ParseError::Schema(_) => None,
        }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(
            f: &mut fmt::Formatter<'_>,
            node: &ErrorTree,
            depth: usize,
        ) -> fmt::Result {
            for error in &node.errors {
                writeln!(f, "{:indent$}- {error}", "", indent = depth * 2)?;
            }
            for (segment, child) in &node.children {
                writeln!(f, "{:indent$}{segment}:", "", indent = depth * 2)?;
                write_node(f, child, depth + 1)?;
            }
            Ok(())
        }
        write_node(f, self, 0)
    }
}
