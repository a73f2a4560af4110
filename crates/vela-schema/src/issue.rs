//! Issue vocabulary
//!
//! Three stages of a validation failure:
//! - `IssueData`: what a node or refinement reports, with a path relative to
//!   the reporting context
//! - `RawIssue`: the appended record in the per-call log, with the full path,
//!   the offending input and the reporting node's error map
//! - `Issue`: the finalized record handed to callers, with a resolved message

use core::fmt;

use indexmap::IndexMap;
use num_bigint::BigInt;
use vela_value::{Path, Value, ValueType, format_number};

use crate::error::ValidationError;
use crate::error_map::ErrorMap;

// =============================================================================
// Issue kinds
// =============================================================================

/// Snake-case discriminant of an [`IssueKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    InvalidType,
    InvalidLiteral,
    Custom,
    InvalidUnion,
    InvalidUnionDiscriminator,
    InvalidEnumValue,
    UnrecognizedKeys,
    InvalidDate,
    InvalidString,
    TooSmall,
    TooBig,
    InvalidIntersectionTypes,
    NotMultipleOf,
    NotFinite,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidType => "invalid_type",
            IssueCode::InvalidLiteral => "invalid_literal",
            IssueCode::Custom => "custom",
            IssueCode::InvalidUnion => "invalid_union",
            IssueCode::InvalidUnionDiscriminator => "invalid_union_discriminator",
            IssueCode::InvalidEnumValue => "invalid_enum_value",
            IssueCode::UnrecognizedKeys => "unrecognized_keys",
            IssueCode::InvalidDate => "invalid_date",
            IssueCode::InvalidString => "invalid_string",
            IssueCode::TooSmall => "too_small",
            IssueCode::TooBig => "too_big",
            IssueCode::InvalidIntersectionTypes => "invalid_intersection_types",
            IssueCode::NotMultipleOf => "not_multiple_of",
            IssueCode::NotFinite => "not_finite",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an `invalid_type` issue expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Type(ValueType),
    /// One of a fixed set of values (enums).
    OneOf(Vec<Value>),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Type(ty) => write!(f, "{ty}"),
            Expected::OneOf(values) => f.write_str(&join_values(values, " | ")),
        }
    }
}

impl From<ValueType> for Expected {
    fn from(ty: ValueType) -> Self {
        Expected::Type(ty)
    }
}

/// Which kind of value a size or bound check was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeOrigin {
    String,
    Number,
    BigInt,
    Array,
    Set,
    Date,
}

/// Numeric payload of bound and `multiple_of` issues.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Number(f64),
    BigInt(BigInt),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Number(n) => f.write_str(&format_number(*n)),
            Bound::BigInt(n) => write!(f, "{n}"),
        }
    }
}

impl From<f64> for Bound {
    fn from(n: f64) -> Self {
        Bound::Number(n)
    }
}

impl From<usize> for Bound {
    fn from(n: usize) -> Self {
        Bound::Number(n as f64)
    }
}

impl From<BigInt> for Bound {
    fn from(n: BigInt) -> Self {
        Bound::BigInt(n)
    }
}

/// Sub-kind of an `invalid_string` issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StringValidation {
    Email,
    Url,
    Emoji,
    Uuid,
    Nanoid,
    Cuid,
    Cuid2,
    Ulid,
    Regex,
    Datetime,
    Date,
    Time,
    Duration,
    Ip,
    Cidr,
    Base64,
    Base64Url,
    Includes {
        includes: String,
        position: Option<usize>,
    },
    StartsWith(String),
    EndsWith(String),
}

impl StringValidation {
    pub fn name(&self) -> &'static str {
        match self {
            StringValidation::Email => "email",
            StringValidation::Url => "url",
            StringValidation::Emoji => "emoji",
            StringValidation::Uuid => "uuid",
            StringValidation::Nanoid => "nanoid",
            StringValidation::Cuid => "cuid",
            StringValidation::Cuid2 => "cuid2",
            StringValidation::Ulid => "ulid",
            StringValidation::Regex => "regex",
            StringValidation::Datetime => "datetime",
            StringValidation::Date => "date",
            StringValidation::Time => "time",
            StringValidation::Duration => "duration",
            StringValidation::Ip => "ip",
            StringValidation::Cidr => "cidr",
            StringValidation::Base64 => "base64",
            StringValidation::Base64Url => "base64url",
            StringValidation::Includes { .. } => "includes",
            StringValidation::StartsWith(_) => "startsWith",
            StringValidation::EndsWith(_) => "endsWith",
        }
    }
}

/// A validation failure kind together with the data needed to describe it.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    InvalidType {
        expected: Expected,
        received: ValueType,
    },
    InvalidLiteral {
        expected: Value,
        received: Value,
    },
    Custom {
        params: IndexMap<String, Value>,
    },
    InvalidUnion {
        union_errors: Vec<ValidationError>,
    },
    InvalidUnionDiscriminator {
        options: Vec<Value>,
    },
    InvalidEnumValue {
        options: Vec<Value>,
        received: Value,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
    InvalidDate,
    InvalidString {
        validation: StringValidation,
    },
    TooSmall {
        minimum: Bound,
        inclusive: bool,
        exact: bool,
        origin: SizeOrigin,
    },
    TooBig {
        maximum: Bound,
        inclusive: bool,
        exact: bool,
        origin: SizeOrigin,
    },
    InvalidIntersectionTypes,
    NotMultipleOf {
        multiple_of: Bound,
    },
    NotFinite,
}

impl IssueKind {
    pub fn code(&self) -> IssueCode {
        match self {
            IssueKind::InvalidType { .. } => IssueCode::InvalidType,
            IssueKind::InvalidLiteral { .. } => IssueCode::InvalidLiteral,
            IssueKind::Custom { .. } => IssueCode::Custom,
            IssueKind::InvalidUnion { .. } => IssueCode::InvalidUnion,
            IssueKind::InvalidUnionDiscriminator { .. } => IssueCode::InvalidUnionDiscriminator,
            IssueKind::InvalidEnumValue { .. } => IssueCode::InvalidEnumValue,
            IssueKind::UnrecognizedKeys { .. } => IssueCode::UnrecognizedKeys,
            IssueKind::InvalidDate => IssueCode::InvalidDate,
            IssueKind::InvalidString { .. } => IssueCode::InvalidString,
            IssueKind::TooSmall { .. } => IssueCode::TooSmall,
            IssueKind::TooBig { .. } => IssueCode::TooBig,
            IssueKind::InvalidIntersectionTypes => IssueCode::InvalidIntersectionTypes,
            IssueKind::NotMultipleOf { .. } => IssueCode::NotMultipleOf,
            IssueKind::NotFinite => IssueCode::NotFinite,
        }
    }

    pub fn invalid_type(expected: impl Into<Expected>, received: ValueType) -> Self {
        IssueKind::InvalidType {
            expected: expected.into(),
            received,
        }
    }

    /// A `custom` issue without parameters.
    pub fn custom() -> Self {
        IssueKind::Custom {
            params: IndexMap::new(),
        }
    }

    pub fn too_small(minimum: impl Into<Bound>, inclusive: bool, origin: SizeOrigin) -> Self {
        IssueKind::TooSmall {
            minimum: minimum.into(),
            inclusive,
            exact: false,
            origin,
        }
    }

    pub fn too_big(maximum: impl Into<Bound>, inclusive: bool, origin: SizeOrigin) -> Self {
        IssueKind::TooBig {
            maximum: maximum.into(),
            inclusive,
            exact: false,
            origin,
        }
    }
}

/// Joins values for messages: strings in single quotes, everything else as
/// displayed.
pub fn join_values(values: &[Value], separator: &str) -> String {
    values
        .iter()
        .map(|value| match value {
            Value::String(s) => format!("'{s}'"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// IssueData (reported)
// =============================================================================

/// An issue as reported by a node or a refinement callback.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueData {
    pub kind: IssueKind,
    /// Path relative to the reporting context.
    pub path: Path,
    /// Literal message; takes precedence over every error map.
    pub message: Option<String>,
    /// A fatal issue aborts the enclosing refinement node.
    pub fatal: bool,
}

impl IssueData {
    pub fn new(kind: IssueKind) -> Self {
        Self {
            kind,
            path: Path::root(),
            message: None,
            fatal: false,
        }
    }

    /// A `custom` issue carrying `message`.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueKind::custom()).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub(crate) fn with_message_opt(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn at(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

impl From<IssueKind> for IssueData {
    fn from(kind: IssueKind) -> Self {
        IssueData::new(kind)
    }
}

// =============================================================================
// RawIssue (logged)
// =============================================================================

/// An issue appended to the per-call log, before message resolution.
#[derive(Clone)]
pub struct RawIssue {
    pub kind: IssueKind,
    pub path: Path,
    pub message: Option<String>,
    /// The value being checked by the reporting node.
    pub input: Value,
    pub(crate) fatal: bool,
    pub(crate) schema_error_map: Option<ErrorMap>,
}

impl RawIssue {
    pub fn code(&self) -> IssueCode {
        self.kind.code()
    }
}

impl fmt::Debug for RawIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawIssue")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("message", &self.message)
            .field("input", &self.input)
            .field("fatal", &self.fatal)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Issue (finalized)
// =============================================================================

/// A finalized issue: kind, full path and resolved message.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: Path,
    pub message: String,
}

impl Issue {
    pub fn code(&self) -> IssueCode {
        self.kind.code()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code(), self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_values_quotes_strings() {
        let values = vec![Value::from("a"), Value::from(1), Value::Null];
        assert_eq!(join_values(&values, " | "), "'a' | 1 | null");
    }

    #[test]
    fn test_expected_display() {
        assert_eq!(Expected::Type(ValueType::String).to_string(), "string");
        assert_eq!(
            Expected::OneOf(vec![Value::from("x"), Value::from("y")]).to_string(),
            "'x' | 'y'"
        );
    }

    #[test]
    fn test_issue_data_builder() {
        let data = IssueData::custom("bad").at(Path::from_segments(["a"])).fatal();
        assert_eq!(data.kind.code(), IssueCode::Custom);
        assert_eq!(data.message.as_deref(), Some("bad"));
        assert!(data.fatal);
        assert_eq!(data.path.to_string(), "a");
    }

    #[test]
    fn test_code_names() {
        let codes = [
            IssueCode::InvalidType,
            IssueCode::InvalidLiteral,
            IssueCode::Custom,
            IssueCode::InvalidUnion,
            IssueCode::InvalidUnionDiscriminator,
            IssueCode::InvalidEnumValue,
            IssueCode::UnrecognizedKeys,
            IssueCode::InvalidDate,
            IssueCode::InvalidString,
            IssueCode::TooSmall,
            IssueCode::TooBig,
            IssueCode::InvalidIntersectionTypes,
            IssueCode::NotMultipleOf,
            IssueCode::NotFinite,
        ];
        let names: Vec<&str> = codes.iter().map(IssueCode::as_str).collect();
        assert!(!names.contains(&"invalid_arguments"));
        assert!(!names.contains(&"invalid_return_type"));
        let unique: std::collections::HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_bound_display() {
        assert_eq!(Bound::Number(5.0).to_string(), "5");
        assert_eq!(Bound::Number(0.1).to_string(), "0.1");
        assert_eq!(Bound::BigInt(BigInt::from(-3)).to_string(), "-3");
    }
}
