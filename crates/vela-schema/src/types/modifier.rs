//! Wrappers that adjust how an inner schema sees its input.

use std::sync::{Arc, OnceLock};

use vela_value::Value;

use crate::context::ParseContext;
use crate::error::ValidationError;
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn};

// =============================================================================
// Optional / Nullable
// =============================================================================

/// Accepts `undefined` as is, everything else goes to the inner schema.
#[derive(Debug, Clone)]
pub struct OptionalSchema {
    inner: Schema,
}

impl OptionalSchema {
    pub fn new(inner: impl Into<Schema>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn unwrap(&self) -> Schema {
        self.inner.clone()
    }
}

impl TypeParser for OptionalSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        if input.is_undefined() {
            return ParseReturn::valid(input);
        }
        self.inner.parse_input(input, ctx)
    }
}

impl From<OptionalSchema> for Schema {
    fn from(schema: OptionalSchema) -> Self {
        Schema::new(SchemaKind::Optional(schema))
    }
}

/// Accepts `null` as is, everything else goes to the inner schema.
#[derive(Debug, Clone)]
pub struct NullableSchema {
    inner: Schema,
}

impl NullableSchema {
    pub fn new(inner: impl Into<Schema>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn unwrap(&self) -> Schema {
        self.inner.clone()
    }
}

impl TypeParser for NullableSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        if input.is_null() {
            return ParseReturn::valid(input);
        }
        self.inner.parse_input(input, ctx)
    }
}

impl From<NullableSchema> for Schema {
    fn from(schema: NullableSchema) -> Self {
        Schema::new(SchemaKind::Nullable(schema))
    }
}

// =============================================================================
// Default
// =============================================================================

type Supplier = Arc<dyn Fn() -> Value + Send + Sync>;

/// Replaces `undefined` input with a supplied value before parsing.
#[derive(Clone)]
pub struct DefaultSchema {
    inner: Schema,
    supplier: Supplier,
}

impl DefaultSchema {
    pub fn new(inner: impl Into<Schema>, supplier: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self {
            inner: inner.into(),
            supplier: Arc::new(supplier),
        }
    }

    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn remove_default(&self) -> Schema {
        self.inner.clone()
    }

    /// A fresh default value.
    pub fn default_value(&self) -> Value {
        (self.supplier)()
    }
}

impl TypeParser for DefaultSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let input = if input.is_undefined() {
            (self.supplier)()
        } else {
            input
        };
        self.inner.parse_input(input, ctx)
    }
}

impl core::fmt::Debug for DefaultSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultSchema")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl From<DefaultSchema> for Schema {
    fn from(schema: DefaultSchema) -> Self {
        Schema::new(SchemaKind::Default(schema))
    }
}

// =============================================================================
// Catch
// =============================================================================

/// What a catch fallback receives: the swallowed error and the original
/// input.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchContext {
    pub error: ValidationError,
    pub input: Value,
}

type Fallback = Arc<dyn Fn(&CatchContext) -> Value + Send + Sync>;

/// Substitutes a fallback value whenever the inner schema fails. Issues
/// of the inner schema never reach the caller.
#[derive(Clone)]
pub struct CatchSchema {
    inner: Schema,
    fallback: Fallback,
}

impl CatchSchema {
    pub fn new(
        inner: impl Into<Schema>,
        fallback: impl Fn(&CatchContext) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: inner.into(),
            fallback: Arc::new(fallback),
        }
    }

    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn remove_catch(&self) -> Schema {
        self.inner.clone()
    }
}

impl TypeParser for CatchSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let isolated = ctx.isolated();
        let ret = self.inner.parse_input(input.clone(), &isolated);
        let fallback = self.fallback.clone();
        ret.map(move |result| match result {
            ParseResult::Valid(value) => ParseResult::Valid(value),
            ParseResult::Dirty(_) | ParseResult::Aborted => {
                let caught = CatchContext {
                    error: isolated.finish(),
                    input,
                };
                tracing::trace!(issues = caught.error.len(), "catch substituted fallback");
                ParseResult::Valid(fallback(&caught))
            }
        })
    }
}

impl core::fmt::Debug for CatchSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CatchSchema")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl From<CatchSchema> for Schema {
    fn from(schema: CatchSchema) -> Self {
        Schema::new(SchemaKind::Catch(schema))
    }
}

// =============================================================================
// Branded / Readonly
// =============================================================================

/// Tags the inner schema with a nominal brand. Parsing is unchanged.
#[derive(Debug, Clone)]
pub struct BrandedSchema {
    inner: Schema,
    brand: String,
}

impl BrandedSchema {
    pub fn new(inner: impl Into<Schema>, brand: impl Into<String>) -> Self {
        Self {
            inner: inner.into(),
            brand: brand.into(),
        }
    }

    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn unwrap(&self) -> Schema {
        self.inner.clone()
    }
}

impl TypeParser for BrandedSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        self.inner.parse_input(input, ctx)
    }
}

impl From<BrandedSchema> for Schema {
    fn from(schema: BrandedSchema) -> Self {
        Schema::new(SchemaKind::Branded(schema))
    }
}

/// Marks the output as read-only. Values are immutable here, so parsing
/// is unchanged.
#[derive(Debug, Clone)]
pub struct ReadonlySchema {
    inner: Schema,
}

impl ReadonlySchema {
    pub fn new(inner: impl Into<Schema>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn unwrap(&self) -> Schema {
        self.inner.clone()
    }
}

impl TypeParser for ReadonlySchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        self.inner.parse_input(input, ctx)
    }
}

impl From<ReadonlySchema> for Schema {
    fn from(schema: ReadonlySchema) -> Self {
        Schema::new(SchemaKind::Readonly(schema))
    }
}

// =============================================================================
// Lazy
// =============================================================================

type Getter = Arc<dyn Fn() -> Schema + Send + Sync>;

/// Defers building the inner schema until parse time, for recursive types.
///
/// The getter runs once, on first use; clones share the built schema.
#[derive(Clone)]
pub struct LazySchema {
    getter: Getter,
    built: Arc<OnceLock<Schema>>,
}

impl LazySchema {
    pub fn new(getter: impl Fn() -> Schema + Send + Sync + 'static) -> Self {
        Self {
            getter: Arc::new(getter),
            built: Arc::new(OnceLock::new()),
        }
    }

    /// The inner schema, built on first call.
    pub fn schema(&self) -> Schema {
        self.inner().clone()
    }

    fn inner(&self) -> &Schema {
        self.built.get_or_init(|| (self.getter)())
    }
}

impl TypeParser for LazySchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        self.inner().parse_input(input, ctx)
    }
}

impl core::fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazySchema")
            .field("built", &self.built.get().is_some())
            .finish_non_exhaustive()
    }
}

impl From<LazySchema> for Schema {
    fn from(schema: LazySchema) -> Self {
        Schema::new(SchemaKind::Lazy(schema))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use vela_value::value;

    use super::*;
    use crate::issue::IssueCode;
    use crate::{SchemaExt, lazy, number, object, string};

    #[test]
    fn test_optional_and_nullable() {
        assert!(string().optional().safe_parse(Value::Undefined).unwrap().is_success());
        assert!(!string().optional().safe_parse(Value::Null).unwrap().is_success());
        assert!(string().nullable().safe_parse(Value::Null).unwrap().is_success());
        let nullish = string().nullish();
        assert!(nullish.is_optional());
        assert!(nullish.is_nullable());
    }

    #[test]
    fn test_default_only_replaces_undefined() {
        let schema = number().default_value(7);
        assert_eq!(schema.parse(Value::Undefined).unwrap(), Value::from(7));
        assert_eq!(schema.parse(3).unwrap(), Value::from(3));
        assert!(schema.parse(Value::Null).is_err());
    }

    #[test]
    fn test_default_supplier_runs_per_parse() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let schema = number().default_with(move || {
            Value::from(counter.fetch_add(1, Ordering::SeqCst) as f64)
        });
        assert_eq!(schema.parse(Value::Undefined).unwrap(), Value::from(0));
        assert_eq!(schema.parse(Value::Undefined).unwrap(), Value::from(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_output_is_validated() {
        let schema = number().default_value("oops");
        assert!(schema.parse(Value::Undefined).is_err());
    }

    #[test]
    fn test_catch_swallows_issues() {
        let schema = object([("n", number().catch_value(0))]);
        assert_eq!(schema.parse(value!({"n": "x"})).unwrap(), value!({"n": 0}));
    }

    #[test]
    fn test_catch_sees_error_and_input() {
        let schema = string().min(3).catch_with(|caught| {
            Value::from(format!(
                "{}:{}",
                caught.error.issues()[0].code(),
                caught.input.as_str().unwrap_or_default()
            ))
        });
        assert_eq!(schema.parse("ab").unwrap(), Value::from("too_small:ab"));
        assert_eq!(schema.parse("abcd").unwrap(), Value::from("abcd"));
    }

    #[test]
    fn test_brand_and_readonly_are_transparent() {
        let schema = string().brand("UserId").readonly();
        assert_eq!(schema.parse("u1").unwrap(), Value::from("u1"));
        let outcome = schema.safe_parse(1).unwrap();
        assert_eq!(outcome.error().unwrap().issues()[0].code(), IssueCode::InvalidType);
    }

    #[test]
    fn test_lazy_builds_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let schema = lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            number().schema()
        });
        let shared = schema.clone();
        assert!(schema.parse(1).is_ok());
        assert!(shared.parse(2).is_ok());
        assert!(schema.parse("x").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lazy_recursion() {
        fn list() -> Schema {
            object([
                ("value", number().schema()),
                ("next", lazy(list).optional()),
            ])
            .into()
        }
        let data = value!({"value": 1, "next": {"value": 2}});
        assert_eq!(list().parse(data.clone()).unwrap(), data);
        let outcome = list()
            .safe_parse(value!({"value": 1, "next": {"value": "x"}}))
            .unwrap();
        assert_eq!(outcome.error().unwrap().issues()[0].path.to_string(), "next.value");
    }
}
