//! Schema nodes and the parse driver
//!
//! # Architecture
//!
//! - `Schema`: shared handle to an immutable `SchemaNode`
//! - `SchemaKind`: closed set of node kinds, dispatched by one `match`
//! - Kind structs (`StringSchema`, `ObjectSchema`, ...): implement `TypeParser`
//! - `SchemaExt`: derivation helpers and entry points for anything that
//!   converts into a `Schema`

use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, trace, warn};
use vela_value::{Value, ValueType};

use crate::context::{ParseContext, ParseParams};
use crate::error::{ParseError, SchemaError, ValidationError};
use crate::error_map::{ErrorMap, ErrorParams};
use crate::issue::RawIssue;
use crate::status::{ParseResult, ParseReturn};
use crate::types::*;

// =============================================================================
// Schema
// =============================================================================

/// Remaining stack below which a node parse moves to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// A validation node. Cloning shares the node.
#[derive(Clone)]
pub struct Schema(Arc<SchemaNode>);

pub struct SchemaNode {
    kind: SchemaKind,
    error_map: Option<ErrorMap>,
    description: Option<String>,
}

#[derive(Clone)]
pub enum SchemaKind {
    String(StringSchema),
    Number(NumberSchema),
    BigInt(BigIntSchema),
    Boolean(BooleanSchema),
    Date(DateSchema),
    Literal(LiteralSchema),
    Enum(EnumSchema),
    NativeEnum(NativeEnumSchema),
    Symbol,
    Undefined,
    Null,
    Void,
    Never,
    Any,
    Unknown,
    NaN,
    Object(ObjectSchema),
    Array(ArraySchema),
    Tuple(TupleSchema),
    Record(RecordSchema),
    Map(MapSchema),
    Set(SetSchema),
    Union(UnionSchema),
    DiscriminatedUnion(DiscriminatedUnionSchema),
    Intersection(IntersectionSchema),
    Optional(OptionalSchema),
    Nullable(NullableSchema),
    Default(DefaultSchema),
    Catch(CatchSchema),
    Branded(BrandedSchema),
    Readonly(ReadonlySchema),
    Lazy(LazySchema),
    Effects(EffectsSchema),
    Pipeline(PipelineSchema),
}

impl SchemaKind {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::String(_) => "string",
            SchemaKind::Number(_) => "number",
            SchemaKind::BigInt(_) => "bigint",
            SchemaKind::Boolean(_) => "boolean",
            SchemaKind::Date(_) => "date",
            SchemaKind::Literal(_) => "literal",
            SchemaKind::Enum(_) => "enum",
            SchemaKind::NativeEnum(_) => "native_enum",
            SchemaKind::Symbol => "symbol",
            SchemaKind::Undefined => "undefined",
            SchemaKind::Null => "null",
            SchemaKind::Void => "void",
            SchemaKind::Never => "never",
            SchemaKind::Any => "any",
            SchemaKind::Unknown => "unknown",
            SchemaKind::NaN => "nan",
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
            SchemaKind::Tuple(_) => "tuple",
            SchemaKind::Record(_) => "record",
            SchemaKind::Map(_) => "map",
            SchemaKind::Set(_) => "set",
            SchemaKind::Union(_) => "union",
            SchemaKind::DiscriminatedUnion(_) => "discriminated_union",
            SchemaKind::Intersection(_) => "intersection",
            SchemaKind::Optional(_) => "optional",
            SchemaKind::Nullable(_) => "nullable",
            SchemaKind::Default(_) => "default",
            SchemaKind::Catch(_) => "catch",
            SchemaKind::Branded(_) => "branded",
            SchemaKind::Readonly(_) => "readonly",
            SchemaKind::Lazy(_) => "lazy",
            SchemaKind::Effects(_) => "effects",
            SchemaKind::Pipeline(_) => "pipeline",
        }
    }
}

/// The single extension point every node kind implements.
pub(crate) trait TypeParser {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn;
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Schema(Arc::new(SchemaNode {
            kind,
            error_map: None,
            description: None,
        }))
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.0.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    pub(crate) fn has_error_map(&self) -> bool {
        self.0.error_map.is_some()
    }

    /// A new node with the same kind and replaced metadata.
    fn with_meta(&self, error_map: Option<ErrorMap>, description: Option<String>) -> Schema {
        Schema(Arc::new(SchemaNode {
            kind: self.0.kind.clone(),
            error_map,
            description,
        }))
    }

    /// Parses `input` at the position described by `ctx`.
    ///
    /// Grows the stack on demand, so deeply nested input through `lazy`
    /// schemas does not overflow.
    pub(crate) fn parse_input(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.dispatch(input, ctx))
    }

    fn dispatch(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let ctx = ctx.for_node(self.0.error_map.clone());
        match &self.0.kind {
            SchemaKind::String(s) => s.parse_value(input, &ctx),
            SchemaKind::Number(s) => s.parse_value(input, &ctx),
            SchemaKind::BigInt(s) => s.parse_value(input, &ctx),
            SchemaKind::Boolean(s) => s.parse_value(input, &ctx),
            SchemaKind::Date(s) => s.parse_value(input, &ctx),
            SchemaKind::Literal(s) => s.parse_value(input, &ctx),
            SchemaKind::Enum(s) => s.parse_value(input, &ctx),
            SchemaKind::NativeEnum(s) => s.parse_value(input, &ctx),
            SchemaKind::Symbol => expect_type(input, &ctx, ValueType::Symbol),
            SchemaKind::Undefined => expect_type(input, &ctx, ValueType::Undefined),
            SchemaKind::Null => expect_type(input, &ctx, ValueType::Null),
            SchemaKind::Void => expect_type(input, &ctx, ValueType::Void),
            SchemaKind::Never => expect_type(input, &ctx, ValueType::Never),
            SchemaKind::Any | SchemaKind::Unknown => ParseReturn::valid(input),
            SchemaKind::NaN => expect_type(input, &ctx, ValueType::Nan),
            SchemaKind::Object(s) => s.parse_value(input, &ctx),
            SchemaKind::Array(s) => s.parse_value(input, &ctx),
            SchemaKind::Tuple(s) => s.parse_value(input, &ctx),
            SchemaKind::Record(s) => s.parse_value(input, &ctx),
            SchemaKind::Map(s) => s.parse_value(input, &ctx),
            SchemaKind::Set(s) => s.parse_value(input, &ctx),
            SchemaKind::Union(s) => s.parse_value(input, &ctx),
            SchemaKind::DiscriminatedUnion(s) => s.parse_value(input, &ctx),
            SchemaKind::Intersection(s) => s.parse_value(input, &ctx),
            SchemaKind::Optional(s) => s.parse_value(input, &ctx),
            SchemaKind::Nullable(s) => s.parse_value(input, &ctx),
            SchemaKind::Default(s) => s.parse_value(input, &ctx),
            SchemaKind::Catch(s) => s.parse_value(input, &ctx),
            SchemaKind::Branded(s) => s.parse_value(input, &ctx),
            SchemaKind::Readonly(s) => s.parse_value(input, &ctx),
            SchemaKind::Lazy(s) => s.parse_value(input, &ctx),
            SchemaKind::Effects(s) => s.parse_value(input, &ctx),
            SchemaKind::Pipeline(s) => s.parse_value(input, &ctx),
        }
    }

    fn run_sync(&self, data: Value, params: ParseParams) -> Result<SafeParse, SchemaError> {
        trace!(kind = self.kind().name(), "parse");
        let ctx = ParseContext::root(params);
        let ret = match catch_unwind(AssertUnwindSafe(|| self.parse_input(data, &ctx))) {
            Ok(ret) => ret,
            Err(_) => return Ok(conclude(&ctx, self.panicked(&ctx))),
        };
        match ret {
            ParseReturn::Ready(result) => Ok(conclude(&ctx, result)),
            ParseReturn::Pending(_) => {
                warn!(kind = self.kind().name(), "deferred work in synchronous parse");
                Err(SchemaError::AsyncInSync)
            }
        }
    }

    async fn run_async(self, data: Value, params: ParseParams) -> SafeParse {
        trace!(kind = self.kind().name(), "parse_async");
        let ctx = ParseContext::root(params);
        let ret = match catch_unwind(AssertUnwindSafe(|| self.parse_input(data, &ctx))) {
            Ok(ret) => ret,
            Err(_) => return conclude(&ctx, self.panicked(&ctx)),
        };
        let result = match AssertUnwindSafe(ret.resolve()).catch_unwind().await {
            Ok(result) => result,
            Err(_) => self.panicked(&ctx),
        };
        conclude(&ctx, result)
    }

    /// A callback panicked mid-parse: drop whatever was logged and abort.
    fn panicked(&self, ctx: &ParseContext) -> ParseResult {
        warn!(kind = self.kind().name(), "panic during parse, result aborted");
        ctx.take_issues();
        ParseResult::Aborted
    }
}

fn conclude(ctx: &ParseContext, result: ParseResult) -> SafeParse {
    let error = ctx.finish();
    match result {
        ParseResult::Valid(data) => {
            trace!("parse succeeded");
            SafeParse::Success { data }
        }
        ParseResult::Dirty(_) | ParseResult::Aborted => {
            debug!(issues = error.len(), "parse failed");
            SafeParse::Failure { error }
        }
    }
}

impl core::fmt::Debug for Schema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind().name())
            .field("description", &self.0.description)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// SafeParse
// =============================================================================

/// Outcome of a parse that reports validation failures as data.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse {
    Success { data: Value },
    Failure { error: ValidationError },
}

impl SafeParse {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeParse::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            SafeParse::Success { data } => Some(data),
            SafeParse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            SafeParse::Success { .. } => None,
            SafeParse::Failure { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self {
            SafeParse::Success { data } => Ok(data),
            SafeParse::Failure { error } => Err(error),
        }
    }
}

// =============================================================================
// SchemaExt
// =============================================================================

/// Derivation helpers and parse entry points.
///
/// Every helper returns a new node and leaves the receiver untouched.
pub trait SchemaExt: Clone + Into<Schema> {
    fn schema(&self) -> Schema {
        self.clone().into()
    }

    fn optional(&self) -> Schema {
        OptionalSchema::new(self.schema()).into()
    }

    fn nullable(&self) -> Schema {
        NullableSchema::new(self.schema()).into()
    }

    fn nullish(&self) -> Schema {
        self.nullable().optional()
    }

    fn array(&self) -> ArraySchema {
        ArraySchema::new(self.schema())
    }

    /// Union of the receiver and `other`, tried in that order.
    fn or(&self, other: impl Into<Schema>) -> Schema {
        UnionSchema::new([self.schema(), other.into()]).into()
    }

    fn and(&self, other: impl Into<Schema>) -> Schema {
        IntersectionSchema::new(self.schema(), other.into()).into()
    }

    /// Substitutes `value` for `undefined` input.
    fn default_value(&self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        DefaultSchema::new(self.schema(), move || value.clone()).into()
    }

    /// Substitutes a fresh `supplier()` for `undefined` input.
    fn default_with(&self, supplier: impl Fn() -> Value + Send + Sync + 'static) -> Schema {
        DefaultSchema::new(self.schema(), supplier).into()
    }

    fn catch_value(&self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        CatchSchema::new(self.schema(), move |_: &CatchContext| value.clone()).into()
    }

    fn catch_with(
        &self,
        fallback: impl Fn(&CatchContext) -> Value + Send + Sync + 'static,
    ) -> Schema {
        CatchSchema::new(self.schema(), fallback).into()
    }

    fn transform(&self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Schema {
        with_effect(
            self.schema(),
            Effect::transform(move |value, _| MaybeAsync::Ready(f(value))),
        )
    }

    /// Transform that may report issues through the refinement context.
    fn transform_with(
        &self,
        f: impl Fn(Value, &RefinementCtx) -> Value + Send + Sync + 'static,
    ) -> Schema {
        with_effect(
            self.schema(),
            Effect::transform(move |value, ctx| MaybeAsync::Ready(f(value, &ctx))),
        )
    }

    fn transform_async<F, Fut>(&self, f: F) -> Schema
    where
        F: Fn(Value, RefinementCtx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        with_effect(
            self.schema(),
            Effect::transform(move |value, ctx| MaybeAsync::Pending(f(value, ctx).boxed())),
        )
    }

    /// Reports a `custom` issue when `check` returns false.
    fn refine(
        &self,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
        params: impl Into<RefineParams>,
    ) -> Schema {
        let params = params.into();
        with_effect(
            self.schema(),
            Effect::refinement(move |value, ctx| {
                if !check(&value) {
                    ctx.add_issue(params.to_issue());
                }
                MaybeAsync::Ready(())
            }),
        )
    }

    fn refine_async<F, Fut>(&self, check: F, params: impl Into<RefineParams>) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let params = Arc::new(params.into());
        with_effect(
            self.schema(),
            Effect::refinement(move |value, ctx| {
                let pending = check(value);
                let params = params.clone();
                MaybeAsync::Pending(
                    async move {
                        if !pending.await {
                            ctx.add_issue(params.to_issue());
                        }
                    }
                    .boxed(),
                )
            }),
        )
    }

    /// Refinement that reports its own issues.
    fn super_refine(&self, f: impl Fn(&Value, &RefinementCtx) + Send + Sync + 'static) -> Schema {
        with_effect(
            self.schema(),
            Effect::refinement(move |value, ctx| {
                f(&value, &ctx);
                MaybeAsync::Ready(())
            }),
        )
    }

    fn super_refine_async<F, Fut>(&self, f: F) -> Schema
    where
        F: Fn(Value, RefinementCtx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        with_effect(
            self.schema(),
            Effect::refinement(move |value, ctx| MaybeAsync::Pending(f(value, ctx).boxed())),
        )
    }

    fn brand(&self, brand: impl Into<String>) -> Schema {
        BrandedSchema::new(self.schema(), brand).into()
    }

    /// Feeds the receiver's output into `next`.
    fn pipe(&self, next: impl Into<Schema>) -> Schema {
        PipelineSchema::new(self.schema(), next.into()).into()
    }

    fn readonly(&self) -> Schema {
        ReadonlySchema::new(self.schema()).into()
    }

    fn describe(&self, description: impl Into<String>) -> Schema {
        let schema = self.schema();
        schema.with_meta(schema.0.error_map.clone(), Some(description.into()))
    }

    /// Attaches a node-local error map, consulted for this node's own issues.
    fn error_map(
        &self,
        map: impl Fn(&RawIssue, &str) -> Option<String> + Send + Sync + 'static,
    ) -> Schema {
        let schema = self.schema();
        schema.with_meta(Some(Arc::new(map)), schema.0.description.clone())
    }

    fn with_params(&self, params: ErrorParams) -> Schema {
        let schema = self.schema();
        let error_map = params.to_error_map().or_else(|| schema.0.error_map.clone());
        let description = params.description.or_else(|| schema.0.description.clone());
        schema.with_meta(error_map, description)
    }

    /// Whether `undefined` is accepted.
    fn is_optional(&self) -> bool {
        matches!(self.safe_parse(Value::Undefined), Ok(outcome) if outcome.is_success())
    }

    /// Whether `null` is accepted.
    fn is_nullable(&self) -> bool {
        matches!(self.safe_parse(Value::Null), Ok(outcome) if outcome.is_success())
    }

    fn parse(&self, data: impl Into<Value>) -> Result<Value, ParseError> {
        self.parse_with(data, ParseParams::default())
    }

    fn parse_with(&self, data: impl Into<Value>, params: ParseParams) -> Result<Value, ParseError> {
        Ok(self.safe_parse_with(data, params)?.into_result()?)
    }

    /// Parses synchronously. Validation failures are returned as data; only
    /// usage errors are `Err`.
    fn safe_parse(&self, data: impl Into<Value>) -> Result<SafeParse, SchemaError> {
        self.safe_parse_with(data, ParseParams::default())
    }

    fn safe_parse_with(
        &self,
        data: impl Into<Value>,
        params: ParseParams,
    ) -> Result<SafeParse, SchemaError> {
        self.schema().run_sync(data.into(), params)
    }

    fn parse_async(&self, data: impl Into<Value>) -> BoxFuture<'static, Result<Value, ValidationError>> {
        self.parse_async_with(data, ParseParams::default())
    }

    fn parse_async_with(
        &self,
        data: impl Into<Value>,
        params: ParseParams,
    ) -> BoxFuture<'static, Result<Value, ValidationError>> {
        let outcome = self.safe_parse_async_with(data, params);
        async move { outcome.await.into_result() }.boxed()
    }

    fn safe_parse_async(&self, data: impl Into<Value>) -> BoxFuture<'static, SafeParse> {
        self.safe_parse_async_with(data, ParseParams::default())
    }

    fn safe_parse_async_with(
        &self,
        data: impl Into<Value>,
        params: ParseParams,
    ) -> BoxFuture<'static, SafeParse> {
        self.schema().run_async(data.into(), params).boxed()
    }
}

impl<T: Clone + Into<Schema>> SchemaExt for T {}
