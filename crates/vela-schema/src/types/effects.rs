//! Refinements, transforms and preprocessing
//!
//! An `EffectsSchema` parses its inner schema and then runs an ordered list
//! of effects over the result. Chained `refine`/`transform` calls append to
//! the same list instead of nesting nodes, as long as the node carries no
//! metadata of its own.
//!
//! Each effect sees the result of the previous one:
//! - a refinement runs unless the result is aborted; its issues dirty the
//!   result, or abort it when fatal
//! - a transform runs only on a valid result and replaces the value; any
//!   other result passes through unchanged

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use parking_lot::Mutex;
use vela_value::{Path, Value};

use crate::context::ParseContext;
use crate::issue::{IssueData, IssueKind};
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn, Status};

/// A callback result that is either available now or deferred.
pub enum MaybeAsync<T> {
    Ready(T),
    Pending(BoxFuture<'static, T>),
}

impl<T: Send + 'static> MaybeAsync<T> {
    /// Continues with `next`, synchronously when the value is ready.
    fn then(self, next: impl FnOnce(T) -> ParseReturn + Send + 'static) -> ParseReturn {
        match self {
            MaybeAsync::Ready(value) => next(value),
            MaybeAsync::Pending(future) => {
                ParseReturn::Pending(async move { next(future.await).resolve().await }.boxed())
            }
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for MaybeAsync<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MaybeAsync::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            MaybeAsync::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

// =============================================================================
// RefinementCtx / RefineParams
// =============================================================================

/// Handle through which effect callbacks report issues.
#[derive(Clone, Debug)]
pub struct RefinementCtx {
    issues: Arc<Mutex<Vec<IssueData>>>,
    path: Path,
}

impl RefinementCtx {
    fn new(path: Path) -> Self {
        Self {
            issues: Arc::new(Mutex::new(Vec::new())),
            path,
        }
    }

    /// Reports an issue. Its path is relative to the refined value.
    pub fn add_issue(&self, issue: impl Into<IssueData>) {
        self.issues.lock().push(issue.into());
    }

    /// Location of the refined value.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn drain(&self) -> Vec<IssueData> {
        std::mem::take(&mut *self.issues.lock())
    }
}

/// How a failed `refine` check is reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefineParams {
    pub message: Option<String>,
    /// Appended to the refined value's path.
    pub path: Path,
    pub params: IndexMap<String, Value>,
    pub fatal: bool,
}

impl RefineParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    pub fn to_issue(&self) -> IssueData {
        IssueData {
            kind: IssueKind::Custom {
                params: self.params.clone(),
            },
            path: self.path.clone(),
            message: self.message.clone(),
            fatal: self.fatal,
        }
    }
}

impl From<&str> for RefineParams {
    fn from(message: &str) -> Self {
        RefineParams::new().message(message)
    }
}

impl From<String> for RefineParams {
    fn from(message: String) -> Self {
        RefineParams::new().message(message)
    }
}

// =============================================================================
// Effects
// =============================================================================

type RefinementFn = Arc<dyn Fn(Value, RefinementCtx) -> MaybeAsync<()> + Send + Sync>;
type TransformFn = Arc<dyn Fn(Value, RefinementCtx) -> MaybeAsync<Value> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Effect {
    Refinement(RefinementFn),
    Transform(TransformFn),
}

impl Effect {
    pub(crate) fn refinement(
        f: impl Fn(Value, RefinementCtx) -> MaybeAsync<()> + Send + Sync + 'static,
    ) -> Self {
        Effect::Refinement(Arc::new(f))
    }

    pub(crate) fn transform(
        f: impl Fn(Value, RefinementCtx) -> MaybeAsync<Value> + Send + Sync + 'static,
    ) -> Self {
        Effect::Transform(Arc::new(f))
    }
}

/// Appends `effect` to `schema`, reusing its effect list when it is a bare
/// effects node.
pub(crate) fn with_effect(schema: Schema, effect: Effect) -> Schema {
    if let SchemaKind::Effects(existing) = schema.kind()
        && !schema.has_error_map()
        && schema.description().is_none()
    {
        let mut effects = (*existing.effects).clone();
        effects.push(effect);
        return EffectsSchema {
            inner: existing.inner.clone(),
            preprocess: existing.preprocess.clone(),
            effects: Arc::new(effects),
        }
        .into();
    }
    EffectsSchema {
        inner: schema,
        preprocess: None,
        effects: Arc::new(vec![effect]),
    }
    .into()
}

#[derive(Clone)]
pub struct EffectsSchema {
    inner: Schema,
    preprocess: Option<TransformFn>,
    effects: Arc<Vec<Effect>>,
}

impl EffectsSchema {
    /// Runs `f` on the raw input before `inner` sees it.
    pub fn preprocess(
        f: impl Fn(Value, &RefinementCtx) -> Value + Send + Sync + 'static,
        inner: impl Into<Schema>,
    ) -> Self {
        let preprocess: TransformFn =
            Arc::new(move |value: Value, ctx: RefinementCtx| MaybeAsync::Ready(f(value, &ctx)));
        Self {
            inner: inner.into(),
            preprocess: Some(preprocess),
            effects: Arc::new(Vec::new()),
        }
    }

    pub fn preprocess_async<F, Fut>(f: F, inner: impl Into<Schema>) -> Self
    where
        F: Fn(Value, RefinementCtx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        let preprocess: TransformFn = Arc::new(move |value: Value, ctx: RefinementCtx| {
            MaybeAsync::Pending(f(value, ctx).boxed())
        });
        Self {
            inner: inner.into(),
            preprocess: Some(preprocess),
            effects: Arc::new(Vec::new()),
        }
    }

    /// The schema whose output the effects operate on.
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }
}

impl core::fmt::Debug for EffectsSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectsSchema")
            .field("inner", &self.inner)
            .field("preprocess", &self.preprocess.is_some())
            .field("effects", &self.effects.len())
            .finish()
    }
}

impl TypeParser for EffectsSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let chain = Chain {
            inner: self.inner.clone(),
            effects: self.effects.clone(),
            ctx: ctx.clone(),
            input: input.clone(),
        };
        let Some(preprocess) = &self.preprocess else {
            return chain.run(input, Status::Valid);
        };
        let refinement = RefinementCtx::new(ctx.path().clone());
        preprocess(input, refinement.clone()).then(move |value| {
            let mut status = Status::Valid;
            chain.absorb(&refinement, &mut status);
            if status == Status::Aborted {
                return ParseReturn::aborted();
            }
            chain.run(value, status)
        })
    }
}

impl From<EffectsSchema> for Schema {
    fn from(schema: EffectsSchema) -> Self {
        Schema::new(SchemaKind::Effects(schema))
    }
}

/// Owned state threaded through the effect list.
struct Chain {
    inner: Schema,
    effects: Arc<Vec<Effect>>,
    ctx: ParseContext,
    input: Value,
}

impl Chain {
    /// Moves the callback's issues into the parse log.
    fn absorb(&self, refinement: &RefinementCtx, status: &mut Status) {
        for issue in refinement.drain() {
            if issue.fatal {
                status.abort();
            } else {
                status.dirty();
            }
            self.ctx.add_issue(&self.input, issue);
        }
    }

    fn run(self, value: Value, status: Status) -> ParseReturn {
        self.inner
            .parse_input(value, &self.ctx)
            .and_then(move |result| {
                let result = if status == Status::Dirty {
                    result.dirtied()
                } else {
                    result
                };
                self.step(0, result)
            })
    }

    fn step(self, index: usize, result: ParseResult) -> ParseReturn {
        let Some(effect) = self.effects.get(index).cloned() else {
            return ParseReturn::Ready(result);
        };
        match effect {
            Effect::Refinement(refine) => {
                let status = result.status();
                let Some(value) = result.into_value() else {
                    return ParseReturn::aborted();
                };
                let refinement = RefinementCtx::new(self.ctx.path().clone());
                refine(value.clone(), refinement.clone()).then(move |()| {
                    let mut status = status;
                    self.absorb(&refinement, &mut status);
                    self.step(index + 1, ParseResult::with_status(status, value))
                })
            }
            Effect::Transform(transform) => {
                let value = match result {
                    ParseResult::Valid(value) => value,
                    other => return self.step(index + 1, other),
                };
                let refinement = RefinementCtx::new(self.ctx.path().clone());
                transform(value, refinement.clone()).then(move |output| {
                    let mut status = Status::Valid;
                    self.absorb(&refinement, &mut status);
                    self.step(index + 1, ParseResult::with_status(status, output))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use vela_value::value;

    use super::*;
    use crate::error::SchemaError;
    use crate::issue::IssueCode;
    use crate::{SchemaExt, number, object, preprocess, string};

    fn messages(schema: &Schema, input: Value) -> Vec<String> {
        match schema.safe_parse(input).unwrap().error() {
            Some(error) => error.issues().iter().map(|issue| issue.message.clone()).collect(),
            None => vec![],
        }
    }

    #[test]
    fn test_chained_effects_share_one_node() {
        let schema = string()
            .transform(|v| Value::from(v.to_js_string().len()))
            .refine(|v| v.as_f64().is_some_and(|n| n > 2.0), "too short");
        match schema.kind() {
            SchemaKind::Effects(effects) => assert_eq!(effects.effect_count(), 2),
            other => panic!("unexpected kind {}", other.name()),
        }
        assert_eq!(schema.parse("abcd").unwrap(), Value::from(4));
        assert_eq!(messages(&schema, Value::from("ab")), vec!["too short"]);
    }

    #[test]
    fn test_described_node_is_wrapped() {
        let base = string().refine(|_| true, "x").describe("named");
        let schema = base.refine(|_| true, "y");
        match schema.kind() {
            SchemaKind::Effects(effects) => {
                assert_eq!(effects.effect_count(), 1);
                assert_eq!(effects.inner().description(), Some("named"));
            }
            other => panic!("unexpected kind {}", other.name()),
        }
    }

    #[test]
    fn test_refine_runs_on_dirty_input() {
        let schema = string().min(3).refine(|v| v.as_str() != Some("ab"), "not ab");
        let codes: Vec<IssueCode> = schema
            .safe_parse("ab")
            .unwrap()
            .error()
            .unwrap()
            .issues()
            .iter()
            .map(|issue| issue.code())
            .collect();
        assert_eq!(codes, vec![IssueCode::TooSmall, IssueCode::Custom]);
    }

    #[test]
    fn test_refine_skipped_on_abort() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let schema = string().refine(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            },
            "x",
        );
        assert!(schema.parse(1).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_transform_skipped_on_dirty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let schema = string().min(3).transform(move |v| {
            counter.fetch_add(1, Ordering::SeqCst);
            v
        });
        assert!(schema.parse("ab").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fatal_issue_aborts_chain() {
        let schema = number()
            .super_refine(|_, ctx| ctx.add_issue(IssueData::custom("stop").fatal()))
            .refine(|_| false, "unreachable");
        assert_eq!(messages(&schema, Value::from(1)), vec!["stop"]);
    }

    #[test]
    fn test_super_refine_paths() {
        let schema = object([("password", string()), ("confirm", string())]).super_refine(
            |value, ctx| {
                if value.get("password") != value.get("confirm") {
                    ctx.add_issue(
                        IssueData::custom("Passwords don't match")
                            .at(Path::from_segments(["confirm"])),
                    );
                }
            },
        );
        let outcome = schema
            .safe_parse(value!({"password": "a", "confirm": "b"}))
            .unwrap();
        let issue = &outcome.error().unwrap().issues()[0];
        assert_eq!(issue.path.to_string(), "confirm");
        assert_eq!(issue.message, "Passwords don't match");
    }

    #[test]
    fn test_refine_params() {
        let schema = number().refine(
            |v| v.as_f64() == Some(1.0),
            RefineParams::new()
                .message("must be one")
                .path(Path::from_segments(["n"]))
                .param("expected", 1),
        );
        let outcome = schema.safe_parse(2).unwrap();
        let issue = &outcome.error().unwrap().issues()[0];
        assert_eq!(issue.path.to_string(), "n");
        match &issue.kind {
            IssueKind::Custom { params } => assert_eq!(params.get("expected"), Some(&Value::from(1))),
            other => panic!("unexpected issue {other:?}"),
        }
    }

    #[test]
    fn test_transform_with_issue_dirties() {
        let schema = string().transform_with(|v, ctx| {
            ctx.add_issue(IssueData::custom("odd"));
            v
        });
        assert_eq!(messages(&schema, Value::from("x")), vec!["odd"]);
    }

    #[test]
    fn test_preprocess() {
        let schema = preprocess(
            |v, _| match v {
                Value::String(s) => Value::from(s.trim().to_string()),
                other => other,
            },
            string().min(1),
        );
        assert_eq!(schema.parse("  a ").unwrap(), Value::from("a"));
        assert!(schema.parse("   ").is_err());
    }

    #[test]
    fn test_async_transform() {
        let schema = number().transform_async(|v, _| async move {
            Value::from(v.as_f64().unwrap_or_default() * 2.0)
        });
        assert_eq!(schema.safe_parse(2), Err(SchemaError::AsyncInSync));
        assert_eq!(block_on(schema.parse_async(2)).unwrap(), Value::from(4));
    }

    #[test]
    fn test_async_refine_failure() {
        let schema = string().refine_async(|v| async move { v.as_str() == Some("ok") }, "nope");
        let outcome = block_on(schema.safe_parse_async("bad"));
        assert_eq!(outcome.error().unwrap().issues()[0].message, "nope");
    }

    #[test]
    fn test_async_preprocess() {
        let schema = EffectsSchema::preprocess_async(
            |v, _| async move { Value::from(v.to_number()) },
            number(),
        );
        assert_eq!(block_on(schema.parse_async("5")).unwrap(), Value::from(5));
    }
}
