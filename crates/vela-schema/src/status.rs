//! Parse outcomes and the rules for combining them
//!
//! Every node produces a [`ParseReturn`]: either a finished [`ParseResult`]
//! or a future resolving to one. Composite nodes collect their children with
//! [`gather`], which stays synchronous unless some child deferred.

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use vela_value::{Object, Value};

/// Outcome severity, ordered `Valid < Dirty < Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Status {
    #[default]
    Valid,
    /// Issues were reported but a value is still available.
    Dirty,
    /// No usable value.
    Aborted,
}

impl Status {
    /// Moves `Valid` to `Dirty`. Never lifts `Aborted`.
    pub fn dirty(&mut self) {
        if *self == Status::Valid {
            *self = Status::Dirty;
        }
    }

    pub fn abort(&mut self) {
        *self = Status::Aborted;
    }

    /// Lowers `self` to at least `other`.
    pub fn absorb(&mut self, other: Status) {
        if other > *self {
            *self = other;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Valid(Value),
    Dirty(Value),
    Aborted,
}

impl ParseResult {
    /// Pairs `value` with `status`. An aborted status discards the value.
    pub fn with_status(status: Status, value: Value) -> Self {
        match status {
            Status::Valid => ParseResult::Valid(value),
            Status::Dirty => ParseResult::Dirty(value),
            Status::Aborted => ParseResult::Aborted,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            ParseResult::Valid(_) => Status::Valid,
            ParseResult::Dirty(_) => Status::Dirty,
            ParseResult::Aborted => Status::Aborted,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ParseResult::Valid(_))
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, ParseResult::Dirty(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ParseResult::Aborted)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ParseResult::Valid(value) | ParseResult::Dirty(value) => Some(value),
            ParseResult::Aborted => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            ParseResult::Valid(value) | ParseResult::Dirty(value) => Some(value),
            ParseResult::Aborted => None,
        }
    }

    /// Marks a valid result dirty.
    pub fn dirtied(self) -> Self {
        match self {
            ParseResult::Valid(value) => ParseResult::Dirty(value),
            other => other,
        }
    }
}

pub type ParseFuture = BoxFuture<'static, ParseResult>;

/// A finished result, or deferred work producing one.
pub enum ParseReturn {
    Ready(ParseResult),
    Pending(ParseFuture),
}

impl ParseReturn {
    pub fn valid(value: Value) -> Self {
        ParseReturn::Ready(ParseResult::Valid(value))
    }

    pub fn aborted() -> Self {
        ParseReturn::Ready(ParseResult::Aborted)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ParseReturn::Ready(_))
    }

    /// Continues with `next` once the result is available, staying
    /// synchronous when it already is.
    pub fn and_then<F>(self, next: F) -> ParseReturn
    where
        F: FnOnce(ParseResult) -> ParseReturn + Send + 'static,
    {
        match self {
            ParseReturn::Ready(result) => next(result),
            ParseReturn::Pending(future) => {
                ParseReturn::Pending(async move { next(future.await).resolve().await }.boxed())
            }
        }
    }

    pub fn map<F>(self, f: F) -> ParseReturn
    where
        F: FnOnce(ParseResult) -> ParseResult + Send + 'static,
    {
        self.and_then(move |result| ParseReturn::Ready(f(result)))
    }

    /// Awaits the result.
    pub async fn resolve(self) -> ParseResult {
        match self {
            ParseReturn::Ready(result) => result,
            ParseReturn::Pending(future) => future.await,
        }
    }

    pub fn into_future(self) -> ParseFuture {
        match self {
            ParseReturn::Ready(result) => futures::future::ready(result).boxed(),
            ParseReturn::Pending(future) => future,
        }
    }
}

impl From<ParseResult> for ParseReturn {
    fn from(result: ParseResult) -> Self {
        ParseReturn::Ready(result)
    }
}

impl core::fmt::Debug for ParseReturn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseReturn::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            ParseReturn::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Collects child returns in order and hands them to `merge`.
///
/// When every child finished synchronously `merge` runs immediately.
/// Otherwise all children are awaited together and `merge` receives the
/// results in their original order.
pub fn gather<F>(children: Vec<ParseReturn>, merge: F) -> ParseReturn
where
    F: FnOnce(Vec<ParseResult>) -> ParseResult + Send + 'static,
{
    if children.iter().all(ParseReturn::is_ready) {
        let results = children
            .into_iter()
            .filter_map(|child| match child {
                ParseReturn::Ready(result) => Some(result),
                ParseReturn::Pending(_) => None,
            })
            .collect();
        return ParseReturn::Ready(merge(results));
    }
    let futures: Vec<ParseFuture> = children.into_iter().map(ParseReturn::into_future).collect();
    ParseReturn::Pending(async move { merge(join_all(futures).await) }.boxed())
}

/// Merges element results into an array. Any aborted element aborts the
/// array; any dirty element dirties it.
pub fn merge_array(mut status: Status, results: Vec<ParseResult>) -> ParseResult {
    let mut items = Vec::with_capacity(results.len());
    for result in results {
        match result {
            ParseResult::Aborted => return ParseResult::Aborted,
            ParseResult::Dirty(value) => {
                status.dirty();
                items.push(value);
            }
            ParseResult::Valid(value) => items.push(value),
        }
    }
    ParseResult::with_status(status, Value::Array(items))
}

/// Whether a parsed field ends up in the output object.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// The key was absent from the input and its schema produced `undefined`.
    Omitted,
    Present(Value),
}

impl Slot {
    pub fn new(value: Value, always_set: bool) -> Self {
        if value.is_undefined() && !always_set {
            Slot::Omitted
        } else {
            Slot::Present(value)
        }
    }
}

/// One parsed key/value pair awaiting [`merge_object`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub key: ParseResult,
    pub value: ParseResult,
    /// The key was present in the input.
    pub always_set: bool,
}

/// Merges field results into an object. A failed key or value aborts the
/// object; any dirty key or value dirties it.
pub fn merge_object(mut status: Status, fields: Vec<ObjectField>) -> ParseResult {
    let mut object = Object::with_capacity(fields.len());
    for field in fields {
        let (key, value) = match (field.key, field.value) {
            (ParseResult::Aborted, _) | (_, ParseResult::Aborted) => return ParseResult::Aborted,
            (key, value) => {
                status.absorb(key.status());
                status.absorb(value.status());
                (key, value)
            }
        };
        let key = match key.into_value() {
            Some(Value::String(key)) => key,
            Some(other) => other.to_js_string(),
            None => return ParseResult::Aborted,
        };
        let Some(value) = value.into_value() else {
            return ParseResult::Aborted;
        };
        if let Slot::Present(value) = Slot::new(value, field.always_set) {
            object.insert(key, value);
        }
    }
    ParseResult::with_status(status, Value::Object(object))
}
