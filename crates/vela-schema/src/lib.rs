//! Composable runtime schemas for dynamic values.
//!
//! A schema is built from constructor functions and derivation helpers, then
//! checks a [`Value`] and either returns the validated (possibly transformed)
//! output or every issue found, each with the path to the offending value.
//!
//! ```
//! use vela_schema::prelude::*;
//! use vela_value::value;
//!
//! let user = object([
//!     ("name", string().min(1).schema()),
//!     ("age", number().int().nonnegative().optional()),
//! ]);
//!
//! assert!(user.parse(value!({"name": "Ada"})).is_ok());
//!
//! let outcome = user.safe_parse(value!({"name": "", "age": 1.5})).unwrap();
//! let issues = outcome.error().unwrap().issues();
//! assert_eq!(issues[0].path.to_string(), "name");
//! assert_eq!(issues[1].message, "Expected integer, received float");
//! ```

mod context;
mod error_map;
mod locale;
mod schema;
mod status;
mod types;

/// Issue kinds and the three stages of an issue.
pub mod issue;

/// Usage errors and the validation error aggregate.
pub mod error;

pub use context::ParseParams;
pub use error::{ErrorTree, FlattenedError, ParseError, SchemaError, ValidationError};
pub use error_map::{ErrorMap, ErrorParams, error_map, reset_error_map, set_error_map};
pub use issue::{Issue, IssueCode, IssueData, IssueKind, RawIssue};
pub use locale::default_message;
pub use schema::{SafeParse, Schema, SchemaExt, SchemaKind};
pub use types::*;

use vela_value::Value;

pub fn string() -> StringSchema {
    StringSchema::new()
}

pub fn number() -> NumberSchema {
    NumberSchema::new()
}

pub fn bigint() -> BigIntSchema {
    BigIntSchema::new()
}

pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

pub fn date() -> DateSchema {
    DateSchema::new()
}

pub fn literal(value: impl Into<Value>) -> LiteralSchema {
    LiteralSchema::new(value)
}

/// One of a fixed list of strings. Duplicates are dropped.
pub fn enumeration<S: Into<String>>(options: impl IntoIterator<Item = S>) -> EnumSchema {
    EnumSchema::new(options)
}

/// One of the values of a name-to-value table.
pub fn native_enum<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> NativeEnumSchema
where
    K: Into<String>,
    V: Into<Value>,
{
    NativeEnumSchema::new(entries)
}

pub fn symbol() -> Schema {
    Schema::new(SchemaKind::Symbol)
}

pub fn undefined() -> Schema {
    Schema::new(SchemaKind::Undefined)
}

pub fn null() -> Schema {
    Schema::new(SchemaKind::Null)
}

/// Accepts only `undefined`.
pub fn void() -> Schema {
    Schema::new(SchemaKind::Void)
}

/// Accepts nothing.
pub fn never() -> Schema {
    Schema::new(SchemaKind::Never)
}

pub fn any() -> Schema {
    Schema::new(SchemaKind::Any)
}

pub fn unknown() -> Schema {
    Schema::new(SchemaKind::Unknown)
}

/// Accepts only a NaN number.
pub fn nan() -> Schema {
    Schema::new(SchemaKind::NaN)
}

pub fn object<K, S>(shape: impl IntoIterator<Item = (K, S)>) -> ObjectSchema
where
    K: Into<String>,
    S: Into<Schema>,
{
    ObjectSchema::new(shape)
}

pub fn array(element: impl Into<Schema>) -> ArraySchema {
    ArraySchema::new(element)
}

pub fn tuple<S: Into<Schema>>(items: impl IntoIterator<Item = S>) -> TupleSchema {
    TupleSchema::new(items)
}

pub fn record(key: impl Into<Schema>, value: impl Into<Schema>) -> RecordSchema {
    RecordSchema::new(key, value)
}

/// A record with unconstrained string keys.
pub fn record_of(value: impl Into<Schema>) -> RecordSchema {
    RecordSchema::new(string(), value)
}

pub fn map(key: impl Into<Schema>, value: impl Into<Schema>) -> MapSchema {
    MapSchema::new(key, value)
}

pub fn set(element: impl Into<Schema>) -> SetSchema {
    SetSchema::new(element)
}

/// Tries each option in order.
pub fn union<S: Into<Schema>>(options: impl IntoIterator<Item = S>) -> UnionSchema {
    UnionSchema::new(options)
}

/// Object union dispatched on the `discriminator` property.
pub fn discriminated_union(
    discriminator: impl Into<String>,
    options: impl IntoIterator<Item = ObjectSchema>,
) -> Result<DiscriminatedUnionSchema, SchemaError> {
    DiscriminatedUnionSchema::new(discriminator, options)
}

pub fn intersection(left: impl Into<Schema>, right: impl Into<Schema>) -> IntersectionSchema {
    IntersectionSchema::new(left, right)
}

/// Builds the schema on every parse, for self-referencing types.
pub fn lazy(getter: impl Fn() -> Schema + Send + Sync + 'static) -> LazySchema {
    LazySchema::new(getter)
}

/// Runs `f` on the raw input before `schema` parses it.
pub fn preprocess(
    f: impl Fn(Value, &RefinementCtx) -> Value + Send + Sync + 'static,
    schema: impl Into<Schema>,
) -> EffectsSchema {
    EffectsSchema::preprocess(f, schema)
}

/// Primitive schemas that convert their input before checking it.
pub mod coerce {
    use crate::types::{BigIntSchema, BooleanSchema, DateSchema, NumberSchema, StringSchema};

    /// Converts with the string form of the input.
    pub fn string() -> StringSchema {
        StringSchema::coerced()
    }

    /// Converts numerically; unconvertible input becomes NaN and is rejected.
    pub fn number() -> NumberSchema {
        NumberSchema::coerced()
    }

    pub fn bigint() -> BigIntSchema {
        BigIntSchema::coerced()
    }

    /// Converts by truthiness.
    pub fn boolean() -> BooleanSchema {
        BooleanSchema::coerced()
    }

    pub fn date() -> DateSchema {
        DateSchema::coerced()
    }
}

/// Constructors and traits for building schemas.
pub mod prelude {
    pub use crate::{
        ErrorParams, ParseParams, SafeParse, Schema, SchemaExt, any, array, bigint, boolean,
        coerce, date, discriminated_union, enumeration, intersection, lazy, literal, map,
        native_enum, never, nan, null, number, object, preprocess, record, record_of, set,
        string, symbol, tuple, undefined, union, unknown, void,
    };
}
