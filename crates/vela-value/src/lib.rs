//! Dynamic value model for Vela.
//!
//! Schemas in `vela-schema` validate already-deserialized, untyped values.
//! This crate provides that value type together with the path type used to
//! locate a value inside a larger one.

/// The dynamic value type and its runtime type tags.
pub mod value;

/// Calendar instants stored as epoch milliseconds.
pub mod date;

/// Unique symbol values.
pub mod symbol;

/// Paths from a root value to a nested value.
pub mod path;

/// Conversion to and from `serde_json::Value`.
pub mod json;

mod macros;

pub use date::Date;
pub use json::ValueError;
pub use path::{Path, PathSegment};
pub use symbol::Symbol;
pub use value::{Object, Value, ValueMap, ValueSet, ValueType, format_number};
