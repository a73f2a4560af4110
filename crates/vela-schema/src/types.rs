//! Node kinds
//!
//! One module per family, mirroring the `SchemaKind` variants:
//! - primitives: `string`, `number`, `bigint`, `primitive`, `enumeration`
//! - composites: `object`, `compound`, `record`, `union`, `intersection`
//! - modifiers: `modifier`, `effects`, `pipeline`

mod bigint;
mod compound;
mod effects;
mod enumeration;
mod intersection;
mod modifier;
mod number;
mod object;
mod pipeline;
mod primitive;
mod record;
mod string;
mod union;

pub use bigint::BigIntSchema;
pub use compound::{ArraySchema, TupleSchema};
pub use effects::{EffectsSchema, MaybeAsync, RefineParams, RefinementCtx};
pub use enumeration::{EnumSchema, NativeEnumSchema};
pub use intersection::IntersectionSchema;
pub use modifier::{
    BrandedSchema, CatchContext, CatchSchema, DefaultSchema, LazySchema, NullableSchema,
    OptionalSchema, ReadonlySchema,
};
pub use number::NumberSchema;
pub use object::{ObjectSchema, UnknownKeys};
pub use pipeline::PipelineSchema;
pub use primitive::{BooleanSchema, DateSchema, LiteralSchema};
pub use record::{MapSchema, RecordSchema, SetSchema};
pub use string::{DatetimeOptions, IpVersion, StringSchema, TimeOptions};
pub use union::{DiscriminatedUnionSchema, UnionSchema};

pub(crate) use effects::{Effect, with_effect};
pub(crate) use primitive::expect_type;
