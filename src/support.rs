//! Shared request plumbing: query parameter extraction and route parameter schemas.

pub mod params;
pub mod schema;

pub use params::QueryParams;
pub use schema::{ParamDef, ParamType, SchemaBuilder};
