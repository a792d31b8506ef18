//! Query construction and hydration.

pub mod builder;
pub mod hydrate;

pub use builder::QueryBuilder;
