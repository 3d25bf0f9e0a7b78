//! Update builder types for registry mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. Nullable columns use
//! `Option<Option<T>>`: `Some(None)` clears the column.

pub mod ecosystem;
pub mod project;
