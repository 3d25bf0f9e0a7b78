//! Repository modules implementing registry operations.
//!
//! Each module adds methods to `RegistryService` via `impl RegistryService` blocks.

pub mod ecosystem;
pub mod project;
pub mod transaction;
