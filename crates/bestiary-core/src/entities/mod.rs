//! Entity structs for all Bestiary domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `bestiary-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod ecosystem;
mod operation;
mod project;
mod transaction;

pub use ecosystem::Ecosystem;
pub use operation::{Operation, OperationArgs};
pub use project::Project;
pub use transaction::Transaction;
