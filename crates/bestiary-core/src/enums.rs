//! Operation kinds and entity types for Bestiary.
//!
//! `OpType` serializes in upper case (`ADD`, `UPDATE`, `DELETE`), matching
//! the stored and exposed audit format. `EntityType` uses `snake_case`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// OpType
// ---------------------------------------------------------------------------

/// Kind of mutation recorded by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpType {
    Add,
    Update,
    Delete,
}

impl OpType {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Registry entity kinds mutated through audited operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Ecosystem,
    Project,
}

impl EntityType {
    /// Value stored in `operations.entity_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ecosystem => "ecosystem",
            Self::Project => "project",
        }
    }

    /// Capitalized name used in user-facing error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ecosystem => "Ecosystem",
            Self::Project => "Project",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
