//! Domain error taxonomy for Bestiary.
//!
//! These errors describe why a registry call was refused. Storage failures
//! (`DatabaseError`) are defined in `bestiary-db` and wrap this type.

use std::fmt::Display;

use thiserror::Error;

use crate::enums::EntityType;

/// Errors raised by validation and registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Input failed validation: missing, wrong type, or malformed.
    #[error("{0}")]
    InvalidValue(String),

    /// A unique field collided with an existing row.
    #[error("{entity} '{eid}' already exists in the registry")]
    AlreadyExists { entity: String, eid: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found in the registry")]
    NotFound { entity: String },
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn already_exists(entity: EntityType, eid: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.label().to_string(),
            eid: eid.into(),
        }
    }

    /// `NotFound` for an id lookup, e.g. `Ecosystem ID 2 not found in the registry`.
    pub fn not_found_id(entity: EntityType, id: impl Display) -> Self {
        Self::NotFound {
            entity: format!("{} ID {id}", entity.label()),
        }
    }

    /// `NotFound` for a name lookup, e.g. `Project 'example' not found in the registry`.
    pub fn not_found_name(entity: EntityType, name: &str) -> Self {
        Self::NotFound {
            entity: format!("{} '{name}'", entity.label()),
        }
    }
}
