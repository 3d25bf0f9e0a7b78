use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named unit belonging to one ecosystem, optionally nested under a
/// parent project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    /// Unique across the whole registry, not only within the ecosystem.
    pub name: String,
    pub title: Option<String>,
    pub ecosystem_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}
