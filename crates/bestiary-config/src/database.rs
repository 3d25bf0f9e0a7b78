//! Registry store configuration.

use serde::{Deserialize, Serialize};

/// Default database location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".bestiary/registry.db";

fn default_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// libSQL database file, or `:memory:` for a throwaway store.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the store lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
