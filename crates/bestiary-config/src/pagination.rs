//! Listing pagination configuration.

use bestiary_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageLimits};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

const fn max_page_size() -> u32 {
    MAX_PAGE_SIZE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    /// Page size used when a listing request gives none.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a listing request may ask for.
    #[serde(default = "max_page_size")]
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: max_page_size(),
        }
    }
}

impl PaginationConfig {
    /// Bounds handed to the query layer.
    pub const fn limits(&self) -> PageLimits {
        PageLimits {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }

    /// Reject sizes the page math cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size".into(),
                reason: format!(
                    "{} exceeds pagination.max_page_size ({})",
                    self.default_page_size, self.max_page_size
                ),
            });
        }
        Ok(())
    }
}
