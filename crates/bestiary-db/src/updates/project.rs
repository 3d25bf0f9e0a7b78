//! Project update builder.

use bestiary_core::errors::CoreError;
use bestiary_core::validation::{id_field, string_field};
use serde_json::Value;

use crate::input::expect_object;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub title: Option<Option<String>>,
    /// `Some(None)` detaches the project from its parent.
    pub parent_id: Option<Option<i64>>,
}

impl ProjectUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.title.is_none() && self.parent_id.is_none()
    }

    /// Read an update from a JSON object with keys `name`, `title` and
    /// `parent_project`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a non-object, an unknown key, a
    /// `null` name, or a value of the wrong type.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let fields = expect_object("project update", value)?;
        let mut update = Self::default();

        for (key, field) in fields {
            match key.as_str() {
                "name" => {
                    let name = string_field("name", field)?
                        .ok_or_else(|| CoreError::invalid("'name' cannot be None"))?;
                    update.name = Some(name.to_string());
                }
                "title" => update.title = Some(string_field("title", field)?.map(String::from)),
                "parent_project" => update.parent_id = Some(id_field("parent_project", field)?),
                other => {
                    return Err(CoreError::invalid(format!("'{other}' is not a project field")));
                }
            }
        }
        Ok(update)
    }
}

pub struct ProjectUpdateBuilder(ProjectUpdate);

impl ProjectUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ProjectUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: Option<String>) -> Self {
        self.0.title = Some(title);
        self
    }

    #[must_use]
    pub const fn parent_id(mut self, parent_id: Option<i64>) -> Self {
        self.0.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn build(self) -> ProjectUpdate {
        self.0
    }
}

impl Default for ProjectUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
