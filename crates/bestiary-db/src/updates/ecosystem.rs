//! Ecosystem update builder.

use bestiary_core::errors::CoreError;
use bestiary_core::validation::string_field;
use serde_json::Value;

use crate::input::expect_object;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EcosystemUpdate {
    pub name: Option<String>,
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl EcosystemUpdate {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.title.is_none() && self.description.is_none()
    }

    /// Read an update from a JSON object.
    ///
    /// Absent keys are left untouched; `null` clears `title` or `description`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a non-object, an unknown key, a
    /// `null` name, or a non-string value.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let fields = expect_object("ecosystem update", value)?;
        let mut update = Self::default();

        for (key, field) in fields {
            match key.as_str() {
                "name" => {
                    let name = string_field("name", field)?
                        .ok_or_else(|| CoreError::invalid("'name' cannot be None"))?;
                    update.name = Some(name.to_string());
                }
                "title" => update.title = Some(string_field("title", field)?.map(String::from)),
                "description" => {
                    update.description = Some(string_field("description", field)?.map(String::from));
                }
                other => {
                    return Err(CoreError::invalid(format!(
                        "'{other}' is not an ecosystem field"
                    )));
                }
            }
        }
        Ok(update)
    }
}

pub struct EcosystemUpdateBuilder(EcosystemUpdate);

impl EcosystemUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(EcosystemUpdate::default())
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
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn build(self) -> EcosystemUpdate {
        self.0
    }
}

impl Default for EcosystemUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn builder_sets_only_given_fields() {
        let update = EcosystemUpdateBuilder::new().title(None).build();
        assert_eq!(update.name, None);
        assert_eq!(update.title, Some(None));
        assert_eq!(update.description, None);
        assert!(!update.is_empty());
        assert!(EcosystemUpdateBuilder::new().build().is_empty());
    }

    #[test]
    fn from_json_distinguishes_absent_and_null() {
        let update =
            EcosystemUpdate::from_json(&json!({"name": "Example-updated", "title": null}))
                .unwrap();
        assert_eq!(
            update,
            EcosystemUpdate {
                name: Some("Example-updated".into()),
                title: Some(None),
                description: None,
            }
        );
    }

    #[test]
    fn from_json_rejects_bad_input() {
        assert_eq!(
            EcosystemUpdate::from_json(&json!({"name": null})).unwrap_err(),
            CoreError::invalid("'name' cannot be None")
        );
        assert_eq!(
            EcosystemUpdate::from_json(&json!({"title": 12345})).unwrap_err(),
            CoreError::invalid("field 'title' value must be a string; int given")
        );
        assert!(EcosystemUpdate::from_json(&json!({"colour": "red"})).is_err());
        assert!(EcosystemUpdate::from_json(&json!(["name"])).is_err());
    }

    #[test]
    fn description_alone_is_not_empty() {
        let update = EcosystemUpdateBuilder::new()
            .description(Some("Example desc.".into()))
            .build();
        assert!(!update.is_empty());
        assert_eq!(update.name, None);
        assert_eq!(update.title, None);
    }
}
