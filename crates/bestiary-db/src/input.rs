//! Inputs for the add actions, readable from JSON.
//!
//! Parsing only checks shapes and types. The field rules (`name` format,
//! blank titles) are applied by the registry operation itself.

use bestiary_core::errors::CoreError;
use bestiary_core::validation::{id_field, json_type_name, string_field};
use serde_json::{Map, Value};

/// Fields for a new ecosystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EcosystemInput {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl EcosystemInput {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Read from a JSON object with keys `name`, `title` and `description`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a non-object, an unknown key, a
    /// missing name, or a non-string value.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let fields = expect_object("ecosystem", value)?;
        reject_unknown(fields, &["name", "title", "description"], "an ecosystem")?;

        Ok(Self {
            name: required_name(fields)?,
            title: optional_string(fields, "title")?,
            description: optional_string(fields, "description")?,
        })
    }
}

/// Fields for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInput {
    pub ecosystem_id: i64,
    pub name: String,
    pub title: Option<String>,
    pub parent_id: Option<i64>,
}

impl ProjectInput {
    #[must_use]
    pub fn new(ecosystem_id: i64, name: impl Into<String>) -> Self {
        Self {
            ecosystem_id,
            name: name.into(),
            title: None,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Read from a JSON object with keys `ecosystem`, `name`, `title` and
    /// `parent_project`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a non-object, an unknown key, a
    /// missing name or ecosystem, or a value of the wrong type.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let fields = expect_object("project", value)?;
        reject_unknown(fields, &["ecosystem", "name", "title", "parent_project"], "a project")?;

        let ecosystem_id = id_field("ecosystem", fields.get("ecosystem").unwrap_or(&Value::Null))?
            .ok_or_else(|| CoreError::invalid("'ecosystem' cannot be None"))?;

        Ok(Self {
            ecosystem_id,
            name: required_name(fields)?,
            title: optional_string(fields, "title")?,
            parent_id: id_field(
                "parent_project",
                fields.get("parent_project").unwrap_or(&Value::Null),
            )?,
        })
    }
}

/// Require `value` to be a JSON object.
pub(crate) fn expect_object<'a>(
    what: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, CoreError> {
    value.as_object().ok_or_else(|| {
        CoreError::invalid(format!(
            "{what} input must be an object; {} given",
            json_type_name(value)
        ))
    })
}

fn reject_unknown(
    fields: &Map<String, Value>,
    known: &[&str],
    what: &str,
) -> Result<(), CoreError> {
    match fields.keys().find(|k| !known.contains(&k.as_str())) {
        Some(key) => Err(CoreError::invalid(format!("'{key}' is not {what} field"))),
        None => Ok(()),
    }
}

fn required_name(fields: &Map<String, Value>) -> Result<String, CoreError> {
    string_field("name", fields.get("name").unwrap_or(&Value::Null))?
        .map(String::from)
        .ok_or_else(|| CoreError::invalid("'name' cannot be None"))
}

fn optional_string(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, CoreError> {
    Ok(string_field(key, fields.get(key).unwrap_or(&Value::Null))?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn ecosystem_from_json() {
        let input = EcosystemInput::from_json(&json!({
            "name": "Example",
            "title": "Example title",
        }))
        .unwrap();
        assert_eq!(input, EcosystemInput::new("Example").with_title("Example title"));
    }

    #[rstest]
    #[case(json!({}), "'name' cannot be None")]
    #[case(json!({"name": null}), "'name' cannot be None")]
    #[case(json!({"name": 12345}), "field 'name' value must be a string; int given")]
    #[case(json!({"name": "Example", "title": 12345}), "field 'title' value must be a string; int given")]
    #[case(json!({"name": "Example", "description": 12345}), "field 'description' value must be a string; int given")]
    #[case(json!({"name": "Example", "owner": "x"}), "'owner' is not an ecosystem field")]
    #[case(json!("Example"), "ecosystem input must be an object; str given")]
    fn ecosystem_from_json_errors(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(
            EcosystemInput::from_json(&value).unwrap_err(),
            CoreError::invalid(expected)
        );
    }

    #[test]
    fn empty_name_is_left_to_the_registry() {
        let input = EcosystemInput::from_json(&json!({"name": ""})).unwrap();
        assert_eq!(input.name, "");
    }

    #[test]
    fn project_from_json() {
        let input = ProjectInput::from_json(&json!({
            "ecosystem": "2",
            "name": "example",
            "parent_project": 7,
        }))
        .unwrap();
        assert_eq!(input, ProjectInput::new(2, "example").with_parent(7));
    }

    #[rstest]
    #[case(json!({"name": "example"}), "'ecosystem' cannot be None")]
    #[case(json!({"ecosystem": 1}), "'name' cannot be None")]
    #[case(json!({"ecosystem": 1, "name": "example", "title": 12345}), "field 'title' value must be a string; int given")]
    fn project_from_json_errors(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(
            ProjectInput::from_json(&value).unwrap_err(),
            CoreError::invalid(expected)
        );
    }
}
