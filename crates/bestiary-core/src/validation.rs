//! Field validation for registry inputs.
//!
//! Every check here runs before any storage write, and the first violation
//! aborts the call. `name` is required and must be a single alphanumeric-led
//! token; `title` and `description` are optional free text.
//!
//! Typed callers pass `Option<&str>`. Inputs that arrive as JSON go through
//! [`string_field`] first, which adds the type check a statically typed call
//! gets from the compiler.

use serde_json::Value;

use crate::errors::CoreError;

/// Validate a required `name` field.
///
/// # Errors
///
/// Returns `CoreError::InvalidValue` when the name is missing, empty,
/// whitespace-only, starts with a non-alphanumeric character, or contains
/// whitespace anywhere.
pub fn check_name(value: Option<&str>) -> Result<&str, CoreError> {
    let name = value.ok_or_else(|| CoreError::invalid("'name' cannot be None"))?;
    check_not_blank("name", name)?;

    if !name.chars().next().is_some_and(char::is_alphanumeric) {
        return Err(CoreError::invalid(
            "'name' must start with an alphanumeric character",
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(CoreError::invalid(
            "'name' cannot contain whitespace characters",
        ));
    }
    Ok(name)
}

/// Validate an optional text field on the add path.
///
/// `None` passes through. Empty and whitespace-only strings are rejected.
///
/// # Errors
///
/// Returns `CoreError::InvalidValue` for empty or whitespace-only values.
pub fn check_optional<'a>(field: &str, value: Option<&'a str>) -> Result<Option<&'a str>, CoreError> {
    match value {
        None => Ok(None),
        Some(s) => {
            check_not_blank(field, s)?;
            Ok(Some(s))
        }
    }
}

/// Validate an optional text field on the update path.
///
/// Same as [`check_optional`] except that an empty string clears the field
/// and comes back as `None`.
///
/// # Errors
///
/// Returns `CoreError::InvalidValue` for whitespace-only values.
pub fn check_optional_update<'a>(
    field: &str,
    value: Option<&'a str>,
) -> Result<Option<&'a str>, CoreError> {
    match value {
        Some("") => Ok(None),
        other => check_optional(field, other),
    }
}

/// Read a JSON value as an optional string field.
///
/// `null` maps to `None`.
///
/// # Errors
///
/// Returns `CoreError::InvalidValue` when the value is neither a string nor
/// `null`, e.g. `field 'title' value must be a string; int given`.
pub fn string_field<'a>(field: &str, value: &'a Value) -> Result<Option<&'a str>, CoreError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        other => Err(CoreError::invalid(format!(
            "field '{field}' value must be a string; {} given",
            json_type_name(other)
        ))),
    }
}

/// Read a JSON value as an optional integer id.
///
/// Accepts numbers and numeric strings, since ids often travel as strings
/// through query layers.
///
/// # Errors
///
/// Returns `CoreError::InvalidValue` for any other shape.
pub fn id_field(field: &str, value: &Value) -> Result<Option<i64>, CoreError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| {
            CoreError::invalid(format!("field '{field}' value must be an integer id; {n} given"))
        }),
        Value::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
            CoreError::invalid(format!("field '{field}' value must be an integer id; '{s}' given"))
        }),
        other => Err(CoreError::invalid(format!(
            "field '{field}' value must be an integer id; {} given",
            json_type_name(other)
        ))),
    }
}

/// Type name used in type-mismatch messages.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_f64() {
                "float"
            } else {
                "int"
            }
        }
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn check_not_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::invalid(format!(
            "'{field}' cannot be an empty string"
        )));
    }
    if value.chars().all(char::is_whitespace) {
        return Err(CoreError::invalid(format!(
            "'{field}' cannot be composed by whitespaces only"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn message(err: CoreError) -> String {
        match err {
            CoreError::InvalidValue(msg) => msg,
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[rstest]
    #[case("example")]
    #[case("Example")]
    #[case("Eco-example")]
    #[case("9lives")]
    #[case("ñandú")]
    fn valid_names(#[case] name: &str) {
        assert_eq!(check_name(Some(name)).unwrap(), name);
    }

    #[rstest]
    #[case(None, "'name' cannot be None")]
    #[case(Some(""), "'name' cannot be an empty string")]
    #[case(Some("  "), "'name' cannot be composed by whitespaces only")]
    #[case(Some("\t"), "'name' cannot be composed by whitespaces only")]
    #[case(Some(" \t  "), "'name' cannot be composed by whitespaces only")]
    #[case(Some(" ecosystem"), "'name' must start with an alphanumeric character")]
    #[case(Some("-ecosystem"), "'name' must start with an alphanumeric character")]
    #[case(Some("my ecosystem"), "'name' cannot contain whitespace characters")]
    #[case(Some("my\tecosystem"), "'name' cannot contain whitespace characters")]
    #[case(Some("trailing "), "'name' cannot contain whitespace characters")]
    fn invalid_names(#[case] name: Option<&str>, #[case] expected: &str) {
        assert_eq!(message(check_name(name).unwrap_err()), expected);
    }

    #[rstest]
    #[case("title")]
    #[case("description")]
    fn optional_none_passes(#[case] field: &str) {
        assert_eq!(check_optional(field, None).unwrap(), None);
        assert_eq!(check_optional_update(field, None).unwrap(), None);
    }

    #[test]
    fn optional_allows_inner_whitespace() {
        assert_eq!(
            check_optional("title", Some("Example title")).unwrap(),
            Some("Example title")
        );
    }

    #[rstest]
    #[case("title", "", "'title' cannot be an empty string")]
    #[case("title", "  ", "'title' cannot be composed by whitespaces only")]
    #[case("description", "", "'description' cannot be an empty string")]
    #[case("description", " \t  ", "'description' cannot be composed by whitespaces only")]
    fn optional_rejects_blank_on_add(#[case] field: &str, #[case] value: &str, #[case] expected: &str) {
        assert_eq!(message(check_optional(field, Some(value)).unwrap_err()), expected);
    }

    #[test]
    fn update_converts_empty_to_none() {
        assert_eq!(check_optional_update("title", Some("")).unwrap(), None);
        assert_eq!(check_optional_update("description", Some("")).unwrap(), None);
    }

    #[test]
    fn update_still_rejects_whitespace_only() {
        assert_eq!(
            message(check_optional_update("title", Some("\t")).unwrap_err()),
            "'title' cannot be composed by whitespaces only"
        );
    }

    #[rstest]
    #[case(json!(12345), "field 'name' value must be a string; int given")]
    #[case(json!(1.5), "field 'name' value must be a string; float given")]
    #[case(json!(true), "field 'name' value must be a string; bool given")]
    #[case(json!(["a"]), "field 'name' value must be a string; list given")]
    #[case(json!({"a": 1}), "field 'name' value must be a string; dict given")]
    fn string_field_type_mismatch(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(message(string_field("name", &value).unwrap_err()), expected);
    }

    #[test]
    fn string_field_accepts_null_and_strings() {
        assert_eq!(string_field("title", &Value::Null).unwrap(), None);
        assert_eq!(string_field("title", &json!("x")).unwrap(), Some("x"));
    }

    #[rstest]
    #[case(json!(3), Some(3))]
    #[case(json!("42"), Some(42))]
    #[case(Value::Null, None)]
    fn id_field_accepts(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(id_field("id", &value).unwrap(), expected);
    }

    #[rstest]
    #[case(json!("abc"))]
    #[case(json!(1.5))]
    #[case(json!(false))]
    fn id_field_rejects(#[case] value: Value) {
        assert!(matches!(id_field("id", &value), Err(CoreError::InvalidValue(_))));
    }
}
