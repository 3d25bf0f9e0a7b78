//! Column codecs shared by the repos.
//!
//! Timestamps, operation args and enum columns are stored as TEXT; these
//! functions define that on-disk form in both directions.

use bestiary_core::entities::OperationArgs;
use bestiary_core::enums::EntityType;
use bestiary_core::errors::CoreError;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DatabaseError;

/// Render a timestamp the way it is stored.
///
/// Fixed-width RFC 3339 in UTC with nanoseconds, so string comparison in SQL
/// orders rows by time.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Read a stored timestamp.
///
/// Rows written by this crate use [`format_datetime`]. Bare
/// `YYYY-MM-DD HH:MM:SS` values, as produced by `CURRENT_TIMESTAMP`, are
/// read as UTC.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for any other text.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("unreadable timestamp '{s}': {e}")))
}

/// Read a nullable timestamp such as `transactions.closed_at`.
///
/// # Errors
///
/// Same as [`parse_datetime`], for present values.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Read an enum column through its serde name, e.g. `op_type = 'UPDATE'`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for an unknown variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("unknown enum value '{s}': {e}")))
}

/// Read an optional text field. NULL and `''` both mean absent.
///
/// # Errors
///
/// Returns `DatabaseError` if the column is not text.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse the JSON object stored in `operations.args`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column is not a JSON object.
pub fn parse_args(s: &str) -> Result<OperationArgs, DatabaseError> {
    serde_json::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Invalid operation args '{s}': {e}")))
}

/// Serialize operation args for storage.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn encode_args(args: &OperationArgs) -> Result<String, DatabaseError> {
    serde_json::to_string(args).map_err(|e| DatabaseError::Other(e.into()))
}

/// Whether a libSQL failure is a UNIQUE constraint violation.
#[must_use]
pub fn is_unique_violation(err: &libsql::Error) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

/// Whether a libSQL failure is a FOREIGN KEY constraint violation.
#[must_use]
pub fn is_foreign_key_violation(err: &libsql::Error) -> bool {
    err.to_string().contains("FOREIGN KEY constraint failed")
}

/// Turn a UNIQUE violation on `eid` into `AlreadyExists`; pass other failures through.
#[must_use]
pub fn map_unique_violation(err: libsql::Error, entity: EntityType, eid: &str) -> DatabaseError {
    if is_unique_violation(&err) {
        CoreError::already_exists(entity, eid).into()
    } else {
        err.into()
    }
}
