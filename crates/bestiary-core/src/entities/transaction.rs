use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An audit-log session grouping the operations of one named action.
///
/// `is_closed == false` always comes with `closed_at == None`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Transaction {
    pub id: i64,
    /// Time-ordered token generated on open.
    pub tuid: String,
    /// Action being audited, e.g. `add_ecosystem`.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_closed: bool,
    /// Username of the caller; empty for anonymous or system actions.
    pub authored_by: String,
}
