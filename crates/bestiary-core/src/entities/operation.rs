use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::OpType;

/// Field values recorded with an operation.
pub type OperationArgs = serde_json::Map<String, serde_json::Value>;

/// One recorded mutation against an entity, owned by a transaction.
///
/// Operations are append-only: they are never updated, and only go away
/// together with their transaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Operation {
    pub id: i64,
    pub ouid: String,
    pub trx_id: i64,
    pub op_type: OpType,
    /// Free-form entity kind, e.g. `ecosystem`.
    pub entity_type: String,
    /// Affected entity, usually its id or name.
    pub target: String,
    pub timestamp: DateTime<Utc>,
    pub args: OperationArgs,
}
