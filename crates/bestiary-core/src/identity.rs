use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Authenticated caller, as resolved by the facade in front of the registry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CallerIdentity {
    pub username: String,
}

/// Caller context handed to every audited action.
///
/// `user == None` marks anonymous or system actions; their transactions are
/// authored by the empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BestiaryContext {
    pub user: Option<CallerIdentity>,
}

impl BestiaryContext {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            user: Some(CallerIdentity {
                username: username.into(),
            }),
        }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// Value recorded in `transactions.authored_by`.
    #[must_use]
    pub fn authored_by(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.username.as_str())
    }
}
