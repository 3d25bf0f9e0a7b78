//! Unique token generation for transactions and operations.
//!
//! Tokens are UUID v7 values rendered as 32 lowercase hex characters. The
//! leading 48 bits are a millisecond timestamp, so tokens sort by creation
//! time.

use uuid::Uuid;

/// Length of a generated token.
pub const TOKEN_LEN: usize = 32;

/// New transaction token (`tuid`).
#[must_use]
pub fn new_tuid() -> String {
    Uuid::now_v7().simple().to_string()
}

/// New operation token (`ouid`).
#[must_use]
pub fn new_ouid() -> String {
    Uuid::now_v7().simple().to_string()
}
