//! Identity values.
//!
//! Identities live in the external user store; this crate only defines the
//! value shape read by the gate and the access policy. The admin flag is
//! mutated exclusively through the store's set-admin operation.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A registered identity.
///
/// `password_hash` is a PHC-format string and is never serialized out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    /// Unix milliseconds.
    pub created_at: i64,
}

/// Input for registering a new identity. The password is still plaintext
/// here; it is hashed before it ever reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewIdentity {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let identity = Identity {
            id: UserId::new(1),
            email: "a@example.com".into(),
            display_name: "a".into(),
            password_hash: "$argon2id$secret".into(),
            is_admin: false,
            created_at: 0,
        };
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
