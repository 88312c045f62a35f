use serde_json::Number;

use crate::auth::PasswordHash;

/// Registered email. Emails are compared exactly as stored, case included, and double as the
/// user's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(pub String);

/// Savings figure, kept as the JSON number the client sent so that `100` stays `100`.
#[derive(Debug, Clone, PartialEq)]
pub struct Savings(pub Number);

impl Default for Savings {
    fn default() -> Self {
        Self(Number::from(0))
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub savings: Savings,
}
