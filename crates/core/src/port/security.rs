// Security Ports (credential hashing & access tokens)

use crate::domain::Principal;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One-way password hashing
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// Constant-time comparison against a stored hash
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool>;
}

/// Bearer token handed to clients after login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub token_type: String,
    pub expires_at: i64, // epoch seconds
}

/// Issues and verifies access tokens
pub trait TokenService: Send + Sync {
    fn issue(&self, principal: &Principal) -> Result<AccessToken>;

    /// Invalid, expired or tampered tokens yield `AppError::Unauthorized`
    fn verify(&self, token: &str) -> Result<Principal>;
}
