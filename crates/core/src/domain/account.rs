// Account Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Account ID (UUID v4)
pub type AccountId = String;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(DomainError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Registered identity (authorization service)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: i64,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<Role>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            roles,
            created_at,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Authenticated caller, as established from an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: AccountId,
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        // Admin implies every other role
        self.roles.contains(&role) || self.roles.contains(&Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Owner of the resource, or an administrator
    pub fn can_access(&self, owner_id: &str) -> bool {
        self.account_id == owner_id || self.is_admin()
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id.clone(),
            username: account.username.clone(),
            roles: account.roles.clone(),
        }
    }
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(DomainError::Validation(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(DomainError::Validation(
            "Username may only contain alphanumeric characters, '_', '.' or '-'".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}
