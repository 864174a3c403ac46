// Profile Domain Model

use super::account::AccountId;
use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

const DISPLAY_NAME_MAX_LEN: usize = 64;
const BIO_MAX_LEN: usize = 512;

/// Public profile of an account (profile service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: AccountId,
    pub display_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.email.is_none() && self.bio.is_none()
    }
}

impl Profile {
    pub fn new(
        user_id: impl Into<String>,
        created_at: i64,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self> {
        let profile = Self {
            user_id: user_id.into(),
            display_name: display_name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            bio: None,
            created_at,
            updated_at: created_at,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Apply a patch, validating the result before committing it
    pub fn apply(&mut self, patch: ProfilePatch, now_millis: i64) -> Result<()> {
        let mut next = self.clone();
        if let Some(name) = patch.display_name {
            next.display_name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            next.email = email.trim().to_string();
        }
        if let Some(bio) = patch.bio {
            // Empty bio clears the field
            next.bio = if bio.trim().is_empty() { None } else { Some(bio) };
        }
        next.validate()?;
        next.updated_at = now_millis;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let name_len = self.display_name.chars().count();
        if name_len == 0 || name_len > DISPLAY_NAME_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Display name must be 1-{} characters",
                DISPLAY_NAME_MAX_LEN
            )));
        }
        validate_email(&self.email)?;
        if let Some(bio) = &self.bio {
            if bio.chars().count() > BIO_MAX_LEN {
                return Err(DomainError::Validation(format!(
                    "Bio too long (max {} characters)",
                    BIO_MAX_LEN
                )));
            }
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<()> {
    let mut parts = email.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("Invalid email: {}", email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new("u-1", 1000, "Alice", "alice@example.com").unwrap()
    }

    #[test]
    fn test_new_trims_and_validates() {
        let p = Profile::new("u-1", 5, "  Bob ", " bob@example.com ").unwrap();
        assert_eq!(p.display_name, "Bob");
        assert_eq!(p.email, "bob@example.com");
        assert_eq!(p.created_at, p.updated_at);

        assert!(Profile::new("u-1", 5, "", "bob@example.com").is_err());
        assert!(Profile::new("u-1", 5, "Bob", "bob.example.com").is_err());
        assert!(Profile::new("u-1", 5, "Bob", "a@b@c").is_err());
        assert!(Profile::new("u-1", 5, "Bob", "@example.com").is_err());
    }

    #[test]
    fn test_apply_patch_updates_timestamp() {
        let mut p = profile();
        p.apply(
            ProfilePatch {
                display_name: Some("Alice L.".into()),
                bio: Some("Rustacean".into()),
                ..Default::default()
            },
            2000,
        )
        .unwrap();

        assert_eq!(p.display_name, "Alice L.");
        assert_eq!(p.bio.as_deref(), Some("Rustacean"));
        assert_eq!(p.email, "alice@example.com");
        assert_eq!(p.updated_at, 2000);
    }

    #[test]
    fn test_invalid_patch_leaves_profile_untouched() {
        let mut p = profile();
        let err = p.apply(
            ProfilePatch {
                display_name: Some("New".into()),
                email: Some("broken".into()),
                ..Default::default()
            },
            2000,
        );
        assert!(err.is_err());
        assert_eq!(p, profile());
    }

    #[test]
    fn test_empty_bio_clears() {
        let mut p = profile();
        p.bio = Some("old".into());
        p.apply(
            ProfilePatch {
                bio: Some("  ".into()),
                ..Default::default()
            },
            3000,
        )
        .unwrap();
        assert!(p.bio.is_none());
    }

    #[test]
    fn test_bio_length_limit() {
        let mut p = profile();
        let result = p.apply(
            ProfilePatch {
                bio: Some("x".repeat(BIO_MAX_LEN + 1)),
                ..Default::default()
            },
            3000,
        );
        assert!(result.is_err());
    }
}
