// Register Use Case

use crate::application::events;
use crate::domain::account::{validate_password, validate_username};
use crate::domain::{Account, DomainEvent, Profile, Role};
use crate::error::{AppError, Result};
use crate::port::{AccountRepository, IdProvider, PasswordHasher, TimeProvider, UnitOfWork};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Register request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub account: Account,
    pub profile: Profile,
}

/// Validate a register request before any I/O
pub fn validate_request(req: &RegisterRequest) -> Result<()> {
    validate_username(&req.username).map_err(AppError::Domain)?;
    validate_password(&req.password).map_err(AppError::Domain)?;
    Ok(())
}

/// Execute register use case (account + profile + events in one transaction)
///
/// # Arguments
///
/// * `bootstrap_admin` - grant `ADMIN` to the very first account
pub async fn execute(
    uow: &dyn UnitOfWork,
    accounts: &dyn AccountRepository,
    hasher: &dyn PasswordHasher,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    bootstrap_admin: bool,
    req: RegisterRequest,
) -> Result<Registration> {
    validate_request(&req)?;

    // Fast path; the unique index still guards concurrent registrations
    if accounts.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Username {} is already taken",
            req.username
        )));
    }

    let account_id = id_provider.generate_id();
    let now = time_provider.now_millis();
    let profile = Profile::new(account_id.clone(), now, req.display_name, req.email)?;
    let password_hash = hasher.hash(&req.password)?;

    let mut tx = uow.begin().await?;

    let mut roles = vec![Role::User];
    if bootstrap_admin && tx.count_accounts().await? == 0 {
        roles.push(Role::Admin);
    }
    let account = Account::new(account_id, now, req.username, password_hash, roles);

    tx.insert_account(&account).await?;
    tx.insert_profile(&profile).await?;

    events::stage(
        tx.as_mut(),
        id_provider,
        now,
        DomainEvent::AccountRegistered {
            account_id: account.id.clone(),
            username: account.username.clone(),
            roles: account.roles.clone(),
            at: now,
        },
    )
    .await?;
    events::stage(
        tx.as_mut(),
        id_provider,
        now,
        DomainEvent::ProfileCreated {
            profile: profile.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        account_id = %account.id,
        username = %account.username,
        admin = account.has_role(Role::Admin),
        "Account registered"
    );

    Ok(Registration { account, profile })
}
