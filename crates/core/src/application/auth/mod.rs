// Authorization Service - accounts, credentials and access tokens

pub mod register;

pub use register::{RegisterRequest, Registration};

use crate::domain::{Account, Principal};
use crate::error::{AppError, Result};
use crate::port::{
    AccessToken, AccountRepository, IdProvider, PasswordHasher, TimeProvider, TokenService,
    UnitOfWork,
};
use std::sync::Arc;
use tracing::{info, warn};

const INVALID_CREDENTIALS: &str = "invalid credentials";

pub struct AuthService {
    uow: Arc<dyn UnitOfWork>,
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    bootstrap_admin: bool,
}

impl AuthService {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            uow,
            accounts,
            hasher,
            tokens,
            id_provider,
            time_provider,
            bootstrap_admin: false,
        }
    }

    /// Grant ADMIN to the first registered account
    pub fn with_bootstrap_admin(mut self, enabled: bool) -> Self {
        self.bootstrap_admin = enabled;
        self
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Registration> {
        register::execute(
            self.uow.as_ref(),
            self.accounts.as_ref(),
            self.hasher.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            self.bootstrap_admin,
            req,
        )
        .await
    }

    /// Exchange credentials for an access token
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        let Some(account) = self.accounts.find_by_username(username).await? else {
            warn!(username = %username, "Login failed: unknown user");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !self.hasher.verify(password, &account.password_hash)? {
            warn!(username = %username, "Login failed: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(&Principal::from(&account))?;
        info!(account_id = %account.id, "Login succeeded");
        Ok(token)
    }

    /// Resolve a bearer token to the caller it was issued for.
    ///
    /// Roles are re-read from the store so revoked or deleted accounts stop
    /// working before their token expires.
    pub async fn authenticate(&self, token: &str) -> Result<Principal> {
        let claimed = self.tokens.verify(token)?;
        let account = self
            .accounts
            .find_by_id(&claimed.account_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;
        Ok(Principal::from(&account))
    }

    pub async fn whoami(&self, principal: &Principal) -> Result<Account> {
        self.accounts
            .find_by_id(&principal.account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account", &principal.account_id))
    }
}
