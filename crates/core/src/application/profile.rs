// Profile Service

use crate::application::events;
use crate::domain::{AccountId, DomainEvent, Principal, Profile, ProfilePatch};
use crate::error::{AppError, Result};
use crate::port::repository::MAX_PAGE_SIZE;
use crate::port::{IdProvider, ProfileRepository, TimeProvider, UnitOfWork};
use std::sync::Arc;
use tracing::info;

pub struct ProfileService {
    uow: Arc<dyn UnitOfWork>,
    profiles: Arc<dyn ProfileRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ProfileService {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        profiles: Arc<dyn ProfileRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            uow,
            profiles,
            id_provider,
            time_provider,
        }
    }

    /// Profiles are readable by any authenticated caller
    pub async fn get(&self, _principal: &Principal, user_id: &AccountId) -> Result<Profile> {
        self.load(user_id).await
    }

    pub async fn update(
        &self,
        principal: &Principal,
        user_id: &AccountId,
        patch: ProfilePatch,
    ) -> Result<Profile> {
        if !principal.can_access(user_id) {
            return Err(AppError::Forbidden(format!(
                "{} may not edit profile {}",
                principal.username, user_id
            )));
        }
        if patch.is_empty() {
            return Err(AppError::Validation("Profile patch is empty".to_string()));
        }

        let mut tx = self.uow.begin().await?;
        let mut profile = tx
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", user_id))?;
        let now = self.time_provider.now_millis();
        profile.apply(patch, now)?;

        tx.update_profile(&profile).await?;
        events::stage(
            tx.as_mut(),
            self.id_provider.as_ref(),
            now,
            DomainEvent::ProfileUpdated {
                profile: profile.clone(),
            },
        )
        .await?;
        tx.commit().await?;

        info!(user_id = %user_id, "Profile updated");
        Ok(profile)
    }

    pub async fn delete(&self, principal: &Principal, user_id: &AccountId) -> Result<()> {
        if !principal.is_admin() {
            return Err(AppError::Forbidden(
                "Only administrators may delete profiles".to_string(),
            ));
        }

        let now = self.time_provider.now_millis();
        let mut tx = self.uow.begin().await?;
        if !tx.delete_profile(user_id).await? {
            return Err(AppError::not_found("Profile", user_id));
        }
        events::stage(
            tx.as_mut(),
            self.id_provider.as_ref(),
            now,
            DomainEvent::ProfileDeleted {
                user_id: user_id.clone(),
                at: now,
            },
        )
        .await?;
        tx.commit().await?;

        info!(user_id = %user_id, deleted_by = %principal.account_id, "Profile deleted");
        Ok(())
    }

    pub async fn list(&self, principal: &Principal, limit: i64, offset: i64) -> Result<Vec<Profile>> {
        if !principal.is_admin() {
            return Err(AppError::Forbidden(
                "Only administrators may list profiles".to_string(),
            ));
        }
        self.profiles
            .find_all(limit.clamp(1, MAX_PAGE_SIZE), offset.max(0))
            .await
    }

    async fn load(&self, user_id: &AccountId) -> Result<Profile> {
        self.profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", user_id))
    }
}
