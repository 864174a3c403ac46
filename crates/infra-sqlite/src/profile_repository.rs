// SQLite ProfileRepository Implementation

use crate::error::map_sqlx_error;
use crate::rows::ProfileRow;
use async_trait::async_trait;
use sqlx::SqlitePool;
use taskhub_core::domain::{AccountId, Profile};
use taskhub_core::error::Result;
use taskhub_core::port::ProfileRepository;

pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn find_by_user_id(&self, user_id: &AccountId) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Profile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT * FROM profiles
            ORDER BY created_at ASC, user_id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProfileRow::into_profile).collect())
    }
}
