// SQLite AccountRepository Implementation

use crate::error::map_sqlx_error;
use crate::rows::AccountRow;
use async_trait::async_trait;
use sqlx::SqlitePool;
use taskhub_core::domain::{Account, AccountId};
use taskhub_core::error::Result;
use taskhub_core::port::AccountRepository;

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
