use async_trait::async_trait;
use cadence_model::{Account, ProfileUpdate};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::AccountRepository;
use crate::error::{CoreError, CoreResult};

#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresAccountRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAccountRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: &Account) -> CoreResult<()> {
        // Unique violations on accounts_email_key surface as Conflict.
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, email, password_hash, display_name, bio,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.display_name)
        .bind(&account.bio)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> CoreResult<Option<Account>> {
        Ok(sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, display_name, bio,
                   created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, display_name, bio,
                   created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> CoreResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                updated_at = $4
            WHERE id = $1
            RETURNING id, email, password_hash, display_name, bio,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.display_name)
        .bind(&update.bio)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound)
    }
}
