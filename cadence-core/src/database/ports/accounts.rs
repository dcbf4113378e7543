use async_trait::async_trait;
use cadence_model::{Account, ProfileUpdate};
use uuid::Uuid;

use crate::error::CoreResult;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// `Conflict` when the email is already registered.
    async fn create(&self, account: &Account) -> CoreResult<()>;

    async fn get_by_email(&self, email: &str) -> CoreResult<Option<Account>>;

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Account>;

    /// Patch profile columns, leaving absent fields untouched. Returns the
    /// updated row, or `NotFound` on zero affected rows.
    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> CoreResult<Account>;
}
