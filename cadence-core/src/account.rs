use std::sync::Arc;
use std::time::Duration;

use cadence_model::{Account, ProfileUpdate};
use tracing::info;
use uuid::Uuid;

use crate::database::ports::AccountRepository;
use crate::deadline::within;
use crate::error::CoreResult;

/// Read and patch the caller's own profile.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    budget: Duration,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountRepository>, budget: Duration) -> Self {
        Self { accounts, budget }
    }

    pub async fn profile(&self, account_id: Uuid) -> CoreResult<Account> {
        within(self.budget, self.accounts.get_by_id(account_id)).await
    }

    pub async fn update_profile(
        &self,
        account_id: Uuid,
        update: ProfileUpdate,
    ) -> CoreResult<Account> {
        if update.is_empty() {
            return self.profile(account_id).await;
        }

        let account = within(
            self.budget,
            self.accounts.update_profile(account_id, &update),
        )
        .await?;
        info!(account_id = %account_id, "updated profile");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryAccountRepository;
    use crate::error::CoreError;
    use chrono::Utc;

    #[tokio::test]
    async fn update_profile_patches_only_present_fields() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let account = Account::new("a@b.io".into(), "hash".into(), Utc::now());
        repo.create(&account).await.unwrap();
        let service = AccountService::new(repo, Duration::from_secs(1));

        service
            .update_profile(
                account.id,
                ProfileUpdate {
                    display_name: Some("DJ".into()),
                    bio: Some("spins records".into()),
                },
            )
            .await
            .unwrap();

        let updated = service
            .update_profile(
                account.id,
                ProfileUpdate {
                    bio: Some("retired".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("DJ"));
        assert_eq!(updated.bio.as_deref(), Some("retired"));
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let service = AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            Duration::from_secs(1),
        );
        assert!(matches!(
            service.profile(Uuid::now_v7()).await,
            Err(CoreError::NotFound)
        ));
        assert!(matches!(
            service
                .update_profile(
                    Uuid::now_v7(),
                    ProfileUpdate {
                        bio: Some("x".into()),
                        ..Default::default()
                    }
                )
                .await,
            Err(CoreError::NotFound)
        ));
    }
}
