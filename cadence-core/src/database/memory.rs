use async_trait::async_trait;
use cadence_model::{Account, ProfileUpdate, Track};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::ports::{AccountRepository, TrackRepository};
use crate::error::{CoreError, CoreResult};

/// DashMap-backed track table.
#[derive(Debug, Default)]
pub struct InMemoryTrackRepository {
    rows: DashMap<Uuid, Track>,
}

impl InMemoryTrackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl TrackRepository for InMemoryTrackRepository {
    async fn create(&self, track: &Track) -> CoreResult<()> {
        match self.rows.entry(track.id) {
            Entry::Occupied(_) => Err(CoreError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(track.clone());
                Ok(())
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Track> {
        self.rows
            .get(&id)
            .map(|row| row.value().clone())
            .ok_or(CoreError::NotFound)
    }

    async fn get_all(&self) -> CoreResult<Vec<Track>> {
        let mut tracks: Vec<Track> =
            self.rows.iter().map(|row| row.value().clone()).collect();
        tracks.sort_by_key(|track| (track.created_at, track.id));
        Ok(tracks)
    }

    async fn update(&self, track: &Track) -> CoreResult<()> {
        let mut row = self.rows.get_mut(&track.id).ok_or(CoreError::NotFound)?;
        *row = track.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or(CoreError::NotFound)
    }
}

/// DashMap-backed account table with a unique email index.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    by_id: DashMap<Uuid, Account>,
    by_email: DashMap<String, Uuid>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> CoreResult<()> {
        match self.by_email.entry(account.email.clone()) {
            Entry::Occupied(_) => Err(CoreError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(account.id);
                self.by_id.insert(account.id, account.clone());
                Ok(())
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> CoreResult<Option<Account>> {
        let Some(id) = self.by_email.get(email).map(|entry| *entry.value())
        else {
            return Ok(None);
        };
        Ok(self.by_id.get(&id).map(|row| row.value().clone()))
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Account> {
        self.by_id
            .get(&id)
            .map(|row| row.value().clone())
            .ok_or(CoreError::NotFound)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> CoreResult<Account> {
        let mut row = self.by_id.get_mut(&id).ok_or(CoreError::NotFound)?;
        row.apply_profile(update, Utc::now());
        Ok(row.value().clone())
    }
}
