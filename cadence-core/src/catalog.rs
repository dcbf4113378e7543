//! Write-path coordination between the track table and the blob store.
//!
//! The two backends fail independently and nothing here compensates:
//!
//! * `create` uploads every present slot (audio, video, image, in that order)
//!   before inserting the row. A failed upload aborts; blobs uploaded earlier
//!   in the same call are left behind, as are all of them if the insert fails.
//! * `update` uploads replacement blobs and overwrites their locators. The
//!   blobs they replace are not deleted.
//! * `delete` removes blobs best-effort, logging failures, then the row.
//!
//! Every operation runs under one request budget.

use std::sync::Arc;
use std::time::Duration;

use cadence_model::{MediaSlot, NewTrack, Track, TrackPatch};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::ports::TrackRepository;
use crate::deadline::within;
use crate::error::{CoreError, CoreResult};
use crate::storage::{BlobStore, BlobUpload};

/// Optional file for each media slot of a track.
#[derive(Debug, Default)]
pub struct TrackUploads {
    pub audio: Option<BlobUpload>,
    pub video: Option<BlobUpload>,
    pub image: Option<BlobUpload>,
}

impl TrackUploads {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: MediaSlot, upload: BlobUpload) {
        *self.slot_mut(slot) = Some(upload);
    }

    pub fn with(mut self, slot: MediaSlot, upload: BlobUpload) -> Self {
        self.set(slot, upload);
        self
    }

    pub fn take(&mut self, slot: MediaSlot) -> Option<BlobUpload> {
        self.slot_mut(slot).take()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none() && self.image.is_none()
    }

    fn slot_mut(&mut self, slot: MediaSlot) -> &mut Option<BlobUpload> {
        match slot {
            MediaSlot::Audio => &mut self.audio,
            MediaSlot::Video => &mut self.video,
            MediaSlot::Image => &mut self.image,
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    tracks: Arc<dyn TrackRepository>,
    blobs: Arc<dyn BlobStore>,
    budget: Duration,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("blobs", &self.blobs)
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(
        tracks: Arc<dyn TrackRepository>,
        blobs: Arc<dyn BlobStore>,
        budget: Duration,
    ) -> Self {
        Self {
            tracks,
            blobs,
            budget,
        }
    }

    pub fn blob_store(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    pub async fn create(
        &self,
        new: NewTrack,
        uploads: TrackUploads,
    ) -> CoreResult<Track> {
        within(self.budget, async {
            let mut track = Track::from_new(new, Utc::now());
            self.upload_slots(&mut track, uploads).await?;

            if let Err(err) = self.tracks.create(&track).await {
                for (slot, locator) in track.locators() {
                    warn!(
                        track_id = %track.id,
                        %slot,
                        locator,
                        "blob orphaned by failed insert"
                    );
                }
                return Err(err);
            }

            info!(
                track_id = %track.id,
                backend = %self.blobs.kind(),
                "created track"
            );
            Ok(track)
        })
        .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: TrackPatch,
        uploads: TrackUploads,
    ) -> CoreResult<Track> {
        within(self.budget, async {
            let mut track = self.tracks.get_by_id(id).await?;
            self.upload_slots(&mut track, uploads).await?;
            track.apply_patch(patch, Utc::now());

            self.tracks.update(&track).await?;
            info!(track_id = %id, "updated track");
            self.tracks.get_by_id(id).await
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        within(self.budget, async {
            let track = self.tracks.get_by_id(id).await?;

            for (slot, locator) in track.locators() {
                if let Err(err) = self.blobs.delete(locator).await {
                    warn!(
                        track_id = %id,
                        %slot,
                        locator,
                        error = %err,
                        "failed to delete blob"
                    );
                }
            }

            self.tracks.delete(id).await?;
            info!(track_id = %id, "deleted track");
            Ok(())
        })
        .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> CoreResult<Track> {
        within(self.budget, self.tracks.get_by_id(id)).await
    }

    pub async fn get_all(&self) -> CoreResult<Vec<Track>> {
        within(self.budget, self.tracks.get_all()).await
    }

    /// Upload present slots in order, stopping at the first failure.
    async fn upload_slots(
        &self,
        track: &mut Track,
        mut uploads: TrackUploads,
    ) -> CoreResult<()> {
        for slot in MediaSlot::ALL {
            let Some(upload) = uploads.take(slot) else {
                continue;
            };

            let locator = self.blobs.upload(upload).await.map_err(|err| {
                warn!(
                    track_id = %track.id,
                    %slot,
                    error = %err,
                    "upload failed"
                );
                CoreError::from(err)
            })?;
            track.set_locator(slot, locator);
        }
        Ok(())
    }
}
