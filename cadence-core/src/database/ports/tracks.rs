use async_trait::async_trait;
use cadence_model::Track;
use uuid::Uuid;

use crate::error::CoreResult;

#[async_trait]
pub trait TrackRepository: Send + Sync {
    async fn create(&self, track: &Track) -> CoreResult<()>;

    /// `NotFound` when no row has this id.
    async fn get_by_id(&self, id: Uuid) -> CoreResult<Track>;

    /// All tracks, oldest first.
    async fn get_all(&self) -> CoreResult<Vec<Track>>;

    /// Overwrite every mutable column. `NotFound` on zero affected rows.
    async fn update(&self, track: &Track) -> CoreResult<()>;

    /// `NotFound` on zero affected rows.
    async fn delete(&self, id: Uuid) -> CoreResult<()>;
}
