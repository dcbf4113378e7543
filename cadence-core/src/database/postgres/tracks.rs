use async_trait::async_trait;
use cadence_model::Track;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::TrackRepository;
use crate::error::{CoreError, CoreResult};

const TRACK_COLUMNS: &str = "id, title, artist, lyrics, \
     audio_url, video_url, image_url, \
     created_by, updated_by, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresTrackRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresTrackRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTrackRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresTrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackRepository for PostgresTrackRepository {
    async fn create(&self, track: &Track) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tracks (
                id, title, artist, lyrics, audio_url, video_url, image_url,
                created_by, updated_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(track.id)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.lyrics)
        .bind(&track.audio_url)
        .bind(&track.video_url)
        .bind(&track.image_url)
        .bind(&track.created_by)
        .bind(&track.updated_by)
        .bind(track.created_at)
        .bind(track.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Track> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = $1");
        sqlx::query_as::<_, Track>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CoreError::NotFound)
    }

    async fn get_all(&self) -> CoreResult<Vec<Track>> {
        let sql = format!(
            "SELECT {TRACK_COLUMNS} FROM tracks ORDER BY created_at, id"
        );
        Ok(sqlx::query_as::<_, Track>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, track: &Track) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tracks
            SET title = $2,
                artist = $3,
                lyrics = $4,
                audio_url = $5,
                video_url = $6,
                image_url = $7,
                updated_by = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(track.id)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.lyrics)
        .bind(&track.audio_url)
        .bind(&track.video_url)
        .bind(&track.image_url)
        .bind(&track.updated_by)
        .bind(track.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }
}
