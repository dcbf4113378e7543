use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

const MAX_TITLE_LEN: usize = 255;
const MAX_ARTIST_LEN: usize = 255;

/// Actor recorded in the audit columns when no authenticated email is known.
pub const SYSTEM_ACTOR: &str = "system";

/// A catalog record: textual metadata plus up to three blob locators.
///
/// Locators are opaque strings produced by the active storage backend. A
/// present locator is expected to reference an existing blob, but nothing
/// enforces that transactionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Track {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub lyrics: String,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The three blob-bearing fields of a [`Track`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSlot {
    Audio,
    Video,
    Image,
}

impl MediaSlot {
    /// Upload order used by the catalog orchestrator.
    pub const ALL: [MediaSlot; 3] =
        [MediaSlot::Audio, MediaSlot::Video, MediaSlot::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSlot::Audio => "audio",
            MediaSlot::Video => "video",
            MediaSlot::Image => "image",
        }
    }
}

impl std::fmt::Display for MediaSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Track {
    /// Build a fresh record from creation input. Locators start empty and are
    /// filled in by the orchestrator once uploads succeed.
    pub fn from_new(new: NewTrack, now: DateTime<Utc>) -> Self {
        let actor = new.actor.unwrap_or_else(|| SYSTEM_ACTOR.to_string());
        Self {
            id: Uuid::now_v7(),
            title: new.title,
            artist: new.artist,
            lyrics: new.lyrics,
            audio_url: None,
            video_url: None,
            image_url: None,
            created_by: actor.clone(),
            updated_by: actor,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn locator(&self, slot: MediaSlot) -> Option<&str> {
        match slot {
            MediaSlot::Audio => self.audio_url.as_deref(),
            MediaSlot::Video => self.video_url.as_deref(),
            MediaSlot::Image => self.image_url.as_deref(),
        }
    }

    pub fn set_locator(&mut self, slot: MediaSlot, locator: String) {
        let field = match slot {
            MediaSlot::Audio => &mut self.audio_url,
            MediaSlot::Video => &mut self.video_url,
            MediaSlot::Image => &mut self.image_url,
        };
        *field = Some(locator);
    }

    /// Every non-empty locator currently referenced by this record.
    pub fn locators(&self) -> impl Iterator<Item = (MediaSlot, &str)> {
        MediaSlot::ALL.into_iter().filter_map(move |slot| {
            self.locator(slot)
                .filter(|locator| !locator.is_empty())
                .map(|locator| (slot, locator))
        })
    }

    /// Apply a partial update. Fields absent from the patch keep their
    /// current values; locators are never touched here.
    pub fn apply_patch(&mut self, patch: TrackPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(artist) = patch.artist {
            self.artist = artist;
        }
        if let Some(lyrics) = patch.lyrics {
            self.lyrics = lyrics;
        }
        if let Some(actor) = patch.actor {
            self.updated_by = actor;
        }
        self.updated_at = now;
    }
}

/// Creation input for a track, before any blob has been uploaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub lyrics: String,
    /// Email of the acting user, recorded in `created_by`/`updated_by`.
    #[serde(skip)]
    pub actor: Option<String>,
}

impl NewTrack {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title, MAX_TITLE_LEN)?;
        require("artist", &self.artist, MAX_ARTIST_LEN)?;
        Ok(())
    }
}

/// Patch input for a track. `None` means "leave unchanged"; `Some("")`
/// explicitly clears a text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(skip)]
    pub actor: Option<String>,
}

impl TrackPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title
            && title.chars().count() > MAX_TITLE_LEN
        {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }
        if let Some(artist) = &self.artist
            && artist.chars().count() > MAX_ARTIST_LEN
        {
            return Err(ValidationError::TooLong {
                field: "artist",
                max: MAX_ARTIST_LEN,
            });
        }
        Ok(())
    }
}

fn require(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
