//! Catalog endpoints. Create and update accept `multipart/form-data` with
//! text fields `title`, `artist`, `lyrics` and file fields `audio_file`
//! (alias `mp3_file`), `video_file` (alias `mp4_file`) and `image_file`.
//! Update additionally accepts a JSON [`TrackPatch`].

use axum::{
    Extension, Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header},
};
use cadence_core::TrackUploads;
use cadence_core::storage::BlobUpload;
use cadence_model::{
    ApiResponse, MediaSlot, MessageResponse, NewTrack, Track, TrackPatch,
};
use tracing::debug;
use uuid::Uuid;

use crate::infra::{
    app_state::AppState,
    errors::AppResult,
};
use crate::middleware::AuthenticatedUser;

/// Text and file parts of a track form. Text fields are `None` when the part
/// was not sent at all.
#[derive(Debug, Default)]
struct TrackForm {
    title: Option<String>,
    artist: Option<String>,
    lyrics: Option<String>,
    uploads: TrackUploads,
}

fn slot_for_field(name: &str) -> Option<MediaSlot> {
    match name {
        "audio_file" | "mp3_file" => Some(MediaSlot::Audio),
        "video_file" | "mp4_file" => Some(MediaSlot::Video),
        "image_file" => Some(MediaSlot::Image),
        _ => None,
    }
}

async fn read_track_form(mut multipart: Multipart) -> AppResult<TrackForm> {
    let mut form = TrackForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "title" => form.title = Some(field.text().await?),
            "artist" => form.artist = Some(field.text().await?),
            "lyrics" => form.lyrics = Some(field.text().await?),
            other => {
                let Some(slot) = slot_for_field(other) else {
                    debug!(field = %other, "ignoring unknown multipart field");
                    continue;
                };
                let file_name =
                    field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    continue;
                }

                let mut upload = BlobUpload::from_bytes(file_name, bytes);
                if let Some(content_type) = content_type {
                    upload = upload.with_content_type(content_type);
                }
                form.uploads.set(slot, upload);
            }
        }
    }

    Ok(form)
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

pub async fn list_tracks(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Track>>>> {
    let tracks = state.catalog.get_all().await?;
    Ok(Json(ApiResponse::success(tracks)))
}

pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Track>>> {
    let track = state.catalog.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(track)))
}

pub async fn create_track(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Track>>)> {
    let form = read_track_form(multipart).await?;
    let new_track = NewTrack {
        title: form.title.unwrap_or_default(),
        artist: form.artist.unwrap_or_default(),
        lyrics: form.lyrics.unwrap_or_default(),
        actor: Some(user.email),
    };
    new_track.validate()?;

    let track = state.catalog.create(new_track, form.uploads).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(track)
                .with_message("Music created successfully".to_string()),
        ),
    ))
}

pub async fn update_track(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    request: Request,
) -> AppResult<Json<ApiResponse<Track>>> {
    let (mut patch, uploads) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state).await?;
        let form = read_track_form(multipart).await?;
        let patch = TrackPatch {
            title: form.title,
            artist: form.artist,
            lyrics: form.lyrics,
            actor: None,
        };
        (patch, form.uploads)
    } else {
        let Json(patch) =
            Json::<TrackPatch>::from_request(request, &state).await?;
        (patch, TrackUploads::none())
    };
    patch.actor = Some(user.email);
    patch.validate()?;

    let track = state.catalog.update(id, patch, uploads).await?;
    Ok(Json(
        ApiResponse::success(track)
            .with_message("Music updated successfully".to_string()),
    ))
}

pub async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MessageResponse>>> {
    state.catalog.delete(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Music deleted successfully",
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_field_aliases_map_to_slots() {
        assert_eq!(slot_for_field("mp3_file"), Some(MediaSlot::Audio));
        assert_eq!(slot_for_field("audio_file"), Some(MediaSlot::Audio));
        assert_eq!(slot_for_field("mp4_file"), Some(MediaSlot::Video));
        assert_eq!(slot_for_field("image_file"), Some(MediaSlot::Image));
        assert_eq!(slot_for_field("title"), None);
    }
}
