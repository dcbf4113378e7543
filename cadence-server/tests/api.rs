mod support;

use axum::http::{Method, StatusCode};
use cadence_config::EnvConfig;
use serde_json::json;
use support::{
    BASE_URL, Part, TestApp, empty_request, json_request, multipart_request,
};

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) =
        app.send(empty_request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "local");
}

#[tokio::test]
async fn register_returns_created_account_without_hash() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            &json!({
                "email": " New.Listener@Example.com",
                "password": "secret1"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["email"], "new.listener@example.com");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_validates_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let register = |email: &str, password: &str| {
        json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            &json!({ "email": email, "password": password }),
        )
    };

    let (status, _) = app.send(register("not-an-email", "secret1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(register("short@example.com", "abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(register("dup@example.com", "secret1")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.send(register("DUP@example.com", "secret2")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["status"], 409);
}

#[tokio::test]
async fn login_issues_bearer_pair_and_rejects_bad_credentials() {
    let app = TestApp::new().await;
    app.sign_up("fan@example.com", "secret1").await;

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            &json!({ "email": "fan@example.com", "password": "secret1" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 900);

    for (email, password) in [
        ("fan@example.com", "wrong-pass"),
        ("nobody@example.com", "secret1"),
    ] {
        let (status, body) = app
            .send(json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                &json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn refresh_token_exchanges_for_access_token() {
    let app = TestApp::new().await;
    let (access, refresh) = app.sign_up("r@example.com", "secret1").await;

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/refresh-token",
            None,
            &json!({ "refresh_token": refresh }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(empty_request(Method::GET, "/api/v1/user", Some(&fresh)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/api/v1/auth/refresh-token",
            None,
            &json!({ "refresh_token": access }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_an_access_token() {
    let app = TestApp::new().await;
    let (_, refresh) = app.sign_up("gate@example.com", "secret1").await;

    let (status, body) = app
        .send(empty_request(Method::GET, "/api/v1/music", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["status"], 401);

    for token in ["garbage", refresh.as_str()] {
        let (status, _) = app
            .send(empty_request(Method::GET, "/api/v1/music", Some(token)))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn multipart_create_stores_files_and_serves_them() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("curator@example.com", "secret1").await;

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/v1/music",
            &token,
            &[
                Part::Text("title", "Feeling Good"),
                Part::Text("artist", "Nina Simone"),
                Part::Text("lyrics", "Birds flying high"),
                Part::File {
                    field: "mp3_file",
                    file_name: "song.mp3",
                    content_type: "audio/mpeg",
                    bytes: b"ID3-audio-bytes",
                },
                Part::File {
                    field: "image_file",
                    file_name: "cover.JPG",
                    content_type: "image/jpeg",
                    bytes: b"jpeg-bytes",
                },
                Part::File {
                    field: "video_file",
                    file_name: "empty.mp4",
                    content_type: "video/mp4",
                    bytes: b"",
                },
            ],
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let track = &body["data"];
    assert_eq!(track["title"], "Feeling Good");
    assert_eq!(track["created_by"], "curator@example.com");
    assert!(track["video_url"].is_null());

    let audio_url = track["audio_url"].as_str().unwrap();
    assert!(audio_url.starts_with(BASE_URL));
    assert!(audio_url.ends_with(".mp3"));
    assert!(track["image_url"].as_str().unwrap().ends_with(".jpg"));

    let files = std::fs::read_dir(app.upload_dir.path()).unwrap().count();
    assert_eq!(files, 2);

    let served_path = audio_url.trim_start_matches("http://localhost:8080");
    let (status, bytes) = app
        .send_raw(empty_request(Method::GET, served_path, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"ID3-audio-bytes");
}

#[tokio::test]
async fn create_requires_title_and_artist() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("c@example.com", "secret1").await;

    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/v1/music",
            &token,
            &[Part::Text("artist", "Anonymous")],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn update_accepts_json_and_multipart() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("editor@example.com", "secret1").await;

    let (_, created) = app
        .send(multipart_request(
            Method::POST,
            "/api/v1/music",
            &token,
            &[
                Part::Text("title", "Draft"),
                Part::Text("artist", "Someone"),
                Part::File {
                    field: "audio_file",
                    file_name: "v1.mp3",
                    content_type: "audio/mpeg",
                    bytes: b"first",
                },
            ],
        ))
        .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let old_audio = created["data"]["audio_url"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/music/{id}");

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            &uri,
            Some(&token),
            &json!({ "title": "Final" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Final");
    assert_eq!(body["data"]["artist"], "Someone");
    assert_eq!(body["data"]["audio_url"], old_audio.as_str());
    assert_eq!(body["data"]["updated_by"], "editor@example.com");

    let (status, body) = app
        .send(multipart_request(
            Method::PUT,
            &uri,
            &token,
            &[
                Part::Text("lyrics", "new words"),
                Part::File {
                    field: "mp3_file",
                    file_name: "v2.mp3",
                    content_type: "audio/mpeg",
                    bytes: b"second",
                },
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Final");
    assert_eq!(body["data"]["lyrics"], "new words");
    assert_ne!(body["data"]["audio_url"], old_audio.as_str());

    // The replaced blob is left on disk.
    let files = std::fs::read_dir(app.upload_dir.path()).unwrap().count();
    assert_eq!(files, 2);
}

#[tokio::test]
async fn delete_removes_track_and_files() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("d@example.com", "secret1").await;

    let (_, created) = app
        .send(multipart_request(
            Method::POST,
            "/api/v1/music",
            &token,
            &[
                Part::Text("title", "Gone"),
                Part::Text("artist", "Soon"),
                Part::File {
                    field: "mp4_file",
                    file_name: "clip.mp4",
                    content_type: "video/mp4",
                    bytes: b"video",
                },
            ],
        ))
        .await;
    let uri =
        format!("/api/v1/music/{}", created["data"]["id"].as_str().unwrap());

    let (status, body) = app
        .send(empty_request(Method::DELETE, &uri, Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Music deleted successfully");
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);

    let (status, _) =
        app.send(empty_request(Method::GET, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(empty_request(Method::DELETE, &uri, Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_returns_tracks_in_creation_order() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("l@example.com", "secret1").await;

    for title in ["One", "Two"] {
        let (status, _) = app
            .send(multipart_request(
                Method::POST,
                "/api/v1/music",
                &token,
                &[Part::Text("title", title), Part::Text("artist", "Band")],
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .send(empty_request(Method::GET, "/api/v1/music", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|track| track["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["One", "Two"]);
}

#[tokio::test]
async fn unknown_track_is_not_found() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("nf@example.com", "secret1").await;

    let uri = format!("/api/v1/music/{}", uuid::Uuid::now_v7());
    let (status, body) =
        app.send(empty_request(Method::GET, &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            &uri,
            Some(&token),
            &json!({ "title": "x" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_can_be_read_and_patched() {
    let app = TestApp::new().await;
    let (token, _) = app.sign_up("me@example.com", "secret1").await;

    let (status, body) = app
        .send(empty_request(Method::GET, "/api/v1/user", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "me@example.com");
    assert!(body["data"]["display_name"].is_null());

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/v1/user",
            Some(&token),
            &json!({ "display_name": "DJ Me" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["display_name"], "DJ Me");

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            "/api/v1/user",
            Some(&token),
            &json!({ "display_name": "   " }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_uploads_are_rejected() {
    let app = TestApp::with_env(EnvConfig {
        max_upload_bytes: Some("1024".into()),
        ..Default::default()
    })
    .await;
    let (token, _) = app.sign_up("big@example.com", "secret1").await;

    let payload = vec![7u8; 8 * 1024];
    let (status, _) = app
        .send(multipart_request(
            Method::POST,
            "/api/v1/music",
            &token,
            &[
                Part::Text("title", "Huge"),
                Part::Text("artist", "Loud"),
                Part::File {
                    field: "audio_file",
                    file_name: "huge.mp3",
                    content_type: "audio/mpeg",
                    bytes: &payload,
                },
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);
}
