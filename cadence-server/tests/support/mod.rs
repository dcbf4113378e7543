#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use cadence_config::{ConfigMetadata, EnvConfig, compose};
use cadence_core::database::{
    InMemoryAccountRepository, InMemoryTrackRepository,
};
use cadence_core::storage::{BlobStore, LocalBlobStore};
use cadence_server::{AppState, create_app};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BASE_URL: &str = "http://localhost:8080/uploads";
pub const BOUNDARY: &str = "cadence-test-boundary";

/// Router over in-memory repositories and a local blob store in a temp dir.
pub struct TestApp {
    pub router: Router,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_env(EnvConfig::default()).await
    }

    pub async fn with_env(env: EnvConfig) -> Self {
        let upload_dir = TempDir::new().unwrap();
        let env = EnvConfig {
            dev_mode: Some(true),
            jwt_secret: Some("integration-secret-integration-secret".into()),
            upload_dir: Some(upload_dir.path().to_path_buf()),
            base_url: Some(BASE_URL.into()),
            ..env
        };
        let (config, _) =
            compose(None, env, ConfigMetadata::default()).unwrap();

        let blobs: Arc<dyn BlobStore> = Arc::new(
            LocalBlobStore::new(upload_dir.path(), BASE_URL).await.unwrap(),
        );
        let state = AppState::new(
            config,
            Arc::new(InMemoryTrackRepository::new()),
            Arc::new(InMemoryAccountRepository::new()),
            blobs,
        )
        .unwrap();

        Self {
            router: create_app(state),
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into())
            })
        };
        (status, body)
    }

    pub async fn send_raw(
        &self,
        request: Request<Body>,
    ) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    /// Register and log in, returning `(access_token, refresh_token)`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> (String, String) {
        let credentials =
            serde_json::json!({ "email": email, "password": password });
        let (status, _) = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                &credentials,
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                &credentials,
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder =
            builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(serde_json::to_vec(body).unwrap())).unwrap()
}

pub fn empty_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder =
            builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: &str,
    parts: &[Part<'_>],
) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; \
                         name=\"{name}\"\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                field,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; \
                         filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}
