//! Multipart file intake for the upload directory

use crate::errors::AppError;
use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Image extensions accepted by default
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Writes uploaded files into one directory under fresh UUID names.
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
    extensions: &'static [&'static str],
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: IMAGE_EXTENSIONS,
        }
    }

    pub fn with_extensions(mut self, extensions: &'static [&'static str]) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Find the part named `field` and store it.
    ///
    /// Returns the generated filename (not the full path). Other parts are
    /// skipped. The original extension is kept, lowercased.
    pub async fn save_field(&self, multipart: &mut Multipart, field: &str) -> Result<String, AppError> {
        while let Some(part) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            if part.name() != Some(field) {
                continue;
            }

            let extension = part
                .file_name()
                .and_then(|name| Path::new(name).extension())
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
                .filter(|ext| self.extensions.contains(&ext.as_str()))
                .ok_or_else(|| {
                    AppError::invalid(format!(
                        "{field} must be a file with one of the extensions: {}",
                        self.extensions.join(", ")
                    ))
                })?;

            let bytes = part
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if bytes.is_empty() {
                return Err(AppError::invalid(format!("{field} must not be empty")));
            }

            tokio::fs::create_dir_all(&self.dir).await?;
            let filename = format!("{}.{extension}", Uuid::new_v4());
            tokio::fs::write(self.dir.join(&filename), &bytes).await?;

            info!(%filename, size = bytes.len(), "Stored upload");
            return Ok(filename);
        }

        Err(AppError::invalid(format!("Multipart field '{field}' is required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        extract::State,
        http::{Request, StatusCode},
        routing::post,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XSIXCITIESX";

    fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Body {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    async fn upload(store: UploadStore, body: Body) -> (StatusCode, String) {
        let app = Router::new()
            .route(
                "/",
                post(|State(store): State<UploadStore>, mut form: Multipart| async move {
                    store.save_field(&mut form, "avatar").await
                }),
            )
            .with_state(store);

        let response = app
            .oneshot(
                Request::post("/")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn temp_store() -> UploadStore {
        UploadStore::new(std::env::temp_dir().join(format!("six-cities-upload-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_saves_file_with_generated_name() {
        let store = temp_store();
        let dir = store.dir().to_path_buf();

        let (status, filename) = upload(store, multipart_body("avatar", "Me.PNG", b"\x89PNG")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(filename.ends_with(".png"));
        assert_ne!(filename, "Me.PNG");
        assert_eq!(tokio::fs::read(dir.join(&filename)).await.unwrap(), b"\x89PNG");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let (status, body) = upload(temp_store(), multipart_body("avatar", "run.sh", b"#!/bin/sh")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_rejects_missing_field() {
        let (status, body) = upload(temp_store(), multipart_body("photo", "me.jpg", b"jpeg")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("'avatar' is required"));
    }
}
