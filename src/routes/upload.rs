use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::models::UploadedImage;
use crate::state::AppState;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5MB
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

const DEFAULT_BUCKET: &str = "images";
const DEFAULT_FOLDER: &str = "general";

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub bucket: Option<String>,
    pub folder: Option<String>,
}

/// Envelope with the public URL repeated at the top level, where simple
/// form uploaders look for it.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub envelope: Envelope<UploadedImage>,
    pub url: String,
}

fn validate_image_magic_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // GIF: 47 49 46 38
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        // WebP: 52 49 46 46 ... 57 45 42 50
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// A storage path segment: ASCII letters, digits, `-` and `_` only.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Resolves `bucket` and `folder` into relative path segments. The folder
/// may be nested (`projects/2024`); every segment must be safe.
fn storage_segments(query: &UploadQuery) -> Result<Vec<String>, ApiError> {
    let bucket = query
        .bucket
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_BUCKET);
    let folder = query
        .folder
        .as_deref()
        .map(|f| f.trim_matches('/'))
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FOLDER);

    let segments: Vec<String> = std::iter::once(bucket)
        .chain(folder.split('/'))
        .map(str::to_string)
        .collect();

    if segments.iter().all(|s| is_safe_segment(s)) {
        Ok(segments)
    } else {
        Err(ApiError::Validation("Invalid bucket or folder".to_string()))
    }
}

/// POST /admin/upload?bucket=&folder= - Store one image from the `file` field
pub async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let segments = storage_segments(&query)?;

    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Multipart error: {}", e);
                return Err(ApiError::Validation("Invalid multipart data".to_string()));
            }
        };
        // Other fields are ignored.
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("unknown").to_string();
        let original_ext = original_name
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_lowercase();

        if !ALLOWED_EXTENSIONS.contains(&original_ext.as_str()) {
            return Err(ApiError::Validation(
                "Unsupported file type. Allowed: JPEG, PNG, WebP, GIF.".to_string(),
            ));
        }

        let bytes = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read upload bytes: {}", e);
            ApiError::Validation("Failed to read file data".to_string())
        })?;
        upload = Some(bytes);
        break;
    }

    let bytes = upload.ok_or_else(|| ApiError::Validation("No file provided".to_string()))?;

    if bytes.len() > MAX_FILE_SIZE {
        return Err(ApiError::Validation(
            "File too large. Maximum size is 5MB.".to_string(),
        ));
    }

    if bytes.is_empty() {
        return Err(ApiError::Validation("Empty file".to_string()));
    }

    let mime_type = validate_image_magic_bytes(&bytes).ok_or_else(|| {
        ApiError::Validation("File content does not match an allowed image type.".to_string())
    })?;

    let dir: PathBuf = segments
        .iter()
        .fold(state.config.upload_dir.clone(), |path, segment| path.join(segment));
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        ApiError::Internal(format!("Failed to create upload directory: {}", e))
    })?;

    let filename = format!("{}.{}", Uuid::new_v4(), extension_for_mime(mime_type));
    tokio::fs::write(dir.join(&filename), &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to write upload file: {}", e)))?;

    let url = format!(
        "{}/uploads/{}/{}",
        state.config.public_base_url,
        segments.join("/"),
        filename
    );
    tracing::info!(url = %url, size = bytes.len(), "image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: url.clone(),
            envelope: Envelope::ok(UploadedImage {
                url,
                filename,
                size: bytes.len(),
                mime_type: mime_type.to_string(),
            }),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::Stores;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const BOUNDARY: &str = "devforge-boundary";

    fn upload_router(dir: PathBuf) -> Router {
        let config = AppConfig::for_tests("admin", "pw", dir).unwrap();
        Router::new()
            .route("/admin/upload", post(upload_image))
            .with_state(AppState::new(config, Stores::in_memory()))
    }

    fn multipart_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                b = BOUNDARY,
                f = field,
                n = filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::post(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_magic_bytes_detection() {
        assert_eq!(validate_image_magic_bytes(PNG_HEADER), Some("image/png"));
        assert_eq!(validate_image_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(validate_image_magic_bytes(b"GIF89a"), Some("image/gif"));
        assert_eq!(validate_image_magic_bytes(b"RIFF\0\0\0\0WEBPVP8"), Some("image/webp"));
        assert_eq!(validate_image_magic_bytes(b"%PDF-1.7"), None);
        assert_eq!(validate_image_magic_bytes(&[0xFF]), None);
    }

    #[test]
    fn test_storage_segments_reject_traversal() {
        let ok = storage_segments(&UploadQuery {
            bucket: Some("portfolio".into()),
            folder: Some("projects/2024".into()),
        })
        .unwrap();
        assert_eq!(ok, vec!["portfolio", "projects", "2024"]);

        let defaults = storage_segments(&UploadQuery::default()).unwrap();
        assert_eq!(defaults, vec![DEFAULT_BUCKET, DEFAULT_FOLDER]);

        for folder in ["../etc", "a/../b", "a//b", "sp ace"] {
            let query = UploadQuery {
                bucket: None,
                folder: Some(folder.into()),
            };
            assert!(storage_segments(&query).is_err(), "{} accepted", folder);
        }
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let req = multipart_request(
            "/admin/upload?bucket=team&folder=avatars",
            "file",
            "me.png",
            PNG_HEADER,
        );
        let (status, body) = send(upload_router(dir.path().to_path_buf()), req).await;
        assert_eq!(status, StatusCode::CREATED);

        assert_eq!(body["success"], true);
        let url = body["data"]["url"].as_str().unwrap();
        assert_eq!(body["url"], url);
        assert!(url.starts_with("/uploads/team/avatars/"));
        assert!(url.ends_with(".png"));
        assert_eq!(body["data"]["mime_type"], "image/png");
        assert_eq!(body["data"]["size"], PNG_HEADER.len());

        let filename = body["data"]["filename"].as_str().unwrap();
        let stored = dir.path().join("team").join("avatars").join(filename);
        assert_eq!(std::fs::read(stored).unwrap(), PNG_HEADER);
    }

    #[tokio::test]
    async fn test_non_image_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let req = multipart_request("/admin/upload", "file", "notes.png", b"plain text, not a png");
        let (status, body) = send(upload_router(dir.path().to_path_buf()), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_wrong_field_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let req = multipart_request("/admin/upload", "image", "me.png", PNG_HEADER);
        let (status, body) = send(upload_router(dir.path().to_path_buf()), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");
    }
}
