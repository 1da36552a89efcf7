//! Session API handlers
//!
//! Thin wrappers over [`Orchestrator`]: each call mutates the session (or
//! not) and answers with a fresh [`SessionView`].

use crate::{
    error::AppError,
    image_utils::{parse_data_url, SelectedImage, MAX_IMAGE_BYTES},
    session::{Orchestrator, SessionView},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageUploadRequest {
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// `data:image/...;base64,...`
    pub data_url: String,
}

fn default_file_name() -> String {
    "upload".to_string()
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.orchestrator.view())
}

/// DELETE /api/session - forget credential, image and results
pub async fn end_session(State(state): State<AppState>) -> StatusCode {
    state.orchestrator.end_session();
    StatusCode::NO_CONTENT
}

/// POST /api/credential
pub async fn submit_credential(
    State(state): State<AppState>,
    Json(request): Json<CredentialRequest>,
) -> Result<Json<SessionView>, AppError> {
    state.orchestrator.submit_credential(&request.api_key)?;
    Ok(Json(state.orchestrator.view()))
}

/// POST /api/image - select an image and analyze it
///
/// Bodies over the router's limit never reach the orchestrator as an image;
/// they are reported as `ImageTooLarge` with the same notice.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ImageUploadRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let size = decoded_size_hint(&headers).unwrap_or(MAX_IMAGE_BYTES + 1);
            return Err(state.orchestrator.reject_upload(AppError::ImageTooLarge {
                size,
                max: MAX_IMAGE_BYTES,
            }));
        }
        Err(rejection) => {
            return Err(state
                .orchestrator
                .reject_upload(AppError::InvalidUpload(rejection.body_text())));
        }
    };

    let (declared_mime, bytes) = match parse_data_url(&request.data_url) {
        Ok(decoded) => decoded,
        Err(err) => return Err(state.orchestrator.reject_upload(err)),
    };
    let image = SelectedImage::new(request.file_name, bytes);
    tracing::debug!(
        declared = %declared_mime,
        detected = %image.mime_type,
        "Decoded uploaded image"
    );

    state.orchestrator.select_and_analyze(image).await?;
    Ok(Json(state.orchestrator.view()))
}

/// Approximate image size behind a base64 data URL body
fn decoded_size_hint(headers: &HeaderMap) -> Option<usize> {
    let length: usize = headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()?;
    Some(length / 4 * 3)
}

/// POST /api/analyze - re-run analysis on the current image
pub async fn analyze(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    state.orchestrator.analyze().await?;
    Ok(Json(state.orchestrator.view()))
}
