use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Selected image exceeds the upload ceiling
    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },
    /// Analysis attempted without an API key
    #[error("Missing API key: please enter your Gemini API key first")]
    MissingCredential,
    /// Analysis attempted before any image was selected
    #[error("No image selected")]
    NoImageSelected,
    /// A run is already in flight for this session
    #[error("An analysis is already in progress")]
    AnalysisInProgress,
    /// Upload payload could not be decoded
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    /// Upstream API returned a non-success status
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },
    /// HTTP request error (network failure, timeout)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
    /// Upstream answered with a body that carries no text
    #[error("Malformed response from inference service")]
    MalformedResponse,
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure taxonomy surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caught before any network activity
    Validation,
    /// The inference call failed
    Transport,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ImageTooLarge { .. }
            | Self::MissingCredential
            | Self::NoImageSelected
            | Self::AnalysisInProgress
            | Self::InvalidUpload(_) => ErrorKind::Validation,
            Self::Upstream { .. } | Self::HttpRequest(_) | Self::MalformedResponse => {
                ErrorKind::Transport
            }
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Short user-facing message, as shown in the notice area
    pub fn user_message(&self) -> String {
        match self {
            Self::ImageTooLarge { .. } => "Image size should be less than 5MB".to_string(),
            Self::MissingCredential => "Please enter your Gemini API key first".to_string(),
            Self::NoImageSelected => "Please select an image first".to_string(),
            Self::AnalysisInProgress => "An analysis is already running".to_string(),
            Self::InvalidUpload(msg) => format!("Invalid upload: {}", msg),
            Self::Upstream { .. } | Self::HttpRequest(_) | Self::MalformedResponse => {
                "Failed to analyze image. Please try again.".to_string()
            }
            Self::Config(_) | Self::Internal(_) => "Something went wrong".to_string(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MissingCredential | Self::NoImageSelected | Self::InvalidUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::AnalysisInProgress => StatusCode::CONFLICT,
            Self::Upstream { .. } | Self::HttpRequest(_) | Self::MalformedResponse => {
                StatusCode::BAD_GATEWAY
            }
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "notice": self.user_message(),
                "type": error_type_name(&self),
                "kind": self.kind(),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ImageTooLarge { .. } => "image_too_large",
        AppError::MissingCredential => "missing_credential",
        AppError::NoImageSelected => "no_image_selected",
        AppError::AnalysisInProgress => "analysis_in_progress",
        AppError::InvalidUpload(_) => "invalid_upload",
        AppError::Upstream { .. } => "upstream_error",
        AppError::HttpRequest(_) => "http_request_error",
        AppError::MalformedResponse => "malformed_response",
        AppError::Config(_) => "config_error",
        AppError::Internal(_) => "internal_error",
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::ImageTooLarge {
            size: 10,
            max: 5,
        };
        assert_eq!(error.to_string(), "Image too large: 10 bytes (max: 5 bytes)");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(AppError::MissingCredential.kind(), ErrorKind::Validation);
        assert_eq!(AppError::MalformedResponse.kind(), ErrorKind::Transport);
        assert_eq!(
            AppError::Upstream {
                status: StatusCode::FORBIDDEN,
                message: "bad key".to_string(),
            }
            .kind(),
            ErrorKind::Transport
        );
        assert_eq!(AppError::Config("x".to_string()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(error_type_name(&AppError::MissingCredential), "missing_credential");
        assert_eq!(error_type_name(&AppError::NoImageSelected), "no_image_selected");
    }

    #[tokio::test]
    async fn test_error_response() {
        let response = AppError::ImageTooLarge { size: 6, max: 5 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = AppError::MalformedResponse.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = AppError::AnalysisInProgress.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
