use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hn_core::Error;
use serde_json::json;
use tracing::{error, warn};

/// Maps pipeline errors onto HTTP responses with a readable message and no
/// internal detail.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::DigestBuildFailed(_) | Error::EmptyResult => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match &self.0 {
            Error::UpstreamUnavailable(_) => {
                "The content API is unavailable, please try again later".to_string()
            }
            Error::DigestBuildFailed(reason) => format!("Digest unavailable: {}", reason),
            Error::EmptyResult => "Digest unavailable: the content API returned no stories".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::INTERNAL_SERVER_ERROR {
            warn!(%status, error = %self.0, "Request failed");
        } else {
            error!(%status, error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
