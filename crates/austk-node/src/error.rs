use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use austk_art::ArtError;

/// HTTP-facing wrapper mapping the error taxonomy onto status codes.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ArtError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ArtError::NotFound(_) => StatusCode::NOT_FOUND,
            ArtError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ArtError::PaymentInvalid(_) => StatusCode::BAD_REQUEST,
            ArtError::InvalidSignature(_) => StatusCode::FORBIDDEN,
            ArtError::ConfigMismatch(_)
            | ArtError::StorageCorruption(_)
            | ArtError::TransientIo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}
