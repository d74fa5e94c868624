//! Conversion of authentication failures into responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::oauth::{ErrorKind, OAuthError};

/// Body of every 403 response.
pub const FORBIDDEN_BODY: &str = "Verification failed.";

/// Body of every 500 response.
pub const INTERNAL_ERROR_BODY: &str =
    "Internal server error: you may contact the application administrator.";

/// Client errors carry their message; verification and internal failures
/// get a fixed body so nothing about secrets, tokens or upstream state
/// leaks to the client.
impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match kind {
            ErrorKind::BadRequest => (status, self.to_string()).into_response(),
            ErrorKind::Forbidden => (status, FORBIDDEN_BODY).into_response(),
            ErrorKind::Internal => (status, INTERNAL_ERROR_BODY).into_response(),
        }
    }
}
