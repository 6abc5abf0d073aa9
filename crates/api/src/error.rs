use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use wrenchly_services::auth::AuthError;
use wrenchly_services::clerk::ClerkError;
use wrenchly_services::dao::base::DaoError;
use wrenchly_services::invite::InviteError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    /// Identity-provider failure, surfaced to the caller.
    Provider(String),
    Internal(String),
    Validation(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Provider(msg) => (StatusCode::BAD_GATEWAY, "provider", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DaoError::DuplicateKey(msg) | DaoError::Conflict(msg) => ApiError::Conflict(msg),
            DaoError::Forbidden(msg) => ApiError::Forbidden(msg),
            DaoError::Validation(msg) => ApiError::Validation(msg),
            DaoError::Mongo(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonSer(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonDe(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => ApiError::Unauthorized("Session expired".to_string()),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::InvalidKey(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ClerkError> for ApiError {
    fn from(err: ClerkError) -> Self {
        match err {
            ClerkError::EmailTaken | ClerkError::DuplicateInvitation => {
                // Handled inside the invite workflow; reaching here means a
                // call site forgot to, which the caller can't fix.
                ApiError::Internal(err.to_string())
            }
            ClerkError::InvalidSignature => {
                ApiError::BadRequest("Invalid webhook signature".to_string())
            }
            ClerkError::Api { message, .. } => ApiError::Provider(message),
            ClerkError::Http(e) => ApiError::Provider(e.to_string()),
            ClerkError::Parse(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<InviteError> for ApiError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::NotFound => ApiError::NotFound("Invitation not found".to_string()),
            InviteError::UserNotFound => {
                ApiError::NotFound("No account found for this invitation".to_string())
            }
            InviteError::Revoked | InviteError::Expired | InviteError::AlreadyAccepted => {
                ApiError::Conflict(err.to_string())
            }
            InviteError::NotAuthorized(msg) => ApiError::Forbidden(msg),
            InviteError::Dao(e) => e.into(),
            InviteError::Clerk(e) => e.into(),
        }
    }
}
