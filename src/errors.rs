use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::BackendError;
use crate::notifications::Notification;

const ACCESS_DENIED_MESSAGE: &str =
    "Database access error. Please check your permissions.";
const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// A validation failure attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error body returned by every failing HTTP call
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Bad Request")
    pub error: String,
    pub message: String,
    /// Field-scoped messages for rejected forms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
    /// Toast to show the user
    pub notification: Notification,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation error: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Backend error: {0}")]
    Backend(BackendError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ServiceError::Validation(fields)
    }
}

impl From<BackendError> for ServiceError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::PermissionDenied => ServiceError::PermissionDenied,
            BackendError::NotFound(what) => ServiceError::NotFound(what),
            BackendError::UserNotFound => ServiceError::UserNotFound,
            BackendError::WrongPassword => ServiceError::WrongPassword,
            BackendError::EmailInUse => ServiceError::EmailInUse,
            other => ServiceError::Backend(other),
        }
    }
}

impl ServiceError {
    /// Single-field validation error.
    pub fn field(field: &str, message: &str) -> Self {
        ServiceError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UserNotFound | Self::WrongPassword | Self::AuthFailed(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::EmailInUse => StatusCode::CONFLICT,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps the error onto the notification a user sees.
    /// Internal and backend failures collapse into a generic message.
    pub fn notification(&self) -> Notification {
        match self {
            Self::Validation(fields) => Notification::error(
                fields
                    .first()
                    .map(|f| f.message.clone())
                    .unwrap_or_else(|| "Invalid form".to_string()),
            ),
            Self::PermissionDenied => Notification::error(ACCESS_DENIED_MESSAGE),
            Self::NotFound(_) => Notification::error("This item no longer exists"),
            Self::UserNotFound => Notification::error("User not found"),
            Self::WrongPassword => Notification::error("Incorrect password"),
            Self::EmailInUse => Notification::error("This email address is already in use"),
            Self::AuthFailed(message) => Notification::error(message.clone()),
            Self::Unauthorized(_) => Notification::error("Please sign in to continue"),
            Self::Backend(_) | Self::Internal(_) => Notification::error(GENERIC_FAILURE_MESSAGE),
        }
    }

    pub fn response_message(&self) -> String {
        match self {
            Self::Backend(_) => "Backend unavailable".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let fields = match &self {
            ServiceError::Validation(fields) => fields.clone(),
            _ => Vec::new(),
        };
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            fields,
            notification: self.notification(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::field("name", "too short").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::PermissionDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::WrongPassword.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ServiceError::EmailInUse.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ServiceError::Backend(BackendError::Unavailable("down".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn backend_errors_map_to_specific_messages() {
        let denied: ServiceError = BackendError::PermissionDenied.into();
        assert_eq!(denied.notification().description, ACCESS_DENIED_MESSAGE);

        let missing: ServiceError = BackendError::UserNotFound.into();
        assert_eq!(missing.notification().description, "User not found");

        let down: ServiceError = BackendError::Unavailable("timeout".into()).into();
        assert!(down.notification().is_destructive());
        assert_eq!(down.notification().description, GENERIC_FAILURE_MESSAGE);
        assert_eq!(down.response_message(), "Backend unavailable");
    }

    #[tokio::test]
    async fn validation_response_lists_fields() {
        let response = ServiceError::Validation(vec![FieldError {
            field: "quantity".into(),
            message: "Quantity must be greater than 0".into(),
        }])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.fields.len(), 1);
        assert_eq!(payload.fields[0].field, "quantity");
        assert_eq!(
            payload.notification.description,
            "Quantity must be greater than 0"
        );
    }
}
