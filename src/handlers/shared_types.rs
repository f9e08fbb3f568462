use crate::domain::{FieldErrors, StoreError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Wrapper type for successful API responses.
///
/// Encapsulates the data payload and prepares it for JSON serialization.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

/// Outcome of an admin write.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    // ---
    pub success: bool,
    pub message: &'static str,
}

impl ActionResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// Every failure a handler can hand back to the client.
#[derive(Debug)]
pub enum ApiError {
    /// Input failed validation; one message per offending field.
    Validation(FieldErrors),

    /// A gateway call failed. The message is chosen from the error kind.
    Store(StoreError),

    /// A gateway call failed during an admin action; `message` names the action.
    Admin {
        source: StoreError,
        message: &'static str,
    },

    Unauthorized(&'static str),

    NotFound(&'static str),
}

impl ApiError {
    // ---
    pub fn admin(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Admin { source, message }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        // ---
        let mut fields = FieldErrors::new();
        fields.insert(field, message.into());
        ApiError::Validation(fields)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(fields: FieldErrors) -> Self {
        ApiError::Validation(fields)
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    // ---
    match err {
        StoreError::DuplicateEmail => StatusCode::CONFLICT,
        StoreError::FetchSettings(_) | StoreError::SaveSettings(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        StoreError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn store_message(err: &StoreError) -> &'static str {
    // ---
    match err {
        StoreError::DuplicateEmail => {
            "You've already made a prediction with this email. Use \"Find my prediction\" to see it."
        }
        StoreError::FetchSettings(_) => "Failed to fetch current settings.",
        StoreError::SaveSettings(_) => "Failed to save changes.",
        StoreError::NotConfigured => "The party isn't set up yet. Please check back soon.",
        StoreError::Unavailable(_) => "Couldn't connect. Please try again.",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let (status, body) = match self {
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: "Please fix the highlighted fields.".to_string(),
                    code: Some("VALIDATION"),
                    fields: Some(fields),
                },
            ),
            ApiError::Store(err) => (
                store_status(&err),
                ErrorResponse {
                    error: store_message(&err).to_string(),
                    code: Some(err.code()),
                    fields: None,
                },
            ),
            ApiError::Admin { source, message } => {
                tracing::warn!("Admin action failed: {message} ({source})");
                (
                    store_status(&source),
                    ErrorResponse {
                        error: message.to_string(),
                        code: Some(source.code()),
                        fields: None,
                    },
                )
            }
            ApiError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: message.to_string(),
                    code: None,
                    fields: None,
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: message.to_string(),
                    code: None,
                    fields: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
