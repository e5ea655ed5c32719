use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::user::errors::FieldErrors;
use crate::domain::user::errors::UserError;

pub mod index;
pub mod list_users;
pub mod login;

pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const TOKEN_NOT_PROVIDED: &str = "token was not provided";
pub const NOT_AUTHENTICATED: &str = "user is not authenticated";
pub const TOO_MANY_REQUESTS: &str = "too many requests, please try again later";
pub const TOKEN_NOT_GENERATED: &str = "token was not generated";
pub const VALIDATION_FAILED: &str = "request validation failed";
pub const INTERNAL_ERROR: &str = "internal server error";

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(data)))
    }

    pub fn status(&self) -> StatusCode {
        self.0
    }

    pub fn data(&self) -> &T {
        &self.1 .0.data
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Validation(FieldErrors),
    Unauthorized(String),
    NotFound(String),
    TooManyRequests,
    InternalServerError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Request failed with internal error");
        ApiError::InternalServerError(INTERNAL_ERROR.to_string())
    }
}

impl From<Infallible> for ApiError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(details) => ApiErrorBody {
                success: false,
                error: VALIDATION_FAILED.to_string(),
                details: Some(details),
            },
            ApiError::TooManyRequests => ApiErrorBody::new(TOO_MANY_REQUESTS.to_string()),
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::NotFound(message)
            | ApiError::InternalServerError(message) => ApiErrorBody::new(message),
        };

        // Server errors are logged with their cause where they are built.
        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), error = %body.error, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(details) => ApiError::Validation(details),
            UserError::InvalidCredentials => ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()),
            UserError::Token(cause) => {
                tracing::error!(error = %cause, "Token signing failed");
                ApiError::InternalServerError(TOKEN_NOT_GENERATED.to_string())
            }
            UserError::Password(_) | UserError::Store(_) | UserError::Worker(_) => {
                ApiError::internal(err)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize> {
    success: bool,
    data: T,
}

impl<T: Serialize> ApiResponseBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl ApiErrorBody {
    pub fn new(error: String) -> Self {
        Self {
            success: false,
            error,
            details: None,
        }
    }
}
