//! Error types for quotebook.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Field-validation failure kinds.
///
/// Closed vocabulary; `as_str` values are part of the wire contract and
/// drive the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Field is missing or empty where a value is mandatory.
    Required,
    /// Value is shorter than the field's minimum length.
    MinLength,
    /// Value is longer than the field's maximum length.
    MaxLength,
    /// Value does not match the field's pattern.
    Match,
    /// Value collides with an existing row on a unique field.
    Unique,
    /// Value references a row that does not exist.
    Reference,
    /// Value is not a syntactically valid identifier.
    ObjectId,
    /// Value is not a boolean.
    Boolean,
    /// Value is outside the field's closed set.
    Enum,
}

impl ValidationKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minlength",
            Self::MaxLength => "maxlength",
            Self::Match => "match",
            Self::Unique => "unique",
            Self::Reference => "reference",
            Self::ObjectId => "ObjectId",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
        }
    }
}

fn validation_message(path: &str, kind: ValidationKind) -> String {
    match kind {
        ValidationKind::Required => format!("{path} is required"),
        ValidationKind::MaxLength => format!("{path} is too long"),
        ValidationKind::MinLength => format!("{path} is too short"),
        ValidationKind::Unique => format!("{path} is already taken"),
        ValidationKind::Match => format!("{path} does not match the pattern"),
        _ => format!("{path} is not valid ({})", kind.as_str()),
    }
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    /// Target does not exist, or the actor may not know whether it does.
    #[error("Not found")]
    NotFound,

    /// Missing or bad credentials; wrong-password and unknown-user collapse here.
    #[error("Incorrect login")]
    Unauthorized,

    /// Actor identified but the operation is disallowed for them.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A field failed validation, including unique/reference violations
    /// translated from the persistence layer.
    #[error("{}", validation_message(.path, *.kind))]
    Validation {
        /// Offending field.
        path: String,
        /// Failure kind.
        kind: ValidationKind,
    },

    /// Well-formed and authorized, but inapplicable to the current state.
    #[error("{message}")]
    Conflict {
        /// Field or aspect in conflict.
        path: String,
        /// Human-readable description.
        message: String,
    },

    // === Server Errors ===
    /// Persistence-layer failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Startup configuration failure.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broken invariant; should be unreachable.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a [`Self::Validation`] failure.
    pub fn validation(path: impl Into<String>, kind: ValidationKind) -> Self {
        Self::Validation {
            path: path.into(),
            kind,
        }
    }

    /// Shorthand for a [`Self::Conflict`] failure.
    pub fn conflict(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors with detail; clients only see the generic message
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let message = if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });
        match &self {
            Self::Validation { path, kind } => {
                body["error"]["path"] = json!(path);
                body["error"]["kind"] = json!(kind.as_str());
            }
            Self::Conflict { path, .. } => {
                body["error"]["path"] = json!(path);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

// === From implementations ===

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
