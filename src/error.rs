//!
//! # Error handling
//!
//! This module defines the application-wide error type `AppError`. Every
//! fallible operation in the crate reports failures through it, and its
//! `actix_web::error::ResponseError` implementation maps each variant to an
//! HTTP status and a JSON body of the shape `{error, message, details?}`.
//!
//! Two merges are deliberate and must stay explicit:
//! - `Unauthenticated` covers missing, malformed, expired, and
//!   unresolvable tokens with one indistinguishable 401 response.
//! - `InvalidCredentials` covers unknown email and wrong password alike.
//!
//! Anything unexpected (`Internal`, `Database`) is logged with full detail
//! server-side and surfaced to the caller as a generic 500.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all domain error outcomes of the application.
#[derive(Debug)]
pub enum AppError {
    /// Bearer token missing, invalid, expired, or referencing a vanished
    /// user. Always rendered as the same generic 401.
    Unauthenticated(String),
    /// Login failure. Unknown email and wrong password are not
    /// distinguishable from the outside (HTTP 401).
    InvalidCredentials,
    /// Malformed or out-of-range input, with optional field-level details
    /// (HTTP 400).
    Validation {
        message: String,
        details: Option<Vec<String>>,
    },
    /// Registration conflict: the normalized email is already taken
    /// (HTTP 409).
    DuplicateEmail,
    /// Requested resource absent, or owned by somebody else (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500). The message is logged,
    /// never sent to the client.
    Internal(String),
    /// Failure in the storage layer (HTTP 500). Treated like `Internal`
    /// towards the client.
    Database(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Validation { message, .. } => write!(f, "Validation failed: {}", message),
            AppError::DuplicateEmail => write!(f, "Email already in use"),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

fn payload(error: &str, message: &str, details: Option<&Vec<String>>) -> serde_json::Value {
    let mut body = json!({ "error": error, "message": message });
    if let Some(details) = details {
        body["details"] = json!(details);
    }
    body
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // The internal message may say why the gate rejected the
            // request; the caller only ever sees one generic body.
            AppError::Unauthenticated(_) => {
                HttpResponse::Unauthorized().json(payload("unauthorized", "Invalid token", None))
            }
            AppError::InvalidCredentials => HttpResponse::Unauthorized().json(payload(
                "unauthorized",
                "Invalid credentials",
                None,
            )),
            AppError::Validation { message, details } => HttpResponse::BadRequest().json(payload(
                "validation_error",
                message,
                details.as_ref(),
            )),
            AppError::DuplicateEmail => {
                HttpResponse::Conflict().json(payload("conflict", "Email already in use", None))
            }
            AppError::NotFound(msg) => {
                HttpResponse::NotFound().json(payload("not_found", msg, None))
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(payload(
                    "internal_error",
                    "Internal server error",
                    None,
                ))
            }
            AppError::Database(msg) => {
                log::error!("database error: {}", msg);
                HttpResponse::InternalServerError().json(payload(
                    "internal_error",
                    "Internal server error",
                    None,
                ))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; everything else is a storage failure.
/// Unique-violation translation to `DuplicateEmail` happens at the store
/// boundary where the violated constraint is known, not here.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`,
/// flattening per-field messages into the `details` list.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        details.sort();
        AppError::Validation {
            message: "Request validation failed".into(),
            details: Some(details),
        }
    }
}

/// Converts JWT processing failures into the collapsed 401 outcome.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthenticated("token rejected".into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
///
/// Hashing a fresh password should never fail; verification failures are
/// handled as boolean mismatches before this conversion applies.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}
