//! The uniform reply envelope.
//!
//! Every operation result can be folded into a `Reply` carrying a numeric
//! code, a human-readable message, and an optional payload. Business
//! failures map onto stable codes; system failures collapse into 500
//! without leaking internals.

use serde::Serialize;

use ladle_auth::GateError;
use ladle_store::StoreError;

use crate::error::LadleError;

pub mod codes {
    pub const OK: i32 = 200;
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const FORBIDDEN: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL: i32 = 500;
}

/// A reply envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Reply<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: codes::OK,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            code: codes::OK,
            message: "success".to_string(),
            data: None,
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Fold an operation result into an envelope.
    pub fn of(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(data) => Reply::ok(data),
            Err(e) => Reply::error(code_for(&e), message_for(&e)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == codes::OK
    }
}

/// The stable code for an error.
pub fn code_for(error: &LadleError) -> i32 {
    match error {
        LadleError::Validation(_) => codes::BAD_REQUEST,
        LadleError::InvalidCredentials => codes::UNAUTHORIZED,
        LadleError::Credential(_) => codes::UNAUTHORIZED,
        LadleError::Gate(GateError::AuthenticationRequired) => codes::UNAUTHORIZED,
        LadleError::Gate(GateError::PermissionDenied) => codes::FORBIDDEN,
        LadleError::Gate(GateError::Lookup(_)) => codes::INTERNAL,
        LadleError::Policy(_) => codes::FORBIDDEN,
        LadleError::AdminRequired => codes::FORBIDDEN,
        LadleError::RecipeNotFound(_) => codes::NOT_FOUND,
        LadleError::Store(StoreError::NotFound(_)) => codes::NOT_FOUND,
        LadleError::Store(StoreError::EmailTaken(_)) => codes::BAD_REQUEST,
        LadleError::Store(StoreError::Conflict { .. }) => codes::CONFLICT,
        LadleError::Store(_) => codes::INTERNAL,
        LadleError::PasswordHash(_) => codes::INTERNAL,
    }
}

/// The outward message for an error. System errors get a fixed message so
/// database details never reach the caller.
pub fn message_for(error: &LadleError) -> String {
    match code_for(error) {
        codes::INTERNAL => "internal error".to_string(),
        _ => error.to_string(),
    }
}
