//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use taskhub_core::domain::DomainError;
use taskhub_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const UNAUTHORIZED: i32 = 4010;
    pub const FORBIDDEN: i32 = 4030;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const BROKER_ERROR: i32 = 5002;
}

fn error(code: i32, msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code, msg.into(), None::<()>)
}

pub fn throttled() -> ErrorObjectOwned {
    error(code::THROTTLED, "Rate limit exceeded. Please slow down.")
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Domain(DomainError::ElementNotFound(e)) => error(code::NOT_FOUND, e.message()),
        AppError::Domain(e @ DomainError::InvalidStateTransition { .. }) => {
            error(code::CONFLICT, e.to_string())
        }
        AppError::Domain(DomainError::Validation(msg)) => error(code::VALIDATION_ERROR, msg),
        AppError::Domain(DomainError::Internal(msg)) => error(code::INTERNAL_ERROR, msg),
        AppError::Validation(msg) => error(code::VALIDATION_ERROR, msg),
        AppError::Serialization(e) => error(code::VALIDATION_ERROR, e.to_string()),
        AppError::Conflict(msg) => error(code::CONFLICT, msg),
        AppError::Unauthorized(msg) => error(code::UNAUTHORIZED, msg),
        AppError::Forbidden(msg) => error(code::FORBIDDEN, msg),
        AppError::Database(msg) => error(code::DB_ERROR, msg),
        AppError::Publish(msg) => error(code::BROKER_ERROR, msg),
        AppError::Io(e) => error(code::INTERNAL_ERROR, e.to_string()),
        AppError::Config(msg) | AppError::Internal(msg) => error(code::INTERNAL_ERROR, msg),
    }
}
