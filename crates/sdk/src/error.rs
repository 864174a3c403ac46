//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// Gateway error codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const UNAUTHORIZED: i32 = 4010;
    pub const FORBIDDEN: i32 = 4030;
}

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("Not authenticated: log in first or pass an access token")]
    MissingToken,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    pub fn code(&self) -> Option<i32> {
        match self {
            SdkError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(code::NOT_FOUND)
    }

    /// Missing, invalid or expired token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SdkError::MissingToken) || self.code() == Some(code::UNAUTHORIZED)
    }

    pub fn is_forbidden(&self) -> bool {
        self.code() == Some(code::FORBIDDEN)
    }
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        match e {
            jsonrpsee::core::ClientError::Call(call_err) => SdkError::Rpc {
                code: call_err.code(),
                message: call_err.message().to_string(),
            },
            jsonrpsee::core::ClientError::Transport(e) => {
                SdkError::Transport(format!("Transport error: {}", e))
            }
            jsonrpsee::core::ClientError::RestartNeeded(_) => {
                SdkError::Connection("Connection restart needed".to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => SdkError::Serialization(e),
            _ => SdkError::Other(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_helpers() {
        let not_found = SdkError::Rpc {
            code: code::NOT_FOUND,
            message: "Task t-1 not found".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_forbidden());

        assert!(SdkError::MissingToken.is_unauthorized());
        assert_eq!(SdkError::MissingToken.code(), None);
    }

    #[test]
    fn test_call_error_maps_to_rpc() {
        let err: SdkError = jsonrpsee::core::ClientError::Call(
            jsonrpsee::types::ErrorObjectOwned::owned(4030, "nope", None::<()>),
        )
        .into();
        assert!(err.is_forbidden());
        assert_eq!(err.to_string(), "RPC error (4030): nope");
    }
}
