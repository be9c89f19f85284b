//! Error types for the coordination engine

use thiserror::Error;

/// Main error type for hashing, encoding and signing operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Malformed payload: expected {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },

    #[error("Invalid address {value}: {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error("Signing failure during {operation}: {message}")]
    SigningFailure { operation: String, message: String },

    #[error("Inconsistent proposal: {0}")]
    InconsistentProposal(String),

    #[error("Missing signer capability: {0}")]
    MissingCapability(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network {0} not found in deployment registry")]
    UnknownNetwork(String),
}

impl CoordinationError {
    /// Check if error is retryable. Always false; retries belong to the
    /// caller's transport.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Check if error was caused by malformed caller input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoordinationError::Decode(_)
                | CoordinationError::MalformedPayload { .. }
                | CoordinationError::InvalidAddress { .. }
                | CoordinationError::InconsistentProposal(_)
        )
    }

    pub(crate) fn signing(operation: &str, message: impl ToString) -> Self {
        CoordinationError::SigningFailure {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<hex::FromHexError> for CoordinationError {
    fn from(e: hex::FromHexError) -> Self {
        CoordinationError::Decode(e.to_string())
    }
}

/// Result type for coordination operations
pub type CoordinationResult<T> = Result<T, CoordinationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_error_is_retryable() {
        let errors = [
            CoordinationError::Decode("bad".to_string()),
            CoordinationError::MalformedPayload { expected: 128, actual: 3 },
            CoordinationError::signing("sign_intent", "rejected"),
            CoordinationError::MissingCapability("account".to_string()),
        ];
        assert!(errors.iter().all(|e| !e.is_retryable()));
    }

    #[test]
    fn test_input_errors() {
        assert!(CoordinationError::Decode("x".to_string()).is_input_error());
        assert!(CoordinationError::InvalidAddress {
            value: "0x12".to_string(),
            reason: "expected 20 bytes, got 1".to_string(),
        }
        .is_input_error());
        assert!(!CoordinationError::signing("address", "timeout").is_input_error());
    }

    #[test]
    fn test_hex_error_maps_to_decode() {
        let err: CoordinationError = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, CoordinationError::Decode(_)));
    }
}
