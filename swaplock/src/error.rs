use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// Malformed or out-of-range input. Always raised before any cryptographic work.
    Validation { field: &'static str, reason: String },
    /// A private or public key is not valid for secp256k1.
    Cryptographic(String),
    /// An internal derivation step failed. Indicates a defect rather than bad input.
    Construction(String),
}

impl SwapError {
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        SwapError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending input, if this is a validation failure.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SwapError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapError::Validation { field, reason } => write!(f, "invalid {field}: {reason}"),
            SwapError::Cryptographic(msg) => write!(f, "cryptographic error: {msg}"),
            SwapError::Construction(msg) => write!(f, "construction error: {msg}"),
        }
    }
}

impl std::error::Error for SwapError {}

impl From<bitcoin::secp256k1::Error> for SwapError {
    fn from(error: bitcoin::secp256k1::Error) -> Self {
        SwapError::Cryptographic(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = SwapError::validation("prevTxId", "must be 64 hex characters");
        assert_eq!(err.to_string(), "invalid prevTxId: must be 64 hex characters");
        assert_eq!(err.field(), Some("prevTxId"));
    }

    #[test]
    fn test_secp_error_is_cryptographic() {
        let err: SwapError = bitcoin::secp256k1::Error::InvalidSecretKey.into();
        assert!(matches!(err, SwapError::Cryptographic(_)));
        assert_eq!(err.field(), None);
    }
}
