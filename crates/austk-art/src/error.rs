use thiserror::Error;

/// Error taxonomy shared across the node.
///
/// Every failure surfaces as one of these kinds so callers can map it without
/// inspecting messages: the HTTP layer maps kinds to status codes, the sync
/// loop logs and continues, startup treats `ConfigMismatch` and
/// `StorageCorruption` as fatal.
#[derive(Error, Debug)]
pub enum ArtError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("payment required")]
    PaymentRequired,

    #[error("invalid payment: {0}")]
    PaymentInvalid(String),

    #[error("configuration mismatch: {0}")]
    ConfigMismatch(String),

    #[error("storage corruption: {0}")]
    StorageCorruption(String),

    #[error("transient i/o: {0}")]
    TransientIo(String),
}

impl ArtError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ArtError::NotFound(what.into())
    }

    /// True for failures a retry might clear; false for protocol violations.
    pub fn is_transient(&self) -> bool {
        matches!(self, ArtError::TransientIo(_))
    }
}

impl From<std::io::Error> for ArtError {
    fn from(err: std::io::Error) -> Self {
        ArtError::TransientIo(err.to_string())
    }
}
