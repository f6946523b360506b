//! Error types for OTP capture
//!
//! Expected outcomes (denied, blocked, timeout) are modeled as status
//! values by the layers above, so the fallible surface is small: the only
//! thing that fails as an error is the native bridge itself.

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// OTP capture errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A failure surfaced from the native bridge
    #[error("Native API failure: {0}")]
    NativeApiFailure(String),
}
