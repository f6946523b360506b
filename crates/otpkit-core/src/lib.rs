//! Otpkit domain core
//!
//! This crate implements the shared domain model for one-time-passcode
//! capture: device capabilities and their canonical permission statuses,
//! the inbound-message pattern extractor, and the platform
//! authorization-token derivation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app_hash;
pub mod capability;
pub mod error;
pub mod pattern;

pub use app_hash::{authorization_token, SigningInfo, AUTH_TOKEN_LEN};
pub use capability::{
    Capability, PermissionRequestOutcome, PermissionState, PermissionStatus,
};
pub use error::{Error, Result};
pub use pattern::{OtpPattern, DEFAULT_CODE_LEN};
