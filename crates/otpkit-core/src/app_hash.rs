//! Platform message-authorization token (app hash)
//!
//! The OS only delivers an inbound message to a registered listener when
//! the message body carries a token derived from the app's package name
//! and signing certificate. The derivation itself is owned by the OS
//! vendor; we implement the published scheme over signing info supplied by
//! the host and treat the result as opaque.

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the authorization token in characters
pub const AUTH_TOKEN_LEN: usize = 11;

// The vendor scheme hashes "<package> <signature>" and keeps this many
// leading digest bytes before encoding.
const HASH_PREFIX_BYTES: usize = 9;

/// App identity inputs for token derivation
///
/// `signature` is the hex digest of the app's signing certificate as
/// reported by the host platform. Unsigned development builds have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningInfo {
    /// Application package / bundle identifier
    pub package_name: String,
    /// Hex digest of the signing certificate
    pub signature: String,
}

/// Derive the authorization token for outbound verification messages
///
/// Returns `""` when signing info is absent (expected on development
/// builds); the caller must then tell the user to enter the code manually.
/// This is a degraded mode, not a failure.
pub fn authorization_token(signing: Option<&SigningInfo>) -> String {
    let Some(signing) = signing else {
        tracing::debug!("No signing info available, authorization token degraded to empty");
        return String::new();
    };

    let mut hasher = Sha256::new();
    hasher.update(signing.package_name.as_bytes());
    hasher.update(b" ");
    hasher.update(signing.signature.as_bytes());
    let digest = hasher.finalize();

    let mut token =
        base64::engine::general_purpose::STANDARD.encode(&digest[..HASH_PREFIX_BYTES]);
    token.truncate(AUTH_TOKEN_LEN);
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signing() -> SigningInfo {
        SigningInfo {
            package_name: "com.example.app".to_string(),
            signature: "30820122300d06092a864886f70d".to_string(),
        }
    }

    #[test]
    fn token_has_fixed_length() {
        let token = authorization_token(Some(&signing()));
        assert_eq!(token.len(), AUTH_TOKEN_LEN);
    }

    #[test]
    fn token_is_deterministic() {
        let a = authorization_token(Some(&signing()));
        let b = authorization_token(Some(&signing()));
        assert_eq!(a, b);
    }

    #[test]
    fn token_depends_on_identity() {
        let other = SigningInfo {
            package_name: "com.example.other".to_string(),
            ..signing()
        };
        assert_ne!(
            authorization_token(Some(&signing())),
            authorization_token(Some(&other))
        );
    }

    #[test]
    fn missing_signing_info_degrades_to_empty() {
        assert_eq!(authorization_token(None), "");
    }
}
