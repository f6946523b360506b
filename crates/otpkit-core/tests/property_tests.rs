//! Property tests for the pattern extractor and token derivation

use otpkit_core::{authorization_token, OtpPattern, SigningInfo, AUTH_TOKEN_LEN};
use proptest::prelude::*;

proptest! {
    /// Extraction never panics, and any value it returns has exactly the
    /// configured length and is all ASCII digits.
    #[test]
    fn extract_never_panics_and_respects_length(
        body in ".{0,200}",
        code_len in 1usize..12,
    ) {
        let pattern = OtpPattern::new("Brand:", "code is", code_len);
        if let Some(code) = pattern.extract(&body) {
            prop_assert_eq!(code.len(), code_len);
            prop_assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    /// A well-formed body always yields its code regardless of what
    /// surrounds the match.
    #[test]
    fn well_formed_bodies_always_match(
        prefix in "[a-zA-Z ]{0,20}",
        suffix in "[a-zA-Z .!]{0,20}",
        code in proptest::collection::vec(0u8..10, 6),
    ) {
        let code: String = code.iter().map(|d| char::from(b'0' + d)).collect();
        let body = format!("{prefix}Brand: Your code is {code}{suffix}");
        let pattern = OtpPattern::default();
        prop_assert_eq!(pattern.extract(&body), Some(code));
    }

    /// Token derivation never panics and always yields either empty or a
    /// fixed-length token.
    #[test]
    fn token_is_empty_or_fixed_length(
        package in "[a-z.]{0,40}",
        signature in "[0-9a-f]{0,64}",
    ) {
        let info = SigningInfo { package_name: package, signature };
        let token = authorization_token(Some(&info));
        prop_assert_eq!(token.len(), AUTH_TOKEN_LEN);
    }
}
