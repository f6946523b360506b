//! Inbound-message pattern extraction
//!
//! Deterministic matching only: a body either contains the brand literal,
//! the label, and a numeric group of exactly the configured length, or it
//! yields nothing. No fuzzy or partial matches.

use serde::{Deserialize, Serialize};

/// Default length of the numeric code group
pub const DEFAULT_CODE_LEN: usize = 6;

/// Pattern an inbound message body must satisfy to yield a code
///
/// Matching is case-sensitive and ordered: the brand literal first, the
/// label somewhere after it, then the code group immediately after any
/// whitespace following the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpPattern {
    /// Fixed brand literal that must open the match
    pub brand: String,
    /// Label that precedes the numeric group
    pub label: String,
    /// Exact number of ASCII digits in the code
    pub code_len: usize,
}

impl Default for OtpPattern {
    fn default() -> Self {
        Self {
            brand: "Brand:".to_string(),
            label: "code is".to_string(),
            code_len: DEFAULT_CODE_LEN,
        }
    }
}

impl OtpPattern {
    /// Create a pattern with an explicit code length
    pub fn new(brand: impl Into<String>, label: impl Into<String>, code_len: usize) -> Self {
        Self {
            brand: brand.into(),
            label: label.into(),
            code_len,
        }
    }

    /// Extract the code from a message body, if the body matches
    ///
    /// Returns `None` for any body that does not satisfy the full pattern;
    /// a non-match has no side effect and is not an error.
    pub fn extract(&self, body: &str) -> Option<String> {
        if self.code_len == 0 {
            return None;
        }

        let after_brand = &body[body.find(self.brand.as_str())? + self.brand.len()..];
        let after_label = &after_brand[after_brand.find(self.label.as_str())? + self.label.len()..];
        let candidate = after_label.trim_start();

        let code: String = candidate
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if code.len() != self.code_len {
            return None;
        }

        Some(code)
    }
}
