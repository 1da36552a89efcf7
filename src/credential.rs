//! Session-only API key.
//!
//! The key lives in process memory for the duration of one session. It is
//! never serialized and never printed in clear: `Display` and `Debug` both
//! show a masked form.

use crate::error::AppError;
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept a user-supplied key. Surrounding whitespace is dropped; a blank key is rejected.
    pub fn new(key: &str) -> Result<Self, AppError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::MissingCredential);
        }
        Ok(Self(key.to_string()))
    }

    /// Raw key, for the outbound request only
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_api_key(&self.0)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.masked())
    }
}

/// Show only the first 4 characters; short keys are fully masked.
pub fn mask_api_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 8 {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}
