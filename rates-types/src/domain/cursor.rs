//! Transport-safe encoding of the store's continuation key.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::domain::date::DateInt;
use crate::error::DomainError;

/// The store's native "continue from here" key: the hash key and range
/// key of the last evaluated row. Opaque to every caller outside this
/// module once encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageKey {
    pub base_currency: String,
    pub date: DateInt,
}

impl PageKey {
    pub fn new(base_currency: impl Into<String>, date: DateInt) -> Self {
        Self {
            base_currency: base_currency.into(),
            date,
        }
    }

    /// URL-safe token handed to API callers.
    pub fn to_token(&self) -> String {
        let json = serde_json::to_vec(self).expect("PageKey is always serializable");
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Exact inverse of [`Self::to_token`]. A malformed token is a caller
    /// mistake, surfaced as a validation failure rather than a crash.
    pub fn from_token(token: &str) -> Result<Self, DomainError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| DomainError::BadPageToken)?;
        serde_json::from_slice(&bytes).map_err(|_| DomainError::BadPageToken)
    }
}
