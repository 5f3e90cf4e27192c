//! Secret values
//!
//! [`Secret`] marks plaintext that must never reach logs or manifests. Its
//! `Debug`, `Display` and `Serialize` impls print a placeholder, and the
//! buffer is zeroed on drop.

use std::fmt;

use serde::{Serialize, Serializer};
use zeroize::Zeroizing;

/// Placeholder printed in place of secret values
pub const REDACTED: &str = "[secret]";

/// Plaintext marked as secret
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Mark `value` as secret
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// The plaintext
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the plaintext is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&REDACTED).finish()
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_prints_plaintext() {
        let secret = Secret::new("apiVersion: v1\nkind: Config");
        assert!(!format!("{secret:?}").contains("apiVersion"));
        assert_eq!(secret.to_string(), REDACTED);
        assert_eq!(
            serde_json::to_value(&secret).unwrap(),
            serde_json::json!(REDACTED)
        );
        assert_eq!(secret.expose(), "apiVersion: v1\nkind: Config");
    }

    #[test]
    fn default_is_empty() {
        assert!(Secret::default().is_empty());
        assert_eq!(Secret::default(), Secret::new(""));
    }
}
