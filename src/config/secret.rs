//! Credential handling for the store API token
//!
//! The token is kept in a `secrecy::Secret`, which zeroes memory on drop
//! and redacts `Debug` output. Call `expose_secret()` only where the value
//! is put on the wire.
//!
//! ```rust
//! use record_importer::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("api-token".to_string());
//! assert_eq!(token.expose_secret().as_ref(), "api-token");
//! assert!(!format!("{token:?}").contains("api-token"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String wrapper that satisfies the `secrecy` marker traits
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SecretValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string: zeroed on drop, redacted in `Debug`
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_debug_is_redacted() {
        let token = secret_string("tok-abc".to_string());
        let debug_output = format!("{token:?}");
        assert!(!debug_output.contains("tok-abc"));
    }

    #[test]
    fn test_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Section {
            api_token: SecretString,
        }

        let section: Section = toml::from_str("api_token = \"tok-abc\"").unwrap();
        assert_eq!(section.api_token.expose_secret(), "tok-abc");
        assert!(!section.api_token.expose_secret().is_empty());
    }
}
