//! shared secrets for the HMAC algorithms
use crate::error;

use jsonwebtoken::{DecodingKey, EncodingKey};
use std::ops::Drop;
use zeroize::Zeroize;

/// HMAC key shared by the token issuer and verifier
#[derive(Clone, PartialEq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new<T: Into<Vec<u8>>>(secret: T) -> Self {
        Secret(secret.into())
    }

    /// deserializes from an hex-encoded string
    pub fn from_bytes_hex(str: &str) -> Result<Self, error::Config> {
        let bytes = hex::decode(str).map_err(|e| error::Config::InvalidKey(e.to_string()))?;
        Ok(Secret(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.0)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.0)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(..)")
    }
}

impl From<&str> for Secret {
    fn from(secret: &str) -> Self {
        Secret::new(secret)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_secret() {
        let secret = Secret::from_bytes_hex("736563726574").unwrap();
        assert_eq!(secret, Secret::from("secret"));
        assert_eq!(secret.as_bytes(), b"secret");
        assert!(matches!(
            Secret::from_bytes_hex("xyz"),
            Err(error::Config::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_hides_the_secret() {
        assert_eq!(format!("{:?}", Secret::new("hunter2")), "Secret(..)");
    }
}
