//! RSA keys for the `RS*` and `PS*` algorithms, loaded from PEM
use crate::error;

use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fmt;

/// private and public RSA keys
#[derive(Clone)]
pub struct RsaKeyPair {
    encoding: EncodingKey,
    public: RsaPublicKey,
}

impl RsaKeyPair {
    /// loads a PKCS#1 or PKCS#8 private key and its public key
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, error::Config> {
        let encoding = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| error::Config::InvalidKey(e.to_string()))?;

        Ok(RsaKeyPair {
            encoding,
            public: RsaPublicKey::from_pem(public_pem)?,
        })
    }

    pub fn public(&self) -> RsaPublicKey {
        self.public.clone()
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        self.encoding.clone()
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaKeyPair(..)")
    }
}

/// RSA key verifying tokens signed by a [RsaKeyPair]
#[derive(Clone)]
pub struct RsaPublicKey(DecodingKey);

impl RsaPublicKey {
    pub fn from_pem(pem: &[u8]) -> Result<Self, error::Config> {
        DecodingKey::from_rsa_pem(pem)
            .map(RsaPublicKey)
            .map_err(|e| error::Config::InvalidKey(e.to_string()))
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        self.0.clone()
    }
}

impl fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaPublicKey(..)")
    }
}
