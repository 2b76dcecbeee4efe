//! cryptographic operations
//!
//! Tokens are signed as JWS compact serializations, with a shared secret
//! (HMAC-SHA2), an RSA key pair or an Ed25519 key pair. Signing and
//! verification are done by `jsonwebtoken`, this module only turns our keys
//! into its `EncodingKey`/`DecodingKey`.
mod ed25519;
pub(crate) mod rsa;
mod secret;

pub use ed25519::{KeyPair, PrivateKey, PublicKey};
pub use rsa::{RsaKeyPair, RsaPublicKey};
pub use secret::Secret;

use crate::error;
use core::fmt::Display;
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::{
    convert::{TryFrom, TryInto},
    str::FromStr,
};

/// signing algorithm, as written in the `alg` header
#[derive(Debug, Copy, Clone, PartialEq, Hash, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    EdDSA,
}

impl Algorithm {
    pub fn is_hmac(&self) -> bool {
        matches!(self, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
    }

    pub fn is_rsa(&self) -> bool {
        matches!(
            self,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        )
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::HS256
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::HS256 => write!(f, "HS256"),
            Algorithm::HS384 => write!(f, "HS384"),
            Algorithm::HS512 => write!(f, "HS512"),
            Algorithm::RS256 => write!(f, "RS256"),
            Algorithm::RS384 => write!(f, "RS384"),
            Algorithm::RS512 => write!(f, "RS512"),
            Algorithm::PS256 => write!(f, "PS256"),
            Algorithm::PS384 => write!(f, "PS384"),
            Algorithm::PS512 => write!(f, "PS512"),
            Algorithm::EdDSA => write!(f, "EdDSA"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = error::Config;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.try_into()
    }
}

impl TryFrom<&str> for Algorithm {
    type Error = error::Config;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            "RS256" => Ok(Algorithm::RS256),
            "RS384" => Ok(Algorithm::RS384),
            "RS512" => Ok(Algorithm::RS512),
            "PS256" => Ok(Algorithm::PS256),
            "PS384" => Ok(Algorithm::PS384),
            "PS512" => Ok(Algorithm::PS512),
            "EdDSA" => Ok(Algorithm::EdDSA),
            _ => Err(error::Config::UnknownAlgorithm(value.to_string())),
        }
    }
}

impl From<Algorithm> for jsonwebtoken::Algorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::HS256 => jsonwebtoken::Algorithm::HS256,
            Algorithm::HS384 => jsonwebtoken::Algorithm::HS384,
            Algorithm::HS512 => jsonwebtoken::Algorithm::HS512,
            Algorithm::RS256 => jsonwebtoken::Algorithm::RS256,
            Algorithm::RS384 => jsonwebtoken::Algorithm::RS384,
            Algorithm::RS512 => jsonwebtoken::Algorithm::RS512,
            Algorithm::PS256 => jsonwebtoken::Algorithm::PS256,
            Algorithm::PS384 => jsonwebtoken::Algorithm::PS384,
            Algorithm::PS512 => jsonwebtoken::Algorithm::PS512,
            Algorithm::EdDSA => jsonwebtoken::Algorithm::EdDSA,
        }
    }
}

/// key material used to sign tokens
#[derive(Debug, Clone)]
pub enum SigningKey {
    Hmac(Secret),
    Rsa(RsaKeyPair),
    Ed25519(KeyPair),
}

impl SigningKey {
    pub fn encoding_key(&self) -> Result<EncodingKey, error::Config> {
        match self {
            SigningKey::Hmac(secret) => Ok(secret.encoding_key()),
            SigningKey::Rsa(keypair) => Ok(keypair.encoding_key()),
            SigningKey::Ed25519(keypair) => keypair.encoding_key(),
        }
    }

    /// the key that verifies signatures made by this one
    pub fn verifying_key(&self) -> VerifyingKey {
        match self {
            SigningKey::Hmac(secret) => VerifyingKey::Hmac(secret.clone()),
            SigningKey::Rsa(keypair) => VerifyingKey::Rsa(keypair.public()),
            SigningKey::Ed25519(keypair) => VerifyingKey::Ed25519(keypair.public()),
        }
    }

    pub fn supports(&self, algorithm: Algorithm) -> bool {
        match self {
            SigningKey::Hmac(_) => algorithm.is_hmac(),
            SigningKey::Rsa(_) => algorithm.is_rsa(),
            SigningKey::Ed25519(_) => algorithm == Algorithm::EdDSA,
        }
    }
}

impl From<Secret> for SigningKey {
    fn from(secret: Secret) -> Self {
        SigningKey::Hmac(secret)
    }
}

impl From<RsaKeyPair> for SigningKey {
    fn from(keypair: RsaKeyPair) -> Self {
        SigningKey::Rsa(keypair)
    }
}

impl From<KeyPair> for SigningKey {
    fn from(keypair: KeyPair) -> Self {
        SigningKey::Ed25519(keypair)
    }
}

/// key material used to verify token signatures
#[derive(Debug, Clone)]
pub enum VerifyingKey {
    Hmac(Secret),
    Rsa(RsaPublicKey),
    Ed25519(PublicKey),
}

impl VerifyingKey {
    pub fn decoding_key(&self) -> DecodingKey {
        match self {
            VerifyingKey::Hmac(secret) => secret.decoding_key(),
            VerifyingKey::Rsa(public) => public.decoding_key(),
            VerifyingKey::Ed25519(public) => public.decoding_key(),
        }
    }
}

impl From<Secret> for VerifyingKey {
    fn from(secret: Secret) -> Self {
        VerifyingKey::Hmac(secret)
    }
}

impl From<RsaPublicKey> for VerifyingKey {
    fn from(public: RsaPublicKey) -> Self {
        VerifyingKey::Rsa(public)
    }
}

impl From<PublicKey> for VerifyingKey {
    fn from(public: PublicKey) -> Self {
        VerifyingKey::Ed25519(public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names() {
        for alg in &[
            Algorithm::HS256,
            Algorithm::HS384,
            Algorithm::HS512,
            Algorithm::RS256,
            Algorithm::RS384,
            Algorithm::RS512,
            Algorithm::PS256,
            Algorithm::PS384,
            Algorithm::PS512,
            Algorithm::EdDSA,
        ] {
            assert_eq!(alg.to_string().parse::<Algorithm>().unwrap(), *alg);
            assert_eq!(
                format!("{:?}", jsonwebtoken::Algorithm::from(*alg)),
                alg.to_string()
            );
        }
        assert_eq!(
            "ES256".parse::<Algorithm>(),
            Err(error::Config::UnknownAlgorithm("ES256".to_string()))
        );
    }

    #[test]
    fn keys_support_their_own_family() {
        let key = SigningKey::from(KeyPair::new());
        assert!(key.supports(Algorithm::EdDSA));
        assert!(!key.supports(Algorithm::HS256));
        assert!(key.encoding_key().is_ok());

        let key = SigningKey::from(Secret::new("secret"));
        assert!(key.supports(Algorithm::HS512));
        assert!(!key.supports(Algorithm::RS256));

        let key = SigningKey::from(rsa::tests::keypair());
        assert!(key.supports(Algorithm::RS256));
        assert!(key.supports(Algorithm::PS512));
        assert!(!key.supports(Algorithm::EdDSA));
        assert!(matches!(key.verifying_key(), VerifyingKey::Rsa(_)));
    }
}
