//! compact JWT serialization
//!
//! `base64url(header) "." base64url(claims) "." base64url(signature)`,
//! produced and checked by `jsonwebtoken`. This module adds the claim map
//! conversion and maps its errors into ours.
use jsonwebtoken::{DecodingKey, EncodingKey, Header};
use serde_json::{Map, Value};

use super::{Token, Validation};
use crate::crypto::Algorithm;
use crate::error;

/// signs a token
pub fn encode(token: &Token, key: &EncodingKey, algorithm: Algorithm) -> Result<String, error::Jwt> {
    jsonwebtoken::encode(&Header::new(algorithm.into()), token, key).map_err(|e| {
        match error::Jwt::from(e) {
            error::Jwt::Format(f) => error::Jwt::Encode(f.to_string()),
            other => other,
        }
    })
}

/// verifies and decodes a token
///
/// the header's `alg` must be one of the validation's algorithms, then the
/// signature and the claims are checked as configured in `validation`
pub fn decode(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<Token, error::Jwt> {
    if token.split('.').count() != 3 {
        return Err(error::Format::InvalidStructure.into());
    }

    let data = jsonwebtoken::decode::<Map<String, Value>>(token, key, validation)?;
    let token = Token::from(data.claims);

    // a timestamp that is not an integer would be skipped by the checks above
    if validation.validate_exp {
        integer_claim(&token, "exp")?;
    }
    if validation.validate_nbf {
        integer_claim(&token, "nbf")?;
    }

    Ok(token)
}

fn integer_claim(token: &Token, claim: &str) -> Result<(), error::Validation> {
    match token.get(claim) {
        None | Some(Value::Null) => Ok(()),
        Some(value) if value.is_u64() => Ok(()),
        Some(_) => Err(error::Validation::InvalidNumericClaim(claim.to_string())),
    }
}
