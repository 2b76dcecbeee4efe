//! decoded claim sets and their compact JWT form
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::TryFrom;
use std::fmt;

use crate::error;

pub mod builder;
pub mod coder;

pub use builder::TokenBuilder;
pub use jsonwebtoken::Validation;

/// claim holding the token's scopes
pub const SCOPES: &str = "scopes";
/// shorter scope claim, read when `scopes` is absent
pub const SCP: &str = "scp";

/// a decoded token: claim names mapped to JSON values, in insertion order
///
/// the reserved claims (`exp`, `iat`, `nbf`, `iss`, `aud`, `scopes`/`scp`)
/// have typed accessors, any other claim is reachable through [Token::get]
/// or a `jwt:` path reference
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token {
    claims: Map<String, Value>,
}

impl Token {
    /// creates an empty token
    pub fn new() -> Self {
        Token::default()
    }

    /// starts a new token with `iat` set at build time
    pub fn builder() -> TokenBuilder {
        TokenBuilder::new()
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }

    pub fn contains(&self, claim: &str) -> bool {
        self.claims.contains_key(claim)
    }

    /// sets a claim, returning the previous value
    pub fn insert<V: Into<Value>>(&mut self, claim: &str, value: V) -> Option<Value> {
        self.claims.insert(claim.to_string(), value.into())
    }

    pub fn remove(&mut self, claim: &str) -> Option<Value> {
        self.claims.remove(claim)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn into_claims(self) -> Map<String, Value> {
        self.claims
    }

    /// looks up a JSON pointer (`/a/b/0`) inside the claims
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return None;
        }
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        let key = head.replace("~1", "/").replace("~0", "~");
        self.claims.get(&key)?.pointer(tail)
    }

    /// the scopes the token was granted
    ///
    /// read from `scopes`, or from `scp` when `scopes` is absent. Non string
    /// entries are ignored, a missing claim is an empty list.
    pub fn scopes(&self) -> Vec<&str> {
        let claim = self.claims.get(SCOPES).or_else(|| self.claims.get(SCP));
        match claim {
            Some(Value::Array(scopes)) => scopes.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(scope)) => vec![scope.as_str()],
            _ => Vec::new(),
        }
    }

    /// expiration time, in seconds since the UNIX epoch
    pub fn expires_at(&self) -> Result<Option<i64>, error::Validation> {
        self.numeric("exp")
    }

    pub fn issued_at(&self) -> Result<Option<i64>, error::Validation> {
        self.numeric("iat")
    }

    pub fn not_before(&self) -> Result<Option<i64>, error::Validation> {
        self.numeric("nbf")
    }

    /// issuers, whether `iss` holds one string or a list of them
    pub fn issuer(&self) -> Vec<&str> {
        string_or_list(self.claims.get("iss"))
    }

    /// audiences, whether `aud` holds one string or a list of them
    pub fn audience(&self) -> Vec<&str> {
        string_or_list(self.claims.get("aud"))
    }

    // timestamps may come as floats from other JWT libraries
    fn numeric(&self, claim: &str) -> Result<Option<i64>, error::Validation> {
        match self.claims.get(claim) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| error::Validation::InvalidNumericClaim(claim.to_string())),
            Some(_) => Err(error::Validation::InvalidNumericClaim(claim.to_string())),
        }
    }
}

fn string_or_list(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

impl From<Map<String, Value>> for Token {
    fn from(claims: Map<String, Value>) -> Self {
        Token { claims }
    }
}

impl TryFrom<Value> for Token {
    type Error = error::Format;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(claims) => Ok(Token { claims }),
            _ => Err(error::Format::ClaimsNotAnObject),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let claims = self.claims.keys().map(String::as_str).collect::<Vec<_>>();
        write!(f, "Token {{ claims: [{}] }}", claims.join(", "))
    }
}
