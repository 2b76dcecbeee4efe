//! helper to create new tokens
use serde_json::Value;

use super::{Token, SCOPES};

/// creates a [Token], usually to be stored in the request context and sent
/// back to the client
///
/// ```rust
/// use jwt_gate::Token;
///
/// let token = Token::builder()
///     .scopes(["read:thing", "write:thing"])
///     .issuer("issuer1")
///     .audience(vec!["aud1", "aud2"])
///     .claim("uuid", "123")
///     .build();
///
/// assert_eq!(token.scopes(), vec!["read:thing", "write:thing"]);
/// assert!(token.issued_at().unwrap().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenBuilder {
    token: Token,
    issued_at: Option<i64>,
}

impl TokenBuilder {
    pub fn new() -> Self {
        TokenBuilder::default()
    }

    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes = scopes
            .into_iter()
            .map(|s| Value::String(s.into()))
            .collect::<Vec<_>>();
        self.token.insert(SCOPES, scopes);
        self
    }

    /// a single issuer, or a list of them
    pub fn issuer<V: Into<Value>>(mut self, issuer: V) -> Self {
        self.token.insert("iss", issuer);
        self
    }

    /// a single audience, or a list of them
    pub fn audience<V: Into<Value>>(mut self, audience: V) -> Self {
        self.token.insert("aud", audience);
        self
    }

    pub fn not_before(mut self, timestamp: i64) -> Self {
        self.token.insert("nbf", timestamp);
        self
    }

    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.token.insert("exp", timestamp);
        self
    }

    /// overrides the issue time, which defaults to the time of [TokenBuilder::build]
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.issued_at = Some(timestamp);
        self
    }

    /// adds a custom claim
    pub fn claim<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.token.insert(name, value);
        self
    }

    pub fn build(self) -> Token {
        let mut token = self.token;
        token.insert("iat", self.issued_at.unwrap_or_else(crate::time::now));
        token
    }
}
