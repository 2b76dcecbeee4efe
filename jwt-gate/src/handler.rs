//! token transport between HTTP headers and the request context
//!
//! A [JwtHandler] is built once per application. The web framework calls
//! [JwtHandler::before_request] when a request comes in, to decode the
//! token sent by the client and store it for the gates, then
//! [JwtHandler::after_request] before the response leaves, to send back a
//! refreshed token.
use http::{HeaderMap, HeaderName, HeaderValue};
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::Deserialize;
use serde_json::Value;
use std::convert::TryFrom;
use std::fmt;

use crate::context::TokenStore;
use crate::crypto::{Algorithm, SigningKey};
use crate::error;
use crate::time;
use crate::token::{coder, Token, TokenBuilder, Validation};

/// handler settings
///
/// keys are not part of the configuration, they are given to
/// [JwtHandler::new] directly
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub algorithm: Algorithm,
    /// seconds until an encoded token expires, 0 to never expire
    pub lifespan: u64,
    /// issuers stamped on new tokens and accepted on decoding
    pub issuer: Vec<String>,
    /// audiences stamped on new tokens and accepted on decoding
    pub audience: Vec<String>,
    /// seconds of clock skew tolerated on `exp` and `nbf`
    pub leeway: u64,
    /// verify signatures and claims, turn off only to inspect tokens
    pub verify: bool,
    /// send a refreshed token with every response
    pub auto_update: bool,
    pub header_name: String,
    pub bearer_prefix: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            algorithm: Algorithm::HS256,
            lifespan: 3600,
            issuer: Vec::new(),
            audience: Vec::new(),
            leeway: 0,
            verify: true,
            auto_update: false,
            header_name: "Authorization".to_string(),
            bearer_prefix: "Bearer ".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn new() -> Self {
        JwtConfig::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_lifespan(mut self, seconds: u64) -> Self {
        self.lifespan = seconds;
        self
    }

    pub fn with_issuer<I, S>(mut self, issuer: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issuer = issuer.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_audience<I, S>(mut self, audience: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.audience = audience.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    pub fn with_header_name(mut self, name: &str) -> Self {
        self.header_name = name.to_string();
        self
    }

    pub fn with_bearer_prefix(mut self, prefix: &str) -> Self {
        self.bearer_prefix = prefix.to_string();
        self
    }
}

/// encodes and decodes tokens with one key and one algorithm
#[derive(Clone)]
pub struct JwtHandler {
    config: JwtConfig,
    lifespan: i64,
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: HeaderName,
    validation: Validation,
}

impl JwtHandler {
    /// fails if the key cannot sign with the configured algorithm, if the
    /// lifespan does not fit a timestamp, or if the header name is not a
    /// valid HTTP header name
    pub fn new<K: Into<SigningKey>>(config: JwtConfig, key: K) -> Result<Self, error::Config> {
        let key = key.into();
        if !key.supports(config.algorithm) {
            return Err(error::Config::UnsupportedKey(config.algorithm.to_string()));
        }

        let lifespan = i64::try_from(config.lifespan)
            .map_err(|_| error::Config::OutOfRange("lifespan".to_string()))?;

        let header = HeaderName::from_bytes(config.header_name.as_bytes())
            .map_err(|_| error::Config::InvalidHeaderName(config.header_name.clone()))?;

        Ok(JwtHandler {
            lifespan,
            encoding: key.encoding_key()?,
            decoding: key.verifying_key().decoding_key(),
            header,
            validation: validation(&config),
            config,
        })
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// signs a token
    ///
    /// `exp` is set from the lifespan. `iss`, `aud` and `nbf` are only set
    /// when the token does not carry them already.
    pub fn encode(&self, token: &Token, not_before: Option<i64>) -> Result<String, error::Jwt> {
        let mut token = token.clone();

        if self.lifespan > 0 {
            let exp = time::now().saturating_add(self.lifespan);
            tracing::debug!(exp = %time::print(exp), "encoding token");
            token.insert("exp", exp);
        }
        if !token.contains("iss") {
            if let Some(issuer) = one_or_many(&self.config.issuer) {
                token.insert("iss", issuer);
            }
        }
        if !token.contains("aud") {
            if let Some(audience) = one_or_many(&self.config.audience) {
                token.insert("aud", audience);
            }
        }
        if let Some(nbf) = not_before {
            if !token.contains("nbf") {
                token.insert("nbf", nbf);
            }
        }

        coder::encode(&token, &self.encoding, self.config.algorithm)
    }

    pub fn decode(&self, token: &str) -> Result<Token, error::Jwt> {
        coder::decode(token, &self.decoding, &self.validation)
    }

    /// extracts the compact token from a header value
    ///
    /// accepts `<prefix><token>` and a bare token. Any other scheme, or a
    /// prefix followed by nothing, is rejected.
    pub fn extract_bearer<'a>(&self, value: &'a str) -> Result<&'a str, error::Validation> {
        let value = value.trim();
        let prefix = self.config.bearer_prefix.trim_end();

        let token = match value.get(..prefix.len()) {
            Some(scheme) if !prefix.is_empty() && scheme.eq_ignore_ascii_case(prefix) => {
                let rest = &value[prefix.len()..];
                if !rest.starts_with(char::is_whitespace) {
                    return Err(error::Validation::InvalidBearer);
                }
                rest.trim_start()
            }
            _ => value,
        };

        if token.is_empty() || token.contains(char::is_whitespace) {
            return Err(error::Validation::InvalidBearer);
        }

        Ok(token)
    }

    /// decodes the token sent with a request and stores it
    ///
    /// a missing or empty header leaves the store untouched
    pub fn before_request<S: TokenStore + ?Sized>(
        &self,
        headers: &HeaderMap,
        store: &mut S,
    ) -> Result<(), error::Jwt> {
        let value = match headers.get(&self.header) {
            Some(value) => value,
            None => return Ok(()),
        };
        let value = value
            .to_str()
            .map_err(|_| error::Validation::InvalidBearer)?;
        if value.trim().is_empty() {
            return Ok(());
        }

        let token = self.decode(self.extract_bearer(value)?).map_err(|e| {
            tracing::debug!(error = %e, "rejected request token");
            e
        })?;

        tracing::debug!(claims = %token, "stored request token");
        store.set(token);
        Ok(())
    }

    /// sends the current token back with a fresh expiration
    ///
    /// only when `auto_update` is on and the request holds a token,
    /// otherwise the headers are left as they are
    pub fn after_request<S: TokenStore + ?Sized>(
        &self,
        store: &S,
        headers: &mut HeaderMap,
    ) -> Result<(), error::Jwt> {
        if !self.config.auto_update {
            return Ok(());
        }
        let token = match store.get() {
            Some(token) => token,
            None => return Ok(()),
        };

        let encoded = self.encode(token, None)?;
        let value = HeaderValue::from_str(&format!("{}{}", self.config.bearer_prefix, encoded))
            .map_err(|e| error::Jwt::Encode(e.to_string()))?;
        headers.insert(self.header.clone(), value);

        tracing::debug!("refreshed response token");
        Ok(())
    }

    /// builds a new token and stores it for the current request, so it is
    /// sent with the response
    pub fn generate_token<S: TokenStore + ?Sized>(&self, store: &mut S, builder: TokenBuilder) {
        let token = builder.build();
        tracing::debug!(claims = %token, "generated token");
        store.set(token);
    }

    /// the token stored for the current request
    pub fn current_token<'a, S: TokenStore + ?Sized>(&self, store: &'a S) -> Option<&'a Token> {
        store.get()
    }
}

impl fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("config", &self.config)
            .field("header", &self.header)
            .finish()
    }
}

/// claim checks for the configured algorithm
///
/// `exp` and `nbf` are checked when present. Accepted issuers and
/// audiences make the claim mandatory. A token carrying `aud` is rejected
/// when no audience is configured.
fn validation(config: &JwtConfig) -> Validation {
    let mut validation = Validation::new(config.algorithm.into());
    validation.required_spec_claims.clear();

    if !config.verify {
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        return validation;
    }

    // the leeway is subtracted from the current time
    let now = u64::try_from(time::now()).unwrap_or(0);
    validation.leeway = config.leeway.min(now);
    validation.validate_nbf = true;

    if !config.issuer.is_empty() {
        validation.set_issuer(&config.issuer);
        validation.required_spec_claims.insert("iss".to_string());
    }
    if !config.audience.is_empty() {
        validation.set_audience(&config.audience);
        validation.required_spec_claims.insert("aud".to_string());
    }

    validation
}

fn one_or_many(values: &[String]) -> Option<Value> {
    match values {
        [] => None,
        [one] => Some(Value::String(one.clone())),
        many => Some(Value::from(many.to_vec())),
    }
}
