//! error types
//!

use std::fmt;
use thiserror::Error;

/// the global error type for jwt-gate
#[derive(Error, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Jwt {
    #[error("error deserializing or verifying the token: {0}")]
    Format(Format),
    #[error("the token failed validation: {0}")]
    Validation(Validation),
    #[error("invalid configuration: {0}")]
    Config(Config),
    #[error("access denied: {0}")]
    Gate(Gate),
    #[error("could not encode the token: {0}")]
    Encode(String),
}

impl Jwt {
    /// the response status a web framework should answer with
    ///
    /// every token or rule failure is a plain 403, the diagnostic is kept
    /// for logs and never sent to the client
    pub fn status(&self) -> http::StatusCode {
        match self {
            Jwt::Encode(_) | Jwt::Config(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::FORBIDDEN,
        }
    }

    /// true for errors caused by the token the client sent, as opposed to
    /// a missing token or a rule violation
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Jwt::Format(_) | Jwt::Validation(_))
    }
}

impl From<Format> for Jwt {
    fn from(e: Format) -> Self {
        Jwt::Format(e)
    }
}

impl From<Validation> for Jwt {
    fn from(e: Validation) -> Self {
        Jwt::Validation(e)
    }
}

impl From<Config> for Jwt {
    fn from(e: Config) -> Self {
        Jwt::Config(e)
    }
}

impl From<Gate> for Jwt {
    fn from(e: Gate) -> Self {
        Jwt::Gate(e)
    }
}

impl From<jsonwebtoken::errors::Error> for Jwt {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidToken => Format::InvalidStructure.into(),
            ErrorKind::InvalidSignature => {
                Format::Signature(Signature::InvalidSignature(e.to_string())).into()
            }
            ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingAlgorithm
            | ErrorKind::InvalidAlgorithmName => Format::InvalidAlgorithm.into(),
            ErrorKind::Base64(inner) => Format::Base64(inner.to_string()).into(),
            ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                Format::DeserializationError(e.to_string()).into()
            }
            ErrorKind::ExpiredSignature => Validation::Expired.into(),
            ErrorKind::ImmatureSignature => Validation::Immature.into(),
            ErrorKind::InvalidIssuer => Validation::InvalidIssuer.into(),
            ErrorKind::InvalidAudience => Validation::InvalidAudience.into(),
            ErrorKind::MissingRequiredClaim(claim) => Validation::MissingClaim(claim.clone()).into(),
            ErrorKind::InvalidKeyFormat | ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidRsaKey(_) => {
                Config::InvalidKey(e.to_string()).into()
            }
            _ => Jwt::Encode(e.to_string()),
        }
    }
}

/// Errors related to the token's serialization format or cryptographic
/// signature
#[derive(Error, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    #[error("the token must have three dot separated segments")]
    InvalidStructure,
    #[error("cannot decode base64 token: {0}")]
    Base64(String),
    #[error("could not deserialize the token header or claims")]
    DeserializationError(String),
    #[error("the claims must be a JSON object")]
    ClaimsNotAnObject,
    #[error("the token is not signed with the expected algorithm")]
    InvalidAlgorithm,
    #[error("failed verifying the signature")]
    Signature(Signature),
}

/// Signature errors
#[derive(Error, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Signature {
    #[error("the signature did not match")]
    InvalidSignature(String),
}

/// claim validation and transport errors, raised while decoding a token
/// from a request
#[derive(Error, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Validation {
    #[error("the token expired")]
    Expired,
    #[error("the token is not valid yet")]
    Immature,
    #[error("the {0} claim must be a number")]
    InvalidNumericClaim(String),
    #[error("the {0} claim is required")]
    MissingClaim(String),
    #[error("the token issuer is not accepted")]
    InvalidIssuer,
    #[error("the token audience is not accepted")]
    InvalidAudience,
    #[error("invalid bearer token")]
    InvalidBearer,
}

/// misconfiguration, detected when keys, handlers or rules are built
#[derive(Error, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Config {
    #[error("unknown path source `{0}`, expected one of header, json, body, url, param, form, jwt, token")]
    PathSource(String),
    #[error("path reference `{0}` must be written as source:pointer")]
    PathFormat(String),
    #[error("a value match needs at least two paths, got {0}")]
    TooFewPaths(usize),
    #[error("unknown signing algorithm {0}")]
    UnknownAlgorithm(String),
    #[error("this key cannot be used with {0}")]
    UnsupportedKey(String),
    #[error("invalid key size")]
    InvalidKeySize(usize),
    #[error("invalid key")]
    InvalidKey(String),
    #[error("invalid header name {0}")]
    InvalidHeaderName(String),
    #[error("{0} is out of range")]
    OutOfRange(String),
}

/// errors in rule evaluation
#[derive(Error, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Rule {
    #[error("the token is missing required scopes: {}", .0.join(", "))]
    MissingScopes(Vec<String>),
    #[error("nothing found at {0}")]
    PathLookup(String),
    #[error("{kind} failed: {}", print_failures(.failures))]
    Combinator {
        kind: Combinator,
        /// sub rules that did not pass, in evaluation order
        failures: Vec<FailedRule>,
    },
    #[error("{0}")]
    Custom(String),
}

fn print_failures(failures: &[FailedRule]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Combinator {
    AllOf,
    AnyOf,
    NoneOf,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Combinator::AllOf => write!(f, "AllOf"),
            Combinator::AnyOf => write!(f, "AnyOf"),
            Combinator::NoneOf => write!(f, "NoneOf"),
        }
    }
}

/// a rule that did not pass
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub struct FailedRule {
    /// position of the rule in its gate or combinator
    pub index: usize,
    /// pretty print of the rule that failed
    pub rule: String,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// the rule returned false
    Rejected,
    /// a rule under `NoneOf` passed
    Matched,
    /// a combinator rejected the request, the sub rules that did not pass
    /// are listed
    Nested {
        kind: Combinator,
        failures: Vec<FailedRule>,
    },
    /// the rule raised an error
    Error(Rule),
}

impl FailedRule {
    /// the innermost rules responsible for this failure, in evaluation
    /// order
    pub fn leaves(&self) -> Vec<&FailedRule> {
        let nested = match &self.outcome {
            Outcome::Nested { failures, .. } => failures,
            Outcome::Error(Rule::Combinator { failures, .. }) => failures,
            _ => return vec![self],
        };

        let leaves = nested.iter().flat_map(FailedRule::leaves).collect::<Vec<_>>();
        if leaves.is_empty() {
            vec![self]
        } else {
            leaves
        }
    }
}

impl fmt::Display for FailedRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.outcome {
            Outcome::Rejected => write!(f, "rule #{} {} returned false", self.index, self.rule),
            Outcome::Matched => write!(f, "rule #{} {} matched", self.index, self.rule),
            Outcome::Nested { kind, failures } => write!(
                f,
                "rule #{} {} rejected: {} [{}]",
                self.index,
                self.rule,
                kind,
                print_failures(failures)
            ),
            Outcome::Error(e) => write!(f, "rule #{} {}: {}", self.index, self.rule, e),
        }
    }
}

/// errors returned by a gate before its handler runs
#[derive(Error, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-error", derive(serde::Serialize, serde::Deserialize))]
pub enum Gate {
    #[error("client did not supply a token")]
    NoToken,
    #[error("one or more protection rules were violated: {0}")]
    Unauthorized(FailedRule),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_format_strings() {
        assert_eq!(
            format!("{}", Jwt::from(Validation::MissingClaim("iss".to_string()))),
            "the token failed validation: the iss claim is required"
        );

        assert_eq!(
            format!(
                "{}",
                Rule::MissingScopes(vec!["write:x".to_string(), "admin:x".to_string()])
            ),
            "the token is missing required scopes: write:x, admin:x"
        );

        let nested = Rule::Combinator {
            kind: Combinator::AnyOf,
            failures: vec![
                FailedRule {
                    index: 0,
                    rule: "HasScopes(write:x)".to_string(),
                    outcome: Outcome::Error(Rule::MissingScopes(vec!["write:x".to_string()])),
                },
                FailedRule {
                    index: 1,
                    rule: "MatchValue(header:/uuid, jwt:/uuid)".to_string(),
                    outcome: Outcome::Rejected,
                },
            ],
        };
        assert_eq!(
            format!("{}", nested),
            "AnyOf failed: rule #0 HasScopes(write:x): the token is missing required scopes: write:x; \
             rule #1 MatchValue(header:/uuid, jwt:/uuid) returned false"
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            Jwt::from(Gate::NoToken).status(),
            http::StatusCode::FORBIDDEN
        );
        assert_eq!(
            Jwt::from(Validation::Expired).status(),
            http::StatusCode::FORBIDDEN
        );
        assert_eq!(
            Jwt::Encode("bad".to_string()).status(),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(Jwt::from(Format::InvalidStructure).is_invalid_token());
        assert!(!Jwt::from(Gate::NoToken).is_invalid_token());
    }

    #[test]
    fn leaves_of_nested_failures() {
        let mismatch = FailedRule {
            index: 1,
            rule: "MatchValue(url:/uuid, jwt:/uuid)".to_string(),
            outcome: Outcome::Rejected,
        };
        let failed = FailedRule {
            index: 0,
            rule: "AllOf(...)".to_string(),
            outcome: Outcome::Nested {
                kind: Combinator::AllOf,
                failures: vec![mismatch.clone()],
            },
        };

        assert_eq!(failed.leaves(), vec![&mismatch]);
        assert_eq!(mismatch.leaves(), vec![&mismatch]);
        assert_eq!(
            failed.to_string(),
            "rule #0 AllOf(...) rejected: AllOf [rule #1 MatchValue(url:/uuid, jwt:/uuid) returned false]"
        );

        let convert = Jwt::from(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        ));
        assert_eq!(convert, Jwt::Validation(Validation::Expired));
    }
}
