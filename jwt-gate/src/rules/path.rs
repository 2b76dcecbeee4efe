//! `source:pointer` references into the request data or the token
use serde_json::Value;
use std::{convert::TryFrom, fmt, str::FromStr};

use crate::context::RequestData;
use crate::error;
use crate::Token;

/// where a path reference looks for its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// request headers, by lowercased name
    Header,
    /// parsed request body, also written `body`
    Json,
    /// path parameters captured by the router
    Url,
    /// query string parameters
    Param,
    /// form fields
    Form,
    /// claims of the current token, also written `token`
    Jwt,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Header => write!(f, "header"),
            Source::Json => write!(f, "json"),
            Source::Url => write!(f, "url"),
            Source::Param => write!(f, "param"),
            Source::Form => write!(f, "form"),
            Source::Jwt => write!(f, "jwt"),
        }
    }
}

impl FromStr for Source {
    type Err = error::Config;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(Source::Header),
            "json" | "body" => Ok(Source::Json),
            "url" => Ok(Source::Url),
            "param" => Ok(Source::Param),
            "form" => Ok(Source::Form),
            "jwt" | "token" => Ok(Source::Jwt),
            _ => Err(error::Config::PathSource(s.to_string())),
        }
    }
}

/// a parsed `source:pointer` reference
///
/// the pointer is a JSON pointer, its leading `/` is optional:
/// `header:uuid`, `header:/uuid` and `json:/user/uuid` are all valid.
/// Header pointers are lowercased to match how header names are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathRef {
    source: Source,
    pointer: String,
}

impl PathRef {
    /// parses a reference, failing on an unknown source
    pub fn parse(reference: &str) -> Result<Self, error::Config> {
        let (source, pointer) = reference
            .split_once(':')
            .ok_or_else(|| error::Config::PathFormat(reference.to_string()))?;
        let source = source.parse::<Source>()?;

        let mut pointer = if pointer.starts_with('/') {
            pointer.to_string()
        } else {
            format!("/{}", pointer)
        };
        if source == Source::Header {
            pointer.make_ascii_lowercase();
        }

        Ok(PathRef { source, pointer })
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// finds the referenced value for the current request
    pub fn resolve<'a>(
        &self,
        token: &'a Token,
        request: &'a RequestData,
    ) -> Result<&'a Value, error::Rule> {
        let value = match self.source {
            Source::Jwt => token.pointer(&self.pointer),
            source => request
                .source(source)
                .and_then(|data| data.pointer(&self.pointer)),
        };

        tracing::trace!(path = %self, found = value.is_some(), "resolved path");
        value.ok_or_else(|| error::Rule::PathLookup(self.to_string()))
    }
}

impl FromStr for PathRef {
    type Err = error::Config;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathRef::parse(s)
    }
}

impl TryFrom<&str> for PathRef {
    type Error = error::Config;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        PathRef::parse(value)
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.pointer)
    }
}
