//! per request state: the decoded token and a snapshot of the request data
use http::HeaderMap;
use serde_json::{Map, Value};

use crate::rules::Source;
use crate::Token;

/// request scoped slot holding the current token
///
/// the web framework creates one per inbound request, so two concurrent
/// requests never observe each other's token
pub trait TokenStore {
    fn set(&mut self, token: Token);
    fn get(&self) -> Option<&Token>;
    fn take(&mut self) -> Option<Token>;
}

impl TokenStore for Option<Token> {
    fn set(&mut self, token: Token) {
        *self = Some(token);
    }

    fn get(&self) -> Option<&Token> {
        self.as_ref()
    }

    fn take(&mut self) -> Option<Token> {
        Option::take(self)
    }
}

/// read only snapshot of the request data that rules can address
///
/// every source is a JSON document. Header names are lowercased, the same
/// way `http` stores them.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestData {
    headers: Value,
    json: Value,
    url: Value,
    param: Value,
    form: Value,
}

impl Default for RequestData {
    fn default() -> Self {
        RequestData {
            headers: Value::Object(Map::new()),
            json: Value::Null,
            url: Value::Object(Map::new()),
            param: Value::Object(Map::new()),
            form: Value::Object(Map::new()),
        }
    }
}

impl RequestData {
    pub fn new() -> Self {
        RequestData::default()
    }

    /// copies the headers of a request, keeping the first value of each
    /// name. Values that are not valid UTF-8 are skipped.
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        for name in headers.keys() {
            if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
                insert(&mut self.headers, name.as_str(), value.into());
            }
        }
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        insert(&mut self.headers, &name.to_ascii_lowercase(), value.into());
        self
    }

    /// sets the parsed request body
    pub fn with_json(mut self, body: Value) -> Self {
        self.json = body;
        self
    }

    /// adds a path parameter, as captured by the router
    pub fn with_url_param<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        insert(&mut self.url, name, value.into());
        self
    }

    /// adds a query string parameter
    pub fn with_query_param<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        insert(&mut self.param, name, value.into());
        self
    }

    pub fn with_form_field<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        insert(&mut self.form, name, value.into());
        self
    }

    /// the document behind a source, `None` for the token source
    pub fn source(&self, source: Source) -> Option<&Value> {
        match source {
            Source::Header => Some(&self.headers),
            Source::Json => Some(&self.json),
            Source::Url => Some(&self.url),
            Source::Param => Some(&self.param),
            Source::Form => Some(&self.form),
            Source::Jwt => None,
        }
    }
}

fn insert(target: &mut Value, name: &str, value: Value) {
    if let Value::Object(map) = target {
        map.entry(name.to_string()).or_insert(value);
    }
}

/// everything a gate needs for one request: the token slot and the data
/// snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    token: Option<Token>,
    data: RequestData,
}

impl RequestContext {
    pub fn new(data: RequestData) -> Self {
        RequestContext { token: None, data }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn data(&self) -> &RequestData {
        &self.data
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// mutable access to the current token, to update claims before the
    /// response is sent
    pub fn token_mut(&mut self) -> Option<&mut Token> {
        self.token.as_mut()
    }
}

impl TokenStore for RequestContext {
    fn set(&mut self, token: Token) {
        self.token = Some(token);
    }

    fn get(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    fn take(&mut self) -> Option<Token> {
        self.token.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    #[test]
    fn headers_are_lowercased() {
        let mut headers = HeaderMap::new();
        headers.insert("X-User-Id", HeaderValue::from_static("123"));
        headers.append("X-User-Id", HeaderValue::from_static("456"));

        let data = RequestData::new()
            .with_headers(&headers)
            .with_header("Uuid", "abc");

        assert_eq!(
            data.source(Source::Header),
            Some(&json!({"x-user-id": "123", "uuid": "abc"}))
        );
    }

    #[test]
    fn sources() {
        let data = RequestData::new()
            .with_json(json!({"user": {"uuid": 1}}))
            .with_url_param("uuid", "1")
            .with_query_param("page", "2")
            .with_form_field("name", "x");

        assert_eq!(
            data.source(Source::Json).and_then(|v| v.pointer("/user/uuid")),
            Some(&json!(1))
        );
        assert_eq!(data.source(Source::Url), Some(&json!({"uuid": "1"})));
        assert_eq!(data.source(Source::Param), Some(&json!({"page": "2"})));
        assert_eq!(data.source(Source::Form), Some(&json!({"name": "x"})));
        assert_eq!(data.source(Source::Jwt), None);
    }

    #[test]
    fn token_slot() {
        let mut ctx = RequestContext::default();
        assert!(TokenStore::get(&ctx).is_none());

        ctx.set(Token::builder().claim("uuid", "123").build());
        assert_eq!(ctx.token().and_then(|t| t.get("uuid")), Some(&json!("123")));

        assert!(ctx.take().is_some());
        assert!(ctx.token().is_none());

        let mut slot: Option<Token> = None;
        slot.set(Token::new());
        assert!(TokenStore::get(&slot).is_some());
    }
}
