use serde_json::Value;
use std::fmt;

use super::{PathRef, Rule};
use crate::context::RequestData;
use crate::error;
use crate::Token;

/// requires every referenced value to be equal
///
/// typically ties a token claim to a request value, like a user id in the
/// URL that must be the one the token was issued for:
///
/// ```rust
/// use jwt_gate::rules::{MatchValue, Rule};
/// use jwt_gate::{RequestData, Token};
///
/// let rule = MatchValue::new(vec!["url:/uuid", "jwt:/uuid"]).unwrap();
/// let token = Token::builder().claim("uuid", "123").build();
///
/// let request = RequestData::new().with_url_param("uuid", "123");
/// assert_eq!(rule.check(&token, &request), Ok(true));
///
/// let request = RequestData::new().with_url_param("uuid", "321");
/// assert_eq!(rule.check(&token, &request), Ok(false));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchValue {
    paths: Vec<PathRef>,
}

impl MatchValue {
    /// parses the path references, at least two are needed
    pub fn new<I, S>(paths: I) -> Result<Self, error::Config>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|p| PathRef::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if paths.len() < 2 {
            return Err(error::Config::TooFewPaths(paths.len()));
        }

        Ok(MatchValue { paths })
    }

    pub fn paths(&self) -> &[PathRef] {
        &self.paths
    }
}

impl Rule for MatchValue {
    fn check(&self, token: &Token, request: &RequestData) -> Result<bool, error::Rule> {
        let values = self
            .paths
            .iter()
            .map(|p| p.resolve(token, request))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(values.windows(2).all(|pair| same_value(pair[0], pair[1])))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths = self
            .paths
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>();
        write!(f, "MatchValue({})", paths.join(", "))
    }
}

// numbers compare by value (`1` equals `1.0`), at any depth in arrays and
// objects. A string never equals a number.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, x)| y.get(key).map_or(false, |y| same_value(x, y)))
        }
        _ => a == b,
    }
}
