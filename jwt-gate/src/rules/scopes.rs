use std::fmt;

use super::Rule;
use crate::context::RequestData;
use crate::error;
use crate::Token;

/// requires the token to hold every listed scope
///
/// scopes are usually an operation followed by an object, separated by a
/// colon (`read:thing`, `write:thing`), but they are compared as opaque
/// strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasScopes {
    scopes: Vec<String>,
}

impl HasScopes {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HasScopes {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl Rule for HasScopes {
    fn check(&self, token: &Token, _request: &RequestData) -> Result<bool, error::Rule> {
        let granted = token.scopes();
        let missing = self
            .scopes
            .iter()
            .filter(|scope| !granted.contains(&scope.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(true)
        } else {
            Err(error::Rule::MissingScopes(missing))
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HasScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HasScopes({})", self.scopes.join(", "))
    }
}
