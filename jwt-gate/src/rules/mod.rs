//! protection rules
//!
//! A rule is a predicate over the current token and a snapshot of the
//! request data. It returns `Ok(true)` to let the request through,
//! `Ok(false)` to reject it, or an [error::Rule] carrying a diagnostic.
//!
//! Rules are built once, when routes are registered, and never change
//! afterwards: the same rule can be evaluated by concurrent requests, and
//! evaluating it twice on the same data gives the same answer.
//!
//! Custom rules implement [Rule] directly:
//!
//! ```rust
//! use jwt_gate::{error, rules::Rule, RequestData, Token};
//!
//! struct HasClaim(&'static str);
//!
//! impl Rule for HasClaim {
//!     fn check(&self, token: &Token, _request: &RequestData) -> Result<bool, error::Rule> {
//!         Ok(token.contains(self.0))
//!     }
//!
//!     fn describe(&self) -> String {
//!         format!("HasClaim({})", self.0)
//!     }
//! }
//! ```
use std::fmt;
use std::sync::Arc;

use crate::context::RequestData;
use crate::error::{self, Outcome};
use crate::Token;

mod combinators;
mod match_value;
mod path;
mod scopes;

pub use combinators::{AllOf, AnyOf, NoneOf};
pub use match_value::MatchValue;
pub use path::{PathRef, Source};
pub use scopes::HasScopes;

pub trait Rule: Send + Sync {
    fn check(&self, token: &Token, request: &RequestData) -> Result<bool, error::Rule>;

    /// evaluates the rule, explaining why it did not pass
    ///
    /// combinators override it to name the sub rules that rejected the
    /// request, which a plain `Ok(false)` cannot carry
    fn verdict(&self, token: &Token, request: &RequestData) -> Result<(), Outcome> {
        match self.check(token, request) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Outcome::Rejected),
            Err(e) => Err(Outcome::Error(e)),
        }
    }

    /// pretty print of the rule, used in diagnostics
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    fn check(&self, token: &Token, request: &RequestData) -> Result<bool, error::Rule> {
        (**self).check(token, request)
    }

    fn verdict(&self, token: &Token, request: &RequestData) -> Result<(), Outcome> {
        (**self).verdict(token, request)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<R: Rule + ?Sized> Rule for Arc<R> {
    fn check(&self, token: &Token, request: &RequestData) -> Result<bool, error::Rule> {
        (**self).check(token, request)
    }

    fn verdict(&self, token: &Token, request: &RequestData) -> Result<(), Outcome> {
        (**self).verdict(token, request)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// a rule defined by a closure
pub struct FnRule<F> {
    name: String,
    f: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Token, &RequestData) -> Result<bool, error::Rule> + Send + Sync,
{
    fn check(&self, token: &Token, request: &RequestData) -> Result<bool, error::Rule> {
        (self.f)(token, request)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}

/// wraps a closure into a named rule
///
/// ```rust
/// use jwt_gate::rules::{from_fn, Rule};
/// use jwt_gate::{RequestData, Token};
///
/// let has_subject = from_fn("HasSubject", |token: &Token, _: &RequestData| {
///     Ok(token.contains("sub"))
/// });
/// assert_eq!(has_subject.check(&Token::new(), &RequestData::new()), Ok(false));
/// ```
pub fn from_fn<F>(name: &str, f: F) -> FnRule<F>
where
    F: Fn(&Token, &RequestData) -> Result<bool, error::Rule> + Send + Sync,
{
    FnRule {
        name: name.to_string(),
        f,
    }
}

/// creates an [AllOf] from a list of rules
#[macro_export]
macro_rules! all_of {
    ($($rule:expr),* $(,)?) => {
        $crate::rules::AllOf::from(vec![
            $(Box::new($rule) as Box<dyn $crate::rules::Rule>),*
        ])
    };
}

/// creates an [AnyOf] from a list of rules
#[macro_export]
macro_rules! any_of {
    ($($rule:expr),* $(,)?) => {
        $crate::rules::AnyOf::from(vec![
            $(Box::new($rule) as Box<dyn $crate::rules::Rule>),*
        ])
    };
}

/// creates a [NoneOf] from a list of rules
#[macro_export]
macro_rules! none_of {
    ($($rule:expr),* $(,)?) => {
        $crate::rules::NoneOf::from(vec![
            $(Box::new($rule) as Box<dyn $crate::rules::Rule>),*
        ])
    };
}

pub(crate) fn describe_all(rules: &[Box<dyn Rule>]) -> String {
    rules
        .iter()
        .map(|r| r.describe())
        .collect::<Vec<_>>()
        .join(", ")
}
