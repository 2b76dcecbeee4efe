//! route protection
//!
//! A [Gate] holds the rules of one route. Before the route's handler runs,
//! the gate takes the token stored for the current request and checks every
//! rule against it, in order. The handler only runs when all of them pass.
//!
//! ```rust
//! use jwt_gate::rules::{HasScopes, MatchValue};
//! use jwt_gate::{error, Gate, RequestContext, RequestData, Token};
//!
//! let get_thing = Gate::new()
//!     .rule(HasScopes::new(vec!["read:thing"]))
//!     .rule(MatchValue::new(vec!["url:/uuid", "jwt:/uuid"]).unwrap())
//!     .protect(|uuid: &str| format!("thing {}", uuid));
//!
//! let token = Token::builder()
//!     .scopes(vec!["read:thing"])
//!     .claim("uuid", "123")
//!     .build();
//! let ctx = RequestContext::new(RequestData::new().with_url_param("uuid", "123"))
//!     .with_token(token);
//! assert_eq!(get_thing.call_with(&ctx, "123"), Ok("thing 123".to_string()));
//!
//! let anonymous = RequestContext::new(RequestData::new());
//! assert_eq!(get_thing.call_with(&anonymous, "123"), Err(error::Gate::NoToken));
//! ```
use std::fmt;

use crate::context::{RequestContext, RequestData, TokenStore};
use crate::error;
use crate::rules::{AllOf, Rule};

/// the rules protecting a route, all of which must pass
#[derive(Default)]
pub struct Gate {
    rules: AllOf,
}

impl Gate {
    /// a gate with no rule, letting through any request carrying a token
    pub fn new() -> Self {
        Gate::default()
    }

    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(rule);
        self
    }

    /// checks the token stored for a request
    pub fn authorize<S: TokenStore + ?Sized>(
        &self,
        store: &S,
        request: &RequestData,
    ) -> Result<(), error::Gate> {
        let token = match store.get() {
            Some(token) => token,
            None => {
                tracing::warn!("rejected request without a token");
                return Err(error::Gate::NoToken);
            }
        };

        match self.rules.verify(token, request) {
            Ok(()) => {
                tracing::debug!(rules = self.rules.len(), "request authorized");
                Ok(())
            }
            Err(failed) => {
                let leaves = failed
                    .leaves()
                    .iter()
                    .map(|leaf| leaf.rule.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::warn!(
                    index = failed.index,
                    rule = %failed.rule,
                    failing = %leaves,
                    "protection rule violated"
                );
                Err(error::Gate::Unauthorized(failed))
            }
        }
    }

    pub fn check(&self, ctx: &RequestContext) -> Result<(), error::Gate> {
        self.authorize(ctx, ctx.data())
    }

    /// wraps a handler so it only runs once the gate let the request through
    pub fn protect<F>(self, handler: F) -> Protected<F> {
        Protected {
            gate: self,
            handler,
        }
    }
}

impl From<Vec<Box<dyn Rule>>> for Gate {
    fn from(rules: Vec<Box<dyn Rule>>) -> Self {
        Gate {
            rules: AllOf::from(rules),
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gate({})", self.rules)
    }
}

/// a handler behind a [Gate]
///
/// the handler's return value is passed through unchanged
pub struct Protected<F> {
    gate: Gate,
    handler: F,
}

impl<F> Protected<F> {
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// runs a handler taking no argument
    pub fn call<T>(&self, ctx: &RequestContext) -> Result<T, error::Gate>
    where
        F: Fn() -> T,
    {
        self.gate.check(ctx)?;
        Ok((self.handler)())
    }

    /// runs a handler with its arguments, usually the route parameters
    pub fn call_with<A, T>(&self, ctx: &RequestContext, args: A) -> Result<T, error::Gate>
    where
        F: Fn(A) -> T,
    {
        self.gate.check(ctx)?;
        Ok((self.handler)(args))
    }
}

impl<F> fmt::Debug for Protected<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protected")
            .field("gate", &self.gate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailedRule, Outcome};
    use crate::rules::tests::fixed;
    use crate::rules::{HasScopes, MatchValue};
    use crate::{all_of, Token};
    use std::cell::Cell;

    fn ctx(scopes: &[&str]) -> RequestContext {
        RequestContext::new(RequestData::new())
            .with_token(Token::builder().scopes(scopes.to_vec()).build())
    }

    #[test]
    fn no_token() {
        let called = Cell::new(false);
        let protected = Gate::new().rule(fixed(Some(true))).protect(|| called.set(true));

        assert_eq!(
            protected.call(&RequestContext::default()),
            Err(error::Gate::NoToken)
        );
        assert!(!called.get());
    }

    #[test]
    fn empty_gate_only_needs_a_token() {
        assert_eq!(Gate::new().check(&ctx(&[])), Ok(()));
    }

    #[test]
    fn passes_the_return_value_through() {
        let protected = Gate::new()
            .rule(HasScopes::new(vec!["read:x"]))
            .protect(|(a, b): (i32, i32)| a + b);
        assert_eq!(protected.call_with(&ctx(&["read:x"]), (1, 2)), Ok(3));
    }

    #[test]
    fn names_the_first_violated_rule() {
        let called = Cell::new(false);
        let protected = Gate::new()
            .rule(fixed(Some(true)))
            .rule(HasScopes::new(vec!["read:x", "write:x"]))
            .rule(fixed(None))
            .protect(|| called.set(true));

        assert_eq!(
            protected.call(&ctx(&["read:x"])),
            Err(error::Gate::Unauthorized(FailedRule {
                index: 1,
                rule: "HasScopes(read:x, write:x)".to_string(),
                outcome: Outcome::Error(error::Rule::MissingScopes(vec![
                    "write:x".to_string()
                ])),
            }))
        );
        assert!(!called.get());
    }

    #[test]
    fn a_false_rule_is_a_violation() {
        let gate = Gate::from(vec![Box::new(fixed(Some(false))) as Box<dyn Rule>]);
        assert_eq!(
            gate.check(&ctx(&[])),
            Err(error::Gate::Unauthorized(FailedRule {
                index: 0,
                rule: "False".to_string(),
                outcome: Outcome::Rejected,
            }))
        );
    }

    #[test]
    fn names_the_rejecting_rule_inside_a_combinator() {
        let gate = Gate::new().rule(all_of![
            HasScopes::new(vec!["read:x"]),
            MatchValue::new(vec!["url:uuid", "jwt:uuid"]).unwrap()
        ]);
        let ctx = RequestContext::new(RequestData::new().with_url_param("uuid", "456"))
            .with_token(
                Token::builder()
                    .scopes(vec!["read:x"])
                    .claim("uuid", "123")
                    .build(),
            );

        let failed = match gate.check(&ctx) {
            Err(error::Gate::Unauthorized(failed)) => failed,
            other => panic!("unexpected result: {:?}", other),
        };
        assert_eq!(failed.index, 0);
        assert_eq!(
            failed.outcome,
            Outcome::Nested {
                kind: error::Combinator::AllOf,
                failures: vec![FailedRule {
                    index: 1,
                    rule: "MatchValue(url:/uuid, jwt:/uuid)".to_string(),
                    outcome: Outcome::Rejected,
                }],
            }
        );
        assert_eq!(
            failed
                .leaves()
                .iter()
                .map(|leaf| leaf.rule.as_str())
                .collect::<Vec<_>>(),
            vec!["MatchValue(url:/uuid, jwt:/uuid)"]
        );
        assert!(error::Gate::Unauthorized(failed)
            .to_string()
            .contains("MatchValue(url:/uuid, jwt:/uuid) returned false"));
    }

    #[test]
    fn plain_token_slot() {
        let gate = Gate::new().rule(HasScopes::new(vec!["read:x"]));
        let slot = Some(Token::builder().scopes(vec!["read:x"]).build());
        assert_eq!(gate.authorize(&slot, &RequestData::new()), Ok(()));
        assert_eq!(
            gate.authorize(&None::<Token>, &RequestData::new()),
            Err(error::Gate::NoToken)
        );
    }
}
