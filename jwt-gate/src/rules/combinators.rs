//! boolean composition of rules
//!
//! Combinators hold any [Rule], including other combinators. A combinator
//! rejecting a request reports the sub rules that did not pass through
//! [Rule::verdict], as [Outcome::Nested], so the failing leaves stay visible
//! at the top. A sub rule raising an error is reported through
//! [error::Rule::Combinator], which lists them the same way.
use std::fmt;

use super::{describe_all, Rule};
use crate::context::RequestData;
use crate::error::{self, FailedRule, Outcome};
use crate::Token;

enum Evaluation {
    Pass,
    Rejected(Vec<FailedRule>),
    Raised(Vec<FailedRule>),
}

fn failed(index: usize, rule: &dyn Rule, outcome: Outcome) -> FailedRule {
    FailedRule {
        index,
        rule: rule.describe(),
        outcome,
    }
}

macro_rules! combinator {
    ($name:ident) => {
        impl $name {
            pub fn new() -> Self {
                $name { rules: Vec::new() }
            }

            /// adds a sub rule
            pub fn with<R: Rule + 'static>(mut self, rule: R) -> Self {
                self.rules.push(Box::new(rule));
                self
            }

            pub fn push<R: Rule + 'static>(&mut self, rule: R) {
                self.rules.push(Box::new(rule));
            }

            pub fn len(&self) -> usize {
                self.rules.len()
            }

            pub fn is_empty(&self) -> bool {
                self.rules.is_empty()
            }
        }

        impl Rule for $name {
            fn check(&self, token: &Token, request: &RequestData) -> Result<bool, error::Rule> {
                match self.evaluate(token, request) {
                    Evaluation::Pass => Ok(true),
                    Evaluation::Rejected(_) => Ok(false),
                    Evaluation::Raised(failures) => Err(error::Rule::Combinator {
                        kind: error::Combinator::$name,
                        failures,
                    }),
                }
            }

            fn verdict(&self, token: &Token, request: &RequestData) -> Result<(), Outcome> {
                match self.evaluate(token, request) {
                    Evaluation::Pass => Ok(()),
                    Evaluation::Rejected(failures) => Err(Outcome::Nested {
                        kind: error::Combinator::$name,
                        failures,
                    }),
                    Evaluation::Raised(failures) => Err(Outcome::Error(error::Rule::Combinator {
                        kind: error::Combinator::$name,
                        failures,
                    })),
                }
            }

            fn describe(&self) -> String {
                self.to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }

        impl From<Vec<Box<dyn Rule>>> for $name {
            fn from(rules: Vec<Box<dyn Rule>>) -> Self {
                $name { rules }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), describe_all(&self.rules))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self)
            }
        }
    };
}

/// passes when every sub rule passes, stops at the first one that does not
///
/// an empty `AllOf` passes
pub struct AllOf {
    rules: Vec<Box<dyn Rule>>,
}

combinator!(AllOf);

impl AllOf {
    /// evaluates the sub rules in order, returning the first that did not pass
    pub fn verify(&self, token: &Token, request: &RequestData) -> Result<(), FailedRule> {
        for (index, rule) in self.rules.iter().enumerate() {
            if let Err(outcome) = rule.verdict(token, request) {
                return Err(failed(index, &**rule, outcome));
            }
        }

        Ok(())
    }

    fn evaluate(&self, token: &Token, request: &RequestData) -> Evaluation {
        match self.verify(token, request) {
            Ok(()) => Evaluation::Pass,
            Err(f) if matches!(f.outcome, Outcome::Error(_)) => Evaluation::Raised(vec![f]),
            Err(f) => Evaluation::Rejected(vec![f]),
        }
    }
}

/// passes when at least one sub rule passes, stops at the first that does
///
/// an error raised by a sub rule counts as `false` while the others are
/// tried. When none passes and one of them raised, the error lists every
/// sub rule with its outcome. An empty `AnyOf` does not pass.
pub struct AnyOf {
    rules: Vec<Box<dyn Rule>>,
}

combinator!(AnyOf);

impl AnyOf {
    fn evaluate(&self, token: &Token, request: &RequestData) -> Evaluation {
        let mut failures = Vec::new();
        let mut raised = false;

        for (index, rule) in self.rules.iter().enumerate() {
            match rule.verdict(token, request) {
                Ok(()) => return Evaluation::Pass,
                Err(outcome) => {
                    raised |= matches!(outcome, Outcome::Error(_));
                    failures.push(failed(index, &**rule, outcome));
                }
            }
        }

        if raised {
            Evaluation::Raised(failures)
        } else {
            Evaluation::Rejected(failures)
        }
    }
}

/// passes when no sub rule passes
///
/// a sub rule raising an error is not ignored: it fails the `NoneOf` with
/// that error. An empty `NoneOf` passes.
pub struct NoneOf {
    rules: Vec<Box<dyn Rule>>,
}

combinator!(NoneOf);

impl NoneOf {
    fn evaluate(&self, token: &Token, request: &RequestData) -> Evaluation {
        for (index, rule) in self.rules.iter().enumerate() {
            match rule.verdict(token, request) {
                Ok(()) => {
                    return Evaluation::Rejected(vec![failed(index, &**rule, Outcome::Matched)])
                }
                Err(Outcome::Error(e)) => {
                    return Evaluation::Raised(vec![failed(index, &**rule, Outcome::Error(e))])
                }
                Err(_) => continue,
            }
        }

        Evaluation::Pass
    }
}
