//! Argument matchers and the matching contract between a setup and a
//! call event.
//!
//! Matching is side-effect free: the same setup can be evaluated
//! against the same call any number of times, which the registry
//! relies on when it explains why a call went unhandled.

mod any;
mod args;
mod eq;
mod from_fn;
mod mismatch;
mod of_type;

use std::fmt::{self, Formatter};

pub use any::any;
pub use args::IntoArgMatchers;
pub use eq::eq;
pub use from_fn::{from_fn, Predicate};
pub use mismatch::{ArgumentsMismatch, Mismatch};
pub use of_type::{of_type, OfType};

use crate::{
    expression::Expression,
    setup::{Condition, Setup},
    value::Arg,
    CallEvent,
};

/// Expectation for a single positional argument.
///
/// Matchers are compared structurally so that two declarations of the
/// same pattern are recognized as equivalent:
///
/// * `Any` equals `Any`
/// * `Eq` compares the expected values
/// * `OfType` compares the expected types
/// * `Predicate` compares the identity of the closure
#[derive(Clone, PartialEq)]
pub enum ArgMatcher {
    Any,
    Eq(Arg),
    OfType(OfType),
    Predicate(Predicate),
}

impl ArgMatcher {
    pub fn matches(&self, arg: &Arg) -> bool {
        match self {
            ArgMatcher::Any => true,
            ArgMatcher::Eq(expected) => expected == arg,
            ArgMatcher::OfType(of_type) => of_type.matches(arg),
            ArgMatcher::Predicate(predicate) => predicate.matches(arg),
        }
    }
}

impl fmt::Display for ArgMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ArgMatcher::Any => f.write_str("_"),
            ArgMatcher::Eq(expected) => write!(f, "{:?}", expected),
            ArgMatcher::OfType(of_type) => fmt::Display::fmt(of_type, f),
            ArgMatcher::Predicate(predicate) => fmt::Display::fmt(predicate, f),
        }
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ArgMatcher({})", self)
    }
}

/// Returns whether `setup` should handle `call`.
///
/// The member and every argument must match; a conditional setup must
/// additionally have its guard hold at the time of the call.
pub fn matches(setup: &Setup, call: &CallEvent) -> bool {
    let expression = setup.expression();
    expression.accesses(call.member())
        && expression
            .args()
            .iter()
            .zip(call.args())
            .all(|(matcher, arg)| matcher.matches(arg))
        && setup.condition().map_or(true, Condition::holds)
}

/// Like [`matches`], but details what did not match.
pub fn check(setup: &Setup, call: &CallEvent) -> Result<(), Mismatch> {
    explain(setup.expression(), call)?;

    match setup.condition() {
        Some(condition) if !condition.holds() => Err(Mismatch::Condition),
        _ => Ok(()),
    }
}

/// Matches `call` against an expression alone, ignoring any guard.
pub fn explain(expression: &Expression, call: &CallEvent) -> Result<(), Mismatch> {
    if !expression.accesses(call.member()) {
        return Err(Mismatch::member(expression.member(), call.member().clone()));
    }

    let results: Vec<bool> = expression
        .args()
        .iter()
        .zip(call.args())
        .map(|(matcher, arg)| matcher.matches(arg))
        .collect();

    if results.iter().all(|&did_match| did_match) {
        return Ok(());
    }

    Err(Mismatch::arguments(expression.args(), call.args(), &results))
}
