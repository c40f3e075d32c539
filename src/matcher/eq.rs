use super::ArgMatcher;
use crate::value::{Arg, ArgValue};

/// Returns a matcher that accepts arguments equal to `expected`.
///
/// Arguments of a different type never match, even if a `PartialEq`
/// implementation between both types exists.
///
/// ```
/// use standin::{matcher, Arg};
///
/// let five = matcher::eq(5_u32);
/// assert!(five.matches(&Arg::new(5_u32)));
/// assert!(!five.matches(&Arg::new(5_u64)));
/// assert_eq!(five.to_string(), "5");
/// ```
pub fn eq<Expected: ArgValue>(expected: Expected) -> ArgMatcher {
    ArgMatcher::Eq(Arg::new(expected))
}
