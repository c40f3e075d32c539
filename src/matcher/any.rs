use super::ArgMatcher;

/// Returns a matcher that accepts any argument.
///
/// Displayed as `_`.
pub fn any() -> ArgMatcher {
    ArgMatcher::Any
}
