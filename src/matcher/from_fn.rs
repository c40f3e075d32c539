use std::{
    any::Any,
    fmt::{self, Formatter},
    sync::Arc,
};

use super::ArgMatcher;
use crate::value::Arg;

/// Closure based check carried by [`ArgMatcher::Predicate`].
///
/// Two predicates are only equal if they were cloned from the same
/// [`from_fn`] call; closures cannot be compared otherwise.
#[derive(Clone)]
pub struct Predicate {
    message: Arc<str>,
    matcher: Arc<dyn Fn(&Arg) -> bool + Send + Sync>,
}

impl Predicate {
    pub(super) fn matches(&self, arg: &Arg) -> bool {
        (self.matcher)(arg)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.matcher, &other.matcher)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("message", &self.message)
            .finish()
    }
}

/// Returns an [`ArgMatcher`] that succeeds based on the provided
/// closure.
///
/// Arguments that are not a `T` never match. `message` is used when
/// displaying the matcher.
///
/// ```
/// use standin::{matcher, Arg};
///
/// let even = matcher::from_fn(|x: &u32| x % 2 == 0, "even");
/// assert!(even.matches(&Arg::new(4_u32)));
/// assert!(!even.matches(&Arg::new(3_u32)));
/// assert!(!even.matches(&Arg::new("four")));
/// ```
pub fn from_fn<T: Any>(
    matcher: impl Fn(&T) -> bool + Send + Sync + 'static,
    message: impl fmt::Display,
) -> ArgMatcher {
    ArgMatcher::Predicate(Predicate {
        message: message.to_string().into(),
        matcher: Arc::new(move |arg: &Arg| arg.downcast_ref::<T>().map_or(false, &matcher)),
    })
}

/// Returns an [`ArgMatcher`] that succeeds based on the provided
/// closure.
///
/// The returned matcher is displayed as the string representation of
/// the closure. This is only meant to be used for simple closures.
///
/// ```
/// use standin::{from_fn, Arg};
///
/// let contains_hello = from_fn!(|message: &String| message.contains("hello"));
/// assert!(contains_hello.matches(&Arg::new(String::from("hello world"))));
/// assert!(!contains_hello.matches(&Arg::new(String::from("bye world"))));
/// ```
#[macro_export]
macro_rules! from_fn {
    ($matcher:expr) => {
        $crate::matcher::from_fn($matcher, stringify!($matcher))
    };
}
