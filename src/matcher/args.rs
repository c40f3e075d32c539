use paste::paste;

use super::ArgMatcher;

/// Converts the positional matchers of a declaration into a list.
///
/// Implemented for `()`, `Vec<ArgMatcher>` and tuples of up to ten
/// [`ArgMatcher`]s. Single matchers must be wrapped in a one element
/// tuple; don't forget the trailing comma.
pub trait IntoArgMatchers {
    fn into_arg_matchers(self) -> Vec<ArgMatcher>;
}

impl IntoArgMatchers for () {
    fn into_arg_matchers(self) -> Vec<ArgMatcher> {
        vec![]
    }
}

impl IntoArgMatchers for Vec<ArgMatcher> {
    fn into_arg_matchers(self) -> Vec<ArgMatcher> {
        self
    }
}

// 3 => ArgMatcher
macro_rules! matcher_ty {
    ($idx:tt) => {
        ArgMatcher
    };
}

// (a,b,c) => tuple!(b,c)
macro_rules! peel {
    ($idx:tt, $($other:tt,)*) => (tuple! { $($other,)* })
}

// implement IntoArgMatchers for tuples of ArgMatchers
macro_rules! tuple {
    () => ();
    ($($idx:tt,)+) => (
        paste! {
            impl IntoArgMatchers for ($(matcher_ty!($idx),)+) {
                fn into_arg_matchers(self) -> Vec<ArgMatcher> {
                    let ($([<am $idx>],)+) = self;
                    vec![$([<am $idx>]),+]
                }
            }
        }
        peel! { $($idx,)+ }
    )
}

tuple! { 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, }
