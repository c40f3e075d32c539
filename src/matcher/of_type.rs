use std::{
    any::{Any, TypeId},
    fmt::{self, Formatter},
};

use super::ArgMatcher;
use crate::value::Arg;

/// Type check carried by [`ArgMatcher::OfType`].
#[derive(Debug, Clone, Copy)]
pub struct OfType {
    id: TypeId,
    name: &'static str,
}

impl OfType {
    pub(super) fn matches(&self, arg: &Arg) -> bool {
        arg.value_type_id() == self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for OfType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for OfType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "_: {}", self.name)
    }
}

/// Returns a matcher that accepts any argument of type `T`.
pub fn of_type<T: Any>() -> ArgMatcher {
    ArgMatcher::OfType(OfType {
        id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
    })
}
