use std::{
    fmt::{self, Formatter},
    sync::Arc,
};

use crate::{
    substitute::SubstituteId,
    value::{Arg, ArgValue},
    CallEvent,
};

/// What a call resolved to a setup hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Returned {
    Nothing,
    Value(Arg),
    Substitute(SubstituteId),
}

/// The configured answer of a setup.
///
/// Only a `Returns` response can be inspected without running user
/// code, so it is the only kind that can make a setup's return value
/// known as an inner mock.
#[derive(Clone)]
pub enum Response {
    Returns(Returned),
    Computed(Arc<dyn Fn(&[Arg]) -> Returned + Send + Sync>),
}

impl Response {
    pub fn nothing() -> Self {
        Response::Returns(Returned::Nothing)
    }

    pub fn value<T: ArgValue>(value: T) -> Self {
        Response::Returns(Returned::Value(Arg::new(value)))
    }

    pub fn substitute(id: SubstituteId) -> Self {
        Response::Returns(Returned::Substitute(id))
    }

    /// A response computed from the call arguments every time the setup
    /// handles a call.
    pub fn computed(f: impl Fn(&[Arg]) -> Returned + Send + Sync + 'static) -> Self {
        Response::Computed(Arc::new(f))
    }

    /// The substitute this response returns, if known up front.
    pub fn inner_mock(&self) -> Option<SubstituteId> {
        match self {
            Response::Returns(Returned::Substitute(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn produce(&self, call: &CallEvent) -> Returned {
        match self {
            Response::Returns(returned) => returned.clone(),
            Response::Computed(f) => f(call.args()),
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::nothing()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Response::Returns(returned) => f.debug_tuple("Returns").field(returned).finish(),
            Response::Computed(_) => f.write_str("Computed"),
        }
    }
}
