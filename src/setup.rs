use std::{
    fmt::{self, Formatter},
    sync::Arc,
};

use crate::{
    chain::FluentId,
    expression::Expression,
    response::{Response, Returned},
    substitute::SubstituteId,
    value::{Arg, ArgValue},
};

/// Handle to a setup registered on a substitute.
///
/// The index is the registration position within the owner's
/// registry, which is also its override priority: later wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetupId {
    owner: SubstituteId,
    index: usize,
}

impl SetupId {
    pub(crate) fn new(owner: SubstituteId, index: usize) -> Self {
        SetupId { owner, index }
    }

    pub fn owner(&self) -> SubstituteId {
        self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for SetupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.index)
    }
}

/// Anything that can be verified: a plain setup or the logical setup
/// of a whole fluent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupHandle {
    Single(SetupId),
    Fluent(FluentId),
}

impl From<SetupId> for SetupHandle {
    fn from(id: SetupId) -> Self {
        SetupHandle::Single(id)
    }
}

impl From<FluentId> for SetupHandle {
    fn from(id: FluentId) -> Self {
        SetupHandle::Fluent(id)
    }
}

/// Guard attached to a conditional setup, evaluated against ambient
/// state every time the setup is considered for a call.
///
/// Must be free of side effects.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn() -> bool + Send + Sync>);

impl Condition {
    pub fn new(guard: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Condition(Arc::new(guard))
    }

    pub fn holds(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Condition")
    }
}

/// A structured setup declaration, as produced by whatever syntax
/// sits in front of the engine.
///
/// ```
/// use standin::{matcher, Declaration, Expression};
///
/// let declaration = Declaration::new(Expression::method("get", (matcher::any(),)))
///     .returns(42)
///     .verifiable();
/// ```
#[derive(Debug, Clone)]
pub struct Declaration {
    pub(crate) expression: Expression,
    pub(crate) response: Response,
    pub(crate) condition: Option<Condition>,
    pub(crate) verifiable: Option<bool>,
    pub(crate) fluent: Option<FluentId>,
}

impl Declaration {
    pub fn new(expression: Expression) -> Self {
        Declaration {
            expression,
            response: Response::default(),
            condition: None,
            verifiable: None,
            fluent: None,
        }
    }

    pub fn returns<T: ArgValue>(self, value: T) -> Self {
        self.responds(Response::value(value))
    }

    /// Returns another substitute, which becomes the inner mock of
    /// this setup.
    pub fn returns_substitute(self, substitute: SubstituteId) -> Self {
        self.responds(Response::substitute(substitute))
    }

    pub fn computes(self, f: impl Fn(&[Arg]) -> Returned + Send + Sync + 'static) -> Self {
        self.responds(Response::computed(f))
    }

    pub fn responds(mut self, response: Response) -> Self {
        self.response = response;
        self
    }

    /// Makes this a conditional setup.
    pub fn when(mut self, guard: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.condition = Some(Condition::new(guard));
        self
    }

    pub fn verifiable(self) -> Self {
        self.with_verifiable(true)
    }

    pub fn with_verifiable(mut self, verifiable: bool) -> Self {
        self.verifiable = Some(verifiable);
        self
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

/// A registered setup.
///
/// Everything here is fixed at registration. The mutable parts
/// (override flag and match count) live in the owning registry and
/// are exposed through [`SetupInfo`] snapshots.
#[derive(Debug)]
pub struct Setup {
    id: SetupId,
    expression: Expression,
    response: Response,
    inner_mock: Option<SubstituteId>,
    condition: Option<Condition>,
    verifiable: bool,
    fluent: Option<FluentId>,
}

impl Setup {
    pub(crate) fn new(id: SetupId, declaration: Declaration) -> Self {
        Setup {
            id,
            inner_mock: declaration.response.inner_mock(),
            expression: declaration.expression,
            response: declaration.response,
            condition: declaration.condition,
            verifiable: declaration.verifiable.unwrap_or(false),
            fluent: declaration.fluent,
        }
    }

    pub fn id(&self) -> SetupId {
        self.id
    }

    pub fn owner(&self) -> SubstituteId {
        self.id.owner
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn inner_mock(&self) -> Option<SubstituteId> {
        self.inner_mock
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    pub fn is_verifiable(&self) -> bool {
        self.verifiable
    }

    /// The top level setup this one was declared as part of; itself
    /// unless it is a step of a fluent chain.
    pub fn original_setup(&self) -> SetupHandle {
        match self.fluent {
            Some(fluent) => SetupHandle::Fluent(fluent),
            None => SetupHandle::Single(self.id),
        }
    }
}

/// Point-in-time view of a setup and its matching state.
#[derive(Debug, Clone)]
pub struct SetupInfo {
    pub(crate) setup: Arc<Setup>,
    pub(crate) overridden: bool,
    pub(crate) match_count: usize,
}

impl SetupInfo {
    /// The registered setup this is a snapshot of.
    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    pub fn id(&self) -> SetupId {
        self.setup.id
    }

    pub fn owner(&self) -> SubstituteId {
        self.setup.owner()
    }

    pub fn expression(&self) -> &Expression {
        &self.setup.expression
    }

    pub fn inner_mock(&self) -> Option<SubstituteId> {
        self.setup.inner_mock
    }

    pub fn is_conditional(&self) -> bool {
        self.setup.is_conditional()
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn is_verifiable(&self) -> bool {
        self.setup.verifiable
    }

    pub fn was_matched(&self) -> bool {
        self.match_count > 0
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn original_setup(&self) -> SetupHandle {
        self.setup.original_setup()
    }
}
