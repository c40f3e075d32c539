//! Decomposition of fluent setups such as `root.A.B.C(x)` into one
//! single-step setup per member access.
//!
//! Every intermediate step returns an inner substitute on which the
//! next step is registered. Re-declaring a prefix reuses the inner
//! substitute created the first time, so setups made through earlier
//! chains stay reachable.

use std::{
    fmt::{self, Formatter},
    sync::Arc,
};

use crate::{
    error::{MalformedChain, Result},
    expression::Expression,
    matcher::IntoArgMatchers,
    response::{Response, Returned},
    setup::{Condition, Declaration, SetupId},
    substitute::{Substitute, SubstituteId, Substitutes},
    value::{Arg, ArgValue},
};

/// Handle to the logical setup of a whole fluent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FluentId(usize);

impl FluentId {
    pub(crate) fn new(index: usize) -> Self {
        FluentId(index)
    }
}

impl fmt::Display for FluentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fluent#{}", self.0)
    }
}

/// One step of a fluent chain as written by the user.
///
/// Anything that is not an access to a member of the previous step's
/// result (a conversion, a call to a free function, ...) is an
/// `Other` step and makes the chain malformed.
#[derive(Debug, Clone)]
pub enum Step {
    Access(Expression),
    Other(String),
}

impl Step {
    pub fn property(name: impl Into<String>) -> Self {
        Step::Access(Expression::property(name))
    }

    pub fn indexer(args: impl IntoArgMatchers) -> Self {
        Step::Access(Expression::indexer(args))
    }

    pub fn method(name: impl Into<String>, args: impl IntoArgMatchers) -> Self {
        Step::Access(Expression::method(name, args))
    }

    pub fn other(description: impl Into<String>) -> Self {
        Step::Other(description.into())
    }
}

impl From<Expression> for Step {
    fn from(expression: Expression) -> Self {
        Step::Access(expression)
    }
}

/// Declaration of a setup that chains through several member accesses.
///
/// The response and guard apply to the last step.
///
/// ```
/// use standin::{matcher, ChainDeclaration, Repository, Step};
///
/// let repository = Repository::new();
/// let root = repository.create("root");
///
/// let chain = ChainDeclaration::new(vec![
///     Step::property("Service"),
///     Step::method("fetch", (matcher::eq(3),)),
/// ])
/// .returns("three");
///
/// let fluent = repository.setup_chain(root, chain).unwrap();
/// assert_eq!(repository.fluent(fluent).unwrap().to_string(), "root.Service.fetch(3)");
/// ```
#[derive(Debug, Clone)]
pub struct ChainDeclaration {
    steps: Vec<Step>,
    response: Response,
    condition: Option<Condition>,
    verifiable: Option<bool>,
}

impl ChainDeclaration {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        ChainDeclaration {
            steps: steps.into_iter().collect(),
            response: Response::default(),
            condition: None,
            verifiable: None,
        }
    }

    /// Appends a step to the chain.
    pub fn then(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn returns<T: ArgValue>(self, value: T) -> Self {
        self.responds(Response::value(value))
    }

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
}

/// The synthetic top-level setup of a fluent chain.
///
/// It is never registered itself. `steps` holds the single-step setup
/// handling each member access, including prefix steps reused from an
/// earlier chain.
#[derive(Debug, Clone)]
pub struct FluentSetup {
    id: FluentId,
    root: SubstituteId,
    root_name: Arc<str>,
    expression: Vec<Expression>,
    steps: Vec<SetupId>,
}

impl FluentSetup {
    pub fn id(&self) -> FluentId {
        self.id
    }

    pub fn root(&self) -> SubstituteId {
        self.root
    }

    pub fn expression(&self) -> &[Expression] {
        &self.expression
    }

    pub fn steps(&self) -> &[SetupId] {
        &self.steps
    }

    /// The step setup holding the declared response.
    pub fn last_step(&self) -> Option<SetupId> {
        self.steps.last().copied()
    }
}

impl fmt::Display for FluentSetup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root_name)?;
        self.expression.iter().try_for_each(|step| match step {
            // indexers attach to the previous step directly
            Expression::Indexer { .. } => write!(f, "{}", step),
            _ => write!(f, ".{}", step),
        })
    }
}

fn validate(steps: Vec<Step>) -> Result<Vec<Expression>, MalformedChain> {
    if steps.is_empty() {
        return Err(MalformedChain::Empty);
    }

    steps
        .into_iter()
        .enumerate()
        .map(|(position, step)| match step {
            Step::Access(expression) => Ok(expression),
            Step::Other(step) => Err(MalformedChain::NotAMemberAccess { position, step }),
        })
        .collect()
}

pub(crate) struct FluentChainResolver<'s> {
    substitutes: &'s Substitutes,
    separator: &'s str,
    default_verifiable: bool,
}

impl<'s> FluentChainResolver<'s> {
    pub fn new(substitutes: &'s Substitutes, separator: &'s str, default_verifiable: bool) -> Self {
        FluentChainResolver {
            substitutes,
            separator,
            default_verifiable,
        }
    }

    /// Registers one setup per step of `declaration`, starting on
    /// `root`.
    ///
    /// The whole chain is validated before anything is registered, and
    /// nothing past validation can fail.
    pub fn resolve(
        &self,
        id: FluentId,
        root: Arc<Substitute>,
        declaration: ChainDeclaration,
    ) -> Result<FluentSetup> {
        let expression = validate(declaration.steps)?;
        let verifiable = declaration.verifiable.unwrap_or(self.default_verifiable);

        let (last, prefix) = expression.split_last().ok_or(MalformedChain::Empty)?;

        let mut current = root.clone();
        let mut steps = Vec::with_capacity(expression.len());

        for step in prefix {
            let registry = current.registry();
            let (setup, inner) = registry.find_or_register(step, self.substitutes, || {
                let inner = self.substitutes.create(format!(
                    "{}{}{}",
                    current.name(),
                    self.separator,
                    step
                ));

                tracing::debug!(
                    fluent = %id,
                    parent = %current.name(),
                    inner = %inner.name(),
                    "created inner substitute"
                );

                let declaration = Declaration {
                    fluent: Some(id),
                    ..Declaration::new(step.clone())
                        .returns_substitute(inner.id())
                        .with_verifiable(verifiable)
                };
                (declaration, inner)
            });

            steps.push(setup);
            current = inner;
        }

        let mut last_step = Declaration::new(last.clone())
            .responds(declaration.response)
            .with_verifiable(verifiable);
        last_step.condition = declaration.condition;
        last_step.fluent = Some(id);
        steps.push(current.registry().register(last_step));

        Ok(FluentSetup {
            id,
            root: root.id(),
            root_name: root.name().clone(),
            expression,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_chains() {
        assert_eq!(validate(vec![]).unwrap_err(), MalformedChain::Empty);
    }

    #[test]
    fn rejects_non_member_steps() {
        let error = validate(vec![
            Step::property("A"),
            Step::other("as Bar"),
            Step::property("B"),
        ])
        .unwrap_err();

        assert_eq!(
            error,
            MalformedChain::NotAMemberAccess {
                position: 1,
                step: "as Bar".to_owned()
            }
        );
    }
}
