use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::RwLock;

use crate::{
    chain::{ChainDeclaration, FluentChainResolver, FluentId, FluentSetup},
    error::{Error, Result},
    expression::CallEvent,
    registry::Resolution,
    setup::{Declaration, SetupHandle, SetupId, SetupInfo},
    substitute::{SubstituteId, Substitutes},
    times::Times,
    verify::{self, Selection, VerificationEngine},
};

/// Engine-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Whether setups that do not say otherwise are verifiable.
    pub default_verifiable: bool,
    /// Joins a parent's name and a step when naming inner substitutes
    /// created by fluent chains.
    pub name_separator: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_verifiable: false,
            name_separator: ".",
        }
    }
}

/// Owner of every substitute object together with their setups.
///
/// Call interception feeds call events in through [`resolve`]; setup
/// syntax feeds declarations in through [`setup`] and
/// [`setup_chain`]. Every method takes `&self`: a repository can be
/// shared between threads that declare setups and threads that make
/// calls.
///
/// ```
/// use standin::{matcher, CallEvent, Declaration, Expression, Repository};
///
/// let repository = Repository::new();
/// let calculator = repository.create("calculator");
///
/// let add = repository
///     .setup(
///         calculator,
///         Declaration::new(Expression::method("add", (matcher::any(), matcher::eq(2))))
///             .returns(4)
///             .verifiable(),
///     )
///     .unwrap();
///
/// assert!(repository.verify_substitute(calculator).is_err());
///
/// let resolution = repository.resolve(calculator, &CallEvent::method("add", (2, 2))).unwrap();
/// assert_eq!(resolution.setup(), Some(add));
/// assert!(repository.verify_substitute(calculator).is_ok());
/// ```
///
/// [`resolve`]: Repository::resolve
/// [`setup`]: Repository::setup
/// [`setup_chain`]: Repository::setup_chain
#[derive(Debug, Default)]
pub struct Repository {
    config: Config,
    substitutes: Substitutes,
    next_fluent: AtomicUsize,
    fluents: RwLock<HashMap<FluentId, Arc<FluentSetup>>>,
}

impl Repository {
    pub fn new() -> Self {
        Repository::default()
    }

    pub fn with_config(config: Config) -> Self {
        Repository {
            config,
            ..Repository::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates a substitute object with an empty registry.
    pub fn create(&self, name: impl Into<String>) -> SubstituteId {
        let name: String = name.into();
        self.substitutes.create(name).id()
    }

    pub fn substitute_name(&self, id: SubstituteId) -> Result<Arc<str>> {
        Ok(self.substitutes.get(id)?.name().clone())
    }

    /// Number of substitutes, including inner substitutes created by
    /// fluent chains.
    pub fn substitutes_len(&self) -> usize {
        self.substitutes.len()
    }

    pub fn setup(&self, substitute: SubstituteId, mut declaration: Declaration) -> Result<SetupId> {
        let substitute = self.substitutes.get(substitute)?;
        declaration
            .verifiable
            .get_or_insert(self.config.default_verifiable);
        Ok(substitute.registry().register(declaration))
    }

    /// Declares a fluent chain starting on `root`.
    ///
    /// Returns [`Error::MalformedChain`] without registering anything
    /// if one of the steps is not a member access.
    pub fn setup_chain(
        &self,
        root: SubstituteId,
        declaration: ChainDeclaration,
    ) -> Result<FluentId> {
        let root = self.substitutes.get(root)?;
        let id = FluentId::new(self.next_fluent.fetch_add(1, Ordering::Relaxed));

        let fluent = FluentChainResolver::new(
            &self.substitutes,
            self.config.name_separator,
            self.config.default_verifiable,
        )
        .resolve(id, root, declaration)?;

        tracing::debug!(
            fluent = %id,
            chain = %fluent,
            steps = fluent.steps().len(),
            "registered fluent setup"
        );

        self.fluents.write().insert(id, Arc::new(fluent));
        Ok(id)
    }

    /// Resolves a call made on `substitute` to the setup that handles
    /// it.
    pub fn resolve(&self, substitute: SubstituteId, call: &CallEvent) -> Result<Resolution> {
        Ok(self.substitutes.get(substitute)?.registry().resolve(call))
    }

    pub fn setup_info(&self, id: SetupId) -> Result<SetupInfo> {
        self.substitutes
            .get(id.owner())?
            .registry()
            .info(id.index())
            .ok_or(Error::UnknownSetup(id))
    }

    /// Snapshot of every setup of a substitute, in registration order.
    pub fn setups(&self, substitute: SubstituteId) -> Result<Vec<SetupInfo>> {
        Ok(self.substitutes.get(substitute)?.registry().snapshot())
    }

    pub fn fluent(&self, id: FluentId) -> Result<Arc<FluentSetup>> {
        self.fluents
            .read()
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownFluent(id))
    }

    /// Verifies `setup` regardless of whether it is verifiable.
    ///
    /// When `recursive`, every verifiable setup reachable through its
    /// inner mock is verified as well.
    pub fn verify(&self, setup: impl Into<SetupHandle>, recursive: bool) -> Result<()> {
        self.verify_handle(setup.into(), Selection::Verifiable, recursive)
    }

    /// Verifies `setup` and every setup reachable through its inner
    /// mock, verifiable or not.
    pub fn verify_all(&self, setup: impl Into<SetupHandle>) -> Result<()> {
        self.verify_handle(setup.into(), Selection::All, true)
    }

    /// Verifies every verifiable setup of a substitute and of its inner
    /// mocks.
    pub fn verify_substitute(&self, substitute: SubstituteId) -> Result<()> {
        VerificationEngine::new(&self.substitutes).substitute(substitute, Selection::Verifiable)
    }

    /// Verifies every setup of a substitute and of its inner mocks.
    pub fn verify_all_substitute(&self, substitute: SubstituteId) -> Result<()> {
        VerificationEngine::new(&self.substitutes).substitute(substitute, Selection::All)
    }

    /// Verifies that `setup` handled a number of calls within `times`.
    pub fn verify_times(&self, setup: SetupId, times: Times) -> Result<()> {
        verify::times(&self.substitutes, setup, times)
    }

    fn verify_handle(
        &self,
        handle: SetupHandle,
        selection: Selection,
        recursive: bool,
    ) -> Result<()> {
        let engine = VerificationEngine::new(&self.substitutes);
        match handle {
            SetupHandle::Single(setup) => engine.setup(setup, selection, recursive),
            SetupHandle::Fluent(fluent) => {
                let fluent = self.fluent(fluent)?;
                engine.fluent(&fluent, selection, recursive)
            }
        }
    }
}
