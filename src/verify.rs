//! Verification of setups against the calls they handled.
//!
//! Verification starts from one setup (or one substitute) and follows
//! inner mocks recursively. Every setup found along the way that was
//! never matched is collected so a single failure reports all of them.

use std::{
    collections::HashSet,
    fmt::{self, Formatter},
    sync::Arc,
};

use crate::{
    chain::FluentSetup,
    error::{Error, Result},
    setup::{SetupId, SetupInfo},
    substitute::{SubstituteId, Substitutes},
    times::Times,
};

/// A setup that did not handle the expected number of calls.
///
/// `verify` and its variants only ask for a setup to have been matched,
/// so their violations expect [`Times::at_least_once`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    setup: SetupId,
    expression: String,
    owner: SubstituteId,
    owner_name: Arc<str>,
    expected: Times,
    actual: usize,
}

impl Violation {
    pub fn setup(&self) -> SetupId {
        self.setup
    }

    /// The setup's expression, as displayed.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn owner(&self) -> SubstituteId {
        self.owner
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn expected(&self) -> Times {
        self.expected
    }

    pub fn actual(&self) -> usize {
        self.actual
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: expected {}, but was matched {} {}",
            self.owner_name,
            self.expression,
            self.expected,
            self.actual,
            if self.actual == 1 { "time" } else { "times" }
        )
    }
}

/// Every violation found by one verification, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct VerificationFailure {
    violations: Vec<Violation>,
}

impl VerificationFailure {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✗ {} setup{} not satisfied:",
            self.violations.len(),
            if self.violations.len() == 1 { " was" } else { "s were" }
        )?;

        self.violations
            .iter()
            .try_for_each(|violation| write!(f, "\n  - {}", violation))
    }
}

/// Which setups of an inner mock are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    Verifiable,
    All,
}

impl Selection {
    fn includes(self, info: &SetupInfo) -> bool {
        !info.is_overridden() && (self == Selection::All || info.is_verifiable())
    }
}

pub(crate) struct VerificationEngine<'s> {
    substitutes: &'s Substitutes,
    violations: Vec<Violation>,
    // substitutes on the current recursion path
    path: HashSet<SubstituteId>,
    // substitutes whose registry was already swept
    swept: HashSet<SubstituteId>,
}

impl<'s> VerificationEngine<'s> {
    pub fn new(substitutes: &'s Substitutes) -> Self {
        VerificationEngine {
            substitutes,
            violations: vec![],
            path: HashSet::new(),
            swept: HashSet::new(),
        }
    }

    /// Checks `setup` itself, whatever its verifiable flag, and then
    /// the selected setups reachable through its inner mock.
    pub fn setup(mut self, setup: SetupId, selection: Selection, recursive: bool) -> Result<()> {
        self.visit_setup(setup, selection, recursive)?;
        self.finish()
    }

    /// Checks every step of a fluent chain, recursing from the inner
    /// mock of its last step.
    pub fn fluent(
        mut self,
        fluent: &FluentSetup,
        selection: Selection,
        recursive: bool,
    ) -> Result<()> {
        let steps = fluent.steps();
        for (position, &step) in steps.iter().enumerate() {
            let last = position + 1 == steps.len();
            self.visit_setup(step, selection, recursive && last)?;
        }
        self.finish()
    }

    /// Checks the selected setups of a substitute, recursively.
    pub fn substitute(mut self, substitute: SubstituteId, selection: Selection) -> Result<()> {
        self.visit_substitute(substitute, selection)?;
        self.finish()
    }

    fn visit_setup(&mut self, id: SetupId, selection: Selection, recursive: bool) -> Result<()> {
        let owner = self.substitutes.get(id.owner())?;
        let info = owner
            .registry()
            .info(id.index())
            .ok_or(Error::UnknownSetup(id))?;

        self.check(&info, owner.name());

        match info.inner_mock() {
            Some(inner) if recursive => {
                self.path.insert(owner.id());
                let visited = self.visit_substitute(inner, selection);
                self.path.remove(&owner.id());
                visited
            }
            _ => Ok(()),
        }
    }

    fn visit_substitute(&mut self, id: SubstituteId, selection: Selection) -> Result<()> {
        if !self.path.insert(id) {
            tracing::warn!(substitute = %id, "inner mock cycle detected, not verifying it again");
            return Ok(());
        }

        // reached again through another setup sharing the inner mock
        if !self.swept.insert(id) {
            self.path.remove(&id);
            return Ok(());
        }

        let substitute = self.substitutes.get(id)?;
        let snapshot = substitute.registry().snapshot();

        let visited = snapshot
            .iter()
            .filter(|info| selection.includes(info))
            .try_for_each(|info| {
                self.check(info, substitute.name());
                match info.inner_mock() {
                    Some(inner) => self.visit_substitute(inner, selection),
                    None => Ok(()),
                }
            });

        self.path.remove(&id);
        visited
    }

    fn check(&mut self, info: &SetupInfo, owner_name: &Arc<str>) {
        if info.was_matched() {
            return;
        }

        self.violations.push(Violation {
            setup: info.id(),
            expression: info.expression().to_string(),
            owner: info.owner(),
            owner_name: owner_name.clone(),
            expected: Times::at_least_once(),
            actual: info.match_count(),
        });
    }

    fn finish(self) -> Result<()> {
        if self.violations.is_empty() {
            return Ok(());
        }

        tracing::debug!(violations = self.violations.len(), "verification failed");
        Err(VerificationFailure {
            violations: self.violations,
        }
        .into())
    }
}

/// Checks the match count of a single setup against `times`.
pub(crate) fn times(substitutes: &Substitutes, id: SetupId, times: Times) -> Result<()> {
    let owner = substitutes.get(id.owner())?;
    let info = owner
        .registry()
        .info(id.index())
        .ok_or(Error::UnknownSetup(id))?;

    if times.contains(info.match_count()) {
        return Ok(());
    }

    Err(VerificationFailure {
        violations: vec![Violation {
            setup: id,
            expression: info.expression().to_string(),
            owner: owner.id(),
            owner_name: owner.name().clone(),
            expected: times,
            actual: info.match_count(),
        }],
    }
    .into())
}
