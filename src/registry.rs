use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    error::UnhandledCall,
    expression::{CallEvent, Expression},
    matcher,
    response::Response,
    setup::{Declaration, Setup, SetupId, SetupInfo},
    substitute::{Substitute, SubstituteId, Substitutes},
};

struct Entry {
    setup: Arc<Setup>,
    overridden: bool,
    match_count: usize,
}

impl Entry {
    fn info(&self) -> SetupInfo {
        SetupInfo {
            setup: self.setup.clone(),
            overridden: self.overridden,
            match_count: self.match_count,
        }
    }
}

/// Ordered, append-only collection of the setups of one substitute.
///
/// Registration order is override priority: when a call comes in the
/// most recently registered setup that matches handles it. A single
/// lock guards the sequence, override flags and match counters. User
/// code (argument predicates and guards) never runs while it is held.
pub struct SetupRegistry {
    owner: SubstituteId,
    owner_name: Arc<str>,
    entries: Mutex<Vec<Entry>>,
}

/// Outcome of resolving a call against a registry.
#[derive(Debug, Clone)]
pub enum Resolution {
    Handled(Resolved),
    Unhandled(UnhandledCall),
}

/// The setup that handled a call.
#[derive(Debug, Clone)]
pub struct Resolved {
    setup: SetupId,
    response: Response,
    inner_mock: Option<SubstituteId>,
}

impl Resolved {
    pub fn setup(&self) -> SetupId {
        self.setup
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn inner_mock(&self) -> Option<SubstituteId> {
        self.inner_mock
    }
}

impl Resolution {
    pub fn is_handled(&self) -> bool {
        matches!(self, Resolution::Handled(_))
    }

    /// The setup that handled the call, if any.
    pub fn setup(&self) -> Option<SetupId> {
        match self {
            Resolution::Handled(resolved) => Some(resolved.setup),
            Resolution::Unhandled(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Resolved, UnhandledCall> {
        match self {
            Resolution::Handled(resolved) => Ok(resolved),
            Resolution::Unhandled(unhandled) => Err(unhandled),
        }
    }
}

impl SetupRegistry {
    pub(crate) fn new(owner: SubstituteId, owner_name: Arc<str>) -> Self {
        SetupRegistry {
            owner,
            owner_name,
            entries: Mutex::new(vec![]),
        }
    }

    /// Appends a setup.
    ///
    /// A non-conditional setup overrides every earlier non-conditional
    /// setup with an equivalent expression.
    pub fn register(&self, declaration: Declaration) -> SetupId {
        let mut entries = self.entries.lock();
        self.push(&mut entries, declaration)
    }

    /// Returns the newest non-conditional setup equivalent to
    /// `expression` along with its inner substitute, if it has one in
    /// `substitutes`. Otherwise registers the declaration built by
    /// `make`, which also returns the substitute it created.
    ///
    /// Both happen under one lock so concurrent fluent declarations of
    /// the same prefix end up sharing a single inner substitute.
    pub(crate) fn find_or_register(
        &self,
        expression: &Expression,
        substitutes: &Substitutes,
        make: impl FnOnce() -> (Declaration, Arc<Substitute>),
    ) -> (SetupId, Arc<Substitute>) {
        let mut entries = self.entries.lock();

        let existing = entries
            .iter()
            .rev()
            .find(|entry| !entry.setup.is_conditional() && entry.setup.expression() == expression)
            .and_then(|entry| {
                let inner = substitutes.get(entry.setup.inner_mock()?).ok()?;
                Some((entry.setup.id(), inner))
            });

        if let Some(existing) = existing {
            return existing;
        }

        let (declaration, inner) = make();
        (self.push(&mut entries, declaration), inner)
    }

    fn push(&self, entries: &mut Vec<Entry>, declaration: Declaration) -> SetupId {
        let id = SetupId::new(self.owner, entries.len());
        let setup = Setup::new(id, declaration);

        let mut overridden = 0;
        if !setup.is_conditional() {
            entries
                .iter_mut()
                .filter(|entry| {
                    !entry.overridden
                        && !entry.setup.is_conditional()
                        && entry.setup.expression() == setup.expression()
                })
                .for_each(|entry| {
                    entry.overridden = true;
                    overridden += 1;
                });
        }

        tracing::debug!(
            owner = %self.owner_name,
            setup = %id,
            expression = %setup.expression(),
            conditional = setup.is_conditional(),
            overridden,
            "registered setup"
        );

        entries.push(Entry {
            setup: Arc::new(setup),
            overridden: false,
            match_count: 0,
        });

        id
    }

    /// Finds the setup that should handle `call`.
    ///
    /// Setups are tried from most to least recently registered,
    /// skipping overridden ones. On success the setup's match count is
    /// incremented; an unhandled call changes nothing.
    ///
    /// If the chosen setup got overridden while matchers were running,
    /// the call is resolved again against the current setups.
    pub fn resolve(&self, call: &CallEvent) -> Resolution {
        loop {
            // clone the candidates so user predicates run without the lock
            let candidates: Vec<Arc<Setup>> = {
                let entries = self.entries.lock();
                entries
                    .iter()
                    .rev()
                    .filter(|entry| !entry.overridden)
                    .map(|entry| entry.setup.clone())
                    .collect()
            };

            let setup = match candidates.iter().find(|setup| matcher::matches(setup, call)) {
                Some(setup) => setup,
                None => return self.unhandled(call, &candidates),
            };

            {
                let mut entries = self.entries.lock();
                let entry = &mut entries[setup.id().index()];
                if entry.overridden {
                    tracing::trace!(
                        owner = %self.owner_name,
                        %call,
                        setup = %setup.id(),
                        "setup overridden while matching, resolving again"
                    );
                    continue;
                }
                entry.match_count += 1;
            }

            tracing::trace!(owner = %self.owner_name, %call, setup = %setup.id(), "call handled");

            return Resolution::Handled(Resolved {
                setup: setup.id(),
                response: setup.response().clone(),
                inner_mock: setup.inner_mock(),
            });
        }
    }

    fn unhandled(&self, call: &CallEvent, candidates: &[Arc<Setup>]) -> Resolution {
        tracing::trace!(
            owner = %self.owner_name,
            %call,
            candidates = candidates.len(),
            "call unhandled"
        );

        let mismatches = candidates
            .iter()
            .filter_map(|setup| {
                matcher::check(setup, call)
                    .err()
                    .map(|mismatch| (setup.id(), mismatch))
            })
            .collect();

        Resolution::Unhandled(UnhandledCall {
            owner: self.owner,
            owner_name: self.owner_name.clone(),
            call: call.clone(),
            mismatches,
        })
    }

    pub fn info(&self, index: usize) -> Option<SetupInfo> {
        self.entries.lock().get(index).map(Entry::info)
    }

    /// Consistent view of every setup, in registration order.
    pub fn snapshot(&self) -> Vec<SetupInfo> {
        self.entries.lock().iter().map(Entry::info).collect()
    }
}

impl std::fmt::Debug for SetupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // do not try to run user code through the setups
        f.debug_struct("SetupRegistry")
            .field("owner", &self.owner)
            .field("setups_len", &self.entries.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{matcher, substitute::Substitutes};

    fn registry() -> Arc<crate::substitute::Substitute> {
        Substitutes::default().create("registry")
    }

    #[test]
    fn find_or_register_reuses_inner_mocks() {
        let substitutes = Substitutes::default();
        let root = substitutes.create("root");
        let expression = Expression::property("Child");

        let (first, inner) = root.registry().find_or_register(&expression, &substitutes, || {
            let child = substitutes.create("root.Child");
            (Declaration::new(expression.clone()).returns_substitute(child.id()), child)
        });
        let (second, reused) = root
            .registry()
            .find_or_register(&expression, &substitutes, || {
                panic!("should have reused the first step")
            });

        assert_eq!(first, second);
        assert_eq!(inner.id(), reused.id());
        assert_eq!(substitutes.len(), 2);
    }

    #[test]
    fn find_or_register_skips_setups_without_inner_mock() {
        let substitutes = Substitutes::default();
        let root = substitutes.create("root");
        let expression = Expression::property("Child");
        root.registry()
            .register(Declaration::new(expression.clone()).returns(3));

        let (id, inner) = root.registry().find_or_register(&expression, &substitutes, || {
            let child = substitutes.create("root.Child");
            (Declaration::new(expression.clone()).returns_substitute(child.id()), child)
        });

        assert_eq!(id.index(), 1);
        assert_eq!(
            root.registry().info(1).and_then(|info| info.inner_mock()),
            Some(inner.id())
        );
        assert!(root.registry().info(0).map_or(false, |info| info.is_overridden()));
    }

    #[test]
    fn find_or_register_skips_inner_mocks_of_other_arenas() {
        let substitutes = Substitutes::default();
        let root = substitutes.create("root");
        let expression = Expression::property("Child");

        let elsewhere = Substitutes::default();
        elsewhere.create("a");
        let foreign = elsewhere.create("b").id();
        root.registry()
            .register(Declaration::new(expression.clone()).returns_substitute(foreign));

        let (id, inner) = root.registry().find_or_register(&expression, &substitutes, || {
            let child = substitutes.create("root.Child");
            (Declaration::new(expression.clone()).returns_substitute(child.id()), child)
        });

        assert_eq!(id.index(), 1);
        assert_eq!(inner.name().as_ref(), "root.Child");
        assert!(root.registry().info(0).map_or(false, |info| info.is_overridden()));
    }

    #[test]
    fn unhandled_explains_every_candidate() {
        let substitute = registry();
        let registry = substitute.registry();
        registry.register(Declaration::new(Expression::method("get", (matcher::eq(1),))));
        registry.register(Declaration::new(Expression::property("get")));

        let resolution = registry.resolve(&CallEvent::method("get", (2,)));
        let unhandled = match resolution {
            Resolution::Unhandled(unhandled) => unhandled,
            Resolution::Handled(_) => panic!("call should not be handled"),
        };

        let explained: Vec<_> = unhandled.mismatches().iter().map(|(id, _)| id.index()).collect();
        assert_eq!(explained, vec![1, 0]);
    }
}
