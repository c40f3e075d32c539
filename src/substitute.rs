use std::{
    fmt::{self, Formatter},
    sync::Arc,
};

use parking_lot::RwLock;

use crate::{
    error::{Error, Result},
    registry::SetupRegistry,
};

/// Handle to a substitute object, its creation index within the
/// repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubstituteId(usize);

impl SubstituteId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SubstituteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub(crate) struct Substitute {
    id: SubstituteId,
    name: Arc<str>,
    registry: SetupRegistry,
}

impl Substitute {
    pub fn id(&self) -> SubstituteId {
        self.id
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn registry(&self) -> &SetupRegistry {
        &self.registry
    }
}

/// Arena of every substitute of a repository.
///
/// Substitutes are never removed, so an id stays valid for as long as
/// the arena lives. The arena lock is only held to push or clone out
/// an `Arc<Substitute>`, never while a registry is locked through it.
#[derive(Debug, Default)]
pub(crate) struct Substitutes {
    arena: RwLock<Vec<Arc<Substitute>>>,
}

impl Substitutes {
    pub fn create(&self, name: impl Into<Arc<str>>) -> Arc<Substitute> {
        let name = name.into();
        let mut arena = self.arena.write();
        let id = SubstituteId(arena.len());
        let substitute = Arc::new(Substitute {
            id,
            registry: SetupRegistry::new(id, name.clone()),
            name,
        });
        arena.push(substitute.clone());
        substitute
    }

    pub fn get(&self, id: SubstituteId) -> Result<Arc<Substitute>> {
        self.arena
            .read()
            .get(id.0)
            .cloned()
            .ok_or(Error::UnknownSubstitute(id))
    }

    pub fn len(&self) -> usize {
        self.arena.read().len()
    }
}
