use std::collections::HashMap;
use std::fmt;

use crate::error::{BridgeError, Result};
use crate::handle::IdAllocator;

/// Bridge-side identity of an engine entity.
///
/// The engine gives no way to ask an entity for its own id, so the bridge
/// numbers entities itself in a space separate from object handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub const NULL: EntityId = EntityId(0);

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}", self.0)
    }
}

/// Maps [`EntityId`]s to the engine's entity values.
pub struct EntityRegistry<T> {
    ids: IdAllocator,
    entities: HashMap<EntityId, T>,
}

impl<T> EntityRegistry<T> {
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            entities: HashMap::new(),
        }
    }

    pub fn insert(&mut self, entity: T) -> EntityId {
        let id = EntityId(self.ids.next());
        self.entities.insert(id, entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id)
    }

    /// Like [`get`](Self::get), but a miss is an [`BridgeError::UnknownEntity`].
    pub fn resolve(&self, id: EntityId) -> Result<&T> {
        self.entities.get(&id).ok_or_else(|| {
            log::warn!("Failed to find {id}");
            BridgeError::UnknownEntity(id)
        })
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.entities.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity and restart numbering at 1.
    pub fn drain(&mut self) -> Vec<(EntityId, T)> {
        self.ids.reset();
        self.entities.drain().collect()
    }
}

impl<T> Default for EntityRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one() {
        let mut reg = EntityRegistry::new();
        let a = reg.insert("a");
        let b = reg.insert("b");
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(reg.get(a), Some(&"a"));
    }

    #[test]
    fn test_removed_ids_are_not_reissued() {
        let mut reg = EntityRegistry::new();
        let a = reg.insert(10);
        reg.remove(a);
        let b = reg.insert(11);
        assert_ne!(a, b);
        assert!(!reg.contains(a));
    }

    #[test]
    fn test_null_is_never_registered() {
        let mut reg = EntityRegistry::new();
        reg.insert(());
        assert!(!reg.contains(EntityId::NULL));
    }

    #[test]
    fn test_drain_resets_numbering() {
        let mut reg = EntityRegistry::new();
        reg.insert('x');
        reg.insert('y');
        assert_eq!(reg.drain().len(), 2);
        assert!(reg.is_empty());
        assert_eq!(reg.insert('z').raw(), 1);
    }

    #[test]
    fn test_resolve_reports_unknown_entity() {
        let mut reg = EntityRegistry::new();
        let id = reg.insert(7u32);
        assert_eq!(*reg.resolve(id).unwrap(), 7);
        reg.remove(id);
        assert!(matches!(reg.resolve(id), Err(BridgeError::UnknownEntity(e)) if e == id));
    }
}
