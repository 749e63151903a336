use slotmap::{new_key_type, Key, KeyData, SlotMap};
use std::fmt;

new_key_type! {
    struct SlotKey;
}

/// Prefix of the global names under which a host may mirror bridge objects.
pub const OBJ_PREFIX: &str = "FILAMENT_API_OBJ_";

/// Opaque handle the host holds for a bridge object.
///
/// The low 32 bits are a slot index, the high 32 bits the slot's generation,
/// so a handle to a destroyed object never resolves to whatever later takes
/// its slot. Zero is the null sentinel and never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Global name for hosts that look objects up by name instead of by handle.
    pub fn published_name(self) -> String {
        format!("{OBJ_PREFIX}{}", self.0)
    }

    fn key(self) -> SlotKey {
        KeyData::from_ffi(self.0).into()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source. Starts at 1, never recycles until [`IdAllocator::reset`].
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    pub fn reset(&mut self) {
        self.last = 0;
    }

    /// The most recently issued id, 0 if none.
    pub fn last(&self) -> u64 {
        self.last
    }
}

/// Handle store mapping opaque [`Handle`]s to values.
/// The host holds these handles and passes them back on every call.
pub struct HandleStore<T> {
    items: SlotMap<SlotKey, T>,
}

impl<T> HandleStore<T> {
    pub fn new() -> Self {
        Self {
            items: SlotMap::with_key(),
        }
    }

    /// Insert an item and return its opaque handle.
    pub fn insert(&mut self, item: T) -> Handle {
        let key = self.items.insert(item);
        Handle(key.data().as_ffi())
    }

    /// Get an immutable reference by handle.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if handle.is_null() {
            return None;
        }
        self.items.get(handle.key())
    }

    /// Get a mutable reference by handle.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if handle.is_null() {
            return None;
        }
        self.items.get_mut(handle.key())
    }

    /// Like [`HandleStore::get`], but a miss is reported as a diagnostic.
    pub fn lookup(&self, handle: Handle) -> Option<&T> {
        let item = self.get(handle);
        if item.is_none() {
            log::warn!("Failed to find object {handle}");
        }
        item
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Remove and return the item.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if handle.is_null() {
            return None;
        }
        self.items.remove(handle.key())
    }

    /// Iterate over all items.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.items.iter().map(|(k, v)| (Handle(k.data().as_ffi()), v))
    }

    /// Remove every item, yielding them with their handles.
    pub fn drain(&mut self) -> impl Iterator<Item = (Handle, T)> + '_ {
        self.items.drain().map(|(k, v)| (Handle(k.data().as_ffi()), v))
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for HandleStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_allocator_starts_at_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.last(), 0);
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_allocator_never_repeats() {
        let mut ids = IdAllocator::new();
        let mut seen = HashSet::new();
        let mut prev = 0;
        for _ in 0..10_000 {
            let id = ids.next();
            assert!(id > prev);
            assert!(seen.insert(id));
            prev = id;
        }
    }

    #[test]
    fn test_allocator_reset() {
        let mut ids = IdAllocator::new();
        ids.next();
        ids.next();
        ids.reset();
        assert_eq!(ids.next(), 1);
    }

    #[test]
    fn test_insert_get_remove() {
        let mut store = HandleStore::new();
        let h = store.insert("camera");
        assert!(!h.is_null());
        assert_eq!(store.get(h), Some(&"camera"));
        assert_eq!(store.len(), 1);

        assert_eq!(store.remove(h), Some("camera"));
        assert!(store.get(h).is_none());
        assert!(store.lookup(h).is_none());
        assert!(store.remove(h).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_null_never_resolves() {
        let mut store = HandleStore::new();
        store.insert(1);
        assert!(store.get(Handle::NULL).is_none());
        assert!(store.get_mut(Handle::NULL).is_none());
        assert!(store.remove(Handle::NULL).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stale_handle_does_not_alias_reused_slot() {
        let mut store = HandleStore::new();
        let old = store.insert("first");
        store.remove(old);
        let new = store.insert("second");
        assert_ne!(old, new);
        assert!(store.get(old).is_none());
        assert_eq!(store.get(new), Some(&"second"));
    }

    #[test]
    fn test_garbage_handle_is_a_miss() {
        let store: HandleStore<u32> = HandleStore::new();
        assert!(store.get(Handle::from_raw(0xdead_beef_0000_0001)).is_none());
        assert!(store.get(Handle::from_raw(u64::MAX)).is_none());
    }

    #[test]
    fn test_drain_empties_store() {
        let mut store = HandleStore::new();
        let a = store.insert('a');
        let b = store.insert('b');
        let mut drained: Vec<_> = store.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![(a, 'a'), (b, 'b')]);
        assert!(store.is_empty());
        assert!(store.get(a).is_none());
    }

    #[test]
    fn test_published_name() {
        let h = Handle::from_raw(42);
        assert_eq!(h.published_name(), "FILAMENT_API_OBJ_42");
    }
}
