//! Append-only storage keyed by source identity

use std::{collections::HashMap, hash::Hash};

/// Slots that are only ever appended, plus a key-to-slot map
///
/// An index handed out once stays valid and keeps referring to the same
/// value for the arena's whole lifetime. A key maps to at most one slot.
#[derive(Debug)]
pub struct AssetArena<K, V> {
    slots: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for AssetArena<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> AssetArena<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `key`, creating it with `create` on a miss
    ///
    /// `create` runs only when the key is unknown. If it fails nothing is
    /// stored and the error is returned as is.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        create: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<usize, E> {
        if let Some(&slot) = self.index.get(&key) {
            return Ok(slot);
        }

        let value = create(&key)?;
        let slot = self.slots.len();
        self.slots.push(value);
        self.index.insert(key, slot);
        Ok(slot)
    }

    pub fn lookup(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, slot: usize) -> Option<&V> {
        self.slots.get(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_returns_same_slot_without_recreating() {
        let mut arena: AssetArena<&str, u32> = AssetArena::new();
        let mut created = 0;

        let first = arena
            .get_or_try_insert_with("a.obj", |_| {
                created += 1;
                Ok::<_, ()>(7)
            })
            .unwrap();
        let second = arena
            .get_or_try_insert_with("a.obj", |_| {
                created += 1;
                Ok::<_, ()>(8)
            })
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(created, 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(first), Some(&7));
    }

    #[test]
    fn distinct_keys_get_distinct_slots() {
        let mut arena: AssetArena<String, u32> = AssetArena::new();
        let a = arena
            .get_or_try_insert_with("a.obj".into(), |_| Ok::<_, ()>(1))
            .unwrap();
        let b = arena
            .get_or_try_insert_with("b.obj".into(), |_| Ok::<_, ()>(1))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn failed_creation_leaves_no_entry() {
        let mut arena: AssetArena<&str, u32> = AssetArena::new();
        let result = arena.get_or_try_insert_with("empty.obj", |_| Err("empty"));
        assert_eq!(result, Err("empty"));
        assert!(arena.is_empty());
        assert_eq!(arena.lookup(&"empty.obj"), None);

        let slot = arena
            .get_or_try_insert_with("empty.obj", |_| Ok::<_, &str>(3))
            .unwrap();
        assert_eq!(slot, 0);
    }

    #[test]
    fn indices_stay_stable_as_arena_grows() {
        let mut arena: AssetArena<u32, u32> = AssetArena::new();
        let first = arena.get_or_try_insert_with(0, |k| Ok::<_, ()>(*k)).unwrap();
        for key in 1..100 {
            arena.get_or_try_insert_with(key, |k| Ok::<_, ()>(*k)).unwrap();
        }
        assert_eq!(arena.get(first), Some(&0));
        assert_eq!(arena.lookup(&57), Some(57));
    }
}
