use slotmap::{Key, SlotMap};

/// Generic slotmap-backed asset pool.
///
/// Handles are generation-checked: a handle to a removed asset resolves
/// to `None` instead of aliasing a new resident, which is what turns
/// use-after-dispose into a detectable skip rather than undefined
/// behavior.
#[derive(Debug)]
pub struct Assets<K: Key, T> {
    map: SlotMap<K, T>,
}

impl<K: Key, T> Default for Assets<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, T> Assets<K, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, value: T) -> K {
        self.map.insert(value)
    }

    #[must_use]
    pub fn get(&self, key: K) -> Option<&T> {
        self.map.get(key)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.map.get_mut(key)
    }

    /// Removes and returns the asset. The caller owns the disposal
    /// follow-up (cache invalidation, GPU release).
    pub fn remove(&mut self, key: K) -> Option<T> {
        self.map.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.map.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.map.iter_mut()
    }
}
