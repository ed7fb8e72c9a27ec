use std::collections::HashSet;
use std::hash::Hash;
use std::sync::RwLock;

use crate::error::{Error, Result};

struct RecencyInner<K> {
    order: Vec<K>,
    members: HashSet<K>,
}

/// An ordered set of keys modeling least-to-most-recently-used.
///
/// Membership is unique: pushing an existing key removes it from its
/// current position and reinserts it at the top. The bottom of the set is
/// the least recently pushed member. Reprioritization scans for the key's
/// position, so `push` of an existing member is O(n); the ordered
/// semantics are what callers rely on, not the complexity.
///
/// Access is gated by a reader-writer lock, so concurrent readers observe
/// the set in some state consistent with a serial history of writers.
pub struct RecencySet<K> {
    inner: RwLock<RecencyInner<K>>,
}

impl<K> RecencySet<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> RecencySet<K> {
        RecencySet {
            inner: RwLock::new(RecencyInner { order: Vec::new(), members: HashSet::new() }),
        }
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap();
        inner.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        let inner = self.inner.read().unwrap();
        inner.members.contains(key)
    }

    /// Insert `key` at the top. If `key` is already a member it is moved
    /// from its current position to the top instead.
    pub fn push(&self, key: K) {
        let mut inner = self.inner.write().unwrap();
        if inner.members.contains(&key) {
            // position is guaranteed: members mirrors order
            let at = inner.order.iter().position(|k| *k == key).unwrap();
            inner.order.remove(at);
        } else {
            inner.members.insert(key.clone());
        }
        inner.order.push(key);
    }

    /// Remove and return the top (most recent) member.
    pub fn pop(&self) -> Option<K> {
        let mut inner = self.inner.write().unwrap();
        let key = inner.order.pop();
        if let Some(k) = &key {
            inner.members.remove(k);
        }
        key
    }

    /// The most recently pushed member, or None if the set is empty.
    pub fn top(&self) -> Option<K> {
        let inner = self.inner.read().unwrap();
        inner.order.last().cloned()
    }

    /// The least recently pushed member, or None if the set is empty.
    pub fn bottom(&self) -> Option<K> {
        let inner = self.inner.read().unwrap();
        inner.order.first().cloned()
    }

    /// Remove `key` no matter where it sits in the order.
    pub fn remove(&self, key: &K) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.members.remove(key) {
            return Err(Error::NotFound);
        }
        let at = inner.order.iter().position(|k| k == key).unwrap();
        inner.order.remove(at);
        Ok(())
    }

    /// A snapshot of the members, bottom (least recent) first.
    pub fn ordered(&self) -> Vec<K> {
        let inner = self.inner.read().unwrap();
        inner.order.clone()
    }
}

impl<K> Default for RecencySet<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_orders_bottom_to_top() {
        let set = RecencySet::new();
        set.push(1);
        set.push(2);
        set.push(3);
        assert_eq!(set.len(), 3);
        assert_eq!(set.top(), Some(3));
        assert_eq!(set.bottom(), Some(1));
        assert_eq!(set.ordered(), vec![1, 2, 3]);
    }

    #[test]
    fn test_push_reprioritizes_existing_member() {
        let set = RecencySet::new();
        set.push(10);
        set.push(20);
        set.push(10);
        assert_eq!(set.len(), 2);
        assert_eq!(set.top(), Some(10));
        assert_eq!(set.bottom(), Some(20));
    }

    #[test]
    fn test_push_is_idempotent() {
        let set = RecencySet::new();
        set.push(1);
        set.push(2);
        set.push(2);
        assert_eq!(set.len(), 2);
        assert_eq!(set.ordered(), vec![1, 2]);
    }

    #[test]
    fn test_pop() {
        let set = RecencySet::new();
        set.push(1);
        set.push(2);
        set.push(3);
        assert_eq!(set.pop(), Some(3));
        assert_eq!(set.len(), 2);
        assert_eq!(set.top(), Some(2));
        assert!(!set.contains(&3));
        set.push(3);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_pop_empty() {
        let set: RecencySet<u64> = RecencySet::new();
        assert_eq!(set.pop(), None);
        assert_eq!(set.top(), None);
        assert_eq!(set.bottom(), None);
    }

    #[test]
    fn test_remove() -> Result<()> {
        let set = RecencySet::new();
        set.push(1);
        set.push(2);
        set.push(3);
        set.remove(&2)?;
        assert_eq!(set.len(), 2);
        assert_eq!(set.ordered(), vec![1, 3]);
        set.remove(&1)?;
        set.remove(&3)?;
        assert!(set.is_empty());
        Ok(())
    }

    #[test]
    fn test_remove_absent_member() {
        let set = RecencySet::new();
        set.push(1);
        assert_eq!(set.remove(&2), Err(Error::NotFound));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_concurrent_pushes_keep_membership_unique() {
        use std::sync::Arc;

        let set = Arc::new(RecencySet::new());
        let mut handles = vec![];
        for t in 0..8 {
            let set = Arc::clone(&set);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    set.push((t + i) % 16);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let ordered = set.ordered();
        assert_eq!(ordered.len(), set.len());
        let unique: std::collections::HashSet<_> = ordered.iter().collect();
        assert_eq!(unique.len(), ordered.len());
    }
}
