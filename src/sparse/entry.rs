use crate::order::{Equality, Order, SharedOrder};
use std::cmp::Ordering;
use std::fmt;

/// A key with its value.
///
/// The key is fixed once stored; the value can be replaced in place without
/// moving the entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Create an entry.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// The key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Mutable access to the value.
    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replaces the value, returning the previous one.
    pub fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Splits the entry into key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    /// The key, dropping the value.
    pub fn into_key(self) -> K {
        self.key
    }

    /// The value, dropping the key.
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Orders entries by key.
pub struct KeyOrder<K: ?Sized> {
    order: SharedOrder<K>,
}

impl<K: ?Sized> KeyOrder<K> {
    /// Lift `order` to entries.
    pub fn new(order: SharedOrder<K>) -> Self {
        Self { order }
    }
}

impl<K, V> Equality<Entry<K, V>> for KeyOrder<K> {
    #[inline]
    fn are_equal(&self, left: &Entry<K, V>, right: &Entry<K, V>) -> bool {
        self.order.are_equal(&left.key, &right.key)
    }
}

impl<K, V> Order<Entry<K, V>> for KeyOrder<K> {
    #[inline]
    fn compare(&self, left: &Entry<K, V>, right: &Entry<K, V>) -> Ordering {
        self.order.compare(&left.key, &right.key)
    }

    #[inline]
    fn index_of(&self, value: &Entry<K, V>) -> u32 {
        self.order.index_of(&value.key)
    }
}
