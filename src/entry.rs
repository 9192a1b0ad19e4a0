use core::fmt;
use core::mem;

/// A key-value pair stored in a [`TreeMap`](crate::TreeMap).
///
/// Entries are read-only to callers. The map replaces an entry's value in place when a key is
/// re-inserted, so the entry stays at the same node.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry.
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Returns the key.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value.
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Splits the entry into its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    pub(crate) fn replace_value(&mut self, value: V) -> V {
        mem::replace(&mut self.value, value)
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.key, self.value)
    }
}

/// The payload of a node in a map's tree.
///
/// Internal nodes hold an [`Entry`]; external nodes are sentinels holding nothing. A map keeps
/// every `Empty` node a leaf and gives every `Entry` node exactly two children.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Slot<K, V> {
    /// An internal node's key-value pair.
    Entry(Entry<K, V>),
    /// A sentinel: no entry here yet.
    #[default]
    Empty,
}

impl<K, V> Slot<K, V> {
    /// Returns the entry, if this is an internal node's slot.
    #[must_use]
    pub const fn entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Slot::Entry(entry) => Some(entry),
            Slot::Empty => None,
        }
    }

    /// Returns true for a sentinel.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Consumes the slot, returning its entry if it had one.
    pub fn into_entry(self) -> Option<Entry<K, V>> {
        match self {
            Slot::Entry(entry) => Some(entry),
            Slot::Empty => None,
        }
    }
}
