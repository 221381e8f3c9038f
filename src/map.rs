use core::fmt::Debug;
use core::hash::BuildHasher;

use hashbrown::HashMap;

use crate::DefaultHashBuilder;
use crate::key::Key;

/// A map from dynamically typed [`Key`]s to values of a single type `V`.
///
/// `UpsertMap<V, S>` wraps a [`hashbrown::HashMap`] keyed by [`Key`], whose
/// `Eq` and `Hash` implement the *SameValueZero* relation: NaN keys unify,
/// the two zero signs unify, and symbol or object keys compare by identity.
/// Storage, collision handling, and resizing are entirely the wrapped map's
/// business; this type contributes the key semantics and the
/// [upsert operation family](crate::upsert) layered on top.
///
/// The map owns its entries exclusively. Every operation takes `&self` or
/// `&mut self`, so a lookup-then-insert sequence can never interleave with
/// another caller.
#[derive(Clone)]
pub struct UpsertMap<V, S = DefaultHashBuilder> {
    pub(crate) entries: HashMap<Key, V, S>,
}

impl<V, S> Debug for UpsertMap<V, S>
where
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<V, S> UpsertMap<V, S>
where
    S: BuildHasher,
{
    /// Creates an empty map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use upsert_map::UpsertMap;
    ///
    /// let map: UpsertMap<i32, _> = UpsertMap::with_hasher(RandomState::new());
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            entries: HashMap::with_hasher(hash_builder),
        }
    }

    /// Creates an empty map with the specified capacity and hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use upsert_map::UpsertMap;
    ///
    /// let map: UpsertMap<i32, _> = UpsertMap::with_capacity_and_hasher(100, RandomState::new());
    /// assert!(map.capacity() >= 100);
    /// # }
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(Key::from("a"), 1);
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// assert!(map.is_empty());
    /// map.insert(Key::from("a"), 1);
    /// assert!(!map.is_empty());
    /// # }
    /// ```
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::UpsertMap;
    ///
    /// let map: UpsertMap<i32> = UpsertMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// # }
    /// ```
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Removes all entries from the map, keeping the allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// map.clear();
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reserves capacity for at least `additional` more entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<i32> = UpsertMap::new();
    /// map.reserve(100);
    /// assert!(map.capacity() >= 100);
    /// # }
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    /// Shrinks the capacity of the map as much as possible.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::with_capacity(100);
    /// map.insert(Key::from("a"), 1);
    /// map.shrink_to_fit();
    /// assert_eq!(map.get(&Key::from("a")), Some(&1));
    /// # }
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }

    /// Inserts a key-value pair, returning the previous value if the key was
    /// present.
    ///
    /// The key is matched under SameValueZero, so inserting under
    /// `Key::Number(-0.0)` replaces the value stored under
    /// `Key::Number(0.0)`. A negative zero key is stored as positive zero.
    ///
    /// Unlike the [upsert operations](crate::upsert), `insert` always
    /// overwrites a present value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// assert_eq!(map.insert(Key::from("a"), 1), None);
    /// assert_eq!(map.insert(Key::from("a"), 2), Some(1));
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, key: Key, value: V) -> Option<V> {
        self.entries.insert(key.canonical(), value)
    }

    /// Returns a reference to the value associated with the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// assert_eq!(map.get(&Key::from("a")), Some(&1));
    /// assert_eq!(map.get(&Key::from("b")), None);
    /// # }
    /// ```
    pub fn get(&self, key: &Key) -> Option<&V> {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the value associated with the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// if let Some(value) = map.get_mut(&Key::from("a")) {
    ///     *value += 1;
    /// }
    /// assert_eq!(map.get(&Key::from("a")), Some(&2));
    /// # }
    /// ```
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Returns `true` if the map contains the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::Number(f64::NAN), 1);
    /// assert!(map.contains_key(&Key::Number(f64::NAN)));
    /// assert!(!map.contains_key(&Key::from("a")));
    /// # }
    /// ```
    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// assert_eq!(map.remove(&Key::from("a")), Some(1));
    /// assert_eq!(map.remove(&Key::from("a")), None);
    /// # }
    /// ```
    pub fn remove(&mut self, key: &Key) -> Option<V> {
        self.entries.remove(key)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// assert_eq!(map.remove_entry(&Key::from("a")), Some((Key::from("a"), 1)));
    /// # }
    /// ```
    pub fn remove_entry(&mut self, key: &Key) -> Option<(Key, V)> {
        self.entries.remove_entry(key)
    }

    /// Returns an iterator over the key-value pairs of the map, in arbitrary
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// map.insert(Key::from("b"), 2);
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key:?}: {value}");
    /// }
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Returns an iterator over the keys of the map, in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// map.insert(Key::from("b"), 2);
    /// assert_eq!(map.keys().count(), 2);
    /// # }
    /// ```
    pub fn keys(&self) -> Keys<'_, V> {
        Keys {
            inner: self.entries.keys(),
        }
    }

    /// Returns an iterator over the values of the map, in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// map.insert(Key::from("b"), 2);
    ///
    /// let total: i32 = map.values().sum();
    /// assert_eq!(total, 3);
    /// # }
    /// ```
    pub fn values(&self) -> Values<'_, V> {
        Values {
            inner: self.entries.values(),
        }
    }

    /// Returns an iterator that removes and yields all key-value pairs.
    ///
    /// After calling `drain()`, the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("a"), 1);
    /// map.insert(Key::from("b"), 2);
    ///
    /// let pairs: Vec<_> = map.drain().collect();
    /// assert_eq!(pairs.len(), 2);
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            inner: self.entries.drain(),
        }
    }
}

impl<V, S> UpsertMap<V, S>
where
    S: BuildHasher + Default,
{
    /// Creates an empty map using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::UpsertMap;
    ///
    /// let map: UpsertMap<i32> = UpsertMap::new();
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map with the specified capacity using the default
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::UpsertMap;
    ///
    /// let map: UpsertMap<i32> = UpsertMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<V, S> Default for UpsertMap<V, S>
where
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> PartialEq for UpsertMap<V, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V, S> Eq for UpsertMap<V, S>
where
    V: Eq,
    S: BuildHasher,
{
}

impl<V, S> FromIterator<(Key, V)> for UpsertMap<V, S>
where
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (Key, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<V, S> Extend<(Key, V)> for UpsertMap<V, S>
where
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (Key, V)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(key, value)| (key.canonical(), value)));
    }
}

impl<'a, V, S> IntoIterator for &'a UpsertMap<V, S>
where
    S: BuildHasher,
{
    type IntoIter = Iter<'a, V>;
    type Item = (&'a Key, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V, S> IntoIterator for UpsertMap<V, S> {
    type IntoIter = IntoIter<V>;
    type Item = (Key, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

/// An iterator over the key-value pairs of an `UpsertMap`.
pub struct Iter<'a, V> {
    inner: hashbrown::hash_map::Iter<'a, Key, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the keys of an `UpsertMap`.
pub struct Keys<'a, V> {
    inner: hashbrown::hash_map::Keys<'a, Key, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a Key;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the values of an `UpsertMap`.
pub struct Values<'a, V> {
    inner: hashbrown::hash_map::Values<'a, Key, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining iterator over the key-value pairs of an `UpsertMap`.
pub struct Drain<'a, V> {
    inner: hashbrown::hash_map::Drain<'a, Key, V>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = (Key, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning iterator over the key-value pairs of an `UpsertMap`.
pub struct IntoIter<V> {
    inner: hashbrown::hash_map::IntoIter<Key, V>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (Key, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
