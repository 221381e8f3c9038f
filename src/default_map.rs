use core::fmt::Debug;
use core::hash::BuildHasher;

use crate::DefaultHashBuilder;
use crate::key::Key;
use crate::map::Iter;
use crate::map::UpsertMap;

/// An [`UpsertMap`] paired with a producer that fills in missing values.
///
/// Where a plain map's `get` returns nothing for an absent key, this map's
/// [`get`](DefaultMap::get) upserts: the producer runs once for the key, the
/// result is stored, and every later `get` for an equal key returns the
/// stored value. The producer is fixed at construction, so the laziness of
/// [`get_or_insert_computed`](UpsertMap::get_or_insert_computed) comes
/// without threading a closure through every call site.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use upsert_map::DefaultMap;
/// use upsert_map::Key;
///
/// let mut groups: DefaultMap<Vec<&str>, _> = DefaultMap::new(|_| Vec::new());
/// groups.get_mut(Key::from("fruit")).push("pear");
/// groups.get_mut(Key::from("fruit")).push("plum");
/// groups.get_mut(Key::from("root")).push("beet");
///
/// assert_eq!(groups.get(Key::from("fruit")), &["pear", "plum"]);
/// assert_eq!(groups.len(), 2);
/// # }
/// ```
pub struct DefaultMap<V, F, S = DefaultHashBuilder> {
    map: UpsertMap<V, S>,
    producer: F,
}

impl<V, F, S> Debug for DefaultMap<V, F, S>
where
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultMap")
            .field("entries", &self.map)
            .finish_non_exhaustive()
    }
}

impl<V, F, S> DefaultMap<V, F, S>
where
    F: Fn(&Key) -> V,
    S: BuildHasher,
{
    /// Creates an empty map with the given producer and hasher builder.
    pub fn with_hasher(producer: F, hash_builder: S) -> Self {
        Self {
            map: UpsertMap::with_hasher(hash_builder),
            producer,
        }
    }

    /// Returns the value for `key`, producing and storing it first if the
    /// key is absent.
    ///
    /// The producer runs at most once per call and only on a miss.
    pub fn get(&mut self, key: Key) -> &V {
        self.get_mut(key)
    }

    /// Returns a mutable reference to the value for `key`, producing and
    /// storing it first if the key is absent.
    pub fn get_mut(&mut self, key: Key) -> &mut V {
        let producer = &self.producer;
        self.map.get_or_insert_computed(key, |key| producer(key))
    }

    /// Returns a reference to the value for `key` without producing one,
    /// like a plain map lookup.
    pub fn peek(&self, key: &Key) -> Option<&V> {
        self.map.get(key)
    }

    /// Returns `true` if the map contains the key. Never runs the producer.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts a key-value pair directly, bypassing the producer, and
    /// returns the previous value if the key was present.
    pub fn insert(&mut self, key: Key, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove(&mut self, key: &Key) -> Option<V> {
        self.map.remove(key)
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all entries, keeping the producer and allocated capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns an iterator over the key-value pairs, in arbitrary order.
    pub fn iter(&self) -> Iter<'_, V> {
        self.map.iter()
    }

    /// Consumes the map, discarding the producer and returning the
    /// underlying [`UpsertMap`].
    pub fn into_inner(self) -> UpsertMap<V, S> {
        self.map
    }
}

impl<V, F, S> DefaultMap<V, F, S>
where
    F: Fn(&Key) -> V,
    S: BuildHasher + Default,
{
    /// Creates an empty map with the given producer and the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::DefaultMap;
    /// use upsert_map::Key;
    ///
    /// let mut counters: DefaultMap<u64, _> = DefaultMap::new(|_| 0);
    /// *counters.get_mut(Key::from("hits")) += 1;
    /// *counters.get_mut(Key::from("hits")) += 1;
    /// assert_eq!(counters.get(Key::from("hits")), &2);
    /// # }
    /// ```
    pub fn new(producer: F) -> Self {
        Self::with_hasher(producer, S::default())
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::hash::BuildHasher;

    use alloc::string::String;
    use alloc::vec::Vec;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    #[test]
    fn test_get_produces_on_miss() {
        let calls = Cell::new(0);
        let mut map = DefaultMap::with_hasher(
            |key: &Key| {
                calls.set(calls.get() + 1);
                key.as_str().map_or(0, str::len)
            },
            SipHashBuilder::default(),
        );

        assert_eq!(map.get(Key::from("abc")), &3);
        assert_eq!(calls.get(), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_get_skips_producer_when_present() {
        let calls = Cell::new(0);
        let mut map = DefaultMap::with_hasher(
            |_: &Key| {
                calls.set(calls.get() + 1);
                0
            },
            SipHashBuilder::default(),
        );

        map.insert(Key::from("seeded"), 7);
        assert_eq!(map.get(Key::from("seeded")), &7);
        assert_eq!(calls.get(), 0);

        assert_eq!(map.get(Key::from("fresh")), &0);
        assert_eq!(map.get(Key::from("fresh")), &0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_grouping_pattern() {
        let mut groups: DefaultMap<Vec<&str>, _, SipHashBuilder> =
            DefaultMap::with_hasher(|_| Vec::new(), SipHashBuilder::default());

        for (kind, name) in [("a", "ant"), ("b", "bee"), ("a", "asp")] {
            groups.get_mut(Key::from(kind)).push(name);
        }

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get(Key::from("a")), &["ant", "asp"]);
        assert_eq!(groups.get(Key::from("b")), &["bee"]);
    }

    #[test]
    fn test_peek_and_contains_never_produce() {
        let calls = Cell::new(0);
        let map = DefaultMap::with_hasher(
            |_: &Key| {
                calls.set(calls.get() + 1);
                0
            },
            SipHashBuilder::default(),
        );

        assert_eq!(map.peek(&Key::from("absent")), None);
        assert!(!map.contains_key(&Key::from("absent")));
        assert_eq!(calls.get(), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_nan_key_produces_once() {
        let calls = Cell::new(0);
        let mut map = DefaultMap::with_hasher(
            |_: &Key| {
                calls.set(calls.get() + 1);
                String::from("entry")
            },
            SipHashBuilder::default(),
        );

        map.get(Key::Number(f64::NAN));
        map.get(Key::Number(f64::NAN));
        assert_eq!(calls.get(), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut map = DefaultMap::with_hasher(|_: &Key| 0, SipHashBuilder::default());

        map.get(Key::from("a"));
        map.insert(Key::from("b"), 2);
        assert_eq!(map.len(), 2);

        assert_eq!(map.remove(&Key::from("b")), Some(2));
        assert_eq!(map.len(), 1);

        map.clear();
        assert!(map.is_empty());

        // The producer survives clearing.
        assert_eq!(map.get(Key::from("c")), &0);
    }

    #[test]
    fn test_iter_and_into_inner() {
        let mut map = DefaultMap::with_hasher(|_: &Key| 1, SipHashBuilder::default());
        map.get(Key::from("a"));
        map.get(Key::from("b"));

        assert_eq!(map.iter().count(), 2);

        let inner = map.into_inner();
        assert_eq!(inner.len(), 2);
        assert_eq!(inner.get(&Key::from("a")), Some(&1));
    }
}
