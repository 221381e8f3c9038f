use core::hash::BuildHasher;

use hashbrown::hash_map::Entry as InnerEntry;

use crate::DefaultHashBuilder;
use crate::key::Key;
use crate::map::UpsertMap;

/// Policy applied by [`UpsertMap::upsert`] when the key is already present.
///
/// The historical drafts of the operation family disagree on whether an
/// upsert overwrites a present value. The policy makes that choice explicit
/// at the call site; every named variant in this crate binds [`Keep`].
///
/// [`Keep`]: OnPresent::Keep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnPresent {
    /// Keep the stored value; the offered value is dropped.
    Keep,
    /// Replace the stored value with the offered one. The stored key is not
    /// re-stored.
    Replace,
}

impl<V, S> UpsertMap<V, S>
where
    S: BuildHasher,
{
    /// Resolves the key to a view of its slot in the map, either
    /// [`Occupied`](Entry::Occupied) or [`Vacant`](Entry::Vacant).
    ///
    /// Every upsert variant is a wrapper over this single resolution; the
    /// lookup happens once, and the returned view inserts or reads without
    /// a second lookup.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Entry;
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.insert(Key::from("present"), 1);
    ///
    /// match map.entry(Key::from("present")) {
    ///     Entry::Occupied(entry) => assert_eq!(entry.get(), &1),
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    ///
    /// match map.entry(Key::from("absent")) {
    ///     Entry::Occupied(_) => unreachable!(),
    ///     Entry::Vacant(entry) => {
    ///         entry.insert(2);
    ///     }
    /// }
    /// assert_eq!(map.len(), 2);
    /// # }
    /// ```
    pub fn entry(&mut self, key: Key) -> Entry<'_, V, S> {
        match self.entries.entry(key.canonical()) {
            InnerEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            InnerEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry }),
        }
    }

    /// The canonical upsert: returns the value for `key`, inserting `value`
    /// if the key is absent, with an explicit [`OnPresent`] policy for the
    /// present case.
    ///
    /// Exactly one entry exists for `key` afterward. Under
    /// [`OnPresent::Keep`] a present entry is untouched and `value` is
    /// dropped; under [`OnPresent::Replace`] the stored value is replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::OnPresent;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<_> = UpsertMap::new();
    /// map.upsert(Key::from("counter"), 1, OnPresent::Keep);
    /// map.upsert(Key::from("counter"), 2, OnPresent::Keep);
    /// assert_eq!(map.get(&Key::from("counter")), Some(&1));
    ///
    /// map.upsert(Key::from("counter"), 3, OnPresent::Replace);
    /// assert_eq!(map.get(&Key::from("counter")), Some(&3));
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn upsert(&mut self, key: Key, value: V, on_present: OnPresent) -> &mut V {
        match self.entry(key) {
            Entry::Occupied(mut entry) => {
                if on_present == OnPresent::Replace {
                    entry.insert(value);
                }
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(value),
        }
    }

    /// Returns the value for `key`, inserting `value` if the key is absent.
    ///
    /// A present value always wins: repeated calls with the same key keep
    /// returning the first value, and the offered one is dropped. The value
    /// is taken as-is; use
    /// [`get_or_insert_computed`](UpsertMap::get_or_insert_computed) when
    /// producing it is worth deferring.
    ///
    /// The operation is inherent to [`UpsertMap`]; there is no extension
    /// trait, so calling it on a lookalike map is a compile error rather
    /// than a runtime receiver check:
    ///
    /// ```compile_fail
    /// use upsert_map::Key;
    ///
    /// let mut lookalike = std::collections::HashMap::<Key, i32>::new();
    /// lookalike.get_or_insert(Key::from("a"), 1);
    /// ```
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
    /// assert_eq!(*map.get_or_insert(Key::from("a"), 1), 1);
    /// assert_eq!(*map.get_or_insert(Key::from("a"), 2), 1);
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn get_or_insert(&mut self, key: Key, value: V) -> &mut V {
        self.upsert(key, value, OnPresent::Keep)
    }

    /// Returns the value for `key`, inserting the value produced by
    /// `callback` if the key is absent.
    ///
    /// On a hit the callback is never invoked. On a miss it is invoked
    /// exactly once, synchronously, with the key as its only argument, and
    /// its result is inserted. The map is exclusively borrowed for the whole
    /// call, so the callback cannot observe or mutate it; if the callback
    /// panics, the unwind propagates and nothing is inserted.
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
    /// map.insert(Key::from("cached"), 1);
    ///
    /// // Present key: the callback does not run.
    /// let value = map.get_or_insert_computed(Key::from("cached"), |_| unreachable!());
    /// assert_eq!(*value, 1);
    ///
    /// // Absent key: produced once, from the key.
    /// let value = map.get_or_insert_computed(Key::from("abc"), |key| {
    ///     key.as_str().map_or(0, str::len)
    /// });
    /// assert_eq!(*value, 3);
    /// # }
    /// ```
    pub fn get_or_insert_computed<F>(&mut self, key: Key, callback: F) -> &mut V
    where
        F: FnOnce(&Key) -> V,
    {
        self.entry(key).or_insert_with_key(callback)
    }

    /// Returns the value for `key`, inserting the value produced by
    /// `callback` if the key is absent and the production succeeds.
    ///
    /// On a hit the callback is never invoked and the stored value is
    /// returned. On a miss the callback runs once; `Ok` inserts and returns
    /// the value, while `Err` is returned unmodified and the map is left
    /// unchanged, with no entry inserted. The error is the caller's own
    /// type, untouched, so its identity survives the round trip.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use upsert_map::Key;
    /// use upsert_map::UpsertMap;
    ///
    /// let mut map: UpsertMap<i32> = UpsertMap::new();
    ///
    /// let result = map.try_get_or_insert_computed(Key::from(1), |_| Err("no backing row"));
    /// assert_eq!(result, Err("no backing row"));
    /// assert!(!map.contains_key(&Key::from(1)));
    ///
    /// let result = map.try_get_or_insert_computed(Key::from(1), |_| Ok::<_, &str>(10));
    /// assert_eq!(result.copied(), Ok(10));
    /// # }
    /// ```
    pub fn try_get_or_insert_computed<F, E>(&mut self, key: Key, callback: F) -> Result<&mut V, E>
    where
        F: FnOnce(&Key) -> Result<V, E>,
    {
        self.entry(key).or_try_insert_with(callback)
    }

    /// Legacy value-eager shape of the upsert: returns the existing value if
    /// the key is present, ignoring `value` entirely, and otherwise inserts
    /// `value` and returns it.
    ///
    /// Never overwrites. Equivalent to
    /// [`get_or_insert`](UpsertMap::get_or_insert) with a shared return,
    /// kept for parity with the historical call shape.
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
    /// assert_eq!(map.emplace(Key::from("key"), "val"), &"val");
    /// assert_eq!(map.emplace(Key::from("key"), "new"), &"val");
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn emplace(&mut self, key: Key, value: V) -> &V {
        self.upsert(key, value, OnPresent::Keep)
    }

    /// Like [`emplace`](UpsertMap::emplace), but returns the map itself for
    /// chaining.
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
    /// map.emplace_kv(Key::from(123), "number")
    ///     .emplace_kv(Key::from("stringKey"), "string")
    ///     .emplace_kv(Key::Bool(true), "boolean");
    /// assert_eq!(map.len(), 3);
    /// # }
    /// ```
    pub fn emplace_kv(&mut self, key: Key, value: V) -> &mut Self {
        self.upsert(key, value, OnPresent::Keep);
        self
    }
}

/// A view into a single entry in an [`UpsertMap`], which may be vacant or
/// occupied.
///
/// Constructed from the [`entry`] method on [`UpsertMap`].
///
/// [`entry`]: UpsertMap::entry
pub enum Entry<'a, V, S = DefaultHashBuilder> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, V, S>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V, S>),
}

impl<'a, V, S> Entry<'a, V, S> {
    /// Inserts the default value if the entry is vacant and returns a
    /// mutable reference.
    pub fn or_insert(self, default: V) -> &'a mut V
    where
        S: BuildHasher,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
        S: BuildHasher,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Inserts a value computed from the key if the entry is vacant and
    /// returns a mutable reference.
    ///
    /// The closure runs only on a vacant entry, before anything is inserted.
    pub fn or_insert_with_key<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce(&Key) -> V,
        S: BuildHasher,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(entry.key());
                entry.insert(value)
            }
        }
    }

    /// Inserts a fallibly computed value if the entry is vacant.
    ///
    /// An `Err` from the closure is returned as-is and leaves the map
    /// unchanged; the vacant slot is simply dropped.
    pub fn or_try_insert_with<F, E>(self, default: F) -> Result<&'a mut V, E>
    where
        F: FnOnce(&Key) -> Result<V, E>,
        S: BuildHasher,
    {
        match self {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let value = default(entry.key())?;
                Ok(entry.insert(value))
            }
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &Key {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, V, S> Entry<'a, V, S>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a
    /// mutable reference.
    pub fn or_default(self) -> &'a mut V
    where
        S: BuildHasher,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in an [`UpsertMap`].
pub struct VacantEntry<'a, V, S = DefaultHashBuilder> {
    entry: hashbrown::hash_map::VacantEntry<'a, Key, V, S>,
}

impl<'a, V, S> VacantEntry<'a, V, S> {
    /// Gets a reference to the key that would be used when inserting a
    /// value.
    pub fn key(&self) -> &Key {
        self.entry.key()
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> Key {
        self.entry.into_key()
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V
    where
        S: BuildHasher,
    {
        self.entry.insert(value)
    }
}

/// A view into an occupied entry in an [`UpsertMap`].
pub struct OccupiedEntry<'a, V, S = DefaultHashBuilder> {
    entry: hashbrown::hash_map::OccupiedEntry<'a, Key, V, S>,
}

impl<'a, V, S> OccupiedEntry<'a, V, S> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &Key {
        self.entry.key()
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.entry.get()
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.entry.get_mut()
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        self.entry.into_mut()
    }

    /// Replaces the entry's value and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        self.entry.insert(value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove()
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (Key, V) {
        self.entry.remove_entry()
    }
}
