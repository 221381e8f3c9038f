#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The dynamically typed key universe and its equality relations.
///
/// This module provides the `Key` enum whose `Eq` and `Hash` realize the
/// SameValueZero relation, the stricter `same_value` predicate, and the
/// identity-minting `Symbol` and `ObjectId` types.
pub mod key;

/// The owned container type the upsert operations are attached to.
///
/// This module provides `UpsertMap`, a wrapper over `hashbrown::HashMap`
/// keyed by `Key`, with a standard map surface and configurable hashers.
pub mod map;

/// The upsert operation family and the entry view it is built on.
pub mod upsert;

/// A map with an attached producer whose `get` fills in missing values.
pub mod default_map;

pub use default_map::DefaultMap;
pub use key::Key;
pub use key::ObjectId;
pub use key::Symbol;
pub use map::UpsertMap;
pub use upsert::Entry;
pub use upsert::OccupiedEntry;
pub use upsert::OnPresent;
pub use upsert::VacantEntry;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder `UpsertMap` uses when none is supplied.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder `UpsertMap` uses when none is supplied.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// Placeholder for the default hasher builder.
        ///
        /// With neither the `std` nor the `foldhash` feature enabled there
        /// is no default hasher; construct maps through `with_hasher` or
        /// `with_capacity_and_hasher` instead. This type is uninhabited, so
        /// it can never be built by accident.
        pub enum DefaultHashBuilder {}
    }
}
