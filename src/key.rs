use core::fmt;
use core::fmt::Debug;
use core::hash::Hash;
use core::hash::Hasher;
use core::mem;
use core::sync::atomic::AtomicU64;
use core::sync::atomic::Ordering;

use alloc::boxed::Box;
use alloc::string::String;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// A key of an [`UpsertMap`], covering the value kinds a dynamically typed
/// map accepts as keys.
///
/// Primitive kinds (`Bool`, `Number`, `Str`) compare by content; [`Symbol`]
/// and [`Object`](Key::Object) keys compare by identity. `Undefined` and
/// `Null` are ordinary keys, each equal only to itself.
///
/// The `PartialEq`, `Eq`, and `Hash` implementations realize the
/// *SameValueZero* relation: keys of different kinds are never equal, the
/// not-a-number float equals itself, and `+0.0` equals `-0.0`. This is the
/// relation every lookup and upsert in this crate uses. The stricter
/// *SameValue* relation, which distinguishes the two zero signs, is available
/// as [`Key::same_value`] but drives no lookups.
///
/// # Examples
///
/// ```rust
/// use upsert_map::Key;
///
/// assert_eq!(Key::Number(f64::NAN), Key::Number(f64::NAN));
/// assert_eq!(Key::Number(0.0), Key::Number(-0.0));
/// assert_ne!(Key::from("1"), Key::from(1.0));
/// ```
///
/// [`UpsertMap`]: crate::UpsertMap
#[derive(Clone)]
pub enum Key {
    /// The absent value, usable as a key in its own right.
    Undefined,
    /// The null value.
    Null,
    /// A boolean key.
    Bool(bool),
    /// A numeric key. Any `f64` is usable, including NaN.
    Number(f64),
    /// A string key, compared by content.
    Str(Box<str>),
    /// A symbol key, compared by identity.
    Symbol(Symbol),
    /// An object reference key, compared by identity. Two references minted
    /// separately are never equal, regardless of what they stand for.
    Object(ObjectId),
}

impl Key {
    /// Tests equality under the *SameValueZero* relation.
    ///
    /// This is the relation behind the `PartialEq` implementation and behind
    /// every container lookup: NaN equals NaN, and the two zero signs are
    /// indistinguishable.
    pub fn same_value_zero(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Undefined, Key::Undefined) | (Key::Null, Key::Null) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Number(a), Key::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Key::Str(a), Key::Str(b)) => a == b,
            (Key::Symbol(a), Key::Symbol(b)) => a == b,
            (Key::Object(a), Key::Object(b)) => a == b,
            _ => false,
        }
    }

    /// Tests equality under the *SameValue* relation.
    ///
    /// Differs from [`same_value_zero`](Key::same_value_zero) only for
    /// numeric keys of opposite zero sign: `+0.0` and `-0.0` are distinct
    /// here. NaN still equals NaN.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use upsert_map::Key;
    ///
    /// let pos = Key::Number(0.0);
    /// let neg = Key::Number(-0.0);
    /// assert!(pos.same_value_zero(&neg));
    /// assert!(!pos.same_value(&neg));
    /// ```
    pub fn same_value(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Number(a), Key::Number(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            _ => self.same_value_zero(other),
        }
    }

    /// Returns `true` for the `Undefined` key.
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Key::Undefined)
    }

    /// Returns `true` for the `Null` key.
    pub const fn is_null(&self) -> bool {
        matches!(self, Key::Null)
    }

    /// Returns the boolean payload, if this is a `Bool` key.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Key::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this is a `Number` key.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Key::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `Str` key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the symbol, if this is a `Symbol` key.
    pub const fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Key::Symbol(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Returns the object reference, if this is an `Object` key.
    pub const fn as_object(&self) -> Option<ObjectId> {
        match self {
            Key::Object(object) => Some(*object),
            _ => None,
        }
    }

    /// The form under which a key is stored. A negative zero key is stored as
    /// positive zero so that stored keys never expose a sign the container's
    /// relation cannot distinguish.
    pub(crate) fn canonical(self) -> Key {
        match self {
            Key::Number(value) if value == 0.0 => Key::Number(0.0),
            key => key,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Key) -> bool {
        self.same_value_zero(other)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Key::Undefined | Key::Null => {}
            Key::Bool(value) => value.hash(state),
            Key::Number(value) => canonical_bits(*value).hash(state),
            Key::Str(value) => value.hash(state),
            Key::Symbol(symbol) => symbol.hash(state),
            Key::Object(object) => object.hash(state),
        }
    }
}

// Every NaN payload and both zero signs must land on one hash, or equal keys
// would hash apart.
fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Undefined => f.write_str("undefined"),
            Key::Null => f.write_str("null"),
            Key::Bool(value) => Debug::fmt(value, f),
            Key::Number(value) => Debug::fmt(value, f),
            Key::Str(value) => Debug::fmt(value, f),
            Key::Symbol(symbol) => Debug::fmt(symbol, f),
            Key::Object(object) => Debug::fmt(object, f),
        }
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Key {
        Key::Bool(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Key {
        Key::Number(f64::from(value))
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Key {
        Key::Number(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Key {
        Key::Str(value.into())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Key {
        Key::Str(value.into_boxed_str())
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Key {
        Key::Symbol(symbol)
    }
}

impl From<ObjectId> for Key {
    fn from(object: ObjectId) -> Key {
        Key::Object(object)
    }
}

/// A process-unique symbol identity.
///
/// Each call to [`Symbol::new`] mints a fresh identity from a shared atomic
/// counter; two symbols are equal only if one is a copy of the other. Symbols
/// are `Copy`, so passing one around never changes which identity it names.
///
/// Identity keys like this one are the only keys a weak-keyed container
/// variant could hold; this crate states that precondition and builds no such
/// variant.
///
/// # Examples
///
/// ```rust
/// use upsert_map::Symbol;
///
/// let a = Symbol::new();
/// let b = Symbol::new();
/// assert_ne!(a, b);
/// assert_eq!(a, a);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u64);

impl Symbol {
    /// Mints a symbol distinct from every other symbol in the process.
    pub fn new() -> Symbol {
        Symbol(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// A process-unique object reference identity.
///
/// Stand-in for reference-typed keys (objects, arrays): two references minted
/// separately never compare equal, even when whatever they stand for has the
/// same shape. Like [`Symbol`], copies share the identity of the original.
///
/// # Examples
///
/// ```rust
/// use upsert_map::ObjectId;
///
/// let a = ObjectId::new();
/// let also_a = a;
/// assert_eq!(a, also_a);
/// assert_ne!(a, ObjectId::new());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Mints a reference distinct from every other reference in the process.
    pub fn new() -> ObjectId {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use siphasher::sip::SipHasher;

    use super::*;

    fn hash_of(key: &Key) -> u64 {
        let mut hasher = SipHasher::new_with_keys(0xfeed, 0xface);
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_nan_is_equal_to_itself() {
        let a = Key::Number(f64::NAN);
        let b = Key::Number(f64::NAN);

        assert_eq!(a, b);
        assert!(a.same_value_zero(&b));
        assert!(a.same_value(&b));
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_nan_payloads_unify() {
        let quiet = Key::Number(f64::NAN);
        let other = Key::Number(f64::from_bits(0x7ff8_0000_0000_0001));

        assert_eq!(quiet, other);
        assert_eq!(hash_of(&quiet), hash_of(&other));
    }

    #[test]
    fn test_zero_signs_unify_under_same_value_zero() {
        let pos = Key::Number(0.0);
        let neg = Key::Number(-0.0);

        assert_eq!(pos, neg);
        assert!(pos.same_value_zero(&neg));
        assert_eq!(hash_of(&pos), hash_of(&neg));
    }

    #[test]
    fn test_same_value_distinguishes_zero_signs() {
        let pos = Key::Number(0.0);
        let neg = Key::Number(-0.0);

        assert!(!pos.same_value(&neg));
        assert!(!neg.same_value(&pos));
        assert!(pos.same_value(&pos));
        assert!(neg.same_value(&neg));
    }

    #[test]
    fn test_canonical_drops_zero_sign() {
        let stored = Key::Number(-0.0).canonical();
        match stored {
            Key::Number(value) => assert!(value.is_sign_positive()),
            _ => panic!("canonical changed the key kind"),
        }

        let nan = Key::Number(f64::NAN).canonical();
        assert_eq!(nan, Key::Number(f64::NAN));

        let plain = Key::Number(1.5).canonical();
        assert_eq!(plain, Key::Number(1.5));
    }

    #[test]
    fn test_ordinary_numbers_compare_by_value() {
        assert_eq!(Key::Number(1.0), Key::Number(1.0));
        assert_ne!(Key::Number(1.0), Key::Number(2.0));
        assert_eq!(Key::from(1), Key::Number(1.0));
    }

    #[test]
    fn test_kinds_never_cross_compare() {
        let keys = [
            Key::Undefined,
            Key::Null,
            Key::Bool(false),
            Key::Number(0.0),
            Key::from(""),
            Key::Symbol(Symbol::new()),
            Key::Object(ObjectId::new()),
        ];

        for (i, a) in keys.iter().enumerate() {
            for (j, b) in keys.iter().enumerate() {
                if i == j {
                    assert_eq!(a, b);
                } else {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_undefined_and_null_are_distinct_keys() {
        assert_eq!(Key::Undefined, Key::Undefined);
        assert_eq!(Key::Null, Key::Null);
        assert_ne!(Key::Undefined, Key::Null);
        assert!(Key::Undefined.is_undefined());
        assert!(Key::Null.is_null());
        assert!(!Key::Null.is_undefined());
    }

    #[test]
    fn test_strings_compare_by_content() {
        assert_eq!(Key::from("item"), Key::from(String::from("item")));
        assert_ne!(Key::from("item"), Key::from("other"));
        assert_eq!(hash_of(&Key::from("item")), hash_of(&Key::from("item")));
    }

    #[test]
    fn test_symbols_are_distinct_identities() {
        let a = Symbol::new();
        let b = Symbol::new();

        assert_ne!(Key::Symbol(a), Key::Symbol(b));
        assert_eq!(Key::Symbol(a), Key::Symbol(a));

        let copy = a;
        assert_eq!(Key::Symbol(a), Key::Symbol(copy));
    }

    #[test]
    fn test_objects_with_identical_shape_stay_distinct() {
        // Two separately minted references model two `{}` literals.
        let first = ObjectId::new();
        let second = ObjectId::new();

        assert_ne!(Key::Object(first), Key::Object(second));
        assert!(!Key::Object(first).same_value(&Key::Object(second)));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Key::Bool(true).as_bool(), Some(true));
        assert_eq!(Key::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Key::from("item").as_str(), Some("item"));
        assert_eq!(Key::Undefined.as_bool(), None);
        assert_eq!(Key::Null.as_number(), None);

        let symbol = Symbol::new();
        assert_eq!(Key::Symbol(symbol).as_symbol(), Some(symbol));
        assert_eq!(Key::Symbol(symbol).as_object(), None);

        let object = ObjectId::new();
        assert_eq!(Key::Object(object).as_object(), Some(object));
        assert_eq!(Key::Object(object).as_symbol(), None);
    }

    #[test]
    fn test_debug_output() {
        use alloc::format;

        assert_eq!(format!("{:?}", Key::Undefined), "undefined");
        assert_eq!(format!("{:?}", Key::Null), "null");
        assert_eq!(format!("{:?}", Key::Bool(true)), "true");
        assert_eq!(format!("{:?}", Key::from("item")), "\"item\"");
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;
    use siphasher::sip::SipHasher;

    use super::*;

    fn hash_of(key: &Key) -> u64 {
        let mut hasher = SipHasher::new_with_keys(0xfeed, 0xface);
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn any_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            Just(Key::Undefined),
            Just(Key::Null),
            any::<bool>().prop_map(Key::Bool),
            any::<f64>().prop_map(Key::Number),
            any::<String>().prop_map(Key::from),
            Just(Key::Symbol(Symbol::new())),
            Just(Key::Object(ObjectId::new())),
        ]
    }

    proptest! {
        #[test]
        fn same_value_zero_is_reflexive(key in any_key()) {
            prop_assert!(key.same_value_zero(&key));
            prop_assert!(key.same_value(&key));
        }

        #[test]
        fn equal_keys_hash_alike(a in any_key(), b in any_key()) {
            if a == b {
                prop_assert_eq!(hash_of(&a), hash_of(&b));
            }
        }

        #[test]
        fn same_value_divergence_is_signed_zero_only(value in any::<f64>()) {
            let plain = Key::Number(value);
            let negated = Key::Number(-value);

            if value == 0.0 {
                prop_assert!(plain.same_value_zero(&negated));
                prop_assert!(!plain.same_value(&negated));
            } else {
                prop_assert_eq!(
                    plain.same_value_zero(&negated),
                    plain.same_value(&negated)
                );
            }
        }

        #[test]
        fn canonical_never_changes_identity(key in any_key()) {
            let stored = key.clone().canonical();
            prop_assert!(stored == key);
            prop_assert_eq!(hash_of(&stored), hash_of(&key));
        }
    }
}
