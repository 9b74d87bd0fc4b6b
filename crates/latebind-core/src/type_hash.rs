//! Deterministic hash-based identity for types and members.
//!
//! [`TypeHash`] is a 64-bit hash that uniquely identifies a type, field,
//! property, method, constructor or event. Hashes are computed from names and
//! signatures, so:
//!
//! - The same qualified name always produces the same hash
//! - Member hashes incorporate the declaring type, so `A.Count` and `B.Count`
//!   never collide
//! - Method hashes incorporate parameter types, so overloads are distinct
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants to prevent collisions
//! between different member kinds. The hash function is `const`, which lets
//! the primitive type hashes be compile-time constants.
//!
//! # Examples
//!
//! ```
//! use latebind_core::{TypeHash, primitives};
//!
//! assert_eq!(TypeHash::from_name("int"), primitives::INT32);
//!
//! let widget = TypeHash::from_name("Widget");
//! let a = TypeHash::from_method(widget, "Resize", &[primitives::INT32]);
//! let b = TypeHash::from_method(widget, "Resize", &[primitives::DOUBLE]);
//! assert_ne!(a, b);
//! ```

use std::fmt;
use xxhash_rust::const_xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant for chaining components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for field hashes
    pub const FIELD: u64 = 0x1a095090689d4647;

    /// Domain marker for property hashes
    pub const PROPERTY: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for method hashes
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for constructor hashes
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for event hashes
    pub const EVENT: u64 = 0x3e9f5d2a8c7b1403;

    /// Parameter position mixing constants.
    /// Each parameter position gets a unique constant so parameter order matters.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x123456789abcdef0,
    ];
}

/// A deterministic 64-bit hash identifying a type or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a field hash from its declaring type and name.
    #[inline]
    pub const fn from_field(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_constants::FIELD ^ owner.0.rotate_left(7) ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a property hash from its declaring type and name.
    #[inline]
    pub const fn from_property(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_constants::PROPERTY ^ owner.0.rotate_left(11) ^ xxh64(name.as_bytes(), 0))
    }

    /// Create an event hash from its declaring type and name.
    #[inline]
    pub const fn from_event(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_constants::EVENT ^ owner.0.rotate_left(13) ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a method hash from owner type, method name and parameter type hashes.
    ///
    /// Parameter order matters: `(int, float)` hashes differently from `(float, int)`.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, param_hashes: &[TypeHash]) -> Self {
        let seed = hash_constants::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, param_hashes))
    }

    /// Create a constructor hash from owner type and parameter type hashes.
    #[inline]
    pub fn from_constructor(owner: TypeHash, param_hashes: &[TypeHash]) -> Self {
        TypeHash(mix_params(hash_constants::CONSTRUCTOR ^ owner.0, param_hashes))
    }

    /// Check if this is the empty hash.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

fn mix_params(seed: u64, param_hashes: &[TypeHash]) -> u64 {
    let mut hash = seed;
    for (i, param) in param_hashes.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps the combination non-commutative
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ param.0);
    }
    hash
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash(0x{:016x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Default for TypeHash {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Hashes for the built-in types.
///
/// `OBJECT` is the universal object type: every registered type derives from it,
/// and plan widening falls back to it when two branch types are unrelated.
pub mod primitives {
    use super::TypeHash;

    pub const VOID: TypeHash = TypeHash::from_name("void");
    pub const BOOL: TypeHash = TypeHash::from_name("bool");
    pub const CHAR: TypeHash = TypeHash::from_name("char");
    pub const INT8: TypeHash = TypeHash::from_name("int8");
    pub const INT16: TypeHash = TypeHash::from_name("int16");
    pub const INT32: TypeHash = TypeHash::from_name("int");
    pub const INT64: TypeHash = TypeHash::from_name("int64");
    pub const UINT8: TypeHash = TypeHash::from_name("uint8");
    pub const UINT16: TypeHash = TypeHash::from_name("uint16");
    pub const UINT32: TypeHash = TypeHash::from_name("uint");
    pub const UINT64: TypeHash = TypeHash::from_name("uint64");
    pub const FLOAT: TypeHash = TypeHash::from_name("float");
    pub const DOUBLE: TypeHash = TypeHash::from_name("double");
    pub const STRING: TypeHash = TypeHash::from_name("string");

    /// Type of the `null` literal (converts to any reference or nullable type).
    pub const NULL: TypeHash = TypeHash::from_name("null");

    /// The universal object type.
    pub const OBJECT: TypeHash = TypeHash::from_name("object");

    /// Type of a static-context type value.
    pub const TYPE: TypeHash = TypeHash::from_name("type");

    /// Base type of synthesized exception objects.
    pub const EXCEPTION: TypeHash = TypeHash::from_name("exception");

    /// Signed and unsigned integer types, narrowest first.
    pub const INTEGRAL: [TypeHash; 9] = [
        INT8, UINT8, INT16, UINT16, CHAR, INT32, UINT32, INT64, UINT64,
    ];

    /// Check whether `ty` is an integral primitive.
    pub fn is_integral(ty: TypeHash) -> bool {
        INTEGRAL.contains(&ty)
    }

    /// Check whether `ty` is a floating point primitive.
    pub fn is_floating(ty: TypeHash) -> bool {
        ty == FLOAT || ty == DOUBLE
    }

    /// Check whether `ty` is an arithmetic primitive.
    pub fn is_numeric(ty: TypeHash) -> bool {
        is_integral(ty) || is_floating(ty)
    }

    /// Bit width and signedness of a numeric primitive.
    pub fn numeric_rank(ty: TypeHash) -> Option<(u8, bool)> {
        let rank = match ty {
            t if t == INT8 => (8, true),
            t if t == UINT8 => (8, false),
            t if t == INT16 => (16, true),
            t if t == UINT16 || t == CHAR => (16, false),
            t if t == INT32 => (32, true),
            t if t == UINT32 => (32, false),
            t if t == INT64 => (64, true),
            t if t == UINT64 => (64, false),
            t if t == FLOAT => (32, true),
            t if t == DOUBLE => (64, true),
            _ => return None,
        };
        Some(rank)
    }
}
