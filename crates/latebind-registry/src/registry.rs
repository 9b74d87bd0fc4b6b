//! TypeRegistry - the type system the binder reflects over.
//!
//! This module provides [`TypeRegistry`], the storage for every type the
//! binder can see. It answers the questions binding needs: member
//! enumeration through [`TypeEntry`], inheritance, visibility, and which
//! conversions exist between two types.
//!
//! # Storage Model
//!
//! - **Types**: All type entries stored in a single map by `TypeHash`
//! - **Names**: Qualified name to hash index
//! - **Methods**: Method hash to declaring type, so accessors and extension
//!   methods can be resolved by hash alone
//!
//! # Thread Safety
//!
//! The registry is populated single-threaded and then shared read-only
//! through an `Arc`. Nothing in it is mutated after registration.
//!
//! # Example
//!
//! ```
//! use latebind_registry::TypeRegistry;
//! use latebind_core::{TypeEntry, primitives};
//!
//! let mut registry = TypeRegistry::with_primitives();
//! let widget = registry.register_type(TypeEntry::class("Widget")).unwrap();
//!
//! assert!(registry.get(primitives::INT32).is_some());
//! assert!(registry.is_subclass_of(widget, primitives::OBJECT));
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use latebind_core::{MethodEntry, RegistrationError, TypeEntry, TypeHash, primitives};

/// How a value of one type converts to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConversionRank {
    /// Same type.
    Identity,
    /// Lossless: reference upcast, boxing, numeric widening, nullable wrap.
    Implicit,
    /// Possibly lossy or failing at runtime: numeric narrowing, downcast.
    Narrowing,
}

/// Unified type registry.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// Types by hash.
    types: FxHashMap<TypeHash, TypeEntry>,

    /// Qualified name -> hash.
    by_name: FxHashMap<String, TypeHash>,

    /// Method/constructor hash -> declaring type.
    method_owners: FxHashMap<TypeHash, TypeHash>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in types pre-registered.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register the built-in types.
    ///
    /// `object` is registered first since every other type derives from it.
    pub fn register_builtins(&mut self) {
        let mut object = TypeEntry::class("object");
        object.base = None;
        self.insert(object);

        for name in [
            "void", "bool", "char", "int8", "int16", "int", "int64", "uint8", "uint16", "uint",
            "uint64", "float", "double",
        ] {
            self.insert(TypeEntry::primitive(name, true));
        }
        self.insert(TypeEntry::primitive("string", false));
        self.insert(TypeEntry::primitive("null", false));
        self.insert(TypeEntry::class("type"));
        self.insert(TypeEntry::class("exception"));
    }

    fn insert(&mut self, entry: TypeEntry) -> TypeHash {
        let hash = entry.type_hash;
        self.by_name.insert(entry.qualified_name.clone(), hash);
        for method in entry.methods.iter().chain(entry.constructors.iter()) {
            self.method_owners.insert(method.method_hash, hash);
        }
        self.types.insert(hash, entry);
        hash
    }

    /// Register a type entry.
    ///
    /// Returns an error if the name is taken, the base type is unknown, or two
    /// overloads share a signature. A nested type is linked into its
    /// declaring type when that type is already registered.
    pub fn register_type(&mut self, entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        if self.by_name.contains_key(&entry.qualified_name) {
            return Err(RegistrationError::DuplicateType(entry.qualified_name));
        }

        if let Some(base) = entry.base
            && !self.types.contains_key(&base)
        {
            return Err(RegistrationError::UnknownBase {
                type_name: entry.qualified_name,
                base,
            });
        }

        let mut seen = FxHashSet::default();
        for method in entry.methods.iter().chain(entry.constructors.iter()) {
            if !seen.insert(method.method_hash) {
                return Err(RegistrationError::DuplicateMethod {
                    type_name: entry.qualified_name.clone(),
                    method: method.name.clone(),
                });
            }
        }

        if let Some(parent) = entry.declaring_type
            && let Some(parent_entry) = self.types.get_mut(&parent)
            && !parent_entry.nested_types.contains(&entry.type_hash)
        {
            parent_entry.nested_types.push(entry.type_hash);
        }

        Ok(self.insert(entry))
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a type by hash.
    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    /// Get a type by qualified name.
    pub fn get_by_name(&self, name: &str) -> Option<&TypeEntry> {
        self.by_name.get(name).and_then(|hash| self.types.get(hash))
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.types.contains_key(&hash)
    }

    /// Get a method or constructor by hash.
    pub fn get_method(&self, hash: TypeHash) -> Option<&MethodEntry> {
        let owner = self.method_owners.get(&hash)?;
        self.types.get(owner)?.find_method_by_hash(hash)
    }

    /// Iterate over all types.
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Display name of a type, for messages.
    pub fn type_name(&self, hash: TypeHash) -> String {
        self.get(hash)
            .map(|t| t.qualified_name.clone())
            .unwrap_or_else(|| hash.to_string())
    }

    // ==========================================================================
    // Inheritance Helpers
    // ==========================================================================

    /// Base types of `hash`, from immediate parent to root (excluding itself).
    pub fn base_chain(&self, hash: TypeHash) -> Vec<&TypeEntry> {
        let mut chain = Vec::new();
        let mut current = hash;

        while let Some(entry) = self.get(current)
            && let Some(base) = entry.base
            && let Some(base_entry) = self.get(base)
        {
            chain.push(base_entry);
            current = base;
        }

        chain
    }

    /// Every interface `hash` implements, directly or through its bases.
    pub fn all_interfaces(&self, hash: TypeHash) -> Vec<TypeHash> {
        let mut result = Vec::new();
        let mut pending: Vec<TypeHash> = std::iter::once(hash)
            .chain(self.base_chain(hash).into_iter().map(|t| t.type_hash))
            .filter_map(|t| self.get(t))
            .flat_map(|t| t.interfaces.iter().copied())
            .collect();
        pending.reverse();

        while let Some(iface) = pending.pop() {
            if result.contains(&iface) {
                continue;
            }
            result.push(iface);
            if let Some(entry) = self.get(iface) {
                pending.extend(entry.interfaces.iter().rev().copied());
            }
        }
        result
    }

    /// Whether `derived` is `base`, derives from it, or implements it.
    pub fn is_subclass_of(&self, derived: TypeHash, base: TypeHash) -> bool {
        if derived == base {
            return true;
        }
        if base == primitives::OBJECT && self.contains(derived) {
            return true;
        }
        self.base_chain(derived).iter().any(|t| t.type_hash == base)
            || self.all_interfaces(derived).contains(&base)
    }

    /// Closest common ancestor used when two plan branches meet.
    ///
    /// Equal types stay; a subclass pair narrows to the ancestor; anything
    /// else widens to `object`.
    pub fn common_type(&self, a: TypeHash, b: TypeHash) -> TypeHash {
        if a == b {
            a
        } else if self.is_subclass_of(b, a) {
            a
        } else if self.is_subclass_of(a, b) {
            b
        } else {
            primitives::OBJECT
        }
    }

    /// Whether `hash` and every type enclosing it are public.
    pub fn is_visible(&self, hash: TypeHash) -> bool {
        let mut current = self.get(hash);
        while let Some(entry) = current {
            if !entry.visibility.is_public() {
                return false;
            }
            if let Some(element) = entry.element_type
                && element != hash
                && !self.is_visible(element)
            {
                return false;
            }
            current = entry.declaring_type.and_then(|d| self.get(d));
        }
        true
    }

    pub fn is_value_type(&self, hash: TypeHash) -> bool {
        self.get(hash).is_some_and(|t| t.is_value_type())
    }

    pub fn is_nullable(&self, hash: TypeHash) -> bool {
        self.get(hash).is_some_and(|t| t.is_nullable())
    }

    // ==========================================================================
    // Conversions
    // ==========================================================================

    /// Classify the conversion from `from` to `to`, if one exists.
    pub fn conversion(&self, from: TypeHash, to: TypeHash) -> Option<ConversionRank> {
        if from == to {
            return Some(ConversionRank::Identity);
        }
        if from == primitives::NULL {
            return (!self.is_value_type(to) || self.is_nullable(to))
                .then_some(ConversionRank::Implicit);
        }
        if let Some(rank) = numeric_conversion(from, to) {
            return Some(rank);
        }
        if self.is_subclass_of(from, to) {
            return Some(ConversionRank::Implicit);
        }
        if let Some(target) = self.get(to)
            && target.is_nullable()
            && target.element_type == Some(from)
        {
            return Some(ConversionRank::Implicit);
        }
        // Downcasts are checked at runtime.
        if self.is_subclass_of(to, from) {
            return Some(ConversionRank::Narrowing);
        }
        None
    }

    /// Whether `from` converts to `to` without narrowing.
    pub fn is_assignable(&self, from: TypeHash, to: TypeHash) -> bool {
        self.conversion(from, to)
            .is_some_and(|rank| rank <= ConversionRank::Implicit)
    }

    /// Whether a value of `ty` implicitly converts to some integral type.
    pub fn converts_to_integral(&self, ty: TypeHash) -> bool {
        primitives::is_integral(ty)
            || primitives::INTEGRAL
                .iter()
                .any(|&target| self.is_assignable(ty, target))
    }
}

fn numeric_conversion(from: TypeHash, to: TypeHash) -> Option<ConversionRank> {
    let (from_bits, from_signed) = primitives::numeric_rank(from)?;
    let (to_bits, to_signed) = primitives::numeric_rank(to)?;

    let widening = match (primitives::is_floating(from), primitives::is_floating(to)) {
        (false, true) => true,
        (true, false) => false,
        (true, true) => from_bits < to_bits,
        (false, false) => {
            (from_signed == to_signed && from_bits < to_bits)
                || (!from_signed && to_signed && from_bits < to_bits)
        }
    };
    Some(if widening {
        ConversionRank::Implicit
    } else {
        ConversionRank::Narrowing
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_core::{PropertyDecl, TypeFlags, Visibility};

    fn shapes() -> (TypeRegistry, TypeHash, TypeHash) {
        let mut registry = TypeRegistry::with_primitives();
        let shape = registry
            .register_type(
                TypeEntry::class("Shape").with_interface(TypeHash::from_name("IDrawable")),
            )
            .unwrap();
        let circle = registry
            .register_type(TypeEntry::class("Circle").with_base(shape))
            .unwrap();
        (registry, shape, circle)
    }

    #[test]
    fn builtins_registered() {
        let registry = TypeRegistry::with_primitives();
        assert!(registry.get(primitives::OBJECT).unwrap().base.is_none());
        assert!(registry.get(primitives::INT32).unwrap().is_primitive());
        assert!(registry.get_by_name("string").is_some());
        assert!(registry.contains(primitives::EXCEPTION));
    }

    #[test]
    fn duplicate_type_error() {
        let mut registry = TypeRegistry::with_primitives();
        registry.register_type(TypeEntry::class("Widget")).unwrap();
        let err = registry.register_type(TypeEntry::class("Widget")).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateType("Widget".into()));
    }

    #[test]
    fn unknown_base_error() {
        let mut registry = TypeRegistry::with_primitives();
        let err = registry
            .register_type(TypeEntry::class("Orphan").with_base(TypeHash::from_name("Missing")))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownBase { .. }));
    }

    #[test]
    fn duplicate_method_error() {
        let mut registry = TypeRegistry::with_primitives();
        let entry = TypeEntry::class("Twice")
            .with_method(MethodEntry::new("Go", vec![], primitives::VOID))
            .with_method(MethodEntry::new("Go", vec![], primitives::VOID));
        assert!(matches!(
            registry.register_type(entry),
            Err(RegistrationError::DuplicateMethod { .. })
        ));
    }

    #[test]
    fn accessor_lookup_by_hash() {
        let mut registry = TypeRegistry::with_primitives();
        let widget = TypeEntry::class("Widget")
            .with_property(PropertyDecl::read_write("Color", primitives::STRING));
        let setter = widget.find_property("Color").unwrap().setter.unwrap();
        registry.register_type(widget).unwrap();
        assert_eq!(registry.get_method(setter).unwrap().name, "set_Color");
    }

    #[test]
    fn base_chain_order() {
        let (registry, shape, circle) = shapes();
        let chain: Vec<_> = registry
            .base_chain(circle)
            .iter()
            .map(|t| t.type_hash)
            .collect();
        assert_eq!(chain, vec![shape, primitives::OBJECT]);
    }

    #[test]
    fn subclass_and_interfaces() {
        let (registry, shape, circle) = shapes();
        assert!(registry.is_subclass_of(circle, shape));
        assert!(registry.is_subclass_of(circle, TypeHash::from_name("IDrawable")));
        assert!(!registry.is_subclass_of(shape, circle));
    }

    #[test]
    fn common_type_widening() {
        let (mut registry, shape, circle) = shapes();
        let square = registry
            .register_type(TypeEntry::class("Square").with_base(shape))
            .unwrap();
        assert_eq!(registry.common_type(circle, circle), circle);
        assert_eq!(registry.common_type(shape, circle), shape);
        assert_eq!(registry.common_type(circle, shape), shape);
        assert_eq!(registry.common_type(circle, square), primitives::OBJECT);
        assert_eq!(
            registry.common_type(primitives::INT32, primitives::STRING),
            primitives::OBJECT
        );
    }

    #[test]
    fn nested_types_link_to_parent() {
        let mut registry = TypeRegistry::with_primitives();
        let outer = TypeEntry::class("Outer");
        let inner = TypeEntry::nested(&outer, "Inner", TypeFlags::empty())
            .with_visibility(Visibility::Private);
        let outer_hash = registry.register_type(outer).unwrap();
        let inner_hash = registry.register_type(inner).unwrap();
        assert_eq!(registry.get(outer_hash).unwrap().nested_types, vec![inner_hash]);
        assert!(registry.is_visible(outer_hash));
        assert!(!registry.is_visible(inner_hash));
    }

    #[test]
    fn numeric_conversions() {
        let registry = TypeRegistry::with_primitives();
        assert_eq!(
            registry.conversion(primitives::INT32, primitives::INT64),
            Some(ConversionRank::Implicit)
        );
        assert_eq!(
            registry.conversion(primitives::INT64, primitives::INT32),
            Some(ConversionRank::Narrowing)
        );
        assert_eq!(
            registry.conversion(primitives::INT32, primitives::DOUBLE),
            Some(ConversionRank::Implicit)
        );
        assert_eq!(registry.conversion(primitives::STRING, primitives::INT32), None);
        assert!(registry.converts_to_integral(primitives::UINT8));
        assert!(!registry.converts_to_integral(primitives::DOUBLE));
        assert!(!registry.converts_to_integral(primitives::STRING));
    }

    #[test]
    fn null_and_reference_conversions() {
        let (registry, shape, circle) = shapes();
        assert!(registry.is_assignable(primitives::NULL, shape));
        assert!(!registry.is_assignable(primitives::NULL, primitives::INT32));
        assert!(registry.is_assignable(circle, primitives::OBJECT));
        assert_eq!(
            registry.conversion(shape, circle),
            Some(ConversionRank::Narrowing)
        );
    }
}
