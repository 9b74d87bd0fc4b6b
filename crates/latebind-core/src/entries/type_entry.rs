//! Type entry.
//!
//! This module provides `TypeEntry`, the registry's description of one type:
//! its identity, shape flags, hierarchy, and declared members.

use bitflags::bitflags;

use crate::{TypeHash, Visibility, primitives};

use super::{
    EventEntry, FieldEntry, MemberHook, MethodEntry, MethodFlags, PropertyDecl, PropertyEntry,
};

bitflags! {
    /// Shape of a type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u16 {
        /// Value semantics; instances reach the binder boxed.
        const VALUE_TYPE = 1 << 0;
        /// Built-in primitive.
        const PRIMITIVE = 1 << 1;
        /// Single-dimensional array; `element_type` is set.
        const ARRAY = 1 << 2;
        /// Nullable wrapper over a value type; `element_type` is set.
        const NULLABLE = 1 << 3;
        /// Generic boxed reference (`Box<T>`) with a public `Value` field.
        const BOXED_REFERENCE = 1 << 4;
        /// Interface type.
        const INTERFACE = 1 << 5;
        /// Cannot be derived from.
        const SEALED = 1 << 6;
        /// Generic type definition with unbound parameters.
        const GENERIC_DEFINITION = 1 << 7;
        /// Cannot be instantiated.
        const ABSTRACT = 1 << 8;
    }
}

/// Registry entry for a type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    /// Unqualified name, including any generic arity suffix (``List`1``).
    pub name: String,
    /// Namespace (empty for the global namespace).
    pub namespace: String,
    /// Fully qualified name.
    pub qualified_name: String,
    /// Type identity.
    pub type_hash: TypeHash,
    /// Shape flags.
    pub flags: TypeFlags,
    /// Declared visibility.
    pub visibility: Visibility,

    // === Hierarchy ===
    /// Base type (`None` only for `object`).
    pub base: Option<TypeHash>,
    /// Implemented interfaces.
    pub interfaces: Vec<TypeHash>,
    /// Enclosing type for nested types.
    pub declaring_type: Option<TypeHash>,
    /// Number of generic parameters.
    pub generic_arity: u8,
    /// Element type of arrays, nullables and boxed references.
    pub element_type: Option<TypeHash>,
    /// Name of the indexer property (`Item` by convention).
    pub default_member: Option<String>,

    // === Members ===
    pub fields: Vec<FieldEntry>,
    pub properties: Vec<PropertyEntry>,
    /// Methods, including property and event accessors.
    pub methods: Vec<MethodEntry>,
    pub constructors: Vec<MethodEntry>,
    pub events: Vec<EventEntry>,
    /// Nested types declared directly on this type.
    pub nested_types: Vec<TypeHash>,
}

impl TypeEntry {
    /// Create a new type entry.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, flags: TypeFlags) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let qualified_name = if namespace.is_empty() {
            name.clone()
        } else {
            format!("{namespace}.{name}")
        };
        Self::with_qualified_name(namespace, name, qualified_name, flags)
    }

    fn with_qualified_name(
        namespace: String,
        name: String,
        qualified_name: String,
        flags: TypeFlags,
    ) -> Self {
        let generic_arity = generic_arity_of(&name);
        Self {
            type_hash: TypeHash::from_name(&qualified_name),
            name,
            namespace,
            qualified_name,
            flags,
            visibility: Visibility::Public,
            base: Some(primitives::OBJECT),
            interfaces: Vec::new(),
            declaring_type: None,
            generic_arity,
            element_type: None,
            default_member: None,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            events: Vec::new(),
            nested_types: Vec::new(),
        }
    }

    /// Create a reference type in the global namespace.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new("", name, TypeFlags::empty())
    }

    /// Create a value type in the global namespace.
    pub fn value_type(name: impl Into<String>) -> Self {
        Self::new("", name, TypeFlags::VALUE_TYPE | TypeFlags::SEALED)
    }

    /// Create an interface in the global namespace.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new("", name, TypeFlags::INTERFACE | TypeFlags::ABSTRACT)
    }

    /// Create a primitive type.
    pub fn primitive(name: impl Into<String>, is_value: bool) -> Self {
        let mut flags = TypeFlags::PRIMITIVE | TypeFlags::SEALED;
        if is_value {
            flags |= TypeFlags::VALUE_TYPE;
        }
        Self::new("", name, flags)
    }

    /// Create a type nested inside `parent`.
    pub fn nested(parent: &TypeEntry, name: impl Into<String>, flags: TypeFlags) -> Self {
        let name = name.into();
        let qualified_name = format!("{}+{}", parent.qualified_name, name);
        let mut entry =
            Self::with_qualified_name(parent.namespace.clone(), name, qualified_name, flags);
        entry.declaring_type = Some(parent.type_hash);
        entry
    }

    /// Create the array type `element[]`.
    pub fn array_of(element: &TypeEntry) -> Self {
        let mut entry = Self::new(
            "",
            format!("{}[]", element.qualified_name),
            TypeFlags::ARRAY | TypeFlags::SEALED,
        );
        entry.element_type = Some(element.type_hash);
        entry.visibility = element.visibility;
        entry
    }

    /// Create the nullable type `element?`.
    pub fn nullable_of(element: &TypeEntry) -> Self {
        let mut entry = Self::new(
            "",
            format!("{}?", element.qualified_name),
            TypeFlags::NULLABLE | TypeFlags::VALUE_TYPE | TypeFlags::SEALED,
        );
        entry.element_type = Some(element.type_hash);
        entry
            .with_property(PropertyDecl::read_only("HasValue", primitives::BOOL))
            .with_property(PropertyDecl::read_only("Value", element.type_hash))
    }

    /// Create the boxed reference type `Box<element>` with a public `Value` field.
    pub fn boxed_of(element: &TypeEntry) -> Self {
        let mut entry = Self::new(
            "",
            format!("Box<{}>", element.qualified_name),
            TypeFlags::BOXED_REFERENCE | TypeFlags::SEALED,
        );
        entry.element_type = Some(element.type_hash);
        entry.with_field(FieldEntry::new("Value", element.type_hash))
    }

    // === Builder Methods ===

    /// Set the base type.
    pub fn with_base(mut self, base: TypeHash) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented interface.
    pub fn with_interface(mut self, interface: TypeHash) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add shape flags.
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the indexer property name.
    pub fn with_default_member(mut self, name: impl Into<String>) -> Self {
        self.default_member = Some(name.into());
        self
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldEntry) -> Self {
        self.fields.push(field.with_owner(self.type_hash));
        self
    }

    /// Add a method.
    pub fn with_method(mut self, method: MethodEntry) -> Self {
        self.methods.push(method.with_owner(self.type_hash));
        self
    }

    /// Add a constructor.
    pub fn with_constructor(mut self, ctor: MethodEntry) -> Self {
        let ctor = ctor.with_flags(MethodFlags::CONSTRUCTOR).with_owner(self.type_hash);
        self.constructors.push(ctor);
        self
    }

    /// Add a property, generating its accessor methods.
    pub fn with_property(mut self, decl: PropertyDecl) -> Self {
        let owner = self.type_hash;
        let mut accessor_flags = MethodFlags::SPECIAL_NAME;
        if decl.is_static {
            accessor_flags |= MethodFlags::STATIC;
        }

        let getter = decl.getter.map(|visibility| {
            let m = MethodEntry::new(
                format!("get_{}", decl.name),
                decl.index_params.clone(),
                decl.data_type,
            )
            .with_flags(accessor_flags)
            .with_visibility(visibility)
            .with_owner(owner);
            let hash = m.method_hash;
            self.methods.push(m);
            hash
        });

        let setter = decl.setter.map(|visibility| {
            let mut params = decl.index_params.clone();
            params.push(decl.data_type);
            let return_type = if decl.setter_returns_value {
                decl.data_type
            } else {
                primitives::VOID
            };
            let mut m = MethodEntry::new(format!("set_{}", decl.name), params, return_type)
                .with_flags(accessor_flags)
                .with_visibility(visibility);
            if decl.open_generic_setter {
                m = m.as_open_generic();
            }
            let m = m.with_owner(owner);
            let hash = m.method_hash;
            self.methods.push(m);
            hash
        });

        let deleter = decl.deleter.map(|visibility| {
            let m = MethodEntry::new(
                format!("delete_{}", decl.name),
                decl.index_params.clone(),
                primitives::VOID,
            )
            .with_flags(accessor_flags)
            .with_visibility(visibility)
            .with_owner(owner);
            let hash = m.method_hash;
            self.methods.push(m);
            hash
        });

        self.properties.push(PropertyEntry {
            property_hash: TypeHash::from_property(owner, &decl.name),
            visibility: decl.visibility(),
            name: decl.name,
            owner,
            data_type: decl.data_type,
            is_static: decl.is_static,
            getter,
            setter,
            deleter,
            index_params: decl.index_params,
        });
        self
    }

    /// Add an event, generating its `add_`/`remove_` accessors.
    pub fn with_event(
        mut self,
        name: impl Into<String>,
        handler_type: TypeHash,
        is_static: bool,
    ) -> Self {
        let name = name.into();
        let owner = self.type_hash;
        let mut flags = MethodFlags::SPECIAL_NAME;
        if is_static {
            flags |= MethodFlags::STATIC;
        }
        let add = MethodEntry::new(format!("add_{name}"), vec![handler_type], primitives::VOID)
            .with_flags(flags)
            .with_owner(owner);
        let remove =
            MethodEntry::new(format!("remove_{name}"), vec![handler_type], primitives::VOID)
                .with_flags(flags)
                .with_owner(owner);
        self.events.push(EventEntry {
            event_hash: TypeHash::from_event(owner, &name),
            name,
            owner,
            handler_type,
            visibility: Visibility::Public,
            is_static,
            add: add.method_hash,
            remove: remove.method_hash,
        });
        self.methods.push(add);
        self.methods.push(remove);
        self
    }

    /// Record a nested type declared on this type.
    pub fn with_nested(mut self, nested: TypeHash) -> Self {
        if !self.nested_types.contains(&nested) {
            self.nested_types.push(nested);
        }
        self
    }

    // === Query Methods ===

    pub fn is_value_type(&self) -> bool {
        self.flags.contains(TypeFlags::VALUE_TYPE)
    }

    pub fn is_primitive(&self) -> bool {
        self.flags.contains(TypeFlags::PRIMITIVE)
    }

    pub fn is_array(&self) -> bool {
        self.flags.contains(TypeFlags::ARRAY)
    }

    pub fn is_nullable(&self) -> bool {
        self.flags.contains(TypeFlags::NULLABLE)
    }

    pub fn is_boxed_reference(&self) -> bool {
        self.flags.contains(TypeFlags::BOXED_REFERENCE)
    }

    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeFlags::INTERFACE)
    }

    /// Name without the generic arity suffix.
    pub fn simple_name(&self) -> &str {
        strip_arity(&self.name)
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertyEntry> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn find_event(&self, name: &str) -> Option<&EventEntry> {
        self.events.iter().find(|e| e.name == name)
    }

    /// All overloads with the given name.
    pub fn find_methods<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodEntry> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Find a declared method (or constructor) by hash.
    pub fn find_method_by_hash(&self, hash: TypeHash) -> Option<&MethodEntry> {
        self.methods
            .iter()
            .chain(self.constructors.iter())
            .find(|m| m.method_hash == hash)
    }

    /// Find the method implementing an injector hook.
    pub fn find_hook(&self, hook: MemberHook) -> Option<&MethodEntry> {
        self.methods.iter().find(|m| m.hook == Some(hook))
    }
}

/// Parse the arity from a ``Name`N`` type name (0 when absent).
pub fn generic_arity_of(name: &str) -> u8 {
    name.rsplit_once('`')
        .and_then(|(_, arity)| arity.parse().ok())
        .unwrap_or(0)
}

/// Strip a ``Name`N`` arity suffix.
pub fn strip_arity(name: &str) -> &str {
    match name.rsplit_once('`') {
        Some((base, arity)) if arity.chars().all(|c| c.is_ascii_digit()) && !arity.is_empty() => {
            base
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_derives_from_object() {
        let widget = TypeEntry::class("Widget");
        assert_eq!(widget.base, Some(primitives::OBJECT));
        assert_eq!(widget.type_hash, TypeHash::from_name("Widget"));
    }

    #[test]
    fn namespace_qualifies_name() {
        let widget = TypeEntry::new("Ui", "Widget", TypeFlags::empty());
        assert_eq!(widget.qualified_name, "Ui.Widget");
        assert_eq!(widget.type_hash, TypeHash::from_name("Ui.Widget"));
    }

    #[test]
    fn property_generates_accessors() {
        let widget = TypeEntry::class("Widget")
            .with_property(PropertyDecl::read_write("Color", primitives::STRING));
        let prop = widget.find_property("Color").unwrap();
        let getter = widget.find_method_by_hash(prop.getter.unwrap()).unwrap();
        let setter = widget.find_method_by_hash(prop.setter.unwrap()).unwrap();
        assert_eq!(getter.name, "get_Color");
        assert_eq!(setter.param_types(), vec![primitives::STRING]);
        assert!(setter.is_special_name());
        assert!(prop.deleter.is_none());
    }

    #[test]
    fn read_only_property_has_no_setter() {
        let counter = TypeEntry::class("Counter")
            .with_property(PropertyDecl::read_only("Count", primitives::INT32));
        assert!(counter.find_property("Count").unwrap().is_read_only());
    }

    #[test]
    fn property_visibility_is_most_permissive_accessor() {
        let decl = PropertyDecl::new("Secret", primitives::INT32)
            .getter(Visibility::Private)
            .setter(Visibility::Protected);
        assert_eq!(decl.visibility(), Visibility::Protected);
    }

    #[test]
    fn nested_type_names() {
        let outer = TypeEntry::class("Outer");
        let inner = TypeEntry::nested(&outer, "Inner`1", TypeFlags::empty());
        assert_eq!(inner.qualified_name, "Outer+Inner`1");
        assert_eq!(inner.generic_arity, 1);
        assert_eq!(inner.simple_name(), "Inner");
        assert_eq!(inner.declaring_type, Some(outer.type_hash));
    }

    #[test]
    fn arity_parsing() {
        assert_eq!(generic_arity_of("Dictionary`2"), 2);
        assert_eq!(generic_arity_of("Widget"), 0);
        assert_eq!(strip_arity("List`1"), "List");
        assert_eq!(strip_arity("Odd`x"), "Odd`x");
    }

    #[test]
    fn array_element_type() {
        let int = TypeEntry::primitive("int", true);
        let arr = TypeEntry::array_of(&int);
        assert!(arr.is_array());
        assert_eq!(arr.element_type, Some(primitives::INT32));
        assert_eq!(arr.name, "int[]");
    }

    #[test]
    fn boxed_reference_has_value_field() {
        let int = TypeEntry::primitive("int", true);
        let boxed = TypeEntry::boxed_of(&int);
        assert!(boxed.is_boxed_reference());
        assert_eq!(boxed.find_field("Value").unwrap().data_type, primitives::INT32);
    }
}
