//! Member descriptors.
//!
//! A [`MemberDescriptor`] is the canonical representation of one logical
//! member, however it was discovered: declared, inherited, or registered as
//! an extension. Descriptors are interned by the member catalog, so two
//! lookups of the same member compare equal by `Arc::ptr_eq`.
//!
//! [`MemberDescriptor::Bound`] pairs an instance member with the instance it
//! was reached through. It is composition over the underlying descriptor and
//! is never interned.

use std::sync::Arc;

use crate::{EventEntry, Expr, FieldEntry, MethodEntry, PropertyEntry, TypeHash, Visibility};

/// Kind of a member, as seen by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
    Event,
    NestedType,
    TypeGroup,
    Custom,
}

/// Same-named nested types of different generic arity, merged into one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeGroup {
    /// Name without arity suffix.
    pub name: String,
    pub declaring_type: TypeHash,
    /// `(arity, type)` pairs, sorted by arity.
    pub types: Vec<(u8, TypeHash)>,
}

impl TypeGroup {
    pub fn new(name: impl Into<String>, declaring_type: TypeHash) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            types: Vec::new(),
        }
    }

    /// Add a member type; keeps the arity ordering.
    pub fn with_type(mut self, arity: u8, ty: TypeHash) -> Self {
        let pos = self.types.partition_point(|(a, _)| *a < arity);
        self.types.insert(pos, (arity, ty));
        self
    }

    /// The type with the given generic arity.
    pub fn get(&self, arity: u8) -> Option<TypeHash> {
        self.types
            .iter()
            .find(|(a, _)| *a == arity)
            .map(|(_, ty)| *ty)
    }

    /// The non-generic member of the group, if any.
    pub fn non_generic(&self) -> Option<TypeHash> {
        self.get(0)
    }
}

/// Canonical descriptor of one logical member.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberDescriptor {
    Field(FieldEntry),
    Property {
        entry: PropertyEntry,
        /// Extended type, for extension properties.
        extending: Option<TypeHash>,
    },
    Method {
        method: MethodEntry,
        /// Extended type, for extension methods.
        extending: Option<TypeHash>,
    },
    Constructor(MethodEntry),
    Event(EventEntry),
    NestedType {
        name: String,
        declaring_type: TypeHash,
        ty: TypeHash,
    },
    TypeGroup(TypeGroup),
    /// An instance member together with the instance it is bound to.
    Bound {
        inner: Arc<MemberDescriptor>,
        instance: Expr,
    },
    /// A member supplied wholesale by an extension source.
    Custom {
        name: String,
        declaring_type: TypeHash,
        value: Expr,
    },
}

impl MemberDescriptor {
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberDescriptor::Field(_) => MemberKind::Field,
            MemberDescriptor::Property { .. } => MemberKind::Property,
            MemberDescriptor::Method { .. } => MemberKind::Method,
            MemberDescriptor::Constructor(_) => MemberKind::Constructor,
            MemberDescriptor::Event(_) => MemberKind::Event,
            MemberDescriptor::NestedType { .. } => MemberKind::NestedType,
            MemberDescriptor::TypeGroup(_) => MemberKind::TypeGroup,
            MemberDescriptor::Bound { inner, .. } => inner.kind(),
            MemberDescriptor::Custom { .. } => MemberKind::Custom,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MemberDescriptor::Field(f) => &f.name,
            MemberDescriptor::Property { entry, .. } => &entry.name,
            MemberDescriptor::Method { method, .. } => &method.name,
            MemberDescriptor::Constructor(m) => &m.name,
            MemberDescriptor::Event(e) => &e.name,
            MemberDescriptor::NestedType { name, .. } | MemberDescriptor::Custom { name, .. } => {
                name
            }
            MemberDescriptor::TypeGroup(group) => &group.name,
            MemberDescriptor::Bound { inner, .. } => inner.name(),
        }
    }

    /// Type that declares the member (the holder type for extension members).
    pub fn declaring_type(&self) -> TypeHash {
        match self {
            MemberDescriptor::Field(f) => f.owner,
            MemberDescriptor::Property { entry, .. } => entry.owner,
            MemberDescriptor::Method { method, .. } => method.owner,
            MemberDescriptor::Constructor(m) => m.owner,
            MemberDescriptor::Event(e) => e.owner,
            MemberDescriptor::NestedType { declaring_type, .. }
            | MemberDescriptor::Custom { declaring_type, .. } => *declaring_type,
            MemberDescriptor::TypeGroup(group) => group.declaring_type,
            MemberDescriptor::Bound { inner, .. } => inner.declaring_type(),
        }
    }

    /// Type an extension member attaches to.
    pub fn extending(&self) -> Option<TypeHash> {
        match self {
            MemberDescriptor::Property { extending, .. }
            | MemberDescriptor::Method { extending, .. } => *extending,
            MemberDescriptor::Bound { inner, .. } => inner.extending(),
            _ => None,
        }
    }

    pub fn is_extension(&self) -> bool {
        self.extending().is_some()
    }

    /// Whether the member is used without an instance.
    ///
    /// Extension members are declared static but act as instance members of
    /// the type they extend.
    pub fn is_static(&self) -> bool {
        match self {
            MemberDescriptor::Field(f) => f.is_static(),
            MemberDescriptor::Property { entry, extending } => {
                entry.is_static && extending.is_none()
            }
            MemberDescriptor::Method { method, extending } => {
                method.is_static() && extending.is_none()
            }
            MemberDescriptor::Event(e) => e.is_static,
            MemberDescriptor::Bound { inner, .. } => inner.is_static(),
            MemberDescriptor::Constructor(_)
            | MemberDescriptor::NestedType { .. }
            | MemberDescriptor::TypeGroup(_)
            | MemberDescriptor::Custom { .. } => true,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            MemberDescriptor::Field(f) => f.visibility,
            MemberDescriptor::Property { entry, .. } => entry.visibility,
            MemberDescriptor::Method { method, .. } => method.visibility,
            MemberDescriptor::Constructor(m) => m.visibility,
            MemberDescriptor::Event(e) => e.visibility,
            MemberDescriptor::Bound { inner, .. } => inner.visibility(),
            MemberDescriptor::NestedType { .. }
            | MemberDescriptor::TypeGroup(_)
            | MemberDescriptor::Custom { .. } => Visibility::Public,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility().is_public()
    }

    /// The member without any bound instance.
    pub fn unbound(&self) -> &MemberDescriptor {
        match self {
            MemberDescriptor::Bound { inner, .. } => inner.unbound(),
            other => other,
        }
    }

    /// The bound instance, if any.
    pub fn instance(&self) -> Option<&Expr> {
        match self {
            MemberDescriptor::Bound { instance, .. } => Some(instance),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodEntry> {
        match self.unbound() {
            MemberDescriptor::Method { method, .. } | MemberDescriptor::Constructor(method) => {
                Some(method)
            }
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyEntry> {
        match self.unbound() {
            MemberDescriptor::Property { entry, .. } => Some(entry),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldEntry> {
        match self.unbound() {
            MemberDescriptor::Field(f) => Some(f),
            _ => None,
        }
    }

    /// Bind an instance member to `instance`.
    ///
    /// Static members are returned unchanged.
    pub fn bind_to_instance(self: &Arc<Self>, instance: Expr) -> Arc<MemberDescriptor> {
        if self.is_static() {
            return Arc::clone(self);
        }
        let inner = match self.as_ref() {
            MemberDescriptor::Bound { inner, .. } => Arc::clone(inner),
            _ => Arc::clone(self),
        };
        Arc::new(MemberDescriptor::Bound { inner, instance })
    }
}
