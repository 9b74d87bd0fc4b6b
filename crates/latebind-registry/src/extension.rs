//! Extension members.
//!
//! An extension member is declared somewhere other than the type it extends,
//! typically as a static method whose first parameter is the extended type.
//! Extensions reach the catalog two ways: registered directly with
//! [`MemberCatalog::register_extension`](crate::MemberCatalog::register_extension),
//! or discovered on demand through an [`ExtensionSource`].

use latebind_core::{Expr, MethodEntry, TypeEntry, TypeHash};

/// A member attached to a type from outside its declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionMember {
    /// A static method taking the instance as its first argument.
    Method { name: String, method: TypeHash },
    /// A property made of static accessor methods taking the instance first.
    Property {
        name: String,
        getter: Option<TypeHash>,
        setter: Option<TypeHash>,
        deleter: Option<TypeHash>,
    },
    /// A member whose value is supplied as-is.
    Custom { name: String, value: Expr },
}

impl ExtensionMember {
    /// Extension method backed by a registered static method.
    pub fn method(method: &MethodEntry) -> Self {
        ExtensionMember::Method {
            name: method.name.clone(),
            method: method.method_hash,
        }
    }

    /// Extension property with only a getter.
    pub fn property(name: impl Into<String>, getter: &MethodEntry) -> Self {
        ExtensionMember::Property {
            name: name.into(),
            getter: Some(getter.method_hash),
            setter: None,
            deleter: None,
        }
    }

    /// Add a setter to an extension property.
    pub fn with_setter(mut self, method: &MethodEntry) -> Self {
        if let ExtensionMember::Property { setter, .. } = &mut self {
            *setter = Some(method.method_hash);
        }
        self
    }

    /// Add a deleter to an extension property.
    pub fn with_deleter(mut self, method: &MethodEntry) -> Self {
        if let ExtensionMember::Property { deleter, .. } = &mut self {
            *deleter = Some(method.method_hash);
        }
        self
    }

    pub fn custom(name: impl Into<String>, value: Expr) -> Self {
        ExtensionMember::Custom {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ExtensionMember::Method { name, .. }
            | ExtensionMember::Property { name, .. }
            | ExtensionMember::Custom { name, .. } => name,
        }
    }
}

/// Discovers extension members for a type on first request.
///
/// The catalog caches the answer per type and calls the source without
/// holding its lock, so implementations may take their time.
pub trait ExtensionSource: Send + Sync {
    fn extension_members(&self, ty: &TypeEntry) -> Vec<ExtensionMember>;
}
