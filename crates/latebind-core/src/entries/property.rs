//! Property entries and declarations.
//!
//! A property is declared with a [`PropertyDecl`] and expanded by
//! [`TypeEntry::with_property`](crate::TypeEntry::with_property) into a
//! [`PropertyEntry`] plus `get_`/`set_`/`delete_` accessor methods.

use crate::{TypeHash, Visibility};

/// Registry entry for a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyEntry {
    /// Property name.
    pub name: String,
    /// Declaring type.
    pub owner: TypeHash,
    /// Property identity (owner + name).
    pub property_hash: TypeHash,
    /// Property type.
    pub data_type: TypeHash,
    /// Most permissive accessor visibility.
    pub visibility: Visibility,
    /// Static property.
    pub is_static: bool,
    /// Getter method hash.
    pub getter: Option<TypeHash>,
    /// Setter method hash.
    pub setter: Option<TypeHash>,
    /// Deleter method hash.
    pub deleter: Option<TypeHash>,
    /// Index parameter types (non-empty for indexers).
    pub index_params: Vec<TypeHash>,
}

impl PropertyEntry {
    /// Check if this property can only be read.
    pub fn is_read_only(&self) -> bool {
        self.getter.is_some() && self.setter.is_none()
    }

    /// Check if this property is an indexer.
    pub fn is_indexer(&self) -> bool {
        !self.index_params.is_empty()
    }
}

/// Declaration of a property, expanded into accessors on registration.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub data_type: TypeHash,
    pub is_static: bool,
    pub getter: Option<Visibility>,
    pub setter: Option<Visibility>,
    pub deleter: Option<Visibility>,
    pub index_params: Vec<TypeHash>,
    /// The setter still carries unbound generic parameters.
    pub open_generic_setter: bool,
    /// The setter returns the assigned value instead of `void`.
    pub setter_returns_value: bool,
}

impl PropertyDecl {
    /// Declare a property with no accessors.
    pub fn new(name: impl Into<String>, data_type: TypeHash) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_static: false,
            getter: None,
            setter: None,
            deleter: None,
            index_params: Vec::new(),
            open_generic_setter: false,
            setter_returns_value: false,
        }
    }

    /// Declare a public read-only property.
    pub fn read_only(name: impl Into<String>, data_type: TypeHash) -> Self {
        Self::new(name, data_type).getter(Visibility::Public)
    }

    /// Declare a public read-write property.
    pub fn read_write(name: impl Into<String>, data_type: TypeHash) -> Self {
        Self::new(name, data_type)
            .getter(Visibility::Public)
            .setter(Visibility::Public)
    }

    pub fn getter(mut self, visibility: Visibility) -> Self {
        self.getter = Some(visibility);
        self
    }

    pub fn setter(mut self, visibility: Visibility) -> Self {
        self.setter = Some(visibility);
        self
    }

    pub fn deleter(mut self, visibility: Visibility) -> Self {
        self.deleter = Some(visibility);
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Make this an indexer taking the given index parameters.
    pub fn indexed(mut self, index_params: Vec<TypeHash>) -> Self {
        self.index_params = index_params;
        self
    }

    pub fn open_generic_setter(mut self) -> Self {
        self.open_generic_setter = true;
        self
    }

    pub fn setter_returns_value(mut self) -> Self {
        self.setter_returns_value = true;
        self
    }

    /// Most permissive visibility across the declared accessors.
    pub fn visibility(&self) -> Visibility {
        [self.getter, self.setter, self.deleter]
            .into_iter()
            .flatten()
            .min_by_key(|v| match v {
                Visibility::Public => 0,
                Visibility::Protected => 1,
                Visibility::Internal => 2,
                Visibility::Private => 3,
            })
            .unwrap_or(Visibility::Private)
    }
}
