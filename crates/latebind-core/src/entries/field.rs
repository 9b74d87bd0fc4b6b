//! Field entries.

use bitflags::bitflags;

use crate::{Literal, TypeHash, Visibility};

bitflags! {
    /// Flags describing how a field is declared.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Static field (one slot per type).
        const STATIC = 1 << 0;
        /// Compile-time constant; never assignable.
        const LITERAL = 1 << 1;
        /// Assignable only during construction.
        const INIT_ONLY = 1 << 2;
    }
}

/// Registry entry for a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldEntry {
    /// Field name.
    pub name: String,
    /// Declaring type.
    pub owner: TypeHash,
    /// Field identity (owner + name).
    pub field_hash: TypeHash,
    /// Field type.
    pub data_type: TypeHash,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Declaration flags.
    pub flags: FieldFlags,
    /// Value of a literal field.
    pub constant: Option<Literal>,
}

impl FieldEntry {
    /// Create a public instance field.
    pub fn new(name: impl Into<String>, data_type: TypeHash) -> Self {
        Self {
            name: name.into(),
            owner: TypeHash::EMPTY,
            field_hash: TypeHash::EMPTY,
            data_type,
            visibility: Visibility::Public,
            flags: FieldFlags::empty(),
            constant: None,
        }
    }

    /// Create a public literal (constant) field.
    pub fn literal(name: impl Into<String>, data_type: TypeHash, value: Literal) -> Self {
        let mut field = Self::new(name, data_type);
        field.flags = FieldFlags::STATIC | FieldFlags::LITERAL;
        field.constant = Some(value);
        field
    }

    /// Set the declaring type and recompute the identity.
    pub fn with_owner(mut self, owner: TypeHash) -> Self {
        self.owner = owner;
        self.field_hash = TypeHash::from_field(owner, &self.name);
        self
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the field static.
    pub fn as_static(mut self) -> Self {
        self.flags |= FieldFlags::STATIC;
        self
    }

    /// Mark the field init-only.
    pub fn as_init_only(mut self) -> Self {
        self.flags |= FieldFlags::INIT_ONLY;
        self
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(FieldFlags::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    /// Literal or init-only fields cannot be assigned through the binder.
    pub fn is_read_only(&self) -> bool {
        self.flags
            .intersects(FieldFlags::LITERAL | FieldFlags::INIT_ONLY)
    }
}
