//! Visibility modifiers for types and members.

use std::fmt;

/// Visibility modifier for types and members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

impl Visibility {
    /// Check if this is `Public`.
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }

    /// Whether a member with this visibility is inherited by derived types.
    pub fn is_inheritable(self) -> bool {
        self != Visibility::Private
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Private => write!(f, "private"),
        }
    }
}
