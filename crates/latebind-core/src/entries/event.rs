//! Event entries.

use crate::{TypeHash, Visibility};

/// Registry entry for an event.
///
/// Events are not assignable; assignment through the binder only validates
/// that the value is the result of an in-place addition or removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventEntry {
    pub name: String,
    pub owner: TypeHash,
    pub event_hash: TypeHash,
    /// Delegate type of the handlers.
    pub handler_type: TypeHash,
    pub visibility: Visibility,
    pub is_static: bool,
    /// `add_` accessor method hash.
    pub add: TypeHash,
    /// `remove_` accessor method hash.
    pub remove: TypeHash,
}
