//! Registry entries describing types and their declared members.
//!
//! These are plain data: the registry stores them, the member catalog wraps
//! them into interned descriptors, and computation trees refer to them by hash.

mod event;
mod field;
mod method;
mod property;
mod type_entry;

pub use event::EventEntry;
pub use field::{FieldEntry, FieldFlags};
pub use method::{MemberHook, MethodEntry, MethodFlags, ParamEntry};
pub use property::{PropertyDecl, PropertyEntry};
pub use type_entry::{TypeEntry, TypeFlags, generic_arity_of, strip_arity};
