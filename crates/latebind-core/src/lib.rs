//! Core types for latebind.
//!
//! This crate holds the data model shared by the registry and the binder:
//!
//! - [`TypeHash`]: deterministic identity for types and members
//! - [`TypeEntry`] and the member entries: what the type system knows
//! - [`MemberDescriptor`]: canonical, interned view of a logical member
//! - [`Expr`]: the computation trees bound plans are made of
//! - [`RuntimeValue`]: snapshots of call-site arguments
//! - [`OperatorKind`]: the operator table
//! - [`BindError`], [`RegistrationError`], [`ErrorKind`]: error types

mod descriptor;
pub mod entries;
mod error;
mod expr;
mod operator;
mod type_hash;
mod value;
mod visibility;

pub use descriptor::{MemberDescriptor, MemberKind, TypeGroup};
pub use entries::{
    EventEntry, FieldEntry, FieldFlags, MemberHook, MethodEntry, MethodFlags, ParamEntry,
    PropertyDecl, PropertyEntry, TypeEntry, TypeFlags, generic_arity_of, strip_arity,
};
pub use error::{BindError, ErrorKind, RegistrationError};
pub use expr::{BinaryOp, Expr, Literal, OBJECT_ARRAY, Temp, UnaryOp};
pub use operator::{OperatorClass, OperatorInfo, OperatorKind};
pub use type_hash::{TypeHash, hash_constants, primitives};
pub use value::RuntimeValue;
pub use visibility::Visibility;
