//! Runtime argument snapshots.
//!
//! The binder never executes anything, but it does look at the values a call
//! site was invoked with: their exact runtime types drive member lookup and
//! become the guards of the resulting plan.

use crate::{TypeHash, primitives};

/// Snapshot of one runtime argument.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Null,
    Bool(bool),
    /// Integral value with its exact primitive type.
    Int { value: i64, ty: TypeHash },
    /// Floating point value with its exact primitive type.
    Float { value: f64, ty: TypeHash },
    Str(String),
    /// Instance of a registered type, identified by an opaque handle.
    Object { ty: TypeHash, handle: u64 },
    /// A type used as a value (static context).
    TypeRef(TypeHash),
}

impl RuntimeValue {
    /// An `int` value.
    pub fn int(value: i64) -> Self {
        RuntimeValue::Int {
            value,
            ty: primitives::INT32,
        }
    }

    /// A `double` value.
    pub fn double(value: f64) -> Self {
        RuntimeValue::Float {
            value,
            ty: primitives::DOUBLE,
        }
    }

    /// An instance of `ty`.
    pub fn object(ty: TypeHash, handle: u64) -> Self {
        RuntimeValue::Object { ty, handle }
    }

    /// Exact runtime type of the value.
    pub fn runtime_type(&self) -> TypeHash {
        match self {
            RuntimeValue::Null => primitives::NULL,
            RuntimeValue::Bool(_) => primitives::BOOL,
            RuntimeValue::Int { ty, .. } | RuntimeValue::Float { ty, .. } => *ty,
            RuntimeValue::Str(_) => primitives::STRING,
            RuntimeValue::Object { ty, .. } => *ty,
            RuntimeValue::TypeRef(_) => primitives::TYPE,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RuntimeValue::Null)
    }

    /// The wrapped type if this is a static-context type value.
    pub fn as_type_ref(&self) -> Option<TypeHash> {
        match self {
            RuntimeValue::TypeRef(ty) => Some(*ty),
            _ => None,
        }
    }
}
