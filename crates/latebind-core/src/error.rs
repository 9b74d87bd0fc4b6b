//! Error types for latebind.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BindError          - returned synchronously from binder entry points
//! ├── programmer failures (invalid arguments, plan misuse, unknown types)
//! └── internal failures   (unreachable dispatch states)
//! RegistrationError  - populating a type registry
//! ErrorKind          - category of a user-facing failure encoded into a plan
//! ```
//!
//! User-facing failures (missing member, read-only member, ...) never appear
//! as `Err`: they are synthesized into the returned plan so the call-site
//! cache can replay them. Only `BindError` escapes immediately.

use std::fmt;

use thiserror::Error;

use crate::TypeHash;

// ============================================================================
// Binding Errors
// ============================================================================

/// Errors that escape a binding request instead of being cached in a plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// An entry point was called with arguments it cannot accept.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// The offending parameter.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A plan was read before `finish` was called.
    #[error("plan read before it was finished")]
    PlanNotFinished,

    /// A plan was modified or finished after `finish` was called.
    #[error("plan already finished")]
    PlanAlreadyFinished,

    /// A type referenced by an argument is not registered.
    #[error("type not registered: {0}")]
    TypeNotFound(TypeHash),

    /// The catalog or a dispatch routine reached a state it should never reach.
    #[error("internal binder error: {0}")]
    Internal(String),
}

impl BindError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        BindError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Create an internal invariant error.
    pub fn internal(message: impl Into<String>) -> Self {
        BindError::Internal(message.into())
    }

    /// Caused by the caller misusing an API.
    pub fn is_programmer_failure(&self) -> bool {
        !self.is_internal()
    }

    /// Caused by a defect in the catalog or dispatch.
    pub fn is_internal(&self) -> bool {
        matches!(self, BindError::Internal(_))
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while populating a type registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A type with this name already exists.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A referenced type was not found.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// A type names a base type that is not registered.
    #[error("type '{type_name}' has unregistered base {base}")]
    UnknownBase {
        /// The derived type.
        type_name: String,
        /// The missing base.
        base: TypeHash,
    },

    /// Two overloads of a method share a signature.
    #[error("duplicate method '{method}' on type '{type_name}'")]
    DuplicateMethod {
        /// The declaring type.
        type_name: String,
        /// The duplicated method name.
        method: String,
    },
}

// ============================================================================
// Plan Error Categories
// ============================================================================

/// Category of a user-facing failure synthesized into a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No member with the requested name.
    MissingMember,
    /// Member exists but cannot be assigned.
    ReadOnlyMember,
    /// Member exists but cannot be deleted.
    UndeletableMember,
    /// Name resolves to members of different kinds, or overloads tie.
    AmbiguousMatch,
    /// Member still has unbound generic parameters.
    GenericAccess,
    /// Static member used through an instance, or the reverse.
    StaticAccess,
    /// Instance field of a value type assigned through a boxed copy.
    ValueTypeField,
    /// Assignment the target cannot accept.
    InvalidAssignment,
    /// No operator implementation for the operand types.
    UnsupportedOperator,
    /// No overload accepts the arguments.
    NoMatchingOverload,
}

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingMember => "missing member",
            ErrorKind::ReadOnlyMember => "read-only member",
            ErrorKind::UndeletableMember => "undeletable member",
            ErrorKind::AmbiguousMatch => "ambiguous match",
            ErrorKind::GenericAccess => "generic access",
            ErrorKind::StaticAccess => "static access",
            ErrorKind::ValueTypeField => "value type field",
            ErrorKind::InvalidAssignment => "invalid assignment",
            ErrorKind::UnsupportedOperator => "unsupported operator",
            ErrorKind::NoMatchingOverload => "no matching overload",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
