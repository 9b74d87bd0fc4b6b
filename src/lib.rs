//! latebind: a binding core for dynamic languages hosted on a typed runtime.
//!
//! The workspace splits into three layers:
//!
//! - [`core`]: type identities, member entries, descriptors, computation
//!   trees and the operator table
//! - [`registry`]: the type registry and the interned member catalog
//! - [`binder`]: plan builder, error taxonomy and the binder surface
//!
//! Most hosts only need the [`prelude`].

pub use latebind_binder as binder;
pub use latebind_core as core;
pub use latebind_registry as registry;

// Re-export main types
pub mod prelude {
    pub use latebind_binder::{
        Binder, BinderConfig, BindingPolicy, BoundValue, DefaultPolicy, ErrorInfo,
        ErrorResultKind, Guard, GuardSet, NarrowingLevel, PlanBuilder,
    };
    pub use latebind_core::{
        BindError, ErrorKind, Expr, FieldEntry, Literal, MemberDescriptor, MemberHook,
        MemberKind, MethodEntry, OperatorKind, PropertyDecl, RuntimeValue, TypeEntry, TypeHash,
        Visibility, primitives,
    };
    pub use latebind_registry::{
        ExtensionMember, ExtensionSource, LookupOptions, MemberCatalog, MemberRequestKind,
        TypeRegistry,
    };
}
