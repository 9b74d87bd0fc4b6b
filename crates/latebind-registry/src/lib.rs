//! Type registry and member catalog for latebind.
//!
//! - [`TypeRegistry`]: the types the binder reflects over
//! - [`MemberCatalog`]: canonical, interned member descriptors and the
//!   member lookup algorithm
//! - [`ExtensionMember`] / [`ExtensionSource`]: members attached to a type
//!   from outside its declaration

mod catalog;
mod extension;
mod registry;

pub use catalog::{LookupOptions, MemberCatalog, MemberRequestKind};
pub use extension::{ExtensionMember, ExtensionSource};
pub use registry::{ConversionRank, TypeRegistry};
