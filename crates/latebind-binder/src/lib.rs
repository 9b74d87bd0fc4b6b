//! Plan builder, error taxonomy and binder surface for latebind.
//!
//! A language runtime hosts dynamic call sites. When a site sees argument
//! shapes it hasn't cached, it asks a [`Binder`] to produce a [`BoundValue`]:
//! a computation plus the guards under which it may be reused.
//!
//! - [`Binder`]: get/set/delete member, operators, index get/set, invocation
//! - [`PlanBuilder`]: guarded conditional plans with temporaries
//! - [`ErrorInfo`]: exception, error value, or success
//! - [`BindingPolicy`]: how a language reports user-facing failures
//! - [`OverloadResolver`]: overload selection, pluggable
//!
//! ```ignore
//! let binder = Binder::new(catalog);
//! let bound = binder.get_member("Length", &BoundValue::argument(0, value))?;
//! if let Some(test) = bound.guards.to_test() {
//!     cache.insert(test, bound.expr);
//! }
//! ```

mod binder;
mod bound;
mod config;
mod index;
mod invoke;
mod member;
mod operators;
mod overload;
mod plan;
mod policy;
mod result;

pub use binder::Binder;
pub use bound::{BoundValue, Guard, GuardSet};
pub use config::BinderConfig;
pub use overload::{
    BindingTarget, DefaultOverloadResolver, NarrowingLevel, OverloadFailure, OverloadRequest,
    OverloadResolver,
};
pub use plan::{Plan, PlanBuilder};
pub use policy::{BindingPolicy, DefaultPolicy};
pub use result::{ErrorInfo, ErrorResultKind};
