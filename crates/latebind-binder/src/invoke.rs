//! Member invocation and overload calls.

use std::sync::Arc;

use tracing::debug;

use latebind_core::{BindError, MemberDescriptor, primitives};
use latebind_registry::MemberRequestKind;

use crate::{Binder, BoundValue, ErrorInfo, OverloadRequest, PlanBuilder};

impl Binder {
    /// Bind a call of method `name` on `target` with `args`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke_member(
        &self,
        name: &str,
        target: &BoundValue,
        args: &[BoundValue],
    ) -> Result<BoundValue, BindError> {
        let target = self.resolve_target(target)?;
        let mut plan = self.plan_for(&target);
        let methods: Vec<_> = self
            .lookup(MemberRequestKind::Invoke, target.ty.type_hash, name)?
            .into_iter()
            .filter(|d| d.as_method().is_some())
            .collect();

        debug!(
            name = %name,
            ty = %target.ty.qualified_name,
            overloads = methods.len(),
            "binder: invoke member"
        );

        let info = if methods.is_empty() {
            self.policy().make_missing_member_error(target.ty, name)
        } else {
            self.bind_call(&mut plan, name, &methods, target.bound.as_ref(), args)
        };
        self.complete(plan, info, primitives::OBJECT)
    }

    /// Bind a call of the overload set `methods`.
    ///
    /// `instance` is the receiver for instance and extension methods.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call_method(
        &self,
        methods: &[Arc<MemberDescriptor>],
        instance: Option<&BoundValue>,
        args: &[BoundValue],
    ) -> Result<BoundValue, BindError> {
        let Some(first) = methods.first() else {
            return Err(BindError::invalid_argument("methods", "overload set is empty"));
        };
        let mut plan = PlanBuilder::new(self.registry());
        let info = self.bind_call(&mut plan, first.name(), methods, instance, args);
        self.complete(plan, info, primitives::OBJECT)
    }

    /// Resolve an overload set and synthesize the call.
    ///
    /// Failures still restrict every argument to its runtime type, since the
    /// outcome depends on those types.
    pub(crate) fn bind_call(
        &self,
        plan: &mut PlanBuilder<'_>,
        name: &str,
        candidates: &[Arc<MemberDescriptor>],
        instance: Option<&BoundValue>,
        args: &[BoundValue],
    ) -> ErrorInfo {
        let request = OverloadRequest {
            name,
            candidates,
            instance,
            args,
            min_level: self.config().min_narrowing,
            max_level: self.config().max_narrowing,
        };

        match self.resolver().resolve(self.registry(), &request) {
            Ok(target) => {
                plan.add_guards(&target.guards);
                if target.method.is_open_generic() {
                    return self.policy().make_generic_access_error(&target.descriptor);
                }
                debug!(
                    name = %name,
                    method = %target.method.method_hash,
                    level = ?target.level,
                    "binder: overload resolved"
                );
                let call = self.make_call(&target.method, target.instance, target.args);
                ErrorInfo::from_success(call)
            }
            Err(failure) => {
                for arg in instance.into_iter().chain(args) {
                    plan.add_guards(&arg.restricted().guards);
                }
                debug!(name = %name, %failure, "binder: overload resolution failed");
                failure.to_error_info()
            }
        }
    }
}
