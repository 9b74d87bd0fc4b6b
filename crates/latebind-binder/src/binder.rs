//! The binder surface.
//!
//! A [`Binder`] answers one binding request at a time: get/set/delete a
//! named member, apply an operator, index, or call an overload set. Each
//! entry point returns a [`BoundValue`] whose guards describe the argument
//! shapes it stays valid for. User-facing failures are encoded into that
//! value through the [`BindingPolicy`]; only misuse and internal defects
//! come back as `Err`.
//!
//! The entry points live in their own modules:
//!
//! - `member`: get/set/delete member
//! - `operators`: operator dispatch
//! - `index`: index get/set
//! - `invoke`: member invocation and overload calls

use std::fmt;
use std::sync::Arc;

use latebind_core::{
    BindError, Expr, Literal, MemberDescriptor, MemberHook, MethodEntry, RuntimeValue, TypeEntry,
    TypeHash, primitives,
};
use latebind_registry::{MemberCatalog, MemberRequestKind, TypeRegistry};

use crate::{
    BinderConfig, BindingPolicy, BoundValue, DefaultOverloadResolver, DefaultPolicy, ErrorInfo,
    Guard, GuardSet, OverloadResolver, PlanBuilder,
};

/// The type a request resolved against, plus the instance if there is one.
#[derive(Debug)]
pub(crate) struct Target<'a> {
    pub ty: &'a TypeEntry,
    /// `None` in static context (the target was a type value).
    pub instance: Option<Expr>,
    /// The original target, when it is an instance.
    pub bound: Option<BoundValue>,
    pub guards: GuardSet,
}

/// Binds dynamic operations against one [`MemberCatalog`].
#[derive(Clone)]
pub struct Binder {
    catalog: Arc<MemberCatalog>,
    policy: Arc<dyn BindingPolicy>,
    resolver: Arc<dyn OverloadResolver>,
    config: BinderConfig,
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Binder {
    /// Create a binder with the default policy and overload resolver.
    pub fn new(catalog: Arc<MemberCatalog>) -> Self {
        Self {
            catalog,
            policy: Arc::new(DefaultPolicy),
            resolver: Arc::new(DefaultOverloadResolver),
            config: BinderConfig::default(),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn BindingPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn OverloadResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &Arc<MemberCatalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.catalog.registry()
    }

    pub fn policy(&self) -> &dyn BindingPolicy {
        self.policy.as_ref()
    }

    pub(crate) fn resolver(&self) -> &dyn OverloadResolver {
        self.resolver.as_ref()
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    // ==========================================================================
    // Shared helpers
    // ==========================================================================

    /// Resolve the effective type of `target`.
    ///
    /// A type value drops the instance and adds an identity guard on the
    /// wrapper; anything else is restricted to its exact runtime type.
    pub(crate) fn resolve_target(&self, target: &BoundValue) -> Result<Target<'_>, BindError> {
        if let Some(ty) = target.value.as_ref().and_then(RuntimeValue::as_type_ref) {
            let mut guards = target.guards.clone();
            guards.add(Guard::TypeIdentity {
                expr: target.expr.clone(),
                ty,
            });
            let entry = self.registry().get(ty).ok_or(BindError::TypeNotFound(ty))?;
            return Ok(Target {
                ty: entry,
                instance: None,
                bound: None,
                guards,
            });
        }

        let restricted = target.restricted();
        let ty = restricted.limit_type();
        let entry = self.registry().get(ty).ok_or(BindError::TypeNotFound(ty))?;
        Ok(Target {
            ty: entry,
            instance: Some(restricted.expr),
            bound: Some(target.clone()),
            guards: restricted.guards,
        })
    }

    pub(crate) fn lookup(
        &self,
        kind: MemberRequestKind,
        ty: TypeHash,
        name: &str,
    ) -> Result<Vec<Arc<MemberDescriptor>>, BindError> {
        self.catalog
            .lookup(kind, ty, name, self.config.lookup_options())
    }

    /// Whether `method` can be called directly from outside its declaring type.
    pub(crate) fn is_accessible(&self, method: &MethodEntry) -> bool {
        method.is_public() && self.registry().is_visible(method.owner)
    }

    /// A call of `method`, crossing visibility boundaries through reflection
    /// when the method or its declaring type is not public.
    pub(crate) fn make_call(
        &self,
        method: &MethodEntry,
        instance: Option<Expr>,
        args: Vec<Expr>,
    ) -> Expr {
        if self.is_accessible(method) {
            return Expr::call(method, instance, args);
        }
        let invoke = Expr::ReflectiveInvoke {
            method: method.method_hash,
            instance: instance.map(|i| Box::new(i.convert(primitives::OBJECT))),
            args: Box::new(Expr::object_array(args)),
        };
        if method.returns_value() {
            invoke.convert(method.return_type)
        } else {
            invoke
        }
    }

    /// Injector hook registered on `ty` or one of its bases.
    pub(crate) fn find_hook<'a>(
        &'a self,
        ty: &'a TypeEntry,
        hook: MemberHook,
    ) -> Option<&'a MethodEntry> {
        std::iter::once(ty)
            .chain(self.registry().base_chain(ty.type_hash))
            .find_map(|t| t.find_hook(hook))
    }

    /// Call an injector hook with the member name and, for set, the value.
    ///
    /// Returns `None` when an instance hook is reached without an instance.
    pub(crate) fn call_hook(
        &self,
        hook: &MethodEntry,
        instance: Option<&Expr>,
        name: &str,
        value: Option<&Expr>,
    ) -> Option<Expr> {
        let instance = if hook.is_static() {
            None
        } else {
            Some(instance?.clone())
        };
        let supplied =
            std::iter::once(Expr::constant(Literal::Str(name.to_string()))).chain(value.cloned());
        let args = supplied
            .zip(&hook.params)
            .map(|(arg, param)| arg.convert(param.data_type))
            .collect();
        Some(self.make_call(hook, instance, args))
    }

    /// Finish `plan` with `info` as its terminal branch.
    pub(crate) fn complete(
        &self,
        mut plan: PlanBuilder<'_>,
        info: ErrorInfo,
        ty: TypeHash,
    ) -> Result<BoundValue, BindError> {
        if info.is_error() {
            plan.finish_as_error(info.into_expr(ty))?;
        } else {
            plan.finish(info.into_expr(ty))?;
        }
        plan.into_bound()
    }

    /// A plan builder seeded with the target's guards.
    pub(crate) fn plan_for(&self, target: &Target<'_>) -> PlanBuilder<'_> {
        let mut plan = PlanBuilder::new(self.registry());
        plan.add_guards(&target.guards);
        plan
    }
}
