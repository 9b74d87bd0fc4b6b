//! Index get/set.
//!
//! Arrays index directly when the single index converts to an integral
//! type. Other types go through the accessor methods of their default
//! member (`get_Item` / `set_Item` for a default member named `Item`).
//! `Ok(None)` means the binder has no opinion and the caller should fall
//! back to its own handling.

use std::sync::Arc;

use tracing::debug;

use latebind_core::{BindError, Expr, MemberDescriptor, TypeEntry, TypeHash, primitives};
use latebind_registry::MemberRequestKind;

use crate::binder::Target;
use crate::{Binder, BoundValue, ErrorInfo, OverloadRequest, PlanBuilder};

impl Binder {
    /// Bind `target[indexes]`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_index(
        &self,
        target: &BoundValue,
        indexes: &[BoundValue],
    ) -> Result<Option<BoundValue>, BindError> {
        if indexes.is_empty() {
            return Err(BindError::invalid_argument("indexes", "at least one index is required"));
        }
        let target = self.resolve_target(target)?;

        if target.ty.is_array() {
            let Some(element) = self.array_element(&target, indexes) else {
                return Ok(None);
            };
            let mut plan = self.plan_for(&target);
            plan.add_guards(&element.guards);
            let info = ErrorInfo::from_success(element.expr);
            return self.complete(plan, info, primitives::OBJECT).map(Some);
        }

        let Some(accessors) = self.default_accessors(&target, "get")? else {
            return Ok(None);
        };
        let mut plan = self.plan_for(&target);
        let name = accessors[0].name().to_string();
        let info = self.bind_call(&mut plan, &name, &accessors, target.bound.as_ref(), indexes);
        self.complete(plan, info, primitives::OBJECT).map(Some)
    }

    /// Bind `target[indexes] = value`.
    ///
    /// The result evaluates to the assigned value.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set_index(
        &self,
        target: &BoundValue,
        indexes: &[BoundValue],
        value: &BoundValue,
    ) -> Result<Option<BoundValue>, BindError> {
        if indexes.is_empty() {
            return Err(BindError::invalid_argument("indexes", "at least one index is required"));
        }
        let target = self.resolve_target(target)?;
        let restricted = value.restricted();

        if target.ty.is_array() {
            let Some(element) = self.array_element(&target, indexes) else {
                return Ok(None);
            };
            let mut plan = self.plan_for(&target);
            plan.add_guards(&element.guards);
            plan.add_guards(&restricted.guards);
            let element_ty = element.expr.ty();
            let info = ErrorInfo::from_success(Expr::assign(
                element.expr,
                restricted.expr.convert(element_ty),
            ));
            return self.complete(plan, info, primitives::OBJECT).map(Some);
        }

        let Some(accessors) = self.default_accessors(&target, "set")? else {
            return Ok(None);
        };
        let mut plan = self.plan_for(&target);
        plan.add_guards(&restricted.guards);
        let info = self.bind_indexed_set(&mut plan, &target, &accessors, indexes, value)?;
        self.complete(plan, info, primitives::OBJECT).map(Some)
    }

    /// `array[index]`, or `None` when the index shape doesn't fit.
    fn array_element(&self, target: &Target<'_>, indexes: &[BoundValue]) -> Option<BoundValue> {
        let array = target.instance.as_ref()?;
        let [index] = indexes else {
            debug!(count = indexes.len(), "binder: array indexed with several indexes");
            return None;
        };
        let index = index.restricted();
        let index_ty = index.limit_type();
        if !self.registry().converts_to_integral(index_ty) {
            debug!(
                ty = %self.registry().type_name(index_ty),
                "binder: array index is not integral"
            );
            return None;
        }

        let index_expr = if primitives::is_integral(index_ty) {
            index.expr
        } else {
            index.expr.convert(self.integral_target(index_ty))
        };
        let element = target.ty.element_type.unwrap_or(primitives::OBJECT);
        Some(BoundValue::new(
            Expr::ArrayIndex {
                array: Box::new(array.clone()),
                index: Box::new(index_expr),
                ty: element,
            },
            index.guards,
        ))
    }

    fn integral_target(&self, ty: TypeHash) -> TypeHash {
        primitives::INTEGRAL
            .iter()
            .copied()
            .find(|&target| self.registry().is_assignable(ty, target))
            .unwrap_or(primitives::INT32)
    }

    /// Accessors of the default member, found on the type or its bases.
    fn default_accessors(
        &self,
        target: &Target<'_>,
        prefix: &str,
    ) -> Result<Option<Vec<Arc<MemberDescriptor>>>, BindError> {
        let Some(member) = self.default_member(target.ty) else {
            debug!(ty = %target.ty.qualified_name, "binder: no default member");
            return Ok(None);
        };
        let accessors: Vec<_> = self
            .lookup(
                MemberRequestKind::Invoke,
                target.ty.type_hash,
                &format!("{prefix}_{member}"),
            )?
            .into_iter()
            .filter(|d| d.as_method().is_some())
            .collect();
        Ok((!accessors.is_empty()).then_some(accessors))
    }

    fn default_member<'a>(&'a self, ty: &'a TypeEntry) -> Option<&'a str> {
        std::iter::once(ty)
            .chain(self.registry().base_chain(ty.type_hash))
            .find_map(|t| t.default_member.as_deref())
    }

    /// Resolve an indexed setter with the value as its last argument.
    ///
    /// A setter that doesn't return the value gets it preserved through a
    /// temporary so the whole expression still evaluates to it. `value` is
    /// unrestricted; the resolver pins it.
    fn bind_indexed_set(
        &self,
        plan: &mut PlanBuilder<'_>,
        target: &Target<'_>,
        accessors: &[Arc<MemberDescriptor>],
        indexes: &[BoundValue],
        value: &BoundValue,
    ) -> Result<ErrorInfo, BindError> {
        let args: Vec<BoundValue> = indexes.iter().cloned().chain([value.clone()]).collect();
        let name = accessors[0].name();
        let request = OverloadRequest {
            name,
            candidates: accessors,
            instance: target.bound.as_ref(),
            args: &args,
            min_level: self.config().min_narrowing,
            max_level: self.config().max_narrowing,
        };

        let mut resolved = match self.resolver().resolve(self.registry(), &request) {
            Ok(resolved) => resolved,
            Err(failure) => {
                for arg in target.bound.iter().chain(&args) {
                    plan.add_guards(&arg.restricted().guards);
                }
                debug!(name = %name, %failure, "binder: indexed set failed");
                return Ok(failure.to_error_info());
            }
        };
        plan.add_guards(&resolved.guards);
        if resolved.method.is_open_generic() {
            return Ok(self.policy().make_generic_access_error(&resolved.descriptor));
        }

        if resolved.method.returns_value() {
            let call = self.make_call(&resolved.method, resolved.instance, resolved.args);
            return Ok(ErrorInfo::from_success(call));
        }

        let value_param = resolved
            .method
            .params
            .last()
            .filter(|_| !resolved.method.has_splat())
            .map(|p| p.data_type);
        let Some(param_ty) = value_param else {
            let call = self.make_call(&resolved.method, resolved.instance, resolved.args);
            return Ok(ErrorInfo::from_success(Expr::block(
                Vec::new(),
                vec![call, value.restricted().expr],
            )));
        };

        let value = value.restricted();
        let temp = plan.declare_temporary(value.expr.ty())?;
        if let Some(last) = resolved.args.last_mut() {
            *last = Expr::Temp(temp).convert(param_ty);
        }
        let call = self.make_call(&resolved.method, resolved.instance, resolved.args);
        debug!(name = %name, "binder: indexed set preserves value in temporary");
        Ok(ErrorInfo::from_success(Expr::block(
            Vec::new(),
            vec![
                Expr::assign(Expr::Temp(temp), value.expr),
                call,
                Expr::Temp(temp),
            ],
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use latebind_core::{
        ErrorKind, Expr, MethodEntry, RuntimeValue, TypeEntry, TypeHash, primitives,
    };
    use latebind_registry::{MemberCatalog, TypeRegistry};

    use crate::{Binder, BoundValue};

    struct Fixture {
        binder: Binder,
        ints: TypeHash,
        table: TypeHash,
        plain: TypeHash,
    }

    fn fixture() -> Fixture {
        let mut registry = TypeRegistry::with_primitives();
        let int = registry.get(primitives::INT32).unwrap().clone();
        let ints = registry.register_type(TypeEntry::array_of(&int)).unwrap();

        let table = TypeEntry::class("Table")
            .with_default_member("Item")
            .with_method(MethodEntry::new("get_Item", vec![primitives::STRING], primitives::OBJECT))
            .with_method(MethodEntry::new(
                "set_Item",
                vec![primitives::STRING, primitives::OBJECT],
                primitives::VOID,
            ));
        let table = registry.register_type(table).unwrap();
        let plain = registry.register_type(TypeEntry::class("Plain")).unwrap();

        Fixture {
            binder: Binder::new(Arc::new(MemberCatalog::new(Arc::new(registry)))),
            ints,
            table,
            plain,
        }
    }

    fn arg(index: usize, value: RuntimeValue) -> BoundValue {
        BoundValue::argument(index, value)
    }

    #[test]
    fn array_get_with_integral_index() {
        let f = fixture();
        let bound = f
            .binder
            .get_index(&arg(0, RuntimeValue::object(f.ints, 1)), &[arg(1, RuntimeValue::int(2))])
            .unwrap()
            .unwrap();
        assert!(matches!(bound.expr, Expr::ArrayIndex { ty, .. } if ty == primitives::INT32));
        assert_eq!(bound.guards.len(), 2);
    }

    #[test]
    fn array_with_non_integral_index_falls_back() {
        let f = fixture();
        let result = f
            .binder
            .get_index(
                &arg(0, RuntimeValue::object(f.ints, 1)),
                &[arg(1, RuntimeValue::Str("x".into()))],
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn array_set_assigns_element() {
        let f = fixture();
        let bound = f
            .binder
            .set_index(
                &arg(0, RuntimeValue::object(f.ints, 1)),
                &[arg(1, RuntimeValue::int(0))],
                &arg(2, RuntimeValue::int(9)),
            )
            .unwrap()
            .unwrap();
        assert!(matches!(bound.expr, Expr::Assign { .. }));
        assert_eq!(bound.guards.len(), 3);
    }

    #[test]
    fn default_member_getter() {
        let f = fixture();
        let bound = f
            .binder
            .get_index(
                &arg(0, RuntimeValue::object(f.table, 1)),
                &[arg(1, RuntimeValue::Str("key".into()))],
            )
            .unwrap()
            .unwrap();
        assert!(matches!(bound.expr, Expr::Call { .. }));
    }

    #[test]
    fn void_setter_preserves_value_in_temporary() {
        let f = fixture();
        let bound = f
            .binder
            .set_index(
                &arg(0, RuntimeValue::object(f.table, 1)),
                &[arg(1, RuntimeValue::Str("key".into()))],
                &arg(2, RuntimeValue::int(5)),
            )
            .unwrap()
            .unwrap();
        let Expr::Block { temps, body } = &bound.expr else {
            panic!("expected plan block, got {:?}", bound.expr);
        };
        assert_eq!(temps.len(), 1);
        let Expr::Block { body: inner, .. } = &body[0] else {
            panic!("expected setter block");
        };
        assert_eq!(inner.len(), 3);
        assert!(matches!(inner[2], Expr::Temp(_)));
    }

    #[test]
    fn wrong_index_type_is_exception() {
        let f = fixture();
        let bound = f
            .binder
            .get_index(
                &arg(0, RuntimeValue::object(f.table, 1)),
                &[arg(1, RuntimeValue::Bool(true))],
            )
            .unwrap()
            .unwrap();
        assert!(bound.is_error);
        assert!(bound.expr.any(&|e| matches!(
            e,
            Expr::NewError { kind: ErrorKind::NoMatchingOverload, .. }
        )));
    }

    #[test]
    fn no_default_member() {
        let f = fixture();
        let result = f
            .binder
            .get_index(&arg(0, RuntimeValue::object(f.plain, 1)), &[arg(1, RuntimeValue::int(0))])
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn empty_indexes_is_a_fault() {
        let f = fixture();
        let err = f
            .binder
            .get_index(&arg(0, RuntimeValue::object(f.ints, 1)), &[])
            .unwrap_err();
        assert!(err.is_programmer_failure());
    }
}
