use tracing::debug;

use latebind_core::{BindError, Expr, MemberHook, MemberKind, primitives};
use latebind_registry::MemberRequestKind;

use super::{Accessor, common_kind};
use crate::{Binder, BoundValue, ErrorInfo};

impl Binder {
    /// Bind a delete of member `name` on `target`.
    ///
    /// Only property deleters and the delete hook can succeed.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn delete_member(&self, name: &str, target: &BoundValue) -> Result<BoundValue, BindError> {
        let target = self.resolve_target(target)?;
        let mut plan = self.plan_for(&target);

        if let Some(hook) = self.find_hook(target.ty, MemberHook::DeleteMember)
            && let Some(call) = self.call_hook(hook, target.instance.as_ref(), name, None)
        {
            debug!(name = %name, hook = %hook.name, "binder: delete routed through hook");
            if hook.return_type == primitives::BOOL {
                plan.add_condition(call, Expr::block(Vec::new(), Vec::new()))?;
            } else {
                let handled = Expr::block(Vec::new(), vec![call]);
                return self.complete(plan, ErrorInfo::from_success(handled), primitives::VOID);
            }
        }

        let members = self.lookup(MemberRequestKind::Delete, target.ty.type_hash, name)?;
        debug!(
            name = %name,
            ty = %target.ty.qualified_name,
            count = members.len(),
            "binder: delete member"
        );

        let info = match common_kind(&members) {
            None if members.is_empty() => self
                .policy()
                .make_missing_member_error_for_delete(target.ty, name),
            Some(MemberKind::Property) => {
                let descriptor = &members[0];
                let deleter = descriptor
                    .as_property()
                    .and_then(|p| self.find_accessor(descriptor, p, Accessor::Deleter));
                match (deleter, &target.instance) {
                    (None, _) => self.policy().make_undeletable_member_error(target.ty, name),
                    (Some(deleter), _) if descriptor.is_static() => {
                        ErrorInfo::from_success(self.make_call(&deleter, None, Vec::new()))
                    }
                    (Some(deleter), Some(instance)) if descriptor.is_extension() => {
                        let receiver = deleter
                            .params
                            .first()
                            .map_or(primitives::OBJECT, |p| p.data_type);
                        ErrorInfo::from_success(self.make_call(
                            &deleter,
                            None,
                            vec![instance.clone().convert(receiver)],
                        ))
                    }
                    (Some(deleter), Some(instance)) => ErrorInfo::from_success(self.make_call(
                        &deleter,
                        Some(instance.clone().convert(deleter.owner)),
                        Vec::new(),
                    )),
                    (Some(_), None) => self.policy().make_static_access_error(descriptor, false),
                }
            }
            _ => self.policy().make_undeletable_member_error(target.ty, name),
        };

        self.complete(plan, info, primitives::VOID)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use latebind_core::{
        ErrorKind, Expr, FieldEntry, MemberHook, MethodEntry, PropertyDecl, RuntimeValue,
        TypeEntry, TypeHash, Visibility, primitives,
    };
    use latebind_registry::{MemberCatalog, TypeRegistry};

    use crate::{Binder, BoundValue};

    fn binder(entry: TypeEntry) -> (Binder, TypeHash) {
        let mut registry = TypeRegistry::with_primitives();
        let ty = registry.register_type(entry).unwrap();
        (
            Binder::new(Arc::new(MemberCatalog::new(Arc::new(registry)))),
            ty,
        )
    }

    fn target(ty: TypeHash) -> BoundValue {
        BoundValue::argument(0, RuntimeValue::object(ty, 1))
    }

    fn has_error(bound: &BoundValue, kind: ErrorKind) -> bool {
        bound
            .expr
            .any(&|e| matches!(e, Expr::NewError { kind: k, .. } if *k == kind))
    }

    #[test]
    fn deleter_is_called() {
        let (binder, ty) = binder(TypeEntry::class("Cache").with_property(
            PropertyDecl::read_write("Entry", primitives::OBJECT).deleter(Visibility::Public),
        ));
        let bound = binder.delete_member("Entry", &target(ty)).unwrap();
        assert!(!bound.is_error);
        assert!(matches!(bound.expr, Expr::Call { .. }));
        assert_eq!(bound.expr.ty(), primitives::VOID);
    }

    #[test]
    fn property_without_deleter_is_undeletable() {
        let (binder, ty) = binder(
            TypeEntry::class("Cache")
                .with_property(PropertyDecl::read_write("Entry", primitives::OBJECT)),
        );
        let bound = binder.delete_member("Entry", &target(ty)).unwrap();
        assert!(bound.is_error);
        assert!(has_error(&bound, ErrorKind::MissingMember));
    }

    #[test]
    fn fields_are_undeletable() {
        let (binder, ty) = binder(
            TypeEntry::class("Cache").with_field(FieldEntry::new("Size", primitives::INT32)),
        );
        let bound = binder.delete_member("Size", &target(ty)).unwrap();
        assert!(bound.is_error);
    }

    #[test]
    fn missing_member() {
        let (binder, ty) = binder(TypeEntry::class("Cache"));
        let bound = binder.delete_member("Nothing", &target(ty)).unwrap();
        assert!(has_error(&bound, ErrorKind::MissingMember));
    }

    #[test]
    fn bool_hook_falls_back_to_lookup() {
        let (binder, ty) = binder(TypeEntry::class("Bag").with_method(
            MethodEntry::new("TryDelete", vec![primitives::STRING], primitives::BOOL)
                .with_hook(MemberHook::DeleteMember),
        ));
        let bound = binder.delete_member("key", &target(ty)).unwrap();
        assert!(!bound.is_error);
        let Expr::Condition { if_false, .. } = &bound.expr else {
            panic!("expected guarded hook branch");
        };
        assert!(if_false.is_throw());
    }

    #[test]
    fn members_of_mixed_kinds_are_undeletable() {
        let mut registry = TypeRegistry::with_primitives();
        let base = registry
            .register_type(
                TypeEntry::class("Panel").with_field(FieldEntry::new("Layout", primitives::INT32)),
            )
            .unwrap();
        let derived = registry
            .register_type(
                TypeEntry::class("Dock")
                    .with_base(base)
                    .with_method(MethodEntry::new("Layout", vec![], primitives::VOID)),
            )
            .unwrap();
        let binder = Binder::new(Arc::new(MemberCatalog::new(Arc::new(registry))));

        let bound = binder.delete_member("Layout", &target(derived)).unwrap();
        assert!(bound.is_error);
        assert!(has_error(&bound, ErrorKind::MissingMember));
        assert!(!has_error(&bound, ErrorKind::AmbiguousMatch));
    }
}
