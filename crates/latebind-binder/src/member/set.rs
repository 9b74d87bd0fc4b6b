use std::sync::Arc;

use tracing::debug;

use latebind_core::{
    BindError, ErrorKind, EventEntry, Expr, FieldEntry, MemberDescriptor, MemberHook, MemberKind,
    PropertyEntry, primitives,
};
use latebind_registry::MemberRequestKind;

use super::{Accessor, common_kind};
use crate::binder::Target;
use crate::{Binder, BoundValue, ErrorInfo, PlanBuilder};

impl Binder {
    /// Bind an assignment of `value` to member `name` on `target`.
    ///
    /// Every successful plan evaluates to the assigned value.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set_member(
        &self,
        name: &str,
        target: &BoundValue,
        value: &BoundValue,
    ) -> Result<BoundValue, BindError> {
        let target = self.resolve_target(target)?;
        let value = value.restricted();
        let mut plan = self.plan_for(&target);
        plan.add_guards(&value.guards);

        if let Some(info) =
            self.set_through_hook(&mut plan, &target, MemberHook::SetMember, name, &value)?
        {
            return self.complete(plan, info, value.expr.ty());
        }

        let members = self.lookup(MemberRequestKind::Set, target.ty.type_hash, name)?;
        let kind = common_kind(&members);
        debug!(
            name = %name,
            ty = %target.ty.qualified_name,
            count = members.len(),
            kind = ?kind,
            "binder: set member"
        );

        let info = match kind {
            None if members.is_empty() => {
                let after = self.set_through_hook(
                    &mut plan,
                    &target,
                    MemberHook::SetMemberAfter,
                    name,
                    &value,
                )?;
                match after {
                    Some(info) => info,
                    None => self
                        .policy()
                        .make_missing_member_error_for_assign(target.ty, name),
                }
            }
            None => self
                .policy()
                .make_ambiguous_match_error(target.ty, name, &members),
            Some(MemberKind::Field) => match members[0].as_field() {
                Some(field) => self.set_field(&target, &members[0], field, &value),
                None => return Err(BindError::internal("field descriptor expected")),
            },
            Some(MemberKind::Property) => match members[0].as_property() {
                Some(property) => self.set_property(&target, &members[0], property, &value),
                None => return Err(BindError::internal("property descriptor expected")),
            },
            Some(MemberKind::Event) => match members[0].unbound() {
                MemberDescriptor::Event(event) => self.set_event(&target, event, &value),
                _ => return Err(BindError::internal("event descriptor expected")),
            },
            Some(
                MemberKind::Method
                | MemberKind::Constructor
                | MemberKind::NestedType
                | MemberKind::TypeGroup
                | MemberKind::Custom,
            ) => self.policy().make_read_only_member_error(target.ty, name),
        };

        self.complete(plan, info, value.expr.ty())
    }

    /// Consult a set hook.
    ///
    /// A hook returning `bool` becomes a guarded branch and the caller keeps
    /// resolving; any other hook handles the request outright.
    fn set_through_hook(
        &self,
        plan: &mut PlanBuilder<'_>,
        target: &Target<'_>,
        hook: MemberHook,
        name: &str,
        value: &BoundValue,
    ) -> Result<Option<ErrorInfo>, BindError> {
        let Some(method) = self.find_hook(target.ty, hook) else {
            return Ok(None);
        };
        let Some(call) = self.call_hook(method, target.instance.as_ref(), name, Some(&value.expr))
        else {
            return Ok(None);
        };

        debug!(name = %name, hook = %method.name, "binder: set routed through hook");
        if method.return_type == primitives::BOOL {
            plan.add_condition(call, value.expr.clone())?;
            Ok(None)
        } else {
            Ok(Some(ErrorInfo::from_success(Expr::block(
                Vec::new(),
                vec![call, value.expr.clone()],
            ))))
        }
    }

    fn set_field(
        &self,
        target: &Target<'_>,
        descriptor: &Arc<MemberDescriptor>,
        field: &FieldEntry,
        value: &BoundValue,
    ) -> ErrorInfo {
        let registry = self.registry();
        let converted = value.expr.clone().convert(field.data_type);

        // Boxed references expose their payload as a plain public field.
        if let Some(owner) = registry.get(field.owner)
            && owner.is_boxed_reference()
            && let Some(instance) = &target.instance
        {
            let slot = Expr::Field {
                instance: Some(Box::new(instance.clone().convert(field.owner))),
                field: field.field_hash,
                ty: field.data_type,
            };
            return ErrorInfo::from_success(Expr::assign(slot, converted));
        }

        if field.is_read_only() {
            return self
                .policy()
                .make_read_only_member_error(target.ty, &field.name);
        }

        let instance = if field.is_static() {
            None
        } else {
            match &target.instance {
                Some(instance) => Some(Box::new(instance.clone().convert(field.owner))),
                None => {
                    return ErrorInfo::exception(
                        ErrorKind::InvalidAssignment,
                        format!(
                            "instance field '{}' cannot be assigned without an instance",
                            field.name
                        ),
                    );
                }
            }
        };

        let assignment = if field.is_public() && registry.is_visible(field.owner) {
            let slot = Expr::Field {
                instance,
                field: field.field_hash,
                ty: field.data_type,
            };
            Expr::assign(slot, converted)
        } else {
            Expr::block(
                Vec::new(),
                vec![
                    Expr::ReflectiveSetField {
                        instance,
                        field: field.field_hash,
                        value: Box::new(converted.clone().convert(primitives::OBJECT)),
                    },
                    converted,
                ],
            )
        };

        if field.is_static() && target.ty.type_hash != field.owner {
            return self
                .policy()
                .make_static_assignment_from_derived_type_error(target.ty, descriptor, assignment);
        }
        if !field.is_static() && registry.is_value_type(field.owner) {
            return self.policy().make_value_type_field_error(field, &value.expr);
        }
        ErrorInfo::from_success(assignment)
    }

    fn set_property(
        &self,
        target: &Target<'_>,
        descriptor: &Arc<MemberDescriptor>,
        property: &PropertyEntry,
        value: &BoundValue,
    ) -> ErrorInfo {
        let Some(setter) = self.find_accessor(descriptor, property, Accessor::Setter) else {
            return self
                .policy()
                .make_missing_member_error_for_assign(target.ty, &property.name);
        };

        let is_static = descriptor.is_static();
        match (is_static, &target.instance) {
            (true, Some(_)) => return self.policy().make_static_access_error(descriptor, true),
            (false, None) => return self.policy().make_static_access_error(descriptor, false),
            _ => {}
        }

        let converted = value.expr.clone().convert(property.data_type);
        let call = match &target.instance {
            Some(instance) if descriptor.is_extension() => {
                let receiver = setter
                    .params
                    .first()
                    .map_or(primitives::OBJECT, |p| p.data_type);
                self.make_call(
                    &setter,
                    None,
                    vec![instance.clone().convert(receiver), converted.clone()],
                )
            }
            Some(instance) => self.make_call(
                &setter,
                Some(instance.clone().convert(setter.owner)),
                vec![converted.clone()],
            ),
            None => self.make_call(&setter, None, vec![converted.clone()]),
        };
        let assignment = if setter.returns_value() {
            call
        } else {
            Expr::block(Vec::new(), vec![call, converted])
        };

        if is_static && target.ty.type_hash != property.owner {
            return self
                .policy()
                .make_static_assignment_from_derived_type_error(target.ty, descriptor, assignment);
        }
        if setter.is_open_generic() {
            return self.policy().make_generic_access_error(descriptor);
        }
        ErrorInfo::from_success(assignment)
    }

    /// Events only accept the result of an in-place add or remove.
    fn set_event(&self, target: &Target<'_>, event: &EventEntry, value: &BoundValue) -> ErrorInfo {
        let instance = if event.is_static {
            None
        } else {
            target
                .instance
                .clone()
                .map(|i| Box::new(i.convert(event.owner)))
        };
        ErrorInfo::from_success(Expr::block(
            Vec::new(),
            vec![
                Expr::ValidateEventAssign {
                    event: event.event_hash,
                    instance,
                    value: Box::new(value.expr.clone()),
                },
                value.expr.clone(),
            ],
        ))
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

    use crate::{Binder, BindingPolicy, BoundValue, ErrorInfo};

    struct Fixture {
        binder: Binder,
        base: TypeHash,
        derived: TypeHash,
        point: TypeHash,
        boxed: TypeHash,
    }

    fn fixture() -> Fixture {
        let mut registry = TypeRegistry::with_primitives();
        let base = TypeEntry::class("Shape")
            .with_field(FieldEntry::new("Name", primitives::STRING))
            .with_field(FieldEntry::new("Count", primitives::INT32).as_static())
            .with_field(FieldEntry::new("Id", primitives::INT64).as_init_only())
            .with_field(
                FieldEntry::new("tag", primitives::INT32).with_visibility(Visibility::Private),
            )
            .with_property(PropertyDecl::read_write("Area", primitives::DOUBLE))
            .with_property(PropertyDecl::read_write("Total", primitives::INT32).as_static())
            .with_property(
                PropertyDecl::read_write("Anything", primitives::OBJECT).open_generic_setter(),
            )
            .with_method(MethodEntry::new("Draw", vec![], primitives::VOID))
            .with_event("Changed", primitives::OBJECT, false);
        let base = registry.register_type(base).unwrap();
        let derived = registry
            .register_type(TypeEntry::class("Circle").with_base(base))
            .unwrap();
        let point = registry
            .register_type(
                TypeEntry::value_type("Point").with_field(FieldEntry::new("X", primitives::INT32)),
            )
            .unwrap();
        let boxed_entry = TypeEntry::boxed_of(registry.get(primitives::INT32).unwrap());
        let boxed = registry.register_type(boxed_entry).unwrap();

        Fixture {
            binder: Binder::new(Arc::new(MemberCatalog::new(Arc::new(registry)))),
            base,
            derived,
            point,
            boxed,
        }
    }

    fn object(ty: TypeHash) -> BoundValue {
        BoundValue::argument(0, RuntimeValue::object(ty, 1))
    }

    fn value(v: i64) -> BoundValue {
        BoundValue::argument(1, RuntimeValue::int(v))
    }

    fn error_kind(bound: &BoundValue) -> Option<ErrorKind> {
        [
            ErrorKind::MissingMember,
            ErrorKind::ReadOnlyMember,
            ErrorKind::AmbiguousMatch,
            ErrorKind::GenericAccess,
            ErrorKind::StaticAccess,
            ErrorKind::ValueTypeField,
            ErrorKind::InvalidAssignment,
        ]
        .into_iter()
        .find(|kind| {
            bound
                .expr
                .any(&|e| matches!(e, Expr::NewError { kind: k, .. } if k == kind))
        })
    }

    #[test]
    fn public_field_assigns_directly() {
        let f = fixture();
        let bound = f.binder.set_member("Name", &object(f.base), &value(1)).unwrap();
        assert!(matches!(bound.expr, Expr::Assign { .. }));
        assert_eq!(bound.guards.len(), 2);
    }

    #[test]
    fn read_only_field() {
        let f = fixture();
        let bound = f.binder.set_member("Id", &object(f.base), &value(1)).unwrap();
        assert!(bound.is_error);
        assert_eq!(error_kind(&bound), Some(ErrorKind::ReadOnlyMember));
    }

    #[test]
    fn private_field_is_missing_without_private_binding() {
        let f = fixture();
        let bound = f.binder.set_member("tag", &object(f.base), &value(1)).unwrap();
        assert_eq!(error_kind(&bound), Some(ErrorKind::MissingMember));
    }

    #[test]
    fn static_field_through_derived_type_allowed_by_default() {
        let f = fixture();
        let target = BoundValue::argument(0, RuntimeValue::TypeRef(f.derived));
        let bound = f.binder.set_member("Count", &target, &value(3)).unwrap();
        assert!(!bound.is_error);
        assert!(matches!(bound.expr, Expr::Assign { .. }));
    }

    #[test]
    fn derived_static_assignment_policy_can_refuse() {
        struct Strict;
        impl BindingPolicy for Strict {
            fn make_static_assignment_from_derived_type_error(
                &self,
                _accessed_through: &TypeEntry,
                member: &latebind_core::MemberDescriptor,
                _assignment: Expr,
            ) -> ErrorInfo {
                ErrorInfo::exception(ErrorKind::StaticAccess, member.name().to_string())
            }
        }

        let f = fixture();
        let binder = f.binder.clone().with_policy(Arc::new(Strict));
        let target = BoundValue::argument(0, RuntimeValue::TypeRef(f.derived));
        let bound = binder.set_member("Count", &target, &value(3)).unwrap();
        assert!(bound.is_error);
        assert_eq!(error_kind(&bound), Some(ErrorKind::StaticAccess));
    }

    #[test]
    fn instance_field_without_instance() {
        let f = fixture();
        let target = BoundValue::argument(0, RuntimeValue::TypeRef(f.base));
        let bound = f.binder.set_member("Name", &target, &value(1)).unwrap();
        assert_eq!(error_kind(&bound), Some(ErrorKind::InvalidAssignment));
    }

    #[test]
    fn value_type_field_through_box() {
        let f = fixture();
        let bound = f.binder.set_member("X", &object(f.point), &value(1)).unwrap();
        assert_eq!(error_kind(&bound), Some(ErrorKind::ValueTypeField));
    }

    #[test]
    fn boxed_reference_field_is_unwrapped() {
        let f = fixture();
        let bound = f.binder.set_member("Value", &object(f.boxed), &value(9)).unwrap();
        assert!(!bound.is_error);
        assert!(matches!(bound.expr, Expr::Assign { .. }));
    }

    #[test]
    fn property_setter_yields_value() {
        let f = fixture();
        let bound = f.binder.set_member("Area", &object(f.base), &value(2)).unwrap();
        let Expr::Block { body, .. } = &bound.expr else {
            panic!("expected block, got {:?}", bound.expr);
        };
        assert!(matches!(body[0], Expr::Call { .. }));
        assert_eq!(bound.expr.ty(), primitives::DOUBLE);
    }

    #[test]
    fn static_property_through_instance() {
        let f = fixture();
        let bound = f.binder.set_member("Total", &object(f.base), &value(2)).unwrap();
        assert_eq!(error_kind(&bound), Some(ErrorKind::StaticAccess));
    }

    #[test]
    fn open_generic_setter() {
        let f = fixture();
        let bound = f.binder.set_member("Anything", &object(f.base), &value(2)).unwrap();
        assert_eq!(error_kind(&bound), Some(ErrorKind::GenericAccess));
    }

    #[test]
    fn methods_are_read_only() {
        let f = fixture();
        let bound = f.binder.set_member("Draw", &object(f.base), &value(2)).unwrap();
        assert_eq!(error_kind(&bound), Some(ErrorKind::ReadOnlyMember));
    }

    #[test]
    fn events_validate_in_place_assignment() {
        let f = fixture();
        let bound = f.binder.set_member("Changed", &object(f.base), &value(2)).unwrap();
        assert!(bound.expr.any(&|e| matches!(e, Expr::ValidateEventAssign { .. })));
    }

    #[test]
    fn bool_hook_is_guarded_branch() {
        let mut registry = TypeRegistry::with_primitives();
        let bag = TypeEntry::class("Bag")
            .with_method(
                MethodEntry::new(
                    "TrySet",
                    vec![primitives::STRING, primitives::OBJECT],
                    primitives::BOOL,
                )
                .with_hook(MemberHook::SetMember),
            )
            .with_field(FieldEntry::new("Size", primitives::INT32));
        let bag = registry.register_type(bag).unwrap();
        let binder = Binder::new(Arc::new(MemberCatalog::new(Arc::new(registry))));

        let bound = binder.set_member("Size", &object(bag), &value(4)).unwrap();
        let Expr::Condition { if_false, .. } = &bound.expr else {
            panic!("expected guarded hook branch, got {:?}", bound.expr);
        };
        assert!(matches!(**if_false, Expr::Assign { .. }));
    }

    #[test]
    fn unconditional_hook_handles_everything() {
        let mut registry = TypeRegistry::with_primitives();
        let bag = TypeEntry::class("Bag").with_method(
            MethodEntry::new(
                "Store",
                vec![primitives::STRING, primitives::OBJECT],
                primitives::VOID,
            )
            .with_hook(MemberHook::SetMember),
        );
        let bag = registry.register_type(bag).unwrap();
        let binder = Binder::new(Arc::new(MemberCatalog::new(Arc::new(registry))));

        let bound = binder.set_member("missing", &object(bag), &value(4)).unwrap();
        assert!(!bound.is_error);
        assert!(matches!(bound.expr, Expr::Block { .. }));
    }

    #[test]
    fn field_and_method_of_same_name_are_ambiguous() {
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

        let bound = binder.set_member("Layout", &object(derived), &value(1)).unwrap();
        assert!(bound.is_error);
        assert_eq!(error_kind(&bound), Some(ErrorKind::AmbiguousMatch));
    }

    #[test]
    fn missing_member_routes_through_after_hook() {
        let mut registry = TypeRegistry::with_primitives();
        let bag = TypeEntry::class("Bag")
            .with_method(
                MethodEntry::new(
                    "StoreExtra",
                    vec![primitives::STRING, primitives::OBJECT],
                    primitives::VOID,
                )
                .with_hook(MemberHook::SetMemberAfter),
            )
            .with_field(FieldEntry::new("Size", primitives::INT32));
        let bag = registry.register_type(bag).unwrap();
        let binder = Binder::new(Arc::new(MemberCatalog::new(Arc::new(registry))));

        let routed = binder.set_member("extra", &object(bag), &value(4)).unwrap();
        assert!(!routed.is_error);
        let Expr::Block { body, .. } = &routed.expr else {
            panic!("expected hook block, got {:?}", routed.expr);
        };
        assert!(matches!(&body[0], Expr::Call { .. }));

        let declared = binder.set_member("Size", &object(bag), &value(4)).unwrap();
        assert!(matches!(declared.expr, Expr::Assign { .. }));
    }
}
