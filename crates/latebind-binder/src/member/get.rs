use std::sync::Arc;

use tracing::debug;

use latebind_core::{
    BindError, Expr, MemberDescriptor, MemberHook, MemberKind, primitives,
};
use latebind_registry::MemberRequestKind;

use super::{Accessor, common_kind};
use crate::binder::Target;
use crate::{Binder, BoundValue, ErrorInfo};

impl Binder {
    /// Bind a read of member `name` on `target`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_member(&self, name: &str, target: &BoundValue) -> Result<BoundValue, BindError> {
        let target = self.resolve_target(target)?;
        let plan = self.plan_for(&target);
        let members = self.lookup(MemberRequestKind::Get, target.ty.type_hash, name)?;

        debug!(
            name = %name,
            ty = %target.ty.qualified_name,
            count = members.len(),
            kind = ?common_kind(&members),
            "binder: get member"
        );

        let info = match common_kind(&members) {
            None if members.is_empty() => self.get_missing(&target, name),
            None => self
                .policy()
                .make_ambiguous_match_error(target.ty, name, &members),
            Some(MemberKind::Field) => self.get_field(&target, &members[0]),
            Some(MemberKind::Property) => self.get_property(&target, name, &members[0]),
            Some(MemberKind::Method | MemberKind::Constructor | MemberKind::Event) => {
                ErrorInfo::from_success(self.member_handle(&target, &members))
            }
            Some(MemberKind::NestedType) => match members[0].as_ref() {
                MemberDescriptor::NestedType { ty, .. } => {
                    ErrorInfo::from_success(Expr::TypeValue(*ty))
                }
                _ => return Err(BindError::internal("nested type descriptor expected")),
            },
            Some(MemberKind::TypeGroup) => {
                ErrorInfo::from_success(Expr::descriptor(Arc::clone(&members[0])))
            }
            Some(MemberKind::Custom) => match members[0].as_ref() {
                MemberDescriptor::Custom { value, .. } => ErrorInfo::from_success(value.clone()),
                _ => return Err(BindError::internal("custom descriptor expected")),
            },
        };

        self.complete(plan, info, primitives::OBJECT)
    }

    /// No member matched: try the after-hook, then report.
    fn get_missing(&self, target: &Target<'_>, name: &str) -> ErrorInfo {
        if let Some(hook) = self.find_hook(target.ty, MemberHook::GetBoundMember)
            && let Some(call) = self.call_hook(hook, target.instance.as_ref(), name, None)
        {
            debug!(name = %name, hook = %hook.name, "binder: get handled by hook");
            return ErrorInfo::from_success(call);
        }
        self.policy()
            .make_missing_member_error_for_get(target.ty, name)
    }

    fn get_field(&self, target: &Target<'_>, descriptor: &Arc<MemberDescriptor>) -> ErrorInfo {
        let Some(field) = descriptor.as_field() else {
            return self
                .policy()
                .make_missing_member_error_for_get(target.ty, descriptor.name());
        };

        if let Some(value) = &field.constant {
            return ErrorInfo::from_success(Expr::typed_constant(value.clone(), field.data_type));
        }

        let instance = if field.is_static() {
            None
        } else {
            match &target.instance {
                Some(instance) => Some(Box::new(instance.clone().convert(field.owner))),
                None => return ErrorInfo::from_success(Expr::descriptor(Arc::clone(descriptor))),
            }
        };

        let expr = if field.is_public() && self.registry().is_visible(field.owner) {
            Expr::Field {
                instance,
                field: field.field_hash,
                ty: field.data_type,
            }
        } else {
            Expr::ReflectiveGetField {
                instance,
                field: field.field_hash,
            }
            .convert(field.data_type)
        };
        ErrorInfo::from_success(expr)
    }

    fn get_property(
        &self,
        target: &Target<'_>,
        name: &str,
        descriptor: &Arc<MemberDescriptor>,
    ) -> ErrorInfo {
        let Some(property) = descriptor.as_property() else {
            return self.policy().make_missing_member_error_for_get(target.ty, name);
        };
        let Some(getter) = self.find_accessor(descriptor, property, Accessor::Getter) else {
            return self.policy().make_missing_member_error_for_get(target.ty, name);
        };
        if getter.is_open_generic() {
            return self.policy().make_generic_access_error(descriptor);
        }

        let call = match (descriptor.is_static(), descriptor.is_extension(), &target.instance) {
            (true, _, _) => self.make_call(&getter, None, Vec::new()),
            (false, true, Some(instance)) => {
                let receiver = getter
                    .params
                    .first()
                    .map_or(primitives::OBJECT, |p| p.data_type);
                self.make_call(&getter, None, vec![instance.clone().convert(receiver)])
            }
            (false, false, Some(instance)) => {
                self.make_call(&getter, Some(instance.clone().convert(getter.owner)), Vec::new())
            }
            (false, _, None) => Expr::descriptor(Arc::clone(descriptor)),
        };
        ErrorInfo::from_success(call)
    }

    /// Methods, constructors and events read as descriptor handles, bound to
    /// the instance when there is one.
    fn member_handle(&self, target: &Target<'_>, members: &[Arc<MemberDescriptor>]) -> Expr {
        let bound: Vec<_> = members
            .iter()
            .map(|m| match &target.instance {
                Some(instance) => self.catalog().bind_to_instance(m, instance.clone()),
                None => Arc::clone(m),
            })
            .collect();
        match <[_; 1]>::try_from(bound) {
            Ok([single]) => Expr::descriptor(single),
            Err(group) => Expr::MemberGroup(group),
        }
    }
}
