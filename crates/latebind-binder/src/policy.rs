//! Per-language binding policy.
//!
//! Every user-facing failure the binder can produce goes through one hook on
//! [`BindingPolicy`]. The defaults build a generic exception with a
//! descriptive message; a hosted language overrides the hooks it wants to
//! report idiomatically, for example by returning a sentinel value instead.

use std::sync::Arc;

use latebind_core::{ErrorKind, Expr, FieldEntry, MemberDescriptor, TypeEntry};

use crate::ErrorInfo;

/// Hooks for user-facing binding failures.
pub trait BindingPolicy: Send + Sync {
    /// `name` does not exist on `ty`.
    fn make_missing_member_error(&self, ty: &TypeEntry, name: &str) -> ErrorInfo {
        ErrorInfo::exception(
            ErrorKind::MissingMember,
            format!("'{}' has no member named '{name}'", ty.qualified_name),
        )
    }

    /// `name` cannot be read on `ty`.
    fn make_missing_member_error_for_get(&self, ty: &TypeEntry, name: &str) -> ErrorInfo {
        self.make_missing_member_error(ty, name)
    }

    /// `name` cannot be assigned on `ty` (absent, or a property without setter).
    fn make_missing_member_error_for_assign(&self, ty: &TypeEntry, name: &str) -> ErrorInfo {
        self.make_missing_member_error(ty, name)
    }

    /// `name` cannot be deleted on `ty` because it does not exist.
    fn make_missing_member_error_for_delete(&self, ty: &TypeEntry, name: &str) -> ErrorInfo {
        self.make_missing_member_error(ty, name)
    }

    /// `name` exists on `ty` but cannot be deleted.
    fn make_undeletable_member_error(&self, ty: &TypeEntry, name: &str) -> ErrorInfo {
        self.make_missing_member_error_for_delete(ty, name)
    }

    /// `name` exists on `ty` but cannot be assigned.
    fn make_read_only_member_error(&self, ty: &TypeEntry, name: &str) -> ErrorInfo {
        ErrorInfo::exception(
            ErrorKind::ReadOnlyMember,
            format!("'{}.{name}' is read-only", ty.qualified_name),
        )
    }

    /// `name` resolves to members of different kinds.
    fn make_ambiguous_match_error(
        &self,
        ty: &TypeEntry,
        name: &str,
        candidates: &[Arc<MemberDescriptor>],
    ) -> ErrorInfo {
        ErrorInfo::exception(
            ErrorKind::AmbiguousMatch,
            format!(
                "'{}.{name}' is ambiguous between {} members",
                ty.qualified_name,
                candidates.len()
            ),
        )
    }

    /// `member` still has unbound generic parameters.
    fn make_generic_access_error(&self, member: &MemberDescriptor) -> ErrorInfo {
        ErrorInfo::exception(
            ErrorKind::GenericAccess,
            format!(
                "'{}' has unbound generic parameters and cannot be used",
                member.name()
            ),
        )
    }

    /// Static `member` used through an instance, or instance `member`
    /// used without one.
    fn make_static_access_error(
        &self,
        member: &MemberDescriptor,
        through_instance: bool,
    ) -> ErrorInfo {
        let message = if through_instance {
            format!(
                "static member '{}' cannot be assigned through an instance",
                member.name()
            )
        } else {
            format!("instance member '{}' requires an instance", member.name())
        };
        ErrorInfo::exception(ErrorKind::StaticAccess, message)
    }

    /// Static `member` of a base type assigned through the derived type
    /// `accessed_through`. `assignment` is the direct assignment; the
    /// default performs it.
    fn make_static_assignment_from_derived_type_error(
        &self,
        _accessed_through: &TypeEntry,
        _member: &MemberDescriptor,
        assignment: Expr,
    ) -> ErrorInfo {
        ErrorInfo::from_success(assignment)
    }

    /// Instance field of a value type assigned through a boxed copy.
    fn make_value_type_field_error(&self, field: &FieldEntry, _value: &Expr) -> ErrorInfo {
        ErrorInfo::exception(
            ErrorKind::ValueTypeField,
            format!(
                "cannot assign field '{}' of a value type through a boxed copy",
                field.name
            ),
        )
    }
}

/// Policy using every default hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl BindingPolicy for DefaultPolicy {}
