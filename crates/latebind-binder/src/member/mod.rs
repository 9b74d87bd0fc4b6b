//! Member get/set/delete.
//!
//! All three start the same way: resolve the target, consult the
//! injector hooks where the request kind has one, look the name up in the
//! catalog, then dispatch on the kind of member found.

mod delete;
mod get;
mod set;

use std::sync::Arc;

use latebind_core::{MemberDescriptor, MemberKind, MethodEntry, PropertyEntry, TypeHash};

use crate::Binder;

/// Which accessor of a property a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Accessor {
    Getter,
    Setter,
    Deleter,
}

impl Accessor {
    fn select(self, entry: &PropertyEntry) -> Option<TypeHash> {
        match self {
            Accessor::Getter => entry.getter,
            Accessor::Setter => entry.setter,
            Accessor::Deleter => entry.deleter,
        }
    }
}

/// The single kind shared by all `members`, or `None` if they disagree.
pub(crate) fn common_kind(members: &[Arc<MemberDescriptor>]) -> Option<MemberKind> {
    let kind = members.first()?.kind();
    members.iter().all(|m| m.kind() == kind).then_some(kind)
}

impl Binder {
    /// Most-derived accessor of `property` the lookup options admit.
    ///
    /// A derived redeclaration may omit an accessor its base provides, so
    /// the search walks from the declaring type towards the root.
    pub(crate) fn find_accessor(
        &self,
        descriptor: &MemberDescriptor,
        property: &PropertyEntry,
        accessor: Accessor,
    ) -> Option<MethodEntry> {
        let registry = self.registry();
        let options = self.config().lookup_options();

        if descriptor.is_extension() {
            return accessor
                .select(property)
                .and_then(|hash| registry.get_method(hash))
                .filter(|method| options.admits(method.visibility))
                .cloned();
        }

        let owner = registry.get(property.owner)?;
        std::iter::once(owner)
            .chain(registry.base_chain(property.owner))
            .filter_map(|ty| ty.find_property(&property.name))
            .filter_map(|p| accessor.select(p))
            .filter_map(|hash| registry.get_method(hash))
            .find(|method| options.admits(method.visibility))
            .cloned()
    }
}
