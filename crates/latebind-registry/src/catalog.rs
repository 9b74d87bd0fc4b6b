//! MemberCatalog - canonical, interned member descriptors.
//!
//! The catalog answers "what does `name` mean on type `T`" with descriptors
//! that are stable across requests: the same member reached through the same
//! extending type always yields the same `Arc`.
//!
//! # Lookup
//!
//! [`MemberCatalog::lookup`] tries, stopping at the first step that finds
//! anything:
//!
//! 1. Members declared on the type and inherited from its bases. Fields,
//!    properties and events hide by name; methods hide by signature. Private
//!    members are never inherited, and inherited statics are skipped.
//! 2. Nested types named ``name`N`` merged into one [`TypeGroup`].
//! 3. Step 1 again, now including statics of base types.
//! 4. Extension members, walking the type, its bases and then its interfaces.
//!    The first ancestor with any match wins.
//!
//! # Locking
//!
//! One coarse [`Mutex`] guards the descriptor map and the extension caches.
//! It is released while an [`ExtensionSource`] runs and re-acquired to
//! commit its answer.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use latebind_core::{
    BindError, Expr, MemberDescriptor, MethodEntry, PropertyEntry, TypeEntry, TypeGroup,
    TypeHash, Visibility, primitives,
};

use crate::{ExtensionMember, ExtensionSource, TypeRegistry};

/// What the caller intends to do with the looked-up member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRequestKind {
    Get,
    Set,
    Delete,
    Invoke,
    Operation,
}

/// Options that affect which members a lookup may return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Make non-public members selectable.
    pub private_binding: bool,
}

impl LookupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_private_binding(mut self, enabled: bool) -> Self {
        self.private_binding = enabled;
        self
    }

    /// Whether a member with `visibility` may be returned.
    pub fn admits(&self, visibility: Visibility) -> bool {
        self.private_binding || visibility.is_public()
    }
}

/// Interning key: one descriptor per (member, extending type).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DescriptorKey {
    Member {
        hash: TypeHash,
        extending: Option<TypeHash>,
    },
    Named {
        declaring: TypeHash,
        name: String,
        extending: Option<TypeHash>,
    },
    Accessors {
        getter: Option<TypeHash>,
        setter: Option<TypeHash>,
        deleter: Option<TypeHash>,
        extending: TypeHash,
    },
}

type Candidate = (DescriptorKey, MemberDescriptor);

#[derive(Default)]
struct CatalogState {
    descriptors: FxHashMap<DescriptorKey, Arc<MemberDescriptor>>,
    /// Extensions registered directly, by extended type.
    registered: FxHashMap<TypeHash, Vec<ExtensionMember>>,
    /// Answers from the extension source, by extended type.
    discovered: FxHashMap<TypeHash, Arc<[ExtensionMember]>>,
}

/// Canonical member catalog, owned by one runtime and shared through `Arc`.
pub struct MemberCatalog {
    registry: Arc<TypeRegistry>,
    source: Option<Arc<dyn ExtensionSource>>,
    state: Mutex<CatalogState>,
}

impl fmt::Debug for MemberCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberCatalog")
            .field("descriptors", &self.descriptor_count())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl MemberCatalog {
    /// Create a catalog over `registry`.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            source: None,
            state: Mutex::new(CatalogState::default()),
        }
    }

    /// Discover extension members through `source`.
    pub fn with_extension_source(mut self, source: Arc<dyn ExtensionSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Number of interned descriptors.
    pub fn descriptor_count(&self) -> usize {
        self.state.lock().descriptors.len()
    }

    /// Attach an extension member to `extended`.
    pub fn register_extension(&self, extended: TypeHash, member: ExtensionMember) {
        self.state
            .lock()
            .registered
            .entry(extended)
            .or_default()
            .push(member);
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Resolve `name` on `ty`.
    ///
    /// Returns every matching descriptor; more than one kind in the result
    /// is an ambiguity for the caller to report.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn lookup(
        &self,
        kind: MemberRequestKind,
        ty: TypeHash,
        name: &str,
        options: LookupOptions,
    ) -> Result<Vec<Arc<MemberDescriptor>>, BindError> {
        let entry = self.registry.get(ty).ok_or(BindError::TypeNotFound(ty))?;

        let mut found = self.declared_members(entry, name, options, false);
        if found.is_empty() {
            trace!(name = %name, ty = %entry.qualified_name, "catalog: trying type group");
            found = self.type_group(entry, name, options);
        }
        if found.is_empty() {
            trace!(name = %name, ty = %entry.qualified_name, "catalog: trying flattened statics");
            found = self.declared_members(entry, name, options, true);
        }
        if !found.is_empty() {
            return Ok(self.intern_all(found));
        }

        trace!(name = %name, ty = %entry.qualified_name, ?kind, "catalog: trying extensions");
        Ok(self.extension_members(kind, entry, name, options))
    }

    /// Bind an instance member to `instance`; statics come back unchanged.
    pub fn bind_to_instance(
        &self,
        descriptor: &Arc<MemberDescriptor>,
        instance: Expr,
    ) -> Arc<MemberDescriptor> {
        descriptor.bind_to_instance(instance)
    }

    /// Canonical descriptor for a method reached outside of `lookup`.
    pub fn method_descriptor(
        &self,
        method: &MethodEntry,
        extending: Option<TypeHash>,
    ) -> Arc<MemberDescriptor> {
        let key = DescriptorKey::Member {
            hash: method.method_hash,
            extending,
        };
        let desc = if method.is_constructor() {
            MemberDescriptor::Constructor(method.clone())
        } else {
            MemberDescriptor::Method {
                method: method.clone(),
                extending,
            }
        };
        self.intern(key, desc)
    }

    fn intern(&self, key: DescriptorKey, desc: MemberDescriptor) -> Arc<MemberDescriptor> {
        Arc::clone(
            self.state
                .lock()
                .descriptors
                .entry(key)
                .or_insert_with(|| Arc::new(desc)),
        )
    }

    fn intern_all(&self, found: Vec<Candidate>) -> Vec<Arc<MemberDescriptor>> {
        let mut state = self.state.lock();
        found
            .into_iter()
            .map(|(key, desc)| {
                Arc::clone(state.descriptors.entry(key).or_insert_with(|| Arc::new(desc)))
            })
            .collect()
    }

    // ==========================================================================
    // Declared and inherited members
    // ==========================================================================

    fn declared_members(
        &self,
        entry: &TypeEntry,
        name: &str,
        options: LookupOptions,
        include_inherited_statics: bool,
    ) -> Vec<Candidate> {
        let mut found = Vec::new();
        let mut field_seen = false;
        let mut property_seen = false;
        let mut event_seen = false;
        let mut signatures: Vec<Vec<TypeHash>> = Vec::new();

        let chain = std::iter::once(entry).chain(self.registry.base_chain(entry.type_hash));
        for (depth, ty) in chain.enumerate() {
            let inherited = depth > 0;
            let admits = |visibility: Visibility, is_static: bool| {
                options.admits(visibility)
                    && (!inherited
                        || (visibility.is_inheritable()
                            && (!is_static || include_inherited_statics)))
            };

            if !field_seen
                && let Some(field) = ty.find_field(name)
                && admits(field.visibility, field.is_static())
            {
                field_seen = true;
                found.push((
                    DescriptorKey::Member {
                        hash: field.field_hash,
                        extending: None,
                    },
                    MemberDescriptor::Field(field.clone()),
                ));
            }

            if !property_seen
                && let Some(prop) = ty.find_property(name)
                && admits(prop.visibility, prop.is_static)
            {
                property_seen = true;
                found.push((
                    DescriptorKey::Member {
                        hash: prop.property_hash,
                        extending: None,
                    },
                    MemberDescriptor::Property {
                        entry: prop.clone(),
                        extending: None,
                    },
                ));
            }

            if !event_seen
                && let Some(event) = ty.find_event(name)
                && admits(event.visibility, event.is_static)
            {
                event_seen = true;
                found.push((
                    DescriptorKey::Member {
                        hash: event.event_hash,
                        extending: None,
                    },
                    MemberDescriptor::Event(event.clone()),
                ));
            }

            for method in ty.find_methods(name) {
                let params = method.param_types();
                if !admits(method.visibility, method.is_static()) || signatures.contains(&params) {
                    continue;
                }
                signatures.push(params);
                found.push((
                    DescriptorKey::Member {
                        hash: method.method_hash,
                        extending: None,
                    },
                    MemberDescriptor::Method {
                        method: method.clone(),
                        extending: None,
                    },
                ));
            }

            if inherited {
                continue;
            }

            for ctor in ty.constructors.iter().filter(|c| c.name == name) {
                if options.admits(ctor.visibility) {
                    found.push((
                        DescriptorKey::Member {
                            hash: ctor.method_hash,
                            extending: None,
                        },
                        MemberDescriptor::Constructor(ctor.clone()),
                    ));
                }
            }

            for &nested in &ty.nested_types {
                if let Some(nested_entry) = self.registry.get(nested)
                    && nested_entry.name == name
                    && options.admits(nested_entry.visibility)
                {
                    found.push((
                        DescriptorKey::Member {
                            hash: nested,
                            extending: None,
                        },
                        MemberDescriptor::NestedType {
                            name: nested_entry.name.clone(),
                            declaring_type: ty.type_hash,
                            ty: nested,
                        },
                    ));
                }
            }
        }

        found
    }

    fn type_group(&self, entry: &TypeEntry, name: &str, options: LookupOptions) -> Vec<Candidate> {
        let mut group = TypeGroup::new(name, entry.type_hash);
        for &nested in &entry.nested_types {
            if let Some(nested_entry) = self.registry.get(nested)
                && nested_entry.simple_name() == name
                && options.admits(nested_entry.visibility)
            {
                group = group.with_type(nested_entry.generic_arity, nested);
            }
        }

        if group.types.iter().all(|(arity, _)| *arity == 0) {
            return Vec::new();
        }
        vec![(
            DescriptorKey::Named {
                declaring: entry.type_hash,
                name: name.to_string(),
                extending: None,
            },
            MemberDescriptor::TypeGroup(group),
        )]
    }

    // ==========================================================================
    // Extension members
    // ==========================================================================

    fn extension_members(
        &self,
        kind: MemberRequestKind,
        entry: &TypeEntry,
        name: &str,
        options: LookupOptions,
    ) -> Vec<Arc<MemberDescriptor>> {
        let mut ancestors = vec![entry.type_hash];
        ancestors.extend(
            self.registry
                .base_chain(entry.type_hash)
                .iter()
                .map(|t| t.type_hash),
        );
        ancestors.extend(self.registry.all_interfaces(entry.type_hash));

        for ancestor in ancestors {
            let found: Vec<Candidate> = self
                .extensions_for(ancestor)
                .iter()
                .filter(|member| member.name() == name)
                .filter_map(|member| self.extension_candidate(kind, ancestor, member, options))
                .collect();

            if !found.is_empty() {
                trace!(
                    name = %name,
                    extending = %self.registry.type_name(ancestor),
                    count = found.len(),
                    "catalog: extension members found"
                );
                return self.intern_all(found);
            }
        }
        Vec::new()
    }

    /// Registered and discovered extensions for exactly `ty`.
    fn extensions_for(&self, ty: TypeHash) -> Vec<ExtensionMember> {
        let (mut members, cached) = {
            let state = self.state.lock();
            (
                state.registered.get(&ty).cloned().unwrap_or_default(),
                state.discovered.get(&ty).cloned(),
            )
        };

        let discovered = match (cached, &self.source, self.registry.get(ty)) {
            (Some(cached), _, _) => cached,
            (None, Some(source), Some(entry)) => {
                trace!(ty = %entry.qualified_name, "catalog: discovering extensions");
                let answer: Arc<[ExtensionMember]> = source.extension_members(entry).into();
                self.state
                    .lock()
                    .discovered
                    .insert(ty, Arc::clone(&answer));
                answer
            }
            _ => return members,
        };

        members.extend(discovered.iter().cloned());
        members
    }

    fn extension_candidate(
        &self,
        kind: MemberRequestKind,
        extending: TypeHash,
        member: &ExtensionMember,
        options: LookupOptions,
    ) -> Option<Candidate> {
        match member {
            ExtensionMember::Method { method, .. } => {
                let method = self.registry.get_method(*method)?;
                if !options.admits(method.visibility) {
                    return None;
                }
                Some((
                    DescriptorKey::Member {
                        hash: method.method_hash,
                        extending: Some(extending),
                    },
                    MemberDescriptor::Method {
                        method: method.clone(),
                        extending: Some(extending),
                    },
                ))
            }
            ExtensionMember::Property {
                name,
                getter,
                setter,
                deleter,
            } => {
                let required = match kind {
                    MemberRequestKind::Set => setter,
                    MemberRequestKind::Delete => deleter,
                    MemberRequestKind::Get
                    | MemberRequestKind::Invoke
                    | MemberRequestKind::Operation => getter,
                };
                let required = self.registry.get_method((*required)?)?;
                if !options.admits(required.visibility) {
                    return None;
                }
                // Same descriptor for every request kind, so type and owner
                // come from the getter first.
                let getter_entry = getter.and_then(|g| self.registry.get_method(g));
                let setter_entry = setter.and_then(|s| self.registry.get_method(s));
                let data_type = getter_entry
                    .map(|g| g.return_type)
                    .or_else(|| setter_entry.and_then(|s| s.params.last()).map(|p| p.data_type))
                    .unwrap_or(primitives::OBJECT);
                let owner = getter_entry.or(setter_entry).unwrap_or(required).owner;
                let deleter_entry = deleter.and_then(|d| self.registry.get_method(d));
                let accessors = [getter_entry, setter_entry, deleter_entry];
                let visibility = if accessors.iter().flatten().any(|m| m.visibility.is_public()) {
                    Visibility::Public
                } else {
                    accessors
                        .iter()
                        .flatten()
                        .map(|m| m.visibility)
                        .next()
                        .unwrap_or(required.visibility)
                };
                Some((
                    DescriptorKey::Accessors {
                        getter: *getter,
                        setter: *setter,
                        deleter: *deleter,
                        extending,
                    },
                    MemberDescriptor::Property {
                        entry: PropertyEntry {
                            name: name.clone(),
                            owner,
                            property_hash: TypeHash::from_property(extending, name),
                            data_type,
                            visibility,
                            is_static: false,
                            getter: *getter,
                            setter: *setter,
                            deleter: *deleter,
                            index_params: Vec::new(),
                        },
                        extending: Some(extending),
                    },
                ))
            }
            ExtensionMember::Custom { name, value } => Some((
                DescriptorKey::Named {
                    declaring: extending,
                    name: name.clone(),
                    extending: Some(extending),
                },
                MemberDescriptor::Custom {
                    name: name.clone(),
                    declaring_type: extending,
                    value: value.clone(),
                },
            )),
        }
    }
}
