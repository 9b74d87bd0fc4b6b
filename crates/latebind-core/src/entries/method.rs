//! Method and constructor entries.

use bitflags::bitflags;

use crate::{TypeHash, Visibility, primitives};

bitflags! {
    /// Flags describing how a method is declared.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u8 {
        /// Static method (no instance).
        const STATIC = 1 << 0;
        /// Compiler-generated accessor (property getter/setter, event add/remove).
        const SPECIAL_NAME = 1 << 1;
        /// Method still has unbound generic parameters.
        const GENERIC_DEFINITION = 1 << 2;
        /// Static method whose first parameter is the extended type.
        const EXTENSION = 1 << 3;
        /// Instance constructor.
        const CONSTRUCTOR = 1 << 4;
    }
}

/// Injector hooks a type can register to intercept member requests.
///
/// Hooks returning `bool` report success through their flag; any other
/// return type means the request is handled unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberHook {
    /// Consulted before normal member resolution on assignment.
    SetMember,
    /// Consulted when normal resolution finds no member to assign.
    SetMemberAfter,
    /// Consulted before normal member resolution on delete.
    DeleteMember,
    /// Consulted when normal resolution finds no member to read.
    GetBoundMember,
}

impl MemberHook {
    /// Conventional method name for the hook.
    pub const fn method_name(self) -> &'static str {
        match self {
            MemberHook::SetMember => "SetMember",
            MemberHook::SetMemberAfter => "SetMemberAfter",
            MemberHook::DeleteMember => "DeleteMember",
            MemberHook::GetBoundMember => "GetBoundMember",
        }
    }
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamEntry {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub data_type: TypeHash,
    /// Splat parameter (absorbs the remaining call-site arguments).
    pub is_splat: bool,
}

impl ParamEntry {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, data_type: TypeHash) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_splat: false,
        }
    }
}

/// Registry entry for a method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodEntry {
    /// Unqualified method name.
    pub name: String,
    /// Declaring type.
    pub owner: TypeHash,
    /// Identity of this overload (owner + name + parameter types).
    pub method_hash: TypeHash,
    /// Declared parameters.
    pub params: Vec<ParamEntry>,
    /// Return type (`void` for none).
    pub return_type: TypeHash,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Declaration flags.
    pub flags: MethodFlags,
    /// Injector hook this method implements, if any.
    pub hook: Option<MemberHook>,
}

impl MethodEntry {
    /// Create a public instance method. The owner is filled in when the
    /// method is attached to a type.
    pub fn new(name: impl Into<String>, params: Vec<TypeHash>, return_type: TypeHash) -> Self {
        let params = params
            .into_iter()
            .enumerate()
            .map(|(i, ty)| ParamEntry::new(format!("arg{i}"), ty))
            .collect();
        Self {
            name: name.into(),
            owner: TypeHash::EMPTY,
            method_hash: TypeHash::EMPTY,
            params,
            return_type,
            visibility: Visibility::Public,
            flags: MethodFlags::empty(),
            hook: None,
        }
    }

    /// Create a public static method.
    pub fn static_method(
        name: impl Into<String>,
        params: Vec<TypeHash>,
        return_type: TypeHash,
    ) -> Self {
        Self::new(name, params, return_type).with_flags(MethodFlags::STATIC)
    }

    /// Create a public constructor.
    pub fn constructor(params: Vec<TypeHash>) -> Self {
        Self::new(".ctor", params, primitives::VOID).with_flags(MethodFlags::CONSTRUCTOR)
    }

    /// Create a static extension method; `params[0]` is the extended type.
    pub fn extension(
        name: impl Into<String>,
        params: Vec<TypeHash>,
        return_type: TypeHash,
    ) -> Self {
        Self::new(name, params, return_type)
            .with_flags(MethodFlags::STATIC | MethodFlags::EXTENSION)
    }

    // === Builder Methods ===

    /// Set the declaring type and recompute the overload identity.
    pub fn with_owner(mut self, owner: TypeHash) -> Self {
        self.owner = owner;
        let param_types = self.param_types();
        self.method_hash = if self.is_constructor() {
            TypeHash::from_constructor(owner, &param_types)
        } else {
            TypeHash::from_method(owner, &self.name, &param_types)
        };
        self
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add declaration flags.
    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Mark the method as an injector hook.
    pub fn with_hook(mut self, hook: MemberHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Mark the last parameter as a splat parameter.
    pub fn with_splat(mut self) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.is_splat = true;
        }
        self
    }

    /// Mark the method as still carrying unbound generic parameters.
    pub fn as_open_generic(self) -> Self {
        self.with_flags(MethodFlags::GENERIC_DEFINITION)
    }

    // === Query Methods ===

    /// Parameter types in declaration order.
    pub fn param_types(&self) -> Vec<TypeHash> {
        self.params.iter().map(|p| p.data_type).collect()
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    pub fn is_extension(&self) -> bool {
        self.flags.contains(MethodFlags::EXTENSION)
    }

    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MethodFlags::CONSTRUCTOR)
    }

    pub fn is_special_name(&self) -> bool {
        self.flags.contains(MethodFlags::SPECIAL_NAME)
    }

    pub fn is_open_generic(&self) -> bool {
        self.flags.contains(MethodFlags::GENERIC_DEFINITION)
    }

    /// Whether the method returns a value.
    pub fn returns_value(&self) -> bool {
        self.return_type != primitives::VOID
    }

    /// Whether the last parameter absorbs remaining arguments.
    pub fn has_splat(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_splat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_assignment_computes_hash() {
        let owner = TypeHash::from_name("Widget");
        let m = MethodEntry::new("Resize", vec![primitives::INT32], primitives::VOID)
            .with_owner(owner);
        assert_eq!(
            m.method_hash,
            TypeHash::from_method(owner, "Resize", &[primitives::INT32])
        );
        assert!(!m.is_static());
        assert!(!m.returns_value());
    }

    #[test]
    fn constructor_hash_ignores_name() {
        let owner = TypeHash::from_name("Widget");
        let ctor = MethodEntry::constructor(vec![]).with_owner(owner);
        assert_eq!(ctor.method_hash, TypeHash::from_constructor(owner, &[]));
        assert!(ctor.is_constructor());
    }

    #[test]
    fn extension_is_static() {
        let m = MethodEntry::extension("Twice", vec![primitives::INT32], primitives::INT32);
        assert!(m.is_static());
        assert!(m.is_extension());
    }

    #[test]
    fn splat_marks_last_parameter() {
        let m = MethodEntry::new(
            "Sum",
            vec![primitives::INT32, primitives::INT32],
            primitives::INT32,
        )
        .with_splat();
        assert!(m.has_splat());
        assert!(!m.params[0].is_splat);
    }
}
