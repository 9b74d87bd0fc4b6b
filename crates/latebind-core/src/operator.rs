//! Operator table.
//!
//! Maps each abstract [`OperatorKind`] to the method names it dispatches to
//! and, for comparisons and truth tests, to its inverse. The table is a
//! `static` indexed by the enum discriminant and never changes.
//!
//! # Example
//!
//! ```
//! use latebind_core::OperatorKind;
//!
//! let eq = OperatorKind::Equal.info();
//! assert_eq!(eq.name, "op_Equality");
//! assert_eq!(eq.inverse, Some(OperatorKind::NotEqual));
//! assert_eq!(OperatorKind::from_name("Equals"), Some(OperatorKind::Equal));
//! ```

use std::fmt;
use std::sync::LazyLock;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use rustc_hash::FxHashMap;

use crate::{BinaryOp, UnaryOp};

/// Abstract operator kinds the binder dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OperatorKind {
    // === Arithmetic ===
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,

    // === Bitwise ===
    BitwiseAnd,
    BitwiseOr,
    ExclusiveOr,
    LeftShift,
    RightShift,

    // === Comparison ===
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // === Unary ===
    Negate,
    UnaryPlus,
    Not,
    OnesComplement,
    IsTrue,
    IsFalse,
}

/// Dispatch family of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Arithmetic,
    Bitwise,
    Shift,
    Comparison,
    Unary,
}

/// Table entry for one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub kind: OperatorKind,
    /// Primary dispatch method name.
    pub name: &'static str,
    /// Alternate method name probed after the primary one.
    pub alternate: &'static str,
    /// Operator whose negation is equivalent.
    pub inverse: Option<OperatorKind>,
    pub arity: u8,
    pub class: OperatorClass,
}

const fn entry(
    kind: OperatorKind,
    name: &'static str,
    alternate: &'static str,
    inverse: Option<OperatorKind>,
    class: OperatorClass,
) -> OperatorInfo {
    let arity = match class {
        OperatorClass::Unary => 1,
        _ => 2,
    };
    OperatorInfo {
        kind,
        name,
        alternate,
        inverse,
        arity,
        class,
    }
}

use OperatorClass as C;
use OperatorKind as K;

static OPERATORS: [OperatorInfo; 23] = [
    entry(K::Add, "op_Addition", "Add", None, C::Arithmetic),
    entry(K::Subtract, "op_Subtraction", "Subtract", None, C::Arithmetic),
    entry(K::Multiply, "op_Multiply", "Multiply", None, C::Arithmetic),
    entry(K::Divide, "op_Division", "Divide", None, C::Arithmetic),
    entry(K::Modulo, "op_Modulus", "Mod", None, C::Arithmetic),
    entry(K::Power, "op_Exponentiation", "Power", None, C::Arithmetic),
    entry(K::BitwiseAnd, "op_BitwiseAnd", "BitwiseAnd", None, C::Bitwise),
    entry(K::BitwiseOr, "op_BitwiseOr", "BitwiseOr", None, C::Bitwise),
    entry(K::ExclusiveOr, "op_ExclusiveOr", "ExclusiveOr", None, C::Bitwise),
    entry(K::LeftShift, "op_LeftShift", "LeftShift", None, C::Shift),
    entry(K::RightShift, "op_RightShift", "RightShift", None, C::Shift),
    entry(K::Equal, "op_Equality", "Equals", Some(K::NotEqual), C::Comparison),
    entry(K::NotEqual, "op_Inequality", "NotEquals", Some(K::Equal), C::Comparison),
    entry(K::LessThan, "op_LessThan", "LessThan", Some(K::GreaterThanOrEqual), C::Comparison),
    entry(
        K::LessThanOrEqual,
        "op_LessThanOrEqual",
        "LessThanOrEqual",
        Some(K::GreaterThan),
        C::Comparison,
    ),
    entry(K::GreaterThan, "op_GreaterThan", "GreaterThan", Some(K::LessThanOrEqual), C::Comparison),
    entry(
        K::GreaterThanOrEqual,
        "op_GreaterThanOrEqual",
        "GreaterThanOrEqual",
        Some(K::LessThan),
        C::Comparison,
    ),
    entry(K::Negate, "op_UnaryNegation", "Negate", None, C::Unary),
    entry(K::UnaryPlus, "op_UnaryPlus", "Plus", None, C::Unary),
    entry(K::Not, "op_LogicalNot", "Not", None, C::Unary),
    entry(K::OnesComplement, "op_OnesComplement", "OnesComplement", None, C::Unary),
    entry(K::IsTrue, "op_True", "IsTrue", Some(K::IsFalse), C::Unary),
    entry(K::IsFalse, "op_False", "IsFalse", Some(K::IsTrue), C::Unary),
];

static BY_NAME: LazyLock<FxHashMap<&'static str, OperatorKind>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();
    for info in &OPERATORS {
        map.insert(info.name, info.kind);
        map.entry(info.alternate).or_insert(info.kind);
    }
    map
});

impl OperatorKind {
    /// Every operator, in table order.
    pub const ALL: [OperatorKind; 23] = [
        K::Add,
        K::Subtract,
        K::Multiply,
        K::Divide,
        K::Modulo,
        K::Power,
        K::BitwiseAnd,
        K::BitwiseOr,
        K::ExclusiveOr,
        K::LeftShift,
        K::RightShift,
        K::Equal,
        K::NotEqual,
        K::LessThan,
        K::LessThanOrEqual,
        K::GreaterThan,
        K::GreaterThanOrEqual,
        K::Negate,
        K::UnaryPlus,
        K::Not,
        K::OnesComplement,
        K::IsTrue,
        K::IsFalse,
    ];

    /// Table entry for this operator.
    pub fn info(self) -> &'static OperatorInfo {
        &OPERATORS[u8::from(self) as usize]
    }

    /// Look up an operator by primary or alternate method name.
    pub fn from_name(name: &str) -> Option<OperatorKind> {
        BY_NAME.get(name).copied()
    }

    pub fn is_unary(self) -> bool {
        self.info().class == OperatorClass::Unary
    }

    pub fn is_comparison(self) -> bool {
        self.info().class == OperatorClass::Comparison
    }

    /// Primitive operation implementing this operator on same-typed operands.
    pub fn binary_op(self) -> Option<BinaryOp> {
        let op = match self {
            K::Add => BinaryOp::Add,
            K::Subtract => BinaryOp::Subtract,
            K::Multiply => BinaryOp::Multiply,
            K::Divide => BinaryOp::Divide,
            K::Modulo => BinaryOp::Modulo,
            K::Power => BinaryOp::Power,
            K::BitwiseAnd => BinaryOp::And,
            K::BitwiseOr => BinaryOp::Or,
            K::ExclusiveOr => BinaryOp::ExclusiveOr,
            K::LeftShift => BinaryOp::LeftShift,
            K::RightShift => BinaryOp::RightShift,
            K::Equal => BinaryOp::Equal,
            K::NotEqual => BinaryOp::NotEqual,
            K::LessThan => BinaryOp::LessThan,
            K::LessThanOrEqual => BinaryOp::LessThanOrEqual,
            K::GreaterThan => BinaryOp::GreaterThan,
            K::GreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
            _ => return None,
        };
        Some(op)
    }

    /// Primitive operation implementing this unary operator.
    ///
    /// `UnaryPlus` and `IsTrue` are identities and have no operation.
    pub fn unary_op(self) -> Option<UnaryOp> {
        match self {
            K::Negate => Some(UnaryOp::Negate),
            K::Not | K::IsFalse => Some(UnaryOp::Not),
            K::OnesComplement => Some(UnaryOp::OnesComplement),
            _ => None,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_discriminant() {
        for kind in OperatorKind::ALL {
            assert_eq!(kind.info().kind, kind);
            assert_eq!(OperatorKind::try_from(u8::from(kind)).ok(), Some(kind));
        }
    }

    #[test]
    fn inverses_are_symmetric() {
        for kind in OperatorKind::ALL {
            if let Some(inverse) = kind.info().inverse {
                assert_eq!(inverse.info().inverse, Some(kind));
            }
        }
    }

    #[test]
    fn name_lookup() {
        assert_eq!(OperatorKind::from_name("op_Addition"), Some(OperatorKind::Add));
        assert_eq!(OperatorKind::from_name("Mod"), Some(OperatorKind::Modulo));
        assert_eq!(OperatorKind::from_name("op_Nothing"), None);
    }

    #[test]
    fn arity_follows_class() {
        assert_eq!(OperatorKind::Negate.info().arity, 1);
        assert_eq!(OperatorKind::LessThan.info().arity, 2);
        assert!(OperatorKind::IsTrue.is_unary());
        assert!(OperatorKind::GreaterThan.is_comparison());
    }
}
