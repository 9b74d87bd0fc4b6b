//! Primitive fast paths.
//!
//! Operands must share one primitive type: numeric for arithmetic and
//! relational operators, integral or `bool` for bitwise operators, integral
//! for shifts. `bool`, `char` and `string` also support equality.

use latebind_core::{Expr, OperatorClass, OperatorKind, primitives};

use crate::BoundValue;

/// Same-type binary operation on primitives.
pub(super) fn binary(kind: OperatorKind, left: &BoundValue, right: &BoundValue) -> Option<Expr> {
    let ty = left.limit_type();
    if ty != right.limit_type() {
        return None;
    }
    let op = kind.binary_op()?;
    let class = kind.info().class;

    let admitted = match class {
        OperatorClass::Arithmetic => primitives::is_numeric(ty),
        OperatorClass::Bitwise => primitives::is_integral(ty) || ty == primitives::BOOL,
        OperatorClass::Shift => primitives::is_integral(ty),
        OperatorClass::Comparison => {
            primitives::is_numeric(ty)
                || (matches!(kind, OperatorKind::Equal | OperatorKind::NotEqual)
                    && [primitives::BOOL, primitives::CHAR, primitives::STRING].contains(&ty))
        }
        OperatorClass::Unary => false,
    };
    if !admitted {
        return None;
    }

    let result = if class == OperatorClass::Comparison {
        primitives::BOOL
    } else {
        ty
    };
    Some(Expr::binary(op, left.expr.clone(), right.expr.clone(), result))
}

/// Default unary forms: truth tests and `Not` on `bool`, negation and
/// unary plus on numbers, complement on integers.
pub(super) fn unary(kind: OperatorKind, operand: &BoundValue) -> Option<Expr> {
    let ty = operand.limit_type();
    let admitted = match kind {
        OperatorKind::IsTrue | OperatorKind::IsFalse | OperatorKind::Not => ty == primitives::BOOL,
        OperatorKind::Negate | OperatorKind::UnaryPlus => primitives::is_numeric(ty),
        OperatorKind::OnesComplement => primitives::is_integral(ty),
        _ => false,
    };
    if !admitted {
        return None;
    }

    let expr = operand.expr.clone();
    Some(match kind.unary_op() {
        Some(op) => Expr::Unary {
            op,
            operand: Box::new(expr),
            ty,
        },
        None => expr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_core::{BinaryOp, Literal, RuntimeValue, UnaryOp};

    fn arg(index: usize, value: RuntimeValue) -> BoundValue {
        BoundValue::argument(index, value).restricted()
    }

    #[test]
    fn relational_yields_bool() {
        let expr = binary(
            OperatorKind::LessThan,
            &arg(0, RuntimeValue::int(1)),
            &arg(1, RuntimeValue::int(2)),
        )
        .unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::LessThan, .. }));
        assert_eq!(expr.ty(), primitives::BOOL);
    }

    #[test]
    fn strings_only_compare_for_equality() {
        let a = arg(0, RuntimeValue::Str("a".into()));
        let b = arg(1, RuntimeValue::Str("b".into()));
        assert!(binary(OperatorKind::Equal, &a, &b).is_some());
        assert!(binary(OperatorKind::LessThan, &a, &b).is_none());
        assert!(binary(OperatorKind::Add, &a, &b).is_none());
    }

    #[test]
    fn bitwise_admits_bool() {
        let a = arg(0, RuntimeValue::Bool(true));
        let b = arg(1, RuntimeValue::Bool(false));
        assert!(binary(OperatorKind::BitwiseAnd, &a, &b).is_some());
        assert!(binary(OperatorKind::LeftShift, &a, &b).is_none());
    }

    #[test]
    fn is_false_negates() {
        let operand = BoundValue::new(Expr::constant(Literal::Bool(true)), Default::default());
        let expr = unary(OperatorKind::IsFalse, &operand).unwrap();
        assert!(matches!(expr, Expr::Unary { op: UnaryOp::Not, .. }));
        assert_eq!(unary(OperatorKind::IsTrue, &operand), Some(operand.expr.clone()));
    }
}
