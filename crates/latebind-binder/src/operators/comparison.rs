//! Comparison dispatch.
//!
//! Resolution order, first hit wins:
//!
//! 1. Static operator method (`op_Equality`, ...) on operand 0
//! 2. Static three-way `Compare(a, b)` on operand 0, tested against zero
//! 3. Inverse operator method on operand 0, negated
//! 4. Equality against `null`
//! 5. Primitive fast path
//!
//! Steps 1 and 3 each probe operand 0 twice.

use tracing::debug;

use latebind_core::{BindError, Expr, OperatorInfo, OperatorKind, primitives};

use super::primitive;
use crate::{Binder, BoundValue};

const COMPARE_METHOD: &str = "Compare";

impl Binder {
    pub(super) fn comparison(
        &self,
        info: &OperatorInfo,
        args: &[BoundValue],
        operands: &[BoundValue],
    ) -> Result<Option<Expr>, BindError> {
        let [left, right] = operands else {
            return Ok(None);
        };
        let ty = left.limit_type();

        for _ in 0..2 {
            if let Some(call) = self.operator_call(ty, info.name, None, args)? {
                debug!(op = %info.name, step = "operator method", "binder: comparison resolved");
                return Ok(Some(call.convert(primitives::BOOL)));
            }
        }

        if let Some(call) = self.operator_call(ty, COMPARE_METHOD, None, args)?
            && let Some(op) = info.kind.binary_op()
        {
            debug!(op = %info.name, step = "compare", "binder: comparison resolved");
            let zero = Expr::int(0).convert(call.ty());
            return Ok(Some(Expr::binary(op, call, zero, primitives::BOOL)));
        }

        if let Some(inverse) = info.inverse {
            let inverse = inverse.info();
            for _ in 0..2 {
                if let Some(call) = self.operator_call(ty, inverse.name, None, args)? {
                    debug!(
                        op = %info.name,
                        inverse = %inverse.name,
                        step = "inverse",
                        "binder: comparison resolved"
                    );
                    return Ok(Some(call.convert(primitives::BOOL).not()));
                }
            }
        }

        if let Some(expr) = self.null_comparison(info.kind, left, right) {
            debug!(op = %info.name, step = "null", "binder: comparison resolved");
            return Ok(Some(expr));
        }

        let fast = primitive::binary(info.kind, left, right);
        if fast.is_some() {
            debug!(op = %info.name, step = "primitive", "binder: comparison resolved");
        }
        Ok(fast)
    }

    /// `==`/`!=` with one `null` operand.
    ///
    /// Reference types compare with `null`, nullables test `HasValue`, and
    /// other value types fold to a constant.
    fn null_comparison(
        &self,
        kind: OperatorKind,
        left: &BoundValue,
        right: &BoundValue,
    ) -> Option<Expr> {
        let equal = match kind {
            OperatorKind::Equal => true,
            OperatorKind::NotEqual => false,
            _ => return None,
        };
        let other = match (left.is_null(), right.is_null()) {
            (true, true) => return Some(Expr::bool(equal)),
            (true, false) => right,
            (false, true) => left,
            (false, false) => return None,
        };

        let registry = self.registry();
        let ty = other.limit_type();
        if registry.is_nullable(ty) {
            let getter = registry
                .get(ty)?
                .find_property("HasValue")?
                .getter
                .and_then(|hash| registry.get_method(hash))?;
            let has_value = self.make_call(getter, Some(other.expr.clone()), Vec::new());
            return Some(if equal { has_value.not() } else { has_value });
        }
        if registry.is_value_type(ty) {
            return Some(Expr::bool(!equal));
        }
        let op = kind.binary_op()?;
        Some(Expr::binary(
            op,
            other.expr.clone().convert(primitives::OBJECT),
            Expr::null(),
            primitives::BOOL,
        ))
    }
}
