//! Operator dispatch.
//!
//! ## Arithmetic, bitwise and unary operators
//!
//! 1. Static operator method (`op_Addition`, ...) on operand 0
//! 2. Alternate name (`Add`, ...) on operand 0, instance or static
//! 3. Primitive fast path for operands sharing one primitive type
//! 4. Default unary forms
//! 5. Unsupported-operator exception
//!
//! ## Comparisons
//!
//! See `comparison.rs`. Every result carries exact-type guards on all operands.

mod comparison;
mod primitive;

use tracing::{debug, trace};

use latebind_core::{
    BindError, ErrorKind, Expr, MemberDescriptor, OperatorInfo, OperatorKind, TypeHash, primitives,
};
use latebind_registry::MemberRequestKind;

use crate::{Binder, BoundValue, ErrorInfo, OverloadRequest, PlanBuilder};

impl Binder {
    /// Bind operator `op` applied to `args`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn do_operation(
        &self,
        op: OperatorKind,
        args: &[BoundValue],
    ) -> Result<BoundValue, BindError> {
        let info = op.info();
        if args.len() != usize::from(info.arity) {
            return Err(BindError::invalid_argument(
                "args",
                format!("{} takes {} operands, got {}", info.name, info.arity, args.len()),
            ));
        }

        let operands: Vec<BoundValue> = args.iter().map(BoundValue::restricted).collect();
        let mut plan = PlanBuilder::new(self.registry());
        for operand in &operands {
            plan.add_guards(&operand.guards);
        }

        let result = if op.is_comparison() {
            self.comparison(info, args, &operands)?
        } else {
            self.arithmetic(info, args, &operands)?
        };

        let ty = if op.is_comparison() {
            primitives::BOOL
        } else {
            primitives::OBJECT
        };
        let info = match result {
            Some(expr) => ErrorInfo::from_success(expr),
            None => {
                debug!(op = %info.name, "binder: operator unsupported");
                self.unsupported(info, &operands)
            }
        };
        self.complete(plan, info, ty)
    }

    fn arithmetic(
        &self,
        info: &OperatorInfo,
        args: &[BoundValue],
        operands: &[BoundValue],
    ) -> Result<Option<Expr>, BindError> {
        let ty = operands[0].limit_type();

        if let Some(call) = self.operator_call(ty, info.name, None, args)? {
            debug!(op = %info.name, step = "operator method", "binder: operator resolved");
            return Ok(Some(call));
        }

        let alternate = match self.operator_call(ty, info.alternate, Some(&args[0]), &args[1..])? {
            Some(call) => Some(call),
            None => self.operator_call(ty, info.alternate, None, args)?,
        };
        if let Some(call) = alternate {
            debug!(op = %info.name, step = "alternate name", "binder: operator resolved");
            return Ok(Some(call));
        }

        if let [left, right] = operands
            && let Some(expr) = primitive::binary(info.kind, left, right)
        {
            debug!(op = %info.name, step = "primitive", "binder: operator resolved");
            return Ok(Some(expr));
        }

        if let [operand] = operands
            && let Some(expr) = primitive::unary(info.kind, operand)
        {
            debug!(op = %info.name, step = "default unary", "binder: operator resolved");
            return Ok(Some(expr));
        }

        Ok(None)
    }

    /// Resolve `name` on `ty` as an operator implementation.
    ///
    /// `None` when there is no such method or no overload accepts `args`.
    pub(crate) fn operator_call(
        &self,
        ty: TypeHash,
        name: &str,
        instance: Option<&BoundValue>,
        args: &[BoundValue],
    ) -> Result<Option<Expr>, BindError> {
        if !self.registry().contains(ty) {
            return Ok(None);
        }
        let candidates: Vec<_> = self
            .lookup(MemberRequestKind::Operation, ty, name)?
            .into_iter()
            .filter(|d| matches!(d.unbound(), MemberDescriptor::Method { .. }))
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }

        let request = OverloadRequest {
            name,
            candidates: &candidates,
            instance,
            args,
            min_level: self.config().min_narrowing,
            max_level: self.config().max_narrowing,
        };
        match self.resolver().resolve(self.registry(), &request) {
            Ok(target) if !target.method.is_open_generic() => Ok(Some(self.make_call(
                &target.method,
                target.instance,
                target.args,
            ))),
            Ok(_) => Ok(None),
            Err(failure) => {
                trace!(name = %name, %failure, "binder: operator candidate rejected");
                Ok(None)
            }
        }
    }

    fn unsupported(&self, info: &OperatorInfo, operands: &[BoundValue]) -> ErrorInfo {
        let types: Vec<String> = operands
            .iter()
            .map(|o| self.registry().type_name(o.limit_type()))
            .collect();
        ErrorInfo::exception(
            ErrorKind::UnsupportedOperator,
            format!(
                "operator {} is not supported for {}",
                info.name,
                types.join(" and ")
            ),
        )
    }
}
