//! Bound values and guards.
//!
//! A [`BoundValue`] is the unit the binder consumes and produces: a
//! computation, the [`GuardSet`] under which it is valid, and optionally the
//! runtime value it was observed to have. A call-site cache may reuse a
//! bound value for any input that satisfies its guards.

use latebind_core::{BinaryOp, Expr, RuntimeValue, TypeHash, primitives};

/// A condition on runtime argument shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    /// `expr` has exactly runtime type `ty`.
    ExactType { expr: Expr, ty: TypeHash },
    /// `expr` is the type value standing for `ty`.
    TypeIdentity { expr: Expr, ty: TypeHash },
    /// `expr` is null.
    IsNull(Expr),
    /// An arbitrary boolean test.
    Test(Expr),
}

impl Guard {
    /// The guard as a boolean test expression.
    pub fn to_test(&self) -> Expr {
        match self {
            Guard::ExactType { expr, ty } => Expr::type_is(expr.clone(), *ty),
            Guard::TypeIdentity { expr, ty } => Expr::binary(
                BinaryOp::Equal,
                expr.clone(),
                Expr::TypeValue(*ty),
                primitives::BOOL,
            ),
            Guard::IsNull(expr) => {
                Expr::binary(BinaryOp::Equal, expr.clone(), Expr::null(), primitives::BOOL)
            }
            Guard::Test(test) => test.clone(),
        }
    }
}

/// Ordered, deduplicated set of guards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuardSet {
    guards: Vec<Guard>,
}

impl GuardSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guard unless an equal one is already present.
    pub fn add(&mut self, guard: Guard) {
        if !self.guards.contains(&guard) {
            self.guards.push(guard);
        }
    }

    /// Add every guard of `other`, keeping order.
    pub fn merge(&mut self, other: &GuardSet) {
        for guard in &other.guards {
            self.add(guard.clone());
        }
    }

    pub fn contains(&self, guard: &Guard) -> bool {
        self.guards.contains(guard)
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Guard> {
        self.guards.iter()
    }

    /// Conjunction of all guards; `None` when the set is empty.
    pub fn to_test(&self) -> Option<Expr> {
        self.guards
            .iter()
            .map(Guard::to_test)
            .reduce(Expr::and_also)
    }
}

impl FromIterator<Guard> for GuardSet {
    fn from_iter<I: IntoIterator<Item = Guard>>(iter: I) -> Self {
        let mut set = GuardSet::new();
        for guard in iter {
            set.add(guard);
        }
        set
    }
}

/// A computation with the guards under which it is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    pub expr: Expr,
    pub guards: GuardSet,
    /// Runtime value observed at bind time, if known.
    pub value: Option<RuntimeValue>,
    /// The computation unconditionally reports an error.
    pub is_error: bool,
}

impl BoundValue {
    pub fn new(expr: Expr, guards: GuardSet) -> Self {
        Self {
            expr,
            guards,
            value: None,
            is_error: false,
        }
    }

    /// Call-site argument `index`, observed with `value`.
    pub fn argument(index: usize, value: RuntimeValue) -> Self {
        Self {
            expr: Expr::argument(index, primitives::OBJECT),
            guards: GuardSet::new(),
            value: Some(value),
            is_error: false,
        }
    }

    pub fn with_value(mut self, value: RuntimeValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Most specific type known for the value.
    pub fn limit_type(&self) -> TypeHash {
        self.value
            .as_ref()
            .map_or_else(|| self.expr.ty(), RuntimeValue::runtime_type)
    }

    pub fn is_null(&self) -> bool {
        self.value.as_ref().is_some_and(RuntimeValue::is_null)
    }

    /// Guard that pins this value to its observed runtime type.
    pub fn restriction(&self) -> Option<Guard> {
        match &self.value {
            None => None,
            Some(RuntimeValue::Null) => Some(Guard::IsNull(self.expr.clone())),
            Some(value) => Some(Guard::ExactType {
                expr: self.expr.clone(),
                ty: value.runtime_type(),
            }),
        }
    }

    /// This value pinned to its runtime type: the expression is converted to
    /// the limit type and the restriction joins the guards.
    pub fn restricted(&self) -> BoundValue {
        let mut guards = self.guards.clone();
        if let Some(guard) = self.restriction() {
            guards.add(guard);
        }
        let expr = if self.is_null() {
            Expr::null()
        } else {
            self.expr.clone().convert(self.limit_type())
        };
        BoundValue {
            expr,
            guards,
            value: self.value.clone(),
            is_error: self.is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_set_deduplicates_in_order() {
        let a = Guard::IsNull(Expr::argument(0, primitives::OBJECT));
        let b = Guard::ExactType {
            expr: Expr::argument(1, primitives::OBJECT),
            ty: primitives::INT32,
        };
        let set: GuardSet = [a.clone(), b.clone(), a.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![&a, &b]);
    }

    #[test]
    fn empty_guard_set_has_no_test() {
        assert!(GuardSet::new().to_test().is_none());
    }

    #[test]
    fn guard_set_test_is_conjunction() {
        let set: GuardSet = [
            Guard::Test(Expr::bool(true)),
            Guard::Test(Expr::bool(false)),
        ]
        .into_iter()
        .collect();
        let test = set.to_test().unwrap();
        assert!(matches!(
            test,
            Expr::Binary {
                op: BinaryOp::AndAlso,
                ..
            }
        ));
    }

    #[test]
    fn restricted_argument_is_converted_and_guarded() {
        let arg = BoundValue::argument(0, RuntimeValue::int(5));
        let restricted = arg.restricted();
        assert_eq!(restricted.expr.ty(), primitives::INT32);
        assert!(restricted.guards.contains(&Guard::ExactType {
            expr: Expr::argument(0, primitives::OBJECT),
            ty: primitives::INT32,
        }));
    }

    #[test]
    fn restricted_null_uses_null_guard() {
        let arg = BoundValue::argument(2, RuntimeValue::Null);
        let restricted = arg.restricted();
        assert_eq!(restricted.expr, Expr::null());
        assert!(restricted
            .guards
            .contains(&Guard::IsNull(Expr::argument(2, primitives::OBJECT))));
    }

    #[test]
    fn unknown_value_has_no_restriction() {
        let bound = BoundValue::new(Expr::int(1), GuardSet::new());
        assert!(bound.restriction().is_none());
        assert_eq!(bound.limit_type(), primitives::INT32);
    }
}
