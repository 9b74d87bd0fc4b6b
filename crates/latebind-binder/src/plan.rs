//! Plan builder.
//!
//! A [`PlanBuilder`] collects guarded branches one at a time and folds them
//! into a single nested conditional when finished:
//!
//! ```text
//! add_condition(t1, b1)
//! add_condition(t2, b2)
//! finish(b3)            =>  t1 ? b1 : (t2 ? b2 : b3)
//! ```
//!
//! Branch types are widened pairwise while folding: equal types stay, a
//! subclass pair narrows to the ancestor, anything else becomes `object`.
//! A branch that only throws takes the type of the other side.
//!
//! Temporaries declared on the builder are scoped around the whole folded
//! conditional, so every branch can use them.

use latebind_core::{BindError, Expr, Temp, TypeHash};
use latebind_registry::TypeRegistry;

use crate::{BoundValue, Guard, GuardSet};

/// A finished plan. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub expr: Expr,
    pub temps: Vec<Temp>,
    /// The plan unconditionally reports an error.
    pub is_error: bool,
}

/// Incrementally builds a [`Plan`].
#[derive(Debug)]
pub struct PlanBuilder<'r> {
    registry: &'r TypeRegistry,
    branches: Vec<(Expr, Expr)>,
    temps: Vec<Temp>,
    guards: GuardSet,
    finished: Option<Plan>,
}

impl<'r> PlanBuilder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            branches: Vec::new(),
            temps: Vec::new(),
            guards: GuardSet::new(),
            finished: None,
        }
    }

    fn ensure_open(&self) -> Result<(), BindError> {
        if self.finished.is_some() {
            Err(BindError::PlanAlreadyFinished)
        } else {
            Ok(())
        }
    }

    /// Append a branch taken when `test` holds. The first branch is outermost.
    pub fn add_condition(&mut self, test: Expr, body: Expr) -> Result<(), BindError> {
        self.ensure_open()?;
        self.branches.push((test, body));
        Ok(())
    }

    /// Add a restriction the whole plan depends on.
    pub fn add_guard(&mut self, guard: Guard) {
        self.guards.add(guard);
    }

    pub fn add_guards(&mut self, guards: &GuardSet) {
        self.guards.merge(guards);
    }

    pub fn guards(&self) -> &GuardSet {
        &self.guards
    }

    /// Declare a temporary visible to every branch.
    pub fn declare_temporary(&mut self, ty: TypeHash) -> Result<Temp, BindError> {
        self.ensure_open()?;
        let temp = Temp {
            id: self.temps.len() as u32,
            ty,
        };
        self.temps.push(temp);
        Ok(temp)
    }

    /// Fold all branches around `terminal`.
    pub fn finish(&mut self, terminal: Expr) -> Result<(), BindError> {
        self.finish_with(terminal, false)
    }

    /// Like [`finish`](Self::finish), but a plan with no conditions is
    /// marked as an error.
    pub fn finish_as_error(&mut self, terminal: Expr) -> Result<(), BindError> {
        let is_error = self.branches.is_empty();
        self.finish_with(terminal, is_error)
    }

    fn finish_with(&mut self, terminal: Expr, is_error: bool) -> Result<(), BindError> {
        self.ensure_open()?;

        let mut ty = terminal.ty();
        let mut undecided = terminal.is_throw();
        let mut result = terminal;

        for (test, body) in std::mem::take(&mut self.branches).into_iter().rev() {
            if !body.is_throw() {
                ty = if undecided {
                    body.ty()
                } else {
                    self.registry.common_type(body.ty(), ty)
                };
                undecided = false;
            }
            result = Expr::condition(test, retype(body, ty), retype(result, ty), ty);
        }

        let expr = if self.temps.is_empty() {
            result
        } else {
            Expr::block(self.temps.clone(), vec![result])
        };

        self.finished = Some(Plan {
            expr,
            temps: self.temps.clone(),
            is_error,
        });
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// The finished plan.
    pub fn plan(&self) -> Result<&Plan, BindError> {
        self.finished.as_ref().ok_or(BindError::PlanNotFinished)
    }

    /// Convert the finished plan into a bound value carrying the guards.
    pub fn into_bound(self) -> Result<BoundValue, BindError> {
        let plan = self.finished.ok_or(BindError::PlanNotFinished)?;
        Ok(BoundValue {
            expr: plan.expr,
            guards: self.guards,
            value: None,
            is_error: plan.is_error,
        })
    }
}

fn retype(expr: Expr, ty: TypeHash) -> Expr {
    match expr {
        Expr::Throw { error, .. } => Expr::Throw { error, ty },
        other => other.convert(ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_core::{ErrorKind, Literal, TypeEntry, primitives};

    fn registry() -> (TypeRegistry, TypeHash, TypeHash) {
        let mut registry = TypeRegistry::with_primitives();
        let animal = registry.register_type(TypeEntry::class("Animal")).unwrap();
        let dog = registry
            .register_type(TypeEntry::class("Dog").with_base(animal))
            .unwrap();
        (registry, animal, dog)
    }

    #[test]
    fn finish_without_conditions_is_terminal() {
        let (registry, ..) = registry();
        let mut plan = PlanBuilder::new(&registry);
        plan.finish(Expr::int(7)).unwrap();
        assert_eq!(plan.plan().unwrap().expr, Expr::int(7));
        assert!(!plan.plan().unwrap().is_error);
    }

    #[test]
    fn reading_before_finish_is_a_fault() {
        let (registry, ..) = registry();
        let plan = PlanBuilder::new(&registry);
        assert_eq!(plan.plan().unwrap_err(), BindError::PlanNotFinished);
        assert_eq!(plan.into_bound().unwrap_err(), BindError::PlanNotFinished);
    }

    #[test]
    fn modifying_after_finish_is_a_fault() {
        let (registry, ..) = registry();
        let mut plan = PlanBuilder::new(&registry);
        plan.finish(Expr::null()).unwrap();
        assert_eq!(
            plan.add_condition(Expr::bool(true), Expr::null()),
            Err(BindError::PlanAlreadyFinished)
        );
        assert_eq!(plan.finish(Expr::null()), Err(BindError::PlanAlreadyFinished));
    }

    #[test]
    fn first_condition_is_outermost() {
        let (registry, ..) = registry();
        let mut plan = PlanBuilder::new(&registry);
        plan.add_condition(Expr::bool(true), Expr::int(1)).unwrap();
        plan.add_condition(Expr::bool(false), Expr::int(2)).unwrap();
        plan.finish(Expr::int(3)).unwrap();

        let Expr::Condition {
            test,
            if_true,
            if_false,
            ..
        } = &plan.plan().unwrap().expr
        else {
            panic!("expected conditional");
        };
        assert_eq!(**test, Expr::bool(true));
        assert_eq!(**if_true, Expr::int(1));
        assert!(matches!(**if_false, Expr::Condition { .. }));
    }

    #[test]
    fn widening_to_ancestor() {
        let (registry, animal, dog) = registry();
        let mut plan = PlanBuilder::new(&registry);
        plan.add_condition(Expr::bool(true), Expr::argument(0, dog))
            .unwrap();
        plan.finish(Expr::argument(1, animal)).unwrap();
        assert_eq!(plan.plan().unwrap().expr.ty(), animal);
    }

    #[test]
    fn widening_unrelated_to_object() {
        let (registry, _, dog) = registry();
        let mut plan = PlanBuilder::new(&registry);
        plan.add_condition(Expr::bool(true), Expr::argument(0, dog))
            .unwrap();
        plan.finish(Expr::constant(Literal::Str("x".into()))).unwrap();
        assert_eq!(plan.plan().unwrap().expr.ty(), primitives::OBJECT);
    }

    #[test]
    fn throwing_branch_takes_other_type() {
        let (registry, ..) = registry();
        let mut plan = PlanBuilder::new(&registry);
        plan.add_condition(Expr::bool(true), Expr::int(1)).unwrap();
        plan.finish(Expr::throw(
            Expr::new_error(ErrorKind::MissingMember, "gone"),
            primitives::OBJECT,
        ))
        .unwrap();
        assert_eq!(plan.plan().unwrap().expr.ty(), primitives::INT32);
    }

    #[test]
    fn finish_as_error_without_conditions() {
        let (registry, ..) = registry();
        let error = Expr::throw(
            Expr::new_error(ErrorKind::MissingMember, "gone"),
            primitives::OBJECT,
        );

        let mut unguarded = PlanBuilder::new(&registry);
        unguarded.finish_as_error(error.clone()).unwrap();
        assert!(unguarded.plan().unwrap().is_error);

        let mut guarded = PlanBuilder::new(&registry);
        guarded.add_condition(Expr::bool(true), Expr::int(1)).unwrap();
        guarded.finish_as_error(error).unwrap();
        assert!(!guarded.plan().unwrap().is_error);
    }

    #[test]
    fn temporaries_scope_whole_plan() {
        let (registry, ..) = registry();
        let mut plan = PlanBuilder::new(&registry);
        let temp = plan.declare_temporary(primitives::INT32).unwrap();
        plan.add_condition(Expr::bool(true), Expr::Temp(temp)).unwrap();
        plan.finish(Expr::int(0)).unwrap();

        let finished = plan.plan().unwrap();
        assert_eq!(finished.temps, vec![temp]);
        let Expr::Block { temps, body } = &finished.expr else {
            panic!("expected block");
        };
        assert_eq!(temps, &vec![temp]);
        assert!(matches!(body[0], Expr::Condition { .. }));
    }

    #[test]
    fn into_bound_carries_guards() {
        let (registry, ..) = registry();
        let mut plan = PlanBuilder::new(&registry);
        plan.add_guard(Guard::Test(Expr::bool(true)));
        plan.finish(Expr::int(1)).unwrap();
        let bound = plan.into_bound().unwrap();
        assert_eq!(bound.guards.len(), 1);
        assert_eq!(bound.expr, Expr::int(1));
    }
}
