//! Overload resolution contract.
//!
//! The binder hands an overload set to an [`OverloadResolver`] and gets back
//! a [`BindingTarget`]: the chosen method, its arguments converted to the
//! parameter types, and the guards that pin each argument to the runtime
//! type the choice was made for.
//!
//! ## Algorithm ([`DefaultOverloadResolver`])
//!
//! For each narrowing tier from the configured minimum to maximum:
//!
//! 1. Filter candidates by argument count (splat parameters absorb the rest)
//! 2. Check every argument converts to its parameter at this tier
//! 3. Rank viable candidates by total conversion cost
//! 4. A unique cheapest candidate wins; a tie is ambiguous
//!
//! Extension methods take the instance as their first argument.

use std::sync::Arc;

use thiserror::Error;

use latebind_core::{ErrorKind, Expr, MemberDescriptor, MethodEntry, primitives};
use latebind_registry::{ConversionRank, TypeRegistry};

use crate::{BoundValue, ErrorInfo, GuardSet};

/// How much narrowing a conversion may do during overload matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NarrowingLevel {
    /// Identity and implicit conversions only.
    None,
    /// Also numeric narrowing.
    One,
    /// Also reference downcasts.
    All,
}

impl NarrowingLevel {
    const TIERS: [NarrowingLevel; 3] = [
        NarrowingLevel::None,
        NarrowingLevel::One,
        NarrowingLevel::All,
    ];

    /// Tiers from `min` to `max`, inclusive.
    pub fn range(min: NarrowingLevel, max: NarrowingLevel) -> impl Iterator<Item = NarrowingLevel> {
        Self::TIERS
            .into_iter()
            .filter(move |level| *level >= min && *level <= max)
    }

    /// Cost of a conversion at this tier, or `None` if the tier forbids it.
    fn cost(
        self,
        registry: &TypeRegistry,
        from: latebind_core::TypeHash,
        to: latebind_core::TypeHash,
    ) -> Option<u32> {
        match registry.conversion(from, to)? {
            ConversionRank::Identity => Some(0),
            ConversionRank::Implicit => Some(1),
            ConversionRank::Narrowing
                if primitives::is_numeric(from) && primitives::is_numeric(to) =>
            {
                (self >= NarrowingLevel::One).then_some(2)
            }
            ConversionRank::Narrowing => (self >= NarrowingLevel::All).then_some(3),
        }
    }
}

/// One overload resolution request.
#[derive(Debug, Clone, Copy)]
pub struct OverloadRequest<'a> {
    /// Name used in failure messages.
    pub name: &'a str,
    pub candidates: &'a [Arc<MemberDescriptor>],
    pub instance: Option<&'a BoundValue>,
    pub args: &'a [BoundValue],
    pub min_level: NarrowingLevel,
    pub max_level: NarrowingLevel,
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingTarget {
    pub descriptor: Arc<MemberDescriptor>,
    pub method: MethodEntry,
    /// Receiver for instance methods; `None` for static and extension methods.
    pub instance: Option<Expr>,
    /// Arguments converted to parameter types, instance first for extensions.
    pub args: Vec<Expr>,
    pub guards: GuardSet,
    pub level: NarrowingLevel,
}

/// Why resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverloadFailure {
    #[error("no callable member named '{name}'")]
    NoCandidates { name: String },

    #[error("no overload of '{name}' takes {got} arguments")]
    ArityMismatch { name: String, got: usize },

    #[error("no overload of '{name}' accepts the given argument types")]
    NoApplicable { name: String },

    #[error("call to '{name}' is ambiguous between {count} overloads")]
    Ambiguous { name: String, count: usize },
}

impl OverloadFailure {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            OverloadFailure::Ambiguous { .. } => ErrorKind::AmbiguousMatch,
            _ => ErrorKind::NoMatchingOverload,
        }
    }

    /// The failure as an exception result.
    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::exception(self.error_kind(), self.to_string())
    }
}

/// Chooses one method from an overload set.
pub trait OverloadResolver: Send + Sync {
    fn resolve(
        &self,
        registry: &TypeRegistry,
        request: &OverloadRequest<'_>,
    ) -> Result<BindingTarget, OverloadFailure>;
}

/// Arity and conversion-cost matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOverloadResolver;

struct Viable<'a> {
    descriptor: &'a Arc<MemberDescriptor>,
    method: &'a MethodEntry,
    args: Vec<Expr>,
    uses_instance: bool,
    cost: u32,
}

impl OverloadResolver for DefaultOverloadResolver {
    fn resolve(
        &self,
        registry: &TypeRegistry,
        request: &OverloadRequest<'_>,
    ) -> Result<BindingTarget, OverloadFailure> {
        let methods: Vec<_> = request
            .candidates
            .iter()
            .filter_map(|d| d.as_method().map(|m| (d, m)))
            .collect();
        if methods.is_empty() {
            return Err(OverloadFailure::NoCandidates {
                name: request.name.to_string(),
            });
        }

        let instance = request.instance.map(BoundValue::restricted);
        let args: Vec<BoundValue> = request.args.iter().map(BoundValue::restricted).collect();
        let mut arity_matched = false;

        for level in NarrowingLevel::range(request.min_level, request.max_level) {
            let mut viable = Vec::new();

            for &(descriptor, method) in &methods {
                let is_extension = descriptor.is_extension();
                let needs_instance = !method.is_static() && !method.is_constructor();
                let effective: Vec<&BoundValue> = if is_extension {
                    match &instance {
                        Some(receiver) => std::iter::once(receiver).chain(args.iter()).collect(),
                        None => continue,
                    }
                } else if needs_instance && instance.is_none() {
                    continue;
                } else {
                    args.iter().collect()
                };

                if !arity_fits(method, effective.len()) {
                    continue;
                }
                arity_matched = true;

                if let Some((converted, cost)) = match_args(registry, method, &effective, level) {
                    viable.push(Viable {
                        descriptor,
                        method,
                        args: converted,
                        uses_instance: needs_instance && !is_extension,
                        cost,
                    });
                }
            }

            if viable.is_empty() {
                continue;
            }

            viable.sort_by_key(|v| v.cost);
            let tied = viable.iter().filter(|v| v.cost == viable[0].cost).count();
            if tied > 1 {
                return Err(OverloadFailure::Ambiguous {
                    name: request.name.to_string(),
                    count: tied,
                });
            }

            let best = viable.swap_remove(0);
            let mut guards = GuardSet::new();
            if let Some(receiver) = &instance
                && (best.uses_instance || best.descriptor.is_extension())
            {
                guards.merge(&receiver.guards);
            }
            for arg in &args {
                guards.merge(&arg.guards);
            }

            return Ok(BindingTarget {
                descriptor: Arc::clone(best.descriptor),
                method: best.method.clone(),
                instance: if best.uses_instance {
                    instance.map(|receiver| receiver.expr)
                } else {
                    None
                },
                args: best.args,
                guards,
                level,
            });
        }

        if arity_matched {
            Err(OverloadFailure::NoApplicable {
                name: request.name.to_string(),
            })
        } else {
            Err(OverloadFailure::ArityMismatch {
                name: request.name.to_string(),
                got: request.args.len(),
            })
        }
    }
}

fn arity_fits(method: &MethodEntry, count: usize) -> bool {
    if method.has_splat() {
        count + 1 >= method.arity()
    } else {
        count == method.arity()
    }
}

fn match_args(
    registry: &TypeRegistry,
    method: &MethodEntry,
    args: &[&BoundValue],
    level: NarrowingLevel,
) -> Option<(Vec<Expr>, u32)> {
    let fixed = if method.has_splat() {
        method.arity() - 1
    } else {
        method.arity()
    };

    let mut converted = Vec::with_capacity(method.arity());
    let mut cost = 0;
    for (arg, param) in args.iter().zip(&method.params[..fixed]) {
        cost += level.cost(registry, arg.limit_type(), param.data_type)?;
        converted.push(arg.expr.clone().convert(param.data_type));
    }

    if let Some(splat) = method.params.get(fixed).filter(|p| p.is_splat) {
        let rest = &args[fixed..];
        let direct = match rest {
            [only] => level
                .cost(registry, only.limit_type(), splat.data_type)
                .map(|c| (only.expr.clone().convert(splat.data_type), c)),
            _ => None,
        };
        match direct {
            Some((expr, c)) => {
                converted.push(expr);
                cost += c;
            }
            None => {
                let element = registry
                    .get(splat.data_type)
                    .and_then(|t| t.element_type)
                    .unwrap_or(primitives::OBJECT);
                let mut items = Vec::with_capacity(rest.len());
                for arg in rest {
                    cost += level.cost(registry, arg.limit_type(), element)?;
                    items.push(arg.expr.clone().convert(element));
                }
                cost += 1;
                converted.push(Expr::NewArray {
                    element,
                    items,
                    ty: splat.data_type,
                });
            }
        }
    }

    Some((converted, cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_core::{RuntimeValue, TypeEntry, TypeHash};
    use latebind_registry::{LookupOptions, MemberCatalog, MemberRequestKind};

    struct Fixture {
        catalog: MemberCatalog,
        calc: TypeHash,
    }

    fn fixture() -> Fixture {
        let mut registry = TypeRegistry::with_primitives();
        let int_array = registry
            .register_type(TypeEntry::array_of(
                registry.get(primitives::INT32).unwrap(),
            ))
            .unwrap();
        let calc = TypeEntry::class("Calc")
            .with_method(MethodEntry::static_method(
                "Twice",
                vec![primitives::INT32],
                primitives::INT32,
            ))
            .with_method(MethodEntry::static_method(
                "Twice",
                vec![primitives::DOUBLE],
                primitives::DOUBLE,
            ))
            .with_method(MethodEntry::static_method(
                "Wide",
                vec![primitives::INT64],
                primitives::INT64,
            ))
            .with_method(MethodEntry::static_method(
                "Wide",
                vec![primitives::DOUBLE],
                primitives::DOUBLE,
            ))
            .with_method(MethodEntry::static_method(
                "Trunc",
                vec![primitives::INT32],
                primitives::INT32,
            ))
            .with_method(
                MethodEntry::static_method("Sum", vec![int_array], primitives::INT32).with_splat(),
            )
            .with_method(MethodEntry::new("Reset", vec![], primitives::VOID));
        let calc = registry.register_type(calc).unwrap();
        Fixture {
            catalog: MemberCatalog::new(Arc::new(registry)),
            calc,
        }
    }

    fn resolve(
        f: &Fixture,
        name: &str,
        instance: Option<&BoundValue>,
        args: &[BoundValue],
        max_level: NarrowingLevel,
    ) -> Result<BindingTarget, OverloadFailure> {
        let candidates = f
            .catalog
            .lookup(
                MemberRequestKind::Invoke,
                f.calc,
                name,
                LookupOptions::new(),
            )
            .unwrap();
        let request = OverloadRequest {
            name,
            candidates: &candidates,
            instance,
            args,
            min_level: NarrowingLevel::None,
            max_level,
        };
        DefaultOverloadResolver.resolve(f.catalog.registry(), &request)
    }

    fn int_arg(index: usize, value: i64) -> BoundValue {
        BoundValue::argument(index, RuntimeValue::int(value))
    }

    #[test]
    fn exact_match_wins() {
        let f = fixture();
        let target = resolve(&f, "Twice", None, &[int_arg(0, 2)], NarrowingLevel::All).unwrap();
        assert_eq!(target.method.param_types(), vec![primitives::INT32]);
        assert_eq!(target.level, NarrowingLevel::None);
        assert_eq!(target.guards.len(), 1);
    }

    #[test]
    fn equal_cost_is_ambiguous() {
        let f = fixture();
        let err = resolve(&f, "Wide", None, &[int_arg(0, 2)], NarrowingLevel::All).unwrap_err();
        assert_eq!(err, OverloadFailure::Ambiguous { name: "Wide".into(), count: 2 });
        assert_eq!(err.error_kind(), ErrorKind::AmbiguousMatch);
    }

    #[test]
    fn narrowing_needs_higher_tier() {
        let f = fixture();
        let arg = BoundValue::argument(0, RuntimeValue::double(2.5));
        let err = resolve(&f, "Trunc", None, std::slice::from_ref(&arg), NarrowingLevel::None)
            .unwrap_err();
        assert!(matches!(err, OverloadFailure::NoApplicable { .. }));

        let target = resolve(&f, "Trunc", None, &[arg], NarrowingLevel::All).unwrap();
        assert_eq!(target.level, NarrowingLevel::One);
    }

    #[test]
    fn arity_mismatch() {
        let f = fixture();
        let err = resolve(&f, "Twice", None, &[int_arg(0, 1), int_arg(1, 2)], NarrowingLevel::All)
            .unwrap_err();
        assert!(matches!(err, OverloadFailure::ArityMismatch { got: 2, .. }));
    }

    #[test]
    fn splat_packs_extra_arguments() {
        let f = fixture();
        let args = [int_arg(0, 1), int_arg(1, 2), int_arg(2, 3)];
        let target = resolve(&f, "Sum", None, &args, NarrowingLevel::All).unwrap();
        assert_eq!(target.args.len(), 1);
        let Expr::NewArray { items, element, .. } = &target.args[0] else {
            panic!("expected packed array");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(*element, primitives::INT32);
        assert_eq!(target.guards.len(), 3);
    }

    #[test]
    fn instance_method_requires_instance() {
        let f = fixture();
        let err = resolve(&f, "Reset", None, &[], NarrowingLevel::All).unwrap_err();
        assert!(matches!(err, OverloadFailure::ArityMismatch { .. }));

        let receiver = BoundValue::argument(0, RuntimeValue::object(f.calc, 1));
        let target = resolve(&f, "Reset", Some(&receiver), &[], NarrowingLevel::All).unwrap();
        assert!(target.instance.is_some());
        assert_eq!(target.guards.len(), 1);
    }

    #[test]
    fn no_candidates() {
        let request = OverloadRequest {
            name: "nothing",
            candidates: &[],
            instance: None,
            args: &[],
            min_level: NarrowingLevel::None,
            max_level: NarrowingLevel::All,
        };
        let registry = TypeRegistry::with_primitives();
        assert!(matches!(
            DefaultOverloadResolver.resolve(&registry, &request),
            Err(OverloadFailure::NoCandidates { .. })
        ));
    }

    #[test]
    fn tier_range() {
        let tiers: Vec<_> =
            NarrowingLevel::range(NarrowingLevel::One, NarrowingLevel::All).collect();
        assert_eq!(tiers, vec![NarrowingLevel::One, NarrowingLevel::All]);
    }
}
