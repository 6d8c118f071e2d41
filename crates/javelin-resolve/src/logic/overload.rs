//! Overload resolution shared by methods and constructors.

use std::collections::HashSet;

use tracing::{trace, warn};

use crate::declarations::{ConstructorDeclaration, Invocable, MethodDeclaration};
use crate::error::{ResolveError, Result};
use crate::model::{param_type_for_argument, SymbolReference};
use crate::solver::TypeSolver;
use crate::types::{ReferenceType, Substitution, TypeUsage};

use super::assignability::is_assignable_by;
use super::hierarchy::all_ancestors;

/// The winning candidate, with parameter types as seen from the receiver.
#[derive(Debug, Clone)]
pub(crate) struct Resolved<T> {
    pub(crate) declaration: T,
    /// The receiver, or the ancestor view that declares `declaration`.
    pub(crate) declaring: ReferenceType,
    pub(crate) param_types: Vec<TypeUsage>,
}

pub(crate) type ResolvedMethod = Resolved<MethodDeclaration>;
pub(crate) type ResolvedConstructor = Resolved<ConstructorDeclaration>;

struct Candidate<T> {
    resolved: Resolved<T>,
    variadic: bool,
    /// Applicable only by spreading trailing arguments into the varargs array.
    by_expansion: bool,
}

fn arity_fits(count: usize, variadic: bool, args: usize) -> bool {
    if variadic {
        args + 1 >= count
    } else {
        args == count
    }
}

/// The receiver substitution minus names the invocable declares itself.
pub(crate) fn receiver_substitution<T: Invocable>(
    invocable: &T,
    declaring: &ReferenceType,
) -> Result<Substitution> {
    let mut substitution = declaring.substitution()?;
    for name in invocable.type_parameter_names()? {
        substitution.remove(&name);
    }
    Ok(substitution)
}

/// Methods named `name` on `receiver` and its ancestors that accept `args`;
/// `Unsolved` when none does.
pub(crate) fn solve_method(
    receiver: &ReferenceType,
    name: &str,
    args: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<SymbolReference<ResolvedMethod>> {
    let mut candidates = Vec::new();
    let views = std::iter::once(receiver.clone()).chain(all_ancestors(receiver, solver)?);
    for view in views {
        for method in view.declaration().declared_methods()? {
            let fits = arity_fits(method.param_count(), method.is_variadic(), args.len());
            if method.name() == name && fits {
                candidates.push((method, view.clone()));
            }
        }
    }
    trace!(name, candidates = candidates.len(), "method candidates");
    select(name, candidates, args, solver)
}

/// Constructors declared by `ty` itself that accept `args`.
pub(crate) fn solve_constructor(
    ty: &ReferenceType,
    args: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<SymbolReference<ResolvedConstructor>> {
    let name = ty.declaration().name();
    let candidates = ty
        .declaration()
        .declared_constructors()?
        .into_iter()
        .filter(|ctor| arity_fits(ctor.param_count(), ctor.is_variadic(), args.len()))
        .map(|ctor| (ctor, ty.clone()))
        .collect();
    select(&name, candidates, args, solver)
}

fn select<T: Invocable>(
    name: &str,
    candidates: Vec<(T, ReferenceType)>,
    args: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<SymbolReference<Resolved<T>>> {
    let mut malformed = None;
    let mut signatures = HashSet::new();
    let mut applicable = Vec::new();

    for (declaration, declaring) in candidates {
        let params = match declaration.param_types(solver) {
            Ok(params) => params,
            Err(err @ ResolveError::MalformedGenericSignature { .. }) => {
                warn!(name, error = %err, "skipping candidate with a malformed signature");
                malformed.get_or_insert(err);
                continue;
            }
            Err(err) => return Err(err),
        };
        let substitution = receiver_substitution(&declaration, &declaring)?;
        let param_types: Vec<TypeUsage> = params
            .iter()
            .map(|param| param.replace_params(&substitution))
            .collect();

        let signature = describe_params(&param_types);
        if !signatures.insert(signature) {
            trace!(name, declaring = %declaring.describe(), "overridden candidate");
            continue;
        }

        let variadic = declaration.is_variadic();
        let Some(by_expansion) = applicability(&param_types, variadic, args, solver)? else {
            continue;
        };
        applicable.push(Candidate {
            resolved: Resolved {
                declaration,
                declaring,
                param_types,
            },
            variadic,
            by_expansion,
        });
    }

    if applicable.is_empty() {
        return match malformed {
            Some(err) => Err(err),
            None => Ok(SymbolReference::Unsolved),
        };
    }
    most_specific(name, applicable, solver).map(SymbolReference::Solved)
}

fn describe_params(params: &[TypeUsage]) -> String {
    params
        .iter()
        .map(TypeUsage::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `None` when not applicable, otherwise whether varargs expansion was needed.
fn applicability(
    params: &[TypeUsage],
    variadic: bool,
    args: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<Option<bool>> {
    if params.len() == args.len() && all_assignable(params, args, solver)? {
        return Ok(Some(false));
    }
    if !variadic {
        return Ok(None);
    }
    let Some((last, fixed)) = params.split_last() else {
        return Ok(None);
    };
    if args.len() < fixed.len() || !all_assignable(fixed, &args[..fixed.len()], solver)? {
        return Ok(None);
    }
    let component = match last {
        TypeUsage::Array(component) => component.as_ref(),
        other => other,
    };
    for arg in &args[fixed.len()..] {
        if !is_assignable_by(component, arg, solver)? {
            return Ok(None);
        }
    }
    Ok(Some(true))
}

fn all_assignable(
    params: &[TypeUsage],
    args: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<bool> {
    for (param, arg) in params.iter().zip(args) {
        if !is_assignable_by(param, arg, solver)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether every parameter of `a` fits the matching parameter of `b`.
fn at_least_as_specific<T>(
    a: &Candidate<T>,
    b: &Candidate<T>,
    solver: &dyn TypeSolver,
) -> Result<bool> {
    let a_params = &a.resolved.param_types;
    let b_params = &b.resolved.param_types;
    let count = a_params.len().max(b_params.len());
    for position in 0..count {
        let (Some(pa), Some(pb)) = (
            param_type_for_argument(a_params, a.variadic && a.by_expansion, position),
            param_type_for_argument(b_params, b.variadic && b.by_expansion, position),
        ) else {
            return Ok(false);
        };
        if !is_assignable_by(&pb, &pa, solver)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn most_specific<T: Invocable>(
    name: &str,
    mut applicable: Vec<Candidate<T>>,
    solver: &dyn TypeSolver,
) -> Result<Resolved<T>> {
    if applicable.iter().any(|candidate| !candidate.by_expansion) {
        applicable.retain(|candidate| !candidate.by_expansion);
    }
    if applicable.len() == 1 {
        return Ok(applicable.remove(0).resolved);
    }

    let mut maximal = Vec::new();
    for (idx, candidate) in applicable.iter().enumerate() {
        let mut dominates = true;
        for (other_idx, other) in applicable.iter().enumerate() {
            if idx != other_idx && !at_least_as_specific(candidate, other, solver)? {
                dominates = false;
                break;
            }
        }
        if dominates {
            maximal.push(idx);
        }
    }

    if let [winner] = maximal[..] {
        return Ok(applicable.swap_remove(winner).resolved);
    }
    let candidates = applicable
        .iter()
        .map(|candidate| {
            format!(
                "{}.{}({})",
                candidate.resolved.declaring.qualified_name(),
                candidate.resolved.declaration.name(),
                describe_params(&candidate.resolved.param_types)
            )
        })
        .collect();
    Err(ResolveError::AmbiguousOverload {
        name: name.to_string(),
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{ReflectionTypeSolver, RuntimeClass, RuntimeRegistry};
    use crate::solver::CombinedTypeSolver;
    use crate::types::PrimitiveType;
    use pretty_assertions::assert_eq;

    fn solver_with(class: RuntimeClass) -> CombinedTypeSolver {
        CombinedTypeSolver::new()
            .with(ReflectionTypeSolver::new(RuntimeRegistry::from_classes([class])))
            .with(ReflectionTypeSolver::jdk())
    }

    fn string(solver: &dyn TypeSolver) -> TypeUsage {
        TypeUsage::reference(solver.solve_type("java.lang.String").unwrap())
    }

    #[test]
    fn most_specific_wins_regardless_of_order() {
        for members in [
            ["public void m(Object o)", "public void m(String s)"],
            ["public void m(String s)", "public void m(Object o)"],
        ] {
            let class = RuntimeClass::parse("public class demo.A", &members).unwrap();
            let solver = solver_with(class);
            let receiver = ReferenceType::raw(solver.solve_type("demo.A").unwrap());
            let found = solve_method(&receiver, "m", &[string(&solver)], &solver)
                .unwrap()
                .solved()
                .unwrap();
            assert_eq!(found.param_types, vec![string(&solver)]);
        }
    }

    #[test]
    fn unrelated_candidates_are_ambiguous() {
        let class = RuntimeClass::parse(
            "public class demo.B",
            &[
                "public void m(CharSequence s)",
                "public void m(Comparable<String> c)",
            ],
        )
        .unwrap();
        let solver = solver_with(class);
        let receiver = ReferenceType::raw(solver.solve_type("demo.B").unwrap());
        let err = solve_method(&receiver, "m", &[string(&solver)], &solver).unwrap_err();
        let ResolveError::AmbiguousOverload { name, candidates } = err else {
            panic!("expected ambiguity, got {err:?}");
        };
        assert_eq!(name, "m");
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn fixed_arity_beats_varargs() {
        let class = RuntimeClass::parse(
            "public class demo.C",
            &["public void m(int... values)", "public void m(int value)"],
        )
        .unwrap();
        let solver = solver_with(class);
        let receiver = ReferenceType::raw(solver.solve_type("demo.C").unwrap());
        let int: TypeUsage = PrimitiveType::Int.into();

        let single =
            solve_method(&receiver, "m", &[int.clone()], &solver).unwrap().solved().unwrap();
        assert!(!single.declaration.is_variadic());

        let many = solve_method(&receiver, "m", &[int.clone(), int.clone()], &solver)
            .unwrap()
            .solved()
            .unwrap();
        assert!(many.declaration.is_variadic());

        let none = solve_method(&receiver, "m", &[], &solver).unwrap().solved().unwrap();
        assert!(none.declaration.is_variadic());

        let direct = solve_method(&receiver, "m", &[TypeUsage::array(int)], &solver)
            .unwrap()
            .solved()
            .unwrap();
        assert!(direct.declaration.is_variadic());
    }

    #[test]
    fn inherited_methods_see_receiver_arguments() {
        let solver = ReflectionTypeSolver::jdk();
        let integer = TypeUsage::reference(solver.solve_type("java.lang.Integer").unwrap());
        let list = ReferenceType::new(
            solver.solve_type("java.util.ArrayList").unwrap(),
            vec![integer.clone()],
        )
        .unwrap();
        let add = solve_method(&list, "add", &[integer.clone()], &solver)
            .unwrap()
            .solved()
            .unwrap();
        assert_eq!(add.param_types, vec![integer]);
        assert_eq!(add.declaring.qualified_name(), "java.util.ArrayList");
        assert!(!solve_method(&list, "missing", &[], &solver).unwrap().is_solved());
    }
}
