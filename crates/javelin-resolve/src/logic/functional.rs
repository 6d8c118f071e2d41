//! Functional interfaces: the single abstract method a lambda implements.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::model::MethodUsage;
use crate::solver::TypeSolver;
use crate::types::{ReferenceType, TypeUsage, Wildcard, OBJECT};

use super::hierarchy::all_ancestors;
use super::overload::receiver_substitution;

/// Public members of `Object` that an interface may redeclare abstractly
/// without affecting whether it is functional.
fn redeclares_object_method(name: &str, params: &[TypeUsage]) -> bool {
    match (name, params) {
        ("equals", [param]) => param.describe() == OBJECT,
        ("hashCode" | "toString", []) => true,
        _ => false,
    }
}

/// The one abstract method of `ty`, with `ty`'s type arguments applied.
///
/// `None` unless `ty` is an interface with exactly one abstract method
/// across itself and its ancestors.
pub fn functional_method(ty: &TypeUsage, solver: &dyn TypeSolver) -> Result<Option<MethodUsage>> {
    let TypeUsage::Reference(reference) = ty else {
        return Ok(None);
    };
    if !reference.declaration().is_interface() {
        return Ok(None);
    }
    let target = without_wildcards(reference, solver)?;

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let views = std::iter::once(target.clone()).chain(all_ancestors(&target, solver)?);
    for view in views {
        if view.qualified_name() == OBJECT {
            continue;
        }
        for method in view.declaration().declared_methods()? {
            if !method.is_abstract() || method.is_default() || method.is_static() {
                continue;
            }
            let substitution = receiver_substitution(&method, &view)?;
            let params: Vec<TypeUsage> = method
                .params(solver)?
                .into_iter()
                .map(|param| param.type_usage.replace_params(&substitution))
                .collect();
            let name = method.name();
            if redeclares_object_method(&name, &params) {
                continue;
            }
            let key = format!(
                "{name}({})",
                params.iter().map(TypeUsage::describe).collect::<Vec<_>>().join(", ")
            );
            if !seen.insert(key) {
                continue;
            }
            let return_type = method.return_type(solver)?.replace_params(&substitution);
            found.push(MethodUsage::new(method, params, return_type));
        }
    }

    if found.len() == 1 {
        Ok(found.pop())
    } else {
        Ok(None)
    }
}

/// The non-wildcard parameterization: `? extends B` and `? super B` become
/// `B`, `?` becomes the parameter's first bound.
fn without_wildcards(reference: &ReferenceType, solver: &dyn TypeSolver) -> Result<ReferenceType> {
    if !reference.type_arguments().iter().any(TypeUsage::is_wildcard) {
        return Ok(reference.clone());
    }
    let params = reference.declaration().type_parameters()?;
    let mut args = Vec::with_capacity(reference.type_arguments().len());
    for (idx, arg) in reference.type_arguments().iter().enumerate() {
        let arg = match arg {
            TypeUsage::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => {
                TypeUsage::clone(bound)
            }
            TypeUsage::Wildcard(Wildcard::Unbounded) => {
                let first_bound = match params.get(idx) {
                    Some(param) => param.bounds(solver)?.into_iter().next(),
                    None => None,
                };
                match first_bound {
                    Some(bound) => bound,
                    None => TypeUsage::reference(solver.solve_type(OBJECT)?),
                }
            }
            other => other.clone(),
        };
        args.push(arg);
    }
    Ok(ReferenceType::from_parts(reference.declaration().clone(), Arc::from(args)))
}

/// `ty` with every wildcard argument replaced by its bound, at any depth.
/// Unbounded wildcards stay as they are.
pub(crate) fn strip_wildcards(ty: &TypeUsage) -> TypeUsage {
    match ty {
        TypeUsage::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => {
            strip_wildcards(bound)
        }
        TypeUsage::Array(component) => TypeUsage::array(strip_wildcards(component)),
        TypeUsage::Reference(reference) if !reference.is_raw() => {
            let args: Vec<TypeUsage> =
                reference.type_arguments().iter().map(strip_wildcards).collect();
            TypeUsage::Reference(ReferenceType::from_parts(
                reference.declaration().clone(),
                Arc::from(args),
            ))
        }
        other => other.clone(),
    }
}
