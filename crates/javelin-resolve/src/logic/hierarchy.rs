use std::collections::HashSet;

use crate::declarations::{FieldDeclaration, TypeDeclaration};
use crate::error::Result;
use crate::solver::TypeSolver;
use crate::types::{ReferenceType, Substitution, TypeUsage, OBJECT};

pub(crate) fn substitute_reference(
    reference: &ReferenceType,
    substitution: &Substitution,
) -> ReferenceType {
    if substitution.is_empty() || reference.is_raw() {
        return reference.clone();
    }
    match TypeUsage::Reference(reference.clone()).replace_params(substitution) {
        TypeUsage::Reference(substituted) => substituted,
        _ => reference.clone(),
    }
}

/// Superclass first, then each interface, depth first. Every ancestor
/// appears once; for classes and interfaces `Object` comes last.
///
/// A raw use of a generic type has raw ancestors.
pub(crate) fn all_ancestors(
    ty: &ReferenceType,
    solver: &dyn TypeSolver,
) -> Result<Vec<ReferenceType>> {
    let mut seen = HashSet::new();
    seen.insert(ty.qualified_name());
    let mut out = Vec::new();
    collect(ty, solver, &mut seen, &mut out)?;

    if ty.declaration().is_type_variable() || ty.qualified_name() == OBJECT {
        return Ok(out);
    }
    match out.iter().position(|ancestor| ancestor.qualified_name() == OBJECT) {
        Some(pos) => {
            let object = out.remove(pos);
            out.push(object);
        }
        None => out.push(ReferenceType::raw(solver.solve_type(OBJECT)?)),
    }
    Ok(out)
}

fn collect(
    ty: &ReferenceType,
    solver: &dyn TypeSolver,
    seen: &mut HashSet<String>,
    out: &mut Vec<ReferenceType>,
) -> Result<()> {
    let decl = ty.declaration();
    let erase = ty.is_raw() && !decl.type_parameters()?.is_empty();
    let substitution = ty.substitution()?;
    let direct = decl
        .superclass(solver)?
        .into_iter()
        .chain(decl.interfaces(solver)?);
    for parent in direct {
        let parent = if erase {
            ReferenceType::raw(parent.declaration().clone())
        } else {
            substitute_reference(&parent, &substitution)
        };
        if !seen.insert(parent.qualified_name()) {
            continue;
        }
        out.push(parent.clone());
        collect(&parent, solver, seen, out)?;
    }
    Ok(())
}

/// `ty` seen as `target`: itself, or the ancestor with that name.
pub(crate) fn ancestor_view(
    ty: &ReferenceType,
    target: &str,
    solver: &dyn TypeSolver,
) -> Result<Option<ReferenceType>> {
    if ty.qualified_name() == target {
        return Ok(Some(ty.clone()));
    }
    Ok(all_ancestors(ty, solver)?
        .into_iter()
        .find(|ancestor| ancestor.qualified_name() == target))
}

pub(crate) fn all_fields(
    decl: &TypeDeclaration,
    solver: &dyn TypeSolver,
) -> Result<Vec<FieldDeclaration>> {
    let mut fields = decl.declared_fields()?;
    for ancestor in all_ancestors(&ReferenceType::raw(decl.clone()), solver)? {
        fields.extend(ancestor.declaration().declared_fields()?);
    }
    Ok(fields)
}

/// The field `name` visible on `receiver` and its type with the receiver's
/// type arguments applied.
pub(crate) fn find_field(
    receiver: &ReferenceType,
    name: &str,
    solver: &dyn TypeSolver,
) -> Result<Option<(FieldDeclaration, TypeUsage)>> {
    let views = std::iter::once(receiver.clone()).chain(all_ancestors(receiver, solver)?);
    for view in views {
        let Some(field) = view
            .declaration()
            .declared_fields()?
            .into_iter()
            .find(|field| field.name() == name)
        else {
            continue;
        };
        let ty = field.type_usage(solver)?.replace_params(&view.substitution()?);
        return Ok(Some((field, ty)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::ReflectionTypeSolver;
    use pretty_assertions::assert_eq;

    fn describe(ancestors: &[ReferenceType]) -> Vec<String> {
        ancestors.iter().map(ReferenceType::describe).collect()
    }

    #[test]
    fn ancestors_carry_type_arguments_and_end_with_object() {
        let solver = ReflectionTypeSolver::jdk();
        let string = TypeUsage::reference(solver.solve_type("java.lang.String").unwrap());
        let array_list = solver.solve_type("java.util.ArrayList").unwrap();
        let list = ReferenceType::new(array_list, vec![string]).unwrap();

        assert_eq!(
            describe(&all_ancestors(&list, &solver).unwrap()),
            [
                "java.util.List<java.lang.String>",
                "java.util.Collection<java.lang.String>",
                "java.lang.Iterable<java.lang.String>",
                "java.lang.Cloneable",
                "java.io.Serializable",
                "java.lang.Object",
            ]
        );
    }

    #[test]
    fn interfaces_and_raw_uses() {
        let solver = ReflectionTypeSolver::jdk();
        let raw_list = ReferenceType::raw(solver.solve_type("java.util.List").unwrap());
        assert_eq!(
            describe(&all_ancestors(&raw_list, &solver).unwrap()),
            ["java.util.Collection", "java.lang.Iterable", "java.lang.Object"]
        );

        let object = ReferenceType::raw(solver.solve_type(OBJECT).unwrap());
        assert!(all_ancestors(&object, &solver).unwrap().is_empty());
    }
}
