use crate::error::Result;
use crate::model::SymbolReference;
use crate::solver::TypeSolver;
use crate::types::{PrimitiveType, ReferenceType, TypeUsage, Wildcard, OBJECT};

use super::functional::functional_method;

const ARRAY_SUPERTYPES: [&str; 3] = [OBJECT, "java.lang.Cloneable", "java.io.Serializable"];

/// Whether a value of type `value` can be assigned to `target`.
///
/// Boxing and unboxing are modelled; primitive widening is not. Reference
/// types are compared by declaration, ignoring type arguments.
pub(crate) fn is_assignable_by(
    target: &TypeUsage,
    value: &TypeUsage,
    solver: &dyn TypeSolver,
) -> Result<bool> {
    Ok(match target {
        TypeUsage::Void => value.is_void(),
        TypeUsage::Null => value.is_null(),
        TypeUsage::LambdaPlaceholder(_) => target == value,
        TypeUsage::Primitive(prim) => match value {
            TypeUsage::Primitive(other) => prim == other,
            TypeUsage::Reference(reference) => {
                PrimitiveType::from_boxed_name(&reference.qualified_name()) == Some(*prim)
            }
            _ => false,
        },
        TypeUsage::Array(component) => match value {
            TypeUsage::Null => true,
            TypeUsage::Array(other) if component.is_primitive() || other.is_primitive() => {
                component == other
            }
            TypeUsage::Array(other) => is_assignable_by(component, other, solver)?,
            _ => false,
        },
        TypeUsage::TypeVariable(_) => !value.is_void(),
        TypeUsage::Wildcard(Wildcard::Unbounded) => !value.is_void() && !value.is_primitive(),
        TypeUsage::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => {
            is_assignable_by(bound, value, solver)?
        }
        TypeUsage::Reference(reference) => reference_accepts(reference, value, solver)?,
    })
}

fn reference_accepts(
    target: &ReferenceType,
    value: &TypeUsage,
    solver: &dyn TypeSolver,
) -> Result<bool> {
    let name = target.qualified_name();
    Ok(match value {
        TypeUsage::Void => false,
        TypeUsage::Null => true,
        TypeUsage::Primitive(prim) => match solver.try_solve_type(prim.boxed_name())? {
            SymbolReference::Solved(boxed) => {
                reference_accepts(target, &TypeUsage::reference(boxed), solver)?
            }
            SymbolReference::Unsolved => false,
        },
        TypeUsage::Array(_) => ARRAY_SUPERTYPES.contains(&name.as_str()),
        TypeUsage::Reference(reference) => {
            reference.qualified_name() == name
                || reference
                    .all_ancestors(solver)?
                    .iter()
                    .any(|ancestor| ancestor.qualified_name() == name)
        }
        TypeUsage::TypeVariable(param) => {
            let bounds = param.bounds(solver)?;
            if bounds.is_empty() {
                name == OBJECT
            } else {
                let mut accepted = false;
                for bound in &bounds {
                    if reference_accepts(target, bound, solver)? {
                        accepted = true;
                        break;
                    }
                }
                accepted
            }
        }
        TypeUsage::Wildcard(Wildcard::Extends(bound)) => reference_accepts(target, bound, solver)?,
        TypeUsage::Wildcard(_) => name == OBJECT,
        TypeUsage::LambdaPlaceholder(_) => {
            target.declaration().is_interface()
                && functional_method(&TypeUsage::Reference(target.clone()), solver)?.is_some()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::ReflectionTypeSolver;
    use crate::types::LambdaArgumentPlaceholder;

    fn reference(solver: &ReflectionTypeSolver, name: &str) -> TypeUsage {
        TypeUsage::reference(solver.solve_type(name).unwrap())
    }

    #[test]
    fn boxing_both_ways_but_no_widening() {
        let solver = ReflectionTypeSolver::jdk();
        let int: TypeUsage = PrimitiveType::Int.into();
        let long: TypeUsage = PrimitiveType::Long.into();
        let integer = reference(&solver, "java.lang.Integer");
        let number = reference(&solver, "java.lang.Number");
        assert!(is_assignable_by(&int, &integer, &solver).unwrap());
        assert!(is_assignable_by(&integer, &int, &solver).unwrap());
        assert!(is_assignable_by(&number, &int, &solver).unwrap());
        assert!(!is_assignable_by(&long, &int, &solver).unwrap());
        assert!(!is_assignable_by(&int, &TypeUsage::Null, &solver).unwrap());
    }

    #[test]
    fn arrays() {
        let solver = ReflectionTypeSolver::jdk();
        let int: TypeUsage = PrimitiveType::Int.into();
        let strings = TypeUsage::array(reference(&solver, "java.lang.String"));
        let objects = TypeUsage::array(reference(&solver, OBJECT));
        assert!(is_assignable_by(&objects, &strings, &solver).unwrap());
        assert!(!is_assignable_by(&strings, &objects, &solver).unwrap());
        assert!(!is_assignable_by(&objects, &TypeUsage::array(int.clone()), &solver).unwrap());
        let object = reference(&solver, OBJECT);
        assert!(is_assignable_by(&object, &TypeUsage::array(int), &solver).unwrap());
    }

    #[test]
    fn placeholders_fit_functional_interfaces_only() {
        let solver = ReflectionTypeSolver::jdk();
        let lambda = TypeUsage::LambdaPlaceholder(LambdaArgumentPlaceholder::new(0));
        let accepts = |name: &str| is_assignable_by(&reference(&solver, name), &lambda, &solver);
        assert!(accepts("java.lang.Runnable").unwrap());
        assert!(!accepts("java.lang.String").unwrap());
        assert!(!accepts("java.util.List").unwrap());
    }
}
