//! Binding a generic method's own type variables from its arguments.

use crate::error::{ResolveError, Result};
use crate::model::{param_type_for_argument, ConstructorUsage, MethodUsage, SymbolReference};
use crate::solver::TypeSolver;
use crate::types::{Substitution, TypeUsage};

use super::functional::strip_wildcards;
use super::hierarchy::ancestor_view;
use super::overload::{receiver_substitution, ResolvedConstructor, ResolvedMethod};

/// Matches each formal against its actual, binding only names in `own`.
/// The first binding for a name wins.
pub(crate) fn infer_bindings(
    formals: &[TypeUsage],
    variadic: bool,
    actuals: &[TypeUsage],
    own: &[String],
    solver: &dyn TypeSolver,
) -> Result<Substitution> {
    let mut bindings = Substitution::new();
    if own.is_empty() {
        return Ok(bindings);
    }
    let passes_array = variadic
        && formals.len() == actuals.len()
        && actuals.last().is_some_and(TypeUsage::is_array);
    for (position, actual) in actuals.iter().enumerate() {
        let formal = if passes_array {
            formals.get(position).cloned()
        } else {
            param_type_for_argument(formals, variadic, position)
        };
        if let Some(formal) = formal {
            bind(&formal, actual, own, &mut bindings, solver)?;
        }
    }
    Ok(bindings)
}

fn bind(
    formal: &TypeUsage,
    actual: &TypeUsage,
    own: &[String],
    bindings: &mut Substitution,
    solver: &dyn TypeSolver,
) -> Result<()> {
    match formal {
        TypeUsage::TypeVariable(param) => {
            if !own.iter().any(|name| name == param.name()) {
                return Ok(());
            }
            let value = match actual {
                TypeUsage::Null | TypeUsage::LambdaPlaceholder(_) | TypeUsage::TypeVariable(_) => {
                    return Ok(())
                }
                TypeUsage::Primitive(prim) => match solver.try_solve_type(prim.boxed_name())? {
                    SymbolReference::Solved(boxed) => TypeUsage::reference(boxed),
                    SymbolReference::Unsolved => actual.clone(),
                },
                other => other.clone(),
            };
            bindings.entry(param.name().to_string()).or_insert(value);
        }
        TypeUsage::Array(component) => {
            if let TypeUsage::Array(actual_component) = actual {
                bind(component, actual_component, own, bindings, solver)?;
            }
        }
        TypeUsage::Reference(formal_ref) if !formal_ref.is_raw() => {
            let TypeUsage::Reference(actual_ref) = actual else {
                return Ok(());
            };
            let view = ancestor_view(actual_ref, &formal_ref.qualified_name(), solver)?
                .ok_or_else(|| {
                    ResolveError::invalid_cast(formal_ref.describe(), actual_ref.describe())
                })?;
            let pairs = formal_ref.type_arguments().iter().zip(view.type_arguments());
            for (formal_arg, actual_arg) in pairs {
                bind(formal_arg, actual_arg, own, bindings, solver)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// The call-site view of a resolved method: receiver arguments applied,
/// then the method's own type variables inferred from `args`.
pub(crate) fn instantiate_method(
    resolved: ResolvedMethod,
    args: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<MethodUsage> {
    let declaration = resolved.declaration;
    let substitution = receiver_substitution(&declaration, &resolved.declaring)?;
    let return_type = declaration.return_type(solver)?.replace_params(&substitution);
    let own: Vec<String> = declaration
        .type_parameters()?
        .iter()
        .map(|param| param.name().to_string())
        .collect();
    let bindings = infer_bindings(
        &resolved.param_types,
        declaration.is_variadic(),
        args,
        &own,
        solver,
    )?;
    Ok(MethodUsage::new(declaration, resolved.param_types, return_type).replace_params(&bindings))
}

/// The return type of `resolved` with its own type variables bound from
/// fully typed `actuals`, such as typed lambdas or calls whose result only
/// a typed lambda could determine.
pub(crate) fn reinstantiated_return_type(
    resolved: &ResolvedMethod,
    actuals: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<TypeUsage> {
    let declaration = &resolved.declaration;
    let substitution = receiver_substitution(declaration, &resolved.declaring)?;
    let own: Vec<String> = declaration
        .type_parameters()?
        .iter()
        .map(|param| param.name().to_string())
        .collect();
    let formals: Vec<TypeUsage> = resolved.param_types.iter().map(strip_wildcards).collect();
    let bindings = infer_bindings(&formals, declaration.is_variadic(), actuals, &own, solver)?;
    Ok(declaration
        .return_type(solver)?
        .replace_params(&substitution)
        .replace_params(&bindings))
}

pub(crate) fn instantiate_constructor(
    resolved: ResolvedConstructor,
    args: &[TypeUsage],
    solver: &dyn TypeSolver,
) -> Result<ConstructorUsage> {
    let own: Vec<String> = resolved
        .declaration
        .type_parameters()?
        .iter()
        .map(|param| param.name().to_string())
        .collect();
    let bindings = infer_bindings(
        &resolved.param_types,
        resolved.declaration.is_variadic(),
        args,
        &own,
        solver,
    )?;
    Ok(ConstructorUsage::new(resolved.declaration, resolved.param_types).replace_params(&bindings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::overload::solve_method;
    use crate::reflection::ReflectionTypeSolver;
    use crate::types::{PrimitiveType, ReferenceType};
    use pretty_assertions::assert_eq;

    #[test]
    fn varargs_tail_binds_boxed_component() {
        let solver = ReflectionTypeSolver::jdk();
        let arrays = ReferenceType::raw(solver.solve_type("java.util.Arrays").unwrap());
        let int: TypeUsage = PrimitiveType::Int.into();
        let args = [int.clone(), int];
        let resolved = solve_method(&arrays, "asList", &args, &solver)
            .unwrap()
            .solved()
            .unwrap();
        let usage = instantiate_method(resolved, &args, &solver).unwrap();
        assert_eq!(usage.return_type().describe(), "java.util.List<java.lang.Integer>");
    }

    #[test]
    fn receiver_arguments_flow_through_ancestors() {
        let solver = ReflectionTypeSolver::jdk();
        let integer = TypeUsage::reference(solver.solve_type("java.lang.Integer").unwrap());
        let list_decl = solver.solve_type("java.util.List").unwrap();
        let list = ReferenceType::new(list_decl, vec![integer]).unwrap();
        let resolved = solve_method(&list, "stream", &[], &solver).unwrap().solved().unwrap();
        assert_eq!(resolved.declaring.describe(), "java.util.Collection<java.lang.Integer>");
        let usage = instantiate_method(resolved, &[], &solver).unwrap();
        assert_eq!(
            usage.return_type().describe(),
            "java.util.stream.Stream<java.lang.Integer>"
        );
    }

    #[test]
    fn generic_arguments_bind_through_supertypes() {
        let solver = ReflectionTypeSolver::jdk();
        let string = TypeUsage::reference(solver.solve_type("java.lang.String").unwrap());
        let array_list_decl = solver.solve_type("java.util.ArrayList").unwrap();
        let array_list = ReferenceType::new(array_list_decl, vec![string.clone()]).unwrap();
        let array_list = TypeUsage::Reference(array_list);
        let list = solver.solve_type("java.util.List").unwrap();
        let of = list
            .declared_methods()
            .unwrap()
            .into_iter()
            .find(|method| method.name() == "of")
            .unwrap();
        let element = of.param(0, &solver).unwrap().type_usage;
        let collection_of_e = TypeUsage::Reference(
            ReferenceType::new(
                solver.solve_type("java.util.Collection").unwrap(),
                vec![element.as_array_component().unwrap().clone()],
            )
            .unwrap(),
        );
        let bindings = infer_bindings(
            &[collection_of_e],
            false,
            &[array_list],
            &["E".to_string()],
            &solver,
        )
        .unwrap();
        assert_eq!(bindings.get("E"), Some(&string));
    }
}
