use std::fmt;

use crate::declarations::{ConstructorDeclaration, MethodDeclaration};
use crate::error::{ResolveError, Result};
use crate::solver::TypeSolver;
use crate::types::{Substitution, TypeUsage};

/// Outcome of a lookup that may legitimately find nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolReference<T> {
    Solved(T),
    Unsolved,
}

impl<T> SymbolReference<T> {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self, SymbolReference::Solved(_))
    }

    pub fn solved(self) -> Option<T> {
        match self {
            SymbolReference::Solved(value) => Some(value),
            SymbolReference::Unsolved => None,
        }
    }

    pub fn as_ref(&self) -> SymbolReference<&T> {
        match self {
            SymbolReference::Solved(value) => SymbolReference::Solved(value),
            SymbolReference::Unsolved => SymbolReference::Unsolved,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SymbolReference<U> {
        match self {
            SymbolReference::Solved(value) => SymbolReference::Solved(f(value)),
            SymbolReference::Unsolved => SymbolReference::Unsolved,
        }
    }

    /// Turns a miss into [`ResolveError::UnresolvedSymbol`].
    pub fn into_result(self, name: &str, context: &str) -> Result<T> {
        self.solved()
            .ok_or_else(|| ResolveError::unresolved(name, context))
    }
}

impl<T> From<Option<T>> for SymbolReference<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => SymbolReference::Solved(value),
            None => SymbolReference::Unsolved,
        }
    }
}

/// A symbol read as an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    name: String,
    type_usage: TypeUsage,
}

impl Value {
    #[must_use]
    pub fn new(name: impl Into<String>, type_usage: TypeUsage) -> Self {
        Value {
            name: name.into(),
            type_usage,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_usage(&self) -> &TypeUsage {
        &self.type_usage
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    /// Compiled classes may not record parameter names.
    pub name: Option<String>,
    /// For a variadic parameter this is the array type.
    pub type_usage: TypeUsage,
    pub is_variadic: bool,
}

/// A method as seen from one call site, after generic substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodUsage {
    declaration: MethodDeclaration,
    param_types: Vec<TypeUsage>,
    return_type: TypeUsage,
}

impl MethodUsage {
    /// The usage with the declared, unsubstituted types.
    pub fn from_declaration(
        declaration: MethodDeclaration,
        solver: &dyn TypeSolver,
    ) -> Result<Self> {
        let param_types = declaration
            .params(solver)?
            .into_iter()
            .map(|param| param.type_usage)
            .collect();
        let return_type = declaration.return_type(solver)?;
        Ok(MethodUsage {
            declaration,
            param_types,
            return_type,
        })
    }

    #[must_use]
    pub fn new(
        declaration: MethodDeclaration,
        param_types: Vec<TypeUsage>,
        return_type: TypeUsage,
    ) -> Self {
        MethodUsage {
            declaration,
            param_types,
            return_type,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.declaration.name()
    }

    #[must_use]
    pub fn declaration(&self) -> &MethodDeclaration {
        &self.declaration
    }

    #[must_use]
    pub fn param_types(&self) -> &[TypeUsage] {
        &self.param_types
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_types.len()
    }

    #[must_use]
    pub fn return_type(&self) -> &TypeUsage {
        &self.return_type
    }

    /// Formal type that receives argument `position`; trailing arguments of
    /// a variadic method map to the component of its last parameter.
    pub fn param_type_for_argument(&self, position: usize) -> Result<TypeUsage> {
        param_type_for_argument(&self.param_types, self.declaration.is_variadic(), position)
            .ok_or_else(|| {
                ResolveError::invalid_cast(
                    format!("an argument index below {}", self.param_types.len()),
                    position.to_string(),
                )
            })
    }

    #[must_use]
    pub fn replace_param_type(&self, idx: usize, ty: TypeUsage) -> Self {
        let mut usage = self.clone();
        if let Some(slot) = usage.param_types.get_mut(idx) {
            *slot = ty;
        }
        usage
    }

    #[must_use]
    pub fn replace_return_type(&self, ty: TypeUsage) -> Self {
        let mut usage = self.clone();
        usage.return_type = ty;
        usage
    }

    /// Substitutes the type variable `name` in parameter and return types.
    #[must_use]
    pub fn replace_name_param(&self, name: &str, value: &TypeUsage) -> Self {
        MethodUsage {
            declaration: self.declaration.clone(),
            param_types: self
                .param_types
                .iter()
                .map(|ty| ty.replace_param(name, value))
                .collect(),
            return_type: self.return_type.replace_param(name, value),
        }
    }

    #[must_use]
    pub(crate) fn replace_params(&self, substitution: &Substitution) -> Self {
        MethodUsage {
            declaration: self.declaration.clone(),
            param_types: self
                .param_types
                .iter()
                .map(|ty| ty.replace_params(substitution))
                .collect(),
            return_type: self.return_type.replace_params(substitution),
        }
    }
}

impl fmt::Display for MethodUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (idx, ty) in self.param_types.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&ty.describe())?;
        }
        write!(f, ") -> {}", self.return_type.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorUsage {
    declaration: ConstructorDeclaration,
    param_types: Vec<TypeUsage>,
}

impl ConstructorUsage {
    pub fn from_declaration(
        declaration: ConstructorDeclaration,
        solver: &dyn TypeSolver,
    ) -> Result<Self> {
        let param_types = declaration
            .params(solver)?
            .into_iter()
            .map(|param| param.type_usage)
            .collect();
        Ok(ConstructorUsage {
            declaration,
            param_types,
        })
    }

    #[must_use]
    pub fn new(declaration: ConstructorDeclaration, param_types: Vec<TypeUsage>) -> Self {
        ConstructorUsage {
            declaration,
            param_types,
        }
    }

    #[must_use]
    pub fn declaration(&self) -> &ConstructorDeclaration {
        &self.declaration
    }

    #[must_use]
    pub fn param_types(&self) -> &[TypeUsage] {
        &self.param_types
    }

    #[must_use]
    pub fn replace_param_type(&self, idx: usize, ty: TypeUsage) -> Self {
        let mut usage = self.clone();
        if let Some(slot) = usage.param_types.get_mut(idx) {
            *slot = ty;
        }
        usage
    }

    #[must_use]
    pub fn replace_name_param(&self, name: &str, value: &TypeUsage) -> Self {
        ConstructorUsage {
            declaration: self.declaration.clone(),
            param_types: self
                .param_types
                .iter()
                .map(|ty| ty.replace_param(name, value))
                .collect(),
        }
    }

    #[must_use]
    pub(crate) fn replace_params(&self, substitution: &Substitution) -> Self {
        ConstructorUsage {
            declaration: self.declaration.clone(),
            param_types: self
                .param_types
                .iter()
                .map(|ty| ty.replace_params(substitution))
                .collect(),
        }
    }
}

pub(crate) fn param_type_for_argument(
    params: &[TypeUsage],
    variadic: bool,
    position: usize,
) -> Option<TypeUsage> {
    let last = params.len().checked_sub(1)?;
    if variadic && position >= last {
        let tail = &params[last];
        return Some(match tail {
            TypeUsage::Array(component) => (**component).clone(),
            other => other.clone(),
        });
    }
    params.get(position).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbol_reference_conversions() {
        let solved: SymbolReference<u8> = Some(3).into();
        assert!(solved.is_solved());
        assert_eq!(solved.clone().map(|v| v + 1).solved(), Some(4));

        let missing: SymbolReference<u8> = None.into();
        let err = missing.into_result("x", "block").unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnresolvedSymbol {
                name: "x".into(),
                context: "block".into()
            }
        );
    }

    #[test]
    fn variadic_tail_maps_to_component() {
        let int: TypeUsage = PrimitiveType::Int.into();
        let params = vec![
            PrimitiveType::Boolean.into(),
            TypeUsage::array(int.clone()),
        ];
        assert_eq!(
            param_type_for_argument(&params, true, 0),
            Some(PrimitiveType::Boolean.into())
        );
        assert_eq!(param_type_for_argument(&params, true, 3), Some(int));
        assert_eq!(param_type_for_argument(&params, false, 3), None);
        assert_eq!(param_type_for_argument(&[], true, 0), None);
    }
}
