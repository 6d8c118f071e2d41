use crate::declarations::TypeDeclaration;
use crate::error::{ResolveError, Result};
use crate::model::SymbolReference;

/// Maps qualified type names to declarations.
///
/// The solver handed to a [`Resolver`](crate::Resolver) is the root: every
/// lookup made while resolving, including `java.lang.Object` and other
/// cross-backend references, goes through it.
pub trait TypeSolver {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>>;

    fn solve_type(&self, name: &str) -> Result<TypeDeclaration> {
        match self.try_solve_type(name)? {
            SymbolReference::Solved(decl) => Ok(decl),
            SymbolReference::Unsolved => Err(ResolveError::unresolved(name, "type solver")),
        }
    }
}

impl<T: TypeSolver + ?Sized> TypeSolver for &T {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>> {
        (**self).try_solve_type(name)
    }
}

impl<T: TypeSolver + ?Sized> TypeSolver for Box<T> {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>> {
        (**self).try_solve_type(name)
    }
}

/// Tries each solver in order; the first hit wins.
#[derive(Default)]
pub struct CombinedTypeSolver {
    solvers: Vec<Box<dyn TypeSolver>>,
}

impl CombinedTypeSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, solver: impl TypeSolver + 'static) -> Self {
        self.add(solver);
        self
    }

    pub fn add(&mut self, solver: impl TypeSolver + 'static) {
        self.solvers.push(Box::new(solver));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }
}

impl TypeSolver for CombinedTypeSolver {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>> {
        for solver in &self.solvers {
            if let SymbolReference::Solved(decl) = solver.try_solve_type(name)? {
                return Ok(SymbolReference::Solved(decl));
            }
        }
        tracing::trace!(name, "no solver knows this type");
        Ok(SymbolReference::Unsolved)
    }
}
