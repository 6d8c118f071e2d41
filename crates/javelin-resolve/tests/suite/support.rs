use std::cell::Cell;
use std::sync::Arc;

use javelin_ast::{Ast, AstBuilder, Import, Modifiers, NodeId, SyntaxNode, TypeRef};
use javelin_resolve::{
    CombinedTypeSolver, ReflectionTypeSolver, Result, SourceTypeSolver, SymbolReference,
    TypeDeclaration, TypeSolver,
};

pub fn ty(text: &str) -> TypeRef {
    text.parse().expect("type text should parse")
}

pub fn node(ast: &Arc<Ast>, id: NodeId) -> SyntaxNode {
    SyntaxNode::root(ast).with_id(id)
}

/// `package demo; <imports> class <class_name> { void run(<params>) { <statements> } }`
pub fn class_with_method(
    mut b: AstBuilder,
    imports: Vec<Import>,
    class_name: &str,
    params: Vec<NodeId>,
    statements: Vec<NodeId>,
) -> Arc<Ast> {
    let body = b.block(statements);
    let method = b.method(Modifiers::NONE, TypeRef::Void, "run", params, Some(body));
    let class = b.class(class_name, vec![method]);
    let cu = b.compilation_unit(Some("demo"), imports, vec![class]);
    b.finish(cu)
}

/// `unit`'s own types first, then the built-in platform classes.
pub fn solver_for(unit: &Arc<Ast>) -> CombinedTypeSolver {
    CombinedTypeSolver::new()
        .with(SourceTypeSolver::new().with_unit(Arc::clone(unit)))
        .with(ReflectionTypeSolver::jdk())
}

/// Counts every name lookup that reaches the wrapped solver.
pub struct CountingSolver<S> {
    inner: S,
    lookups: Cell<usize>,
}

impl<S> CountingSolver<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lookups: Cell::new(0),
        }
    }

    pub fn take(&self) -> usize {
        self.lookups.replace(0)
    }
}

impl<S: TypeSolver> TypeSolver for CountingSolver<S> {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.try_solve_type(name)
    }
}
