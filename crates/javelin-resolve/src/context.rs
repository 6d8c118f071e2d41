//! The lexical scope chain.
//!
//! A [`Context`] wraps one scope-introducing node. Lookups check what the
//! scope itself declares and otherwise move to the enclosing scope, which is
//! recomputed from the tree's parent links; contexts hold no state of their
//! own beyond the node and the child they were entered from.

use javelin_ast::{Import, Node, NodeId, SyntaxNode};
use tracing::trace;

use crate::declarations::{MethodDeclaration, TypeDeclaration, ValueDeclaration};
use crate::error::{ResolveError, Result};
use crate::logic::{self, ResolvedMethod};
use crate::model::{MethodUsage, SymbolReference, Value};
use crate::resolver::Resolver;
use crate::solver::TypeSolver;
use crate::source::{SourceSymbol, SourceTypeDeclaration, SourceTypeVariable};
use crate::types::{ReferenceType, TypeUsage, Wildcard, OBJECT};

fn introduces_scope(node: &Node) -> bool {
    matches!(
        node,
        Node::CompilationUnit { .. }
            | Node::TypeDecl(_)
            | Node::Method(_)
            | Node::Constructor(_)
            | Node::Block { .. }
            | Node::Lambda { .. }
            | Node::MethodCall { .. }
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    node: SyntaxNode,
    /// Child of `node` the lookup came through.
    from: Option<NodeId>,
}

impl Context {
    /// The innermost scope at or above `node`.
    #[must_use]
    pub fn of(node: &SyntaxNode) -> Context {
        Self::enclosing(node.clone(), None)
    }

    /// A tree whose root is not a compilation unit gets its root as the
    /// outermost context.
    fn enclosing(mut node: SyntaxNode, mut from: Option<NodeId>) -> Context {
        while !introduces_scope(node.kind()) {
            let Some(parent) = node.parent() else {
                break;
            };
            from = Some(node.id());
            node = parent;
        }
        Context { node, from }
    }

    #[must_use]
    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    #[must_use]
    pub fn parent(&self) -> Option<Context> {
        let parent = self.node.parent()?;
        Some(Self::enclosing(parent, Some(self.node.id())))
    }

    /// Used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        let kind = self.node.kind();
        match (kind, kind.declared_name()) {
            (Node::MethodCall { name, .. }, _) => format!("call to `{name}`"),
            (_, Some(name)) => format!("{} `{name}`", kind.kind_name()),
            (_, None) => kind.kind_name().to_string(),
        }
    }

    fn type_declaration(&self) -> Option<TypeDeclaration> {
        SourceTypeDeclaration::new(self.node.clone()).map(TypeDeclaration::Source)
    }

    fn children<'n>(&'n self, ids: &'n [NodeId]) -> impl Iterator<Item = SyntaxNode> + 'n {
        ids.iter().map(|id| self.node.with_id(*id))
    }

    fn named<'n>(
        &'n self,
        ids: &'n [NodeId],
        name: &'n str,
    ) -> impl Iterator<Item = SyntaxNode> + 'n {
        ids.iter()
            .map(|id| self.node.with_id(*id))
            .filter(move |node| node.kind().declared_name() == Some(name))
    }

    /// A simple, nested (`Outer.Inner`) or qualified type name.
    pub fn solve_type(
        &self,
        name: &str,
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<TypeDeclaration>> {
        let Some((first, rest)) = name.split_once('.') else {
            return self.solve_simple_type(name, solver);
        };
        if let SymbolReference::Solved(outer) = self.solve_simple_type(first, solver)? {
            if !outer.is_type_variable() {
                return outer.nested_type(rest, solver);
            }
        }
        solver.try_solve_type(name)
    }

    fn solve_simple_type(
        &self,
        name: &str,
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<TypeDeclaration>> {
        match self.node.kind() {
            Node::TypeDecl(decl) => {
                if let Some(param) = self.named(&decl.type_params, name).next() {
                    return Ok(SourceTypeVariable::new(param)
                        .map(TypeDeclaration::SourceTypeVariable)
                        .into());
                }
                let nested = self
                    .children(&decl.members)
                    .find(|member| {
                        matches!(member.kind(), Node::TypeDecl(inner) if inner.name == name)
                    });
                if let Some(nested) = nested.and_then(SourceTypeDeclaration::new) {
                    return Ok(SymbolReference::Solved(TypeDeclaration::Source(nested)));
                }
            }
            Node::Method(method) => {
                if let Some(param) = self.named(&method.type_params, name).next() {
                    return Ok(SourceTypeVariable::new(param)
                        .map(TypeDeclaration::SourceTypeVariable)
                        .into());
                }
            }
            Node::Constructor(ctor) => {
                if let Some(param) = self.named(&ctor.type_params, name).next() {
                    return Ok(SourceTypeVariable::new(param)
                        .map(TypeDeclaration::SourceTypeVariable)
                        .into());
                }
            }
            Node::CompilationUnit {
                package,
                imports,
                types,
            } => return self.solve_unit_type(name, package.as_deref(), imports, types, solver),
            _ => {}
        }
        match self.parent() {
            Some(parent) => parent.solve_simple_type(name, solver),
            None => solver.try_solve_type(name),
        }
    }

    /// Declared types, single-type imports, the package, on-demand imports,
    /// `java.lang`, then the name as written.
    fn solve_unit_type(
        &self,
        name: &str,
        package: Option<&str>,
        imports: &[Import],
        types: &[NodeId],
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<TypeDeclaration>> {
        if let Some(local) = self.named(types, name).find_map(SourceTypeDeclaration::new) {
            return Ok(SymbolReference::Solved(TypeDeclaration::Source(local)));
        }

        let single = imports
            .iter()
            .filter(|import| !import.is_static && !import.on_demand)
            .filter(|import| import.path.rsplit('.').next() == Some(name))
            .map(|import| import.path.clone());
        let in_package = package.map(|package| format!("{package}.{name}"));
        let on_demand = imports
            .iter()
            .filter(|import| !import.is_static && import.on_demand)
            .map(|import| format!("{}.{name}", import.path));
        let candidates = single
            .chain(in_package)
            .chain(on_demand)
            .chain([format!("java.lang.{name}"), name.to_string()]);

        for candidate in candidates {
            if let SymbolReference::Solved(decl) = solver.try_solve_type(&candidate)? {
                trace!(name, qualified = %candidate, "type found from compilation unit");
                return Ok(SymbolReference::Solved(decl));
            }
        }
        Ok(SymbolReference::Unsolved)
    }

    /// The declaration a simple name denotes here.
    pub fn solve_symbol(
        &self,
        name: &str,
        resolver: &Resolver<'_>,
    ) -> Result<SymbolReference<ValueDeclaration>> {
        let solver = resolver.solver();
        match self.node.kind() {
            Node::TypeDecl(_) => {
                if let Some(decl) = self.type_declaration() {
                    if let SymbolReference::Solved(field) = decl.solve_field(name, solver)? {
                        return Ok(SymbolReference::Solved(ValueDeclaration::Field(field)));
                    }
                }
            }
            Node::Method(method) => {
                if let Some(param) = self.named(&method.params, name).next() {
                    return Ok(SymbolReference::Solved(ValueDeclaration::Parameter(
                        SourceSymbol::new(param),
                    )));
                }
            }
            Node::Constructor(ctor) => {
                if let Some(param) = self.named(&ctor.params, name).next() {
                    return Ok(SymbolReference::Solved(ValueDeclaration::Parameter(
                        SourceSymbol::new(param),
                    )));
                }
            }
            Node::Lambda { params, .. } => {
                if let Some(param) = self.named(params, name).next() {
                    return Ok(SymbolReference::Solved(ValueDeclaration::Parameter(
                        SourceSymbol::new(param),
                    )));
                }
            }
            Node::Block { statements } => {
                if let Some(local) = self.local_variable(statements, name) {
                    return Ok(SymbolReference::Solved(ValueDeclaration::Variable(
                        SourceSymbol::new(local),
                    )));
                }
            }
            Node::CompilationUnit { imports, .. } => {
                return self.solve_static_import_field(name, imports, solver);
            }
            _ => {}
        }
        match self.parent() {
            Some(parent) => parent.solve_symbol(name, resolver),
            None => Ok(SymbolReference::Unsolved),
        }
    }

    /// The latest declarator named `name` among the statements before the
    /// one the lookup came from.
    fn local_variable(&self, statements: &[NodeId], name: &str) -> Option<SyntaxNode> {
        let visible = match self.from {
            Some(from) => statements.iter().take_while(|id| **id != from).count(),
            None => statements.len(),
        };
        statements[..visible]
            .iter()
            .rev()
            .filter_map(|id| match self.node.ast().node(*id) {
                Node::ExprStmt { expr } => Some(*expr),
                _ => None,
            })
            .find_map(|expr| match self.node.ast().node(expr) {
                Node::VariableDeclaration { variables, .. } => self.named(variables, name).last(),
                _ => None,
            })
    }

    fn solve_static_import_field(
        &self,
        name: &str,
        imports: &[Import],
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<ValueDeclaration>> {
        for owner in static_import_owners(imports, name) {
            let SymbolReference::Solved(decl) = solver.try_solve_type(&owner)? else {
                continue;
            };
            if let SymbolReference::Solved(field) = decl.solve_field(name, solver)? {
                return Ok(SymbolReference::Solved(ValueDeclaration::Field(field)));
            }
        }
        Ok(SymbolReference::Unsolved)
    }

    /// Like [`Context::solve_symbol`], typed. Fields of the enclosing type
    /// see the type's own arguments pushed through its ancestors.
    pub fn solve_symbol_as_value(
        &self,
        name: &str,
        resolver: &Resolver<'_>,
    ) -> Result<Option<Value>> {
        if let Some(decl) = self.type_declaration() {
            let this = decl.self_type()?;
            if let Some((_, ty)) = logic::find_field(&this, name, resolver.solver())? {
                return Ok(Some(Value::new(name, ty)));
            }
            return match self.parent() {
                Some(parent) => parent.solve_symbol_as_value(name, resolver),
                None => Ok(None),
            };
        }
        let SymbolReference::Solved(decl) = self.solve_symbol(name, resolver)? else {
            return Ok(None);
        };
        Ok(Some(Value::new(decl.name(), decl.type_usage(resolver)?)))
    }

    pub(crate) fn solve_method_resolved(
        &self,
        name: &str,
        args: &[TypeUsage],
        resolver: &Resolver<'_>,
    ) -> Result<SymbolReference<ResolvedMethod>> {
        let solver = resolver.solver();
        match self.node.kind() {
            Node::MethodCall {
                scope: Some(scope), ..
            } if self.from.is_none() => {
                let receiver = resolver.type_of(&self.node.with_id(*scope))?;
                for candidate in receiver_references(&receiver, solver)? {
                    let found = logic::solve_method(&candidate, name, args, solver)?;
                    if found.is_solved() {
                        return Ok(found);
                    }
                }
                return Ok(SymbolReference::Unsolved);
            }
            Node::TypeDecl(_) => {
                if let Some(decl) = self.type_declaration() {
                    let found = logic::solve_method(&decl.self_type()?, name, args, solver)?;
                    if found.is_solved() {
                        return Ok(found);
                    }
                }
            }
            Node::CompilationUnit { imports, .. } => {
                for owner in static_import_owners(imports, name) {
                    let SymbolReference::Solved(decl) = solver.try_solve_type(&owner)? else {
                        continue;
                    };
                    let found = logic::solve_method(&ReferenceType::raw(decl), name, args, solver)?;
                    if found.is_solved() {
                        return Ok(found);
                    }
                }
                return Ok(SymbolReference::Unsolved);
            }
            _ => {}
        }
        match self.parent() {
            Some(parent) => parent.solve_method_resolved(name, args, resolver),
            None => Ok(SymbolReference::Unsolved),
        }
    }

    /// The method a call named `name` with arguments `args` made here binds to.
    pub fn solve_method(
        &self,
        name: &str,
        args: &[TypeUsage],
        resolver: &Resolver<'_>,
    ) -> Result<SymbolReference<MethodDeclaration>> {
        Ok(self
            .solve_method_resolved(name, args, resolver)?
            .map(|resolved| resolved.declaration))
    }

    /// The method as seen from this call site, generics instantiated.
    pub fn solve_method_as_usage(
        &self,
        name: &str,
        args: &[TypeUsage],
        resolver: &Resolver<'_>,
    ) -> Result<Option<MethodUsage>> {
        let SymbolReference::Solved(resolved) = self.solve_method_resolved(name, args, resolver)?
        else {
            return Ok(None);
        };
        for arg in args {
            if let TypeUsage::LambdaPlaceholder(placeholder) = arg {
                placeholder.set_method(resolved.declaration.clone());
            }
        }
        logic::instantiate_method(resolved, args, resolver.solver()).map(Some)
    }

    /// What the type variable `name` is bound to at this point.
    pub fn solve_generic_type(
        &self,
        name: &str,
        resolver: &Resolver<'_>,
    ) -> Result<Option<TypeUsage>> {
        match self.node.kind() {
            Node::Lambda { .. } => {
                if let Some(bound) = self.lambda_generic_type(name, resolver)? {
                    return Ok(Some(bound));
                }
            }
            Node::MethodCall {
                scope: Some(scope), ..
            } if self.from.is_none() => {
                let receiver = resolver.type_of(&self.node.with_id(*scope))?;
                if let TypeUsage::Reference(receiver) = receiver {
                    if let Some(bound) = receiver.generic_parameter_by_name(name)? {
                        return Ok(Some(bound));
                    }
                }
            }
            _ => {}
        }
        match self.parent() {
            Some(parent) => parent.solve_generic_type(name, resolver),
            None => Ok(None),
        }
    }

    /// Pairs the enclosing call's declared parameter types with their
    /// instantiated forms and reads the binding of `name` off them.
    fn lambda_generic_type(
        &self,
        name: &str,
        resolver: &Resolver<'_>,
    ) -> Result<Option<TypeUsage>> {
        let Some(call) = self.node.parent() else {
            return Ok(None);
        };
        if !matches!(call.kind(), Node::MethodCall { .. }) {
            return Ok(None);
        }
        let Some(usage) = resolver.solve_method_as_usage(&call)? else {
            return Ok(None);
        };
        let solver = resolver.solver();
        let formals: Vec<TypeUsage> = usage
            .declaration()
            .params(solver)?
            .into_iter()
            .map(|param| param.type_usage)
            .collect();
        let mut names = Vec::new();
        for formal in &formals {
            collect_variables(formal, &mut names);
        }
        let bindings = logic::infer_bindings(&formals, false, usage.param_types(), &names, solver)?;
        Ok(bindings.get(name).cloned())
    }
}

/// Qualified names of the types whose static member `name` is imported.
fn static_import_owners(imports: &[Import], name: &str) -> Vec<String> {
    let single = imports
        .iter()
        .filter(|import| import.is_static && !import.on_demand)
        .filter_map(|import| {
            let (owner, member) = import.path.rsplit_once('.')?;
            (member == name).then(|| owner.to_string())
        });
    let on_demand = imports
        .iter()
        .filter(|import| import.is_static && import.on_demand)
        .map(|import| import.path.clone());
    single.chain(on_demand).collect()
}

/// Declarations to search for members of a value of type `ty`.
pub(crate) fn receiver_references(
    ty: &TypeUsage,
    solver: &dyn TypeSolver,
) -> Result<Vec<ReferenceType>> {
    Ok(match ty {
        TypeUsage::Reference(reference) => vec![reference.clone()],
        TypeUsage::TypeVariable(param) => {
            let mut out = Vec::new();
            for bound in param.bounds(solver)? {
                out.extend(receiver_references(&bound, solver)?);
            }
            if out.is_empty() {
                out.push(ReferenceType::raw(solver.solve_type(OBJECT)?));
            }
            out
        }
        TypeUsage::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => {
            receiver_references(bound, solver)?
        }
        TypeUsage::Wildcard(Wildcard::Unbounded) | TypeUsage::Array(_) => {
            vec![ReferenceType::raw(solver.solve_type(OBJECT)?)]
        }
        other => {
            return Err(ResolveError::invalid_cast(
                "a type with members",
                other.describe(),
            ))
        }
    })
}

fn collect_variables(ty: &TypeUsage, out: &mut Vec<String>) {
    match ty {
        TypeUsage::TypeVariable(param) => {
            if !out.iter().any(|name| name == param.name()) {
                out.push(param.name().to_string());
            }
        }
        TypeUsage::Array(component) => collect_variables(component, out),
        TypeUsage::Wildcard(wildcard) => {
            if let Some(bound) = wildcard.bound() {
                collect_variables(bound, out);
            }
        }
        TypeUsage::Reference(reference) => {
            for arg in reference.type_arguments() {
                collect_variables(arg, out);
            }
        }
        TypeUsage::Primitive(_)
        | TypeUsage::Void
        | TypeUsage::Null
        | TypeUsage::LambdaPlaceholder(_) => {}
    }
}
