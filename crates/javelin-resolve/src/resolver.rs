//! The resolution facade.
//!
//! [`Resolver`] answers "what type does this expression have" and "which
//! declaration does this name or call bind to" for nodes of any tree the
//! configured [`TypeSolver`] can see. Expression types are memoized per node
//! in two caches: one where lambdas are resolved against their target type,
//! and one where a lambda passed as an argument is only a
//! [`LambdaArgumentPlaceholder`]. Overload resolution works from the second
//! so it never needs the lambda it is deciding the target for.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use javelin_ast::{BinaryOp, LiteralKind, Node, NodeId, NodeKey, SyntaxNode, TypeRef, UnaryOp};
use tracing::{debug, debug_span, trace};

use crate::config::ResolverConfig;
use crate::context::{receiver_references, Context};
use crate::declarations::{MethodDeclaration, TypeDeclaration, ValueDeclaration};
use crate::error::{ResolveError, Result};
use crate::logic;
use crate::model::{param_type_for_argument, ConstructorUsage, MethodUsage, SymbolReference};
use crate::solver::TypeSolver;
use crate::source::{self, SourceTypeDeclaration};
use crate::types::{LambdaArgumentPlaceholder, PrimitiveType, ReferenceType, TypeUsage};

pub struct Resolver<'a> {
    solver: &'a dyn TypeSolver,
    config: ResolverConfig,
    with_lambdas: RefCell<HashMap<NodeKey, TypeUsage>>,
    without_lambdas: RefCell<HashMap<NodeKey, TypeUsage>>,
    depth: Cell<usize>,
}

/// Restores the nesting depth when a query returns.
struct DepthGuard<'r> {
    depth: &'r Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl<'a> Resolver<'a> {
    pub fn new(solver: &'a dyn TypeSolver) -> Self {
        Self::with_config(solver, ResolverConfig::default())
    }

    pub fn with_config(solver: &'a dyn TypeSolver, config: ResolverConfig) -> Self {
        Self {
            solver,
            config,
            with_lambdas: RefCell::new(HashMap::new()),
            without_lambdas: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
        }
    }

    #[must_use]
    pub fn solver(&self) -> &'a dyn TypeSolver {
        self.solver
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Number of memoized expression types, across both caches.
    #[must_use]
    pub fn cached_types(&self) -> usize {
        self.with_lambdas.borrow().len() + self.without_lambdas.borrow().len()
    }

    /// Drops every memoized type, e.g. after the trees the solver sees changed.
    pub fn clear_caches(&self) {
        self.with_lambdas.borrow_mut().clear();
        self.without_lambdas.borrow_mut().clear();
    }

    fn enter(&self) -> Result<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if depth > self.config.max_depth {
            return Err(ResolveError::ResolutionTooDeep {
                limit: self.config.max_depth,
            });
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// The type of an expression or of a declaration that introduces a value.
    pub fn type_of(&self, node: &SyntaxNode) -> Result<TypeUsage> {
        self.type_of_with(node, true)
    }

    /// With `solve_lambdas` unset, lambdas passed as call arguments are typed
    /// as placeholders instead of against the parameter they are passed to.
    pub fn type_of_with(&self, node: &SyntaxNode, solve_lambdas: bool) -> Result<TypeUsage> {
        let key = node.key();
        let cache = if solve_lambdas {
            &self.with_lambdas
        } else {
            &self.without_lambdas
        };
        let hit = cache.borrow().get(&key).cloned();
        if let Some(ty) = hit {
            trace!(?key, "type cache hit");
            return Ok(ty);
        }

        let _guard = self.enter()?;
        let span = debug_span!("type_of", ?key, kind = node.kind().kind_name(), solve_lambdas);
        let _entered = span.enter();
        let ty = self.compute(node, solve_lambdas)?;
        debug!(ty = %ty.describe(), "resolved");
        cache.borrow_mut().insert(key, ty.clone());
        Ok(ty)
    }

    fn compute(&self, node: &SyntaxNode, solve_lambdas: bool) -> Result<TypeUsage> {
        let child = |id: &NodeId| node.with_id(*id);
        match node.kind() {
            Node::Name { name } => self.type_of_name(node, name),
            Node::FieldAccess { scope, name } => {
                self.type_of_field_access(node, &child(scope), name)
            }
            Node::MethodCall { .. } => self.type_of_call(node, solve_lambdas),
            Node::Lambda { .. } => match argument_slot(node) {
                Some((_, index)) if !solve_lambdas => {
                    Ok(TypeUsage::LambdaPlaceholder(LambdaArgumentPlaceholder::new(index)))
                }
                _ => self.type_of_lambda(node),
            },
            Node::Literal(literal) => self.type_of_literal(literal.kind),
            Node::Unary {
                op: UnaryOp::Not, ..
            } => Ok(PrimitiveType::Boolean.into()),
            Node::Unary { operand, .. } => self.type_of_with(&child(operand), solve_lambdas),
            Node::Binary { op, left, .. } => {
                if yields_boolean(*op) {
                    Ok(PrimitiveType::Boolean.into())
                } else {
                    self.type_of_with(&child(left), solve_lambdas)
                }
            }
            Node::Conditional { then_expr, .. } => {
                self.type_of_with(&child(then_expr), solve_lambdas)
            }
            Node::InstanceOf { .. } => Ok(PrimitiveType::Boolean.into()),
            Node::Cast { ty, .. }
            | Node::ObjectCreation { ty, .. }
            | Node::VariableDeclaration { ty, .. } => self.convert_type(ty, node),
            Node::ArrayCreation { element, dims, .. } => {
                let mut ty = self.convert_type(element, node)?;
                for _ in 0..*dims {
                    ty = TypeUsage::array(ty);
                }
                Ok(ty)
            }
            Node::ArrayAccess { array, .. } => {
                let array = self.type_of_with(&child(array), solve_lambdas)?;
                Ok(array.as_array_component()?.clone())
            }
            Node::ClassLiteral { ty } => self.type_of_class_literal(ty, node),
            Node::This { qualifier } => self.type_of_this(node, qualifier.as_deref()),
            Node::Assign { target, .. } => self.type_of_with(&child(target), solve_lambdas),
            Node::Enclosed { inner } => self.type_of_with(&child(inner), solve_lambdas),
            Node::VariableDeclarator { array_dims, .. } => {
                let declared = match node.parent() {
                    Some(parent) => match parent.kind() {
                        Node::VariableDeclaration { ty, .. } | Node::Field { ty, .. } => {
                            self.convert_type(ty, &parent)?
                        }
                        other => {
                            return Err(ResolveError::unsupported(format!(
                                "declarator in a {}",
                                other.kind_name()
                            )))
                        }
                    },
                    None => return Err(ResolveError::unsupported("detached variable declarator")),
                };
                let mut ty = declared;
                for _ in 0..*array_dims {
                    ty = TypeUsage::array(ty);
                }
                Ok(ty)
            }
            Node::Parameter { ty, varargs, .. } => match ty {
                Some(ty) => {
                    let declared = self.convert_type(ty, node)?;
                    Ok(if *varargs { TypeUsage::array(declared) } else { declared })
                }
                None => self.type_of_implicit_parameter(node),
            },
            other => Err(ResolveError::unsupported(other.kind_name())),
        }
    }

    fn type_of_name(&self, node: &SyntaxNode, name: &str) -> Result<TypeUsage> {
        let context = Context::of(node);
        if let Some(value) = context.solve_symbol_as_value(name, self)? {
            return Ok(value.type_usage().clone());
        }
        // A type used as a qualifier, as in `Math.max(a, b)`.
        match context.solve_type(name, self.solver)? {
            SymbolReference::Solved(decl) => Ok(TypeUsage::reference(decl)),
            SymbolReference::Unsolved => Err(ResolveError::unresolved(name, context.describe())),
        }
    }

    fn type_of_field_access(
        &self,
        node: &SyntaxNode,
        scope: &SyntaxNode,
        name: &str,
    ) -> Result<TypeUsage> {
        let receiver = match self.type_of(scope) {
            Ok(receiver) => receiver,
            // Not a value: maybe a package prefix of a qualified type name.
            Err(err) if err.is_unresolved() => {
                let Some(dotted) = dotted_name(node) else {
                    return Err(err);
                };
                let context = Context::of(node);
                return context
                    .solve_type(&dotted, self.solver)?
                    .map(TypeUsage::reference)
                    .into_result(&dotted, &context.describe());
            }
            Err(err) => return Err(err),
        };

        if receiver.is_array() && name == "length" {
            return Ok(PrimitiveType::Int.into());
        }
        for candidate in receiver_references(&receiver, self.solver)? {
            if let Some((_, ty)) = logic::find_field(&candidate, name, self.solver)? {
                return Ok(ty);
            }
            let nested = candidate.declaration().nested_type(name, self.solver)?;
            if let SymbolReference::Solved(nested) = nested {
                return Ok(TypeUsage::reference(nested));
            }
        }
        Err(ResolveError::unresolved(name, receiver.describe()))
    }

    fn type_of_call(&self, call: &SyntaxNode, solve_lambdas: bool) -> Result<TypeUsage> {
        let Node::MethodCall { name, args, .. } = call.kind() else {
            return Err(ResolveError::invalid_cast("a method call", call.kind().kind_name()));
        };
        let usage = self
            .solve_method_as_usage(call)?
            .ok_or_else(|| ResolveError::unresolved(name.as_str(), Context::of(call).describe()))?;
        if !solve_lambdas || args.is_empty() {
            return Ok(usage.return_type().clone());
        }

        // Arguments typed without lambdas (placeholders, or calls left with
        // open variables such as the `R` of `Stream.map`) may bind more once
        // fully typed.
        let placeholders = self.argument_types(call, args)?;
        let actuals = args
            .iter()
            .map(|arg| self.type_of(&call.with_id(*arg)))
            .collect::<Result<Vec<_>>>()?;
        if actuals == placeholders {
            return Ok(usage.return_type().clone());
        }
        let SymbolReference::Solved(resolved) =
            Context::of(call).solve_method_resolved(name, &placeholders, self)?
        else {
            return Ok(usage.return_type().clone());
        };
        let return_type = logic::reinstantiated_return_type(&resolved, &actuals, self.solver)?;
        trace!(method = %usage, %return_type, "re-inferred with typed arguments");
        Ok(return_type)
    }

    fn type_of_lambda(&self, lambda: &SyntaxNode) -> Result<TypeUsage> {
        let Node::Lambda { body, .. } = lambda.kind() else {
            return Err(ResolveError::invalid_cast("a lambda", lambda.kind().kind_name()));
        };
        let target = self.target_type(lambda)?;
        let method = self.functional_target(&target)?;
        let target = logic::strip_wildcards(&target);

        let mut open = Vec::new();
        collect_type_variables(method.return_type(), &mut open);
        if open.is_empty() || method.return_type().is_void() {
            return Ok(target);
        }

        let body = lambda.with_id(*body);
        let result = match body.kind() {
            Node::Block { statements } => match statements.as_slice() {
                [only] => match body.ast().node(*only) {
                    Node::Return { expr: Some(expr) } => body.with_id(*expr),
                    _ => {
                        return Err(ResolveError::unsupported(
                            "lambda block without a single return",
                        ))
                    }
                },
                _ => return Err(ResolveError::unsupported("multi-statement lambda body")),
            },
            _ => body,
        };
        let body_type = self.type_of(&result)?;
        let bindings = logic::infer_bindings(
            &[method.return_type().clone()],
            false,
            &[body_type],
            &open,
            self.solver,
        )?;
        Ok(target.replace_params(&bindings))
    }

    /// The type an expression in `slot` is expected to have, from where it
    /// appears: call arguments, initializers, casts, assignments and returns.
    fn target_type(&self, slot: &SyntaxNode) -> Result<TypeUsage> {
        let parent = slot
            .parent()
            .ok_or_else(|| ResolveError::unsupported("detached lambda"))?;
        match parent.kind() {
            Node::MethodCall { name, .. } => {
                let index = argument_index(&parent, slot.id())
                    .ok_or_else(|| ResolveError::unsupported("lambda as a call receiver"))?;
                let usage = self.solve_method_as_usage(&parent)?.ok_or_else(|| {
                    ResolveError::unresolved(name.as_str(), Context::of(&parent).describe())
                })?;
                usage.param_type_for_argument(index)
            }
            Node::ObjectCreation { ty, .. } => {
                let index = argument_index(&parent, slot.id())
                    .ok_or_else(|| ResolveError::unsupported("lambda in a type position"))?;
                let usage = self
                    .solve_constructor_call(&parent)?
                    .into_result(&ty.to_string(), &Context::of(&parent).describe())?;
                let variadic = usage.declaration().is_variadic();
                param_type_for_argument(usage.param_types(), variadic, index).ok_or_else(|| {
                    ResolveError::invalid_cast("a constructor parameter", index.to_string())
                })
            }
            Node::VariableDeclarator { .. } => self.type_of(&parent),
            Node::Cast { ty, .. } => self.convert_type(ty, &parent),
            Node::Enclosed { .. } => self.target_type(&parent),
            Node::Assign { target, value, .. } if *value == slot.id() => {
                self.type_of(&parent.with_id(*target))
            }
            Node::Return { .. } => {
                let owner = parent
                    .ancestors()
                    .find(|node| matches!(node.kind(), Node::Method(_) | Node::Lambda { .. }))
                    .ok_or_else(|| ResolveError::unsupported("return outside a method"))?;
                match owner.kind() {
                    Node::Method(method) => self.convert_type(&method.return_type, &owner),
                    _ => Err(ResolveError::unsupported("lambda returned from a lambda")),
                }
            }
            other => Err(ResolveError::unsupported(format!("lambda in a {}", other.kind_name()))),
        }
    }

    fn functional_target(&self, target: &TypeUsage) -> Result<MethodUsage> {
        logic::functional_method(target, self.solver)?
            .ok_or_else(|| ResolveError::invalid_cast("a functional interface", target.describe()))
    }

    fn type_of_implicit_parameter(&self, param: &SyntaxNode) -> Result<TypeUsage> {
        let lambda = param
            .parent()
            .filter(|parent| matches!(parent.kind(), Node::Lambda { .. }))
            .ok_or_else(|| ResolveError::unsupported("untyped parameter outside a lambda"))?;
        let Node::Lambda { params, .. } = lambda.kind() else {
            return Err(ResolveError::unsupported("untyped parameter outside a lambda"));
        };
        let index = params
            .iter()
            .position(|id| *id == param.id())
            .ok_or_else(|| ResolveError::unsupported("parameter outside its lambda's list"))?;

        let target = self.target_type(&lambda)?;
        let method = self.functional_target(&target)?;
        if method.param_count() != params.len() {
            return Err(ResolveError::invalid_cast(
                format!("a lambda with {} parameters", method.param_count()),
                params.len().to_string(),
            ));
        }
        Ok(logic::strip_wildcards(&method.param_types()[index]))
    }

    fn type_of_literal(&self, kind: LiteralKind) -> Result<TypeUsage> {
        Ok(match kind {
            LiteralKind::Int => PrimitiveType::Int.into(),
            LiteralKind::Long => PrimitiveType::Long.into(),
            LiteralKind::Float => PrimitiveType::Float.into(),
            LiteralKind::Double => PrimitiveType::Double.into(),
            LiteralKind::Char => PrimitiveType::Char.into(),
            LiteralKind::Boolean => PrimitiveType::Boolean.into(),
            LiteralKind::String => {
                TypeUsage::reference(self.solver.solve_type("java.lang.String")?)
            }
            LiteralKind::Null => TypeUsage::Null,
        })
    }

    /// `Class<T>` with primitives boxed; raw `Class` when the boxed type is
    /// unknown to the solver.
    fn type_of_class_literal(&self, ty: &TypeRef, scope: &SyntaxNode) -> Result<TypeUsage> {
        let class = self.solver.solve_type("java.lang.Class")?;
        let arg = match self.convert_type(ty, scope)? {
            TypeUsage::Primitive(prim) => self.solver.try_solve_type(prim.boxed_name())?.solved(),
            TypeUsage::Void => self.solver.try_solve_type("java.lang.Void")?.solved(),
            other => {
                return Ok(TypeUsage::Reference(ReferenceType::new(class, vec![other])?));
            }
        };
        Ok(match arg {
            Some(boxed) => {
                let boxed = TypeUsage::reference(boxed);
                TypeUsage::Reference(ReferenceType::new(class, vec![boxed])?)
            }
            None => TypeUsage::reference(class),
        })
    }

    fn type_of_this(&self, node: &SyntaxNode, qualifier: Option<&str>) -> Result<TypeUsage> {
        let owner = node
            .ancestors()
            .filter(|ancestor| match ancestor.kind() {
                Node::TypeDecl(decl) => qualifier.map_or(true, |name| decl.name == name),
                _ => false,
            })
            .find_map(SourceTypeDeclaration::new)
            .ok_or_else(|| {
                ResolveError::unresolved(qualifier.unwrap_or("this"), Context::of(node).describe())
            })?;
        Ok(TypeUsage::Reference(TypeDeclaration::Source(owner).self_type()?))
    }

    /// Argument types as overload resolution sees them.
    fn argument_types(&self, call: &SyntaxNode, args: &[NodeId]) -> Result<Vec<TypeUsage>> {
        args.iter()
            .map(|arg| self.type_of_with(&call.with_id(*arg), false))
            .collect()
    }

    /// The declaration a name expression refers to.
    pub fn solve_name(&self, node: &SyntaxNode) -> Result<SymbolReference<ValueDeclaration>> {
        let Node::Name { name } = node.kind() else {
            return Err(ResolveError::invalid_cast("a name expression", node.kind().kind_name()));
        };
        Context::of(node).solve_symbol(name, self)
    }

    pub fn solve_method_call(
        &self,
        call: &SyntaxNode,
    ) -> Result<SymbolReference<MethodDeclaration>> {
        let Node::MethodCall { name, args, .. } = call.kind() else {
            return Err(ResolveError::invalid_cast("a method call", call.kind().kind_name()));
        };
        let args = self.argument_types(call, args)?;
        Context::of(call).solve_method(name, &args, self)
    }

    /// The method a call binds to, with receiver and inferred type arguments
    /// applied. Lambda arguments are matched as placeholders.
    pub fn solve_method_as_usage(&self, call: &SyntaxNode) -> Result<Option<MethodUsage>> {
        let Node::MethodCall { name, args, .. } = call.kind() else {
            return Err(ResolveError::invalid_cast("a method call", call.kind().kind_name()));
        };
        let _guard = self.enter()?;
        let span = debug_span!("solve_method", name = name.as_str());
        let _entered = span.enter();
        let args = self.argument_types(call, args)?;
        Context::of(call).solve_method_as_usage(name, &args, self)
    }

    pub fn solve_constructor_call(
        &self,
        creation: &SyntaxNode,
    ) -> Result<SymbolReference<ConstructorUsage>> {
        let Node::ObjectCreation { ty, args } = creation.kind() else {
            return Err(ResolveError::invalid_cast(
                "an object creation",
                creation.kind().kind_name(),
            ));
        };
        let TypeUsage::Reference(created) = self.convert_type(ty, creation)? else {
            return Err(ResolveError::invalid_cast("a class type", ty.to_string()));
        };
        let args = self.argument_types(creation, args)?;
        match logic::solve_constructor(&created, &args, self.solver)? {
            SymbolReference::Solved(resolved) => {
                let usage = logic::instantiate_constructor(resolved, &args, self.solver)?;
                Ok(SymbolReference::Solved(usage))
            }
            SymbolReference::Unsolved => Ok(SymbolReference::Unsolved),
        }
    }

    /// Converts a written type as seen from `scope`.
    pub fn convert_type(&self, ty: &TypeRef, scope: &SyntaxNode) -> Result<TypeUsage> {
        source::convert_at(ty, scope, self.solver)
    }

    /// What the type name `name` means at `scope`: a type variable bound by
    /// an enclosing call or receiver first, then a declared type.
    pub fn solve_type_usage(&self, name: &str, scope: &SyntaxNode) -> Result<TypeUsage> {
        let context = Context::of(scope);
        if let Some(bound) = context.solve_generic_type(name, self)? {
            return Ok(bound);
        }
        match context.solve_type(name, self.solver)? {
            SymbolReference::Solved(TypeDeclaration::SourceTypeVariable(var)) => {
                Ok(TypeUsage::TypeVariable(var.as_type_parameter()))
            }
            SymbolReference::Solved(decl) => Ok(TypeUsage::reference(decl)),
            SymbolReference::Unsolved => Err(ResolveError::unresolved(name, context.describe())),
        }
    }

    /// The type `this` denotes at `node`.
    pub fn this_type(&self, node: &SyntaxNode) -> Result<TypeUsage> {
        self.type_of_this(node, None)
    }
}

fn yields_boolean(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Or
            | BinaryOp::And
            | BinaryOp::Equals
            | BinaryOp::NotEquals
            | BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessEquals
            | BinaryOp::GreaterEquals
    )
}

fn argument_index(invocation: &SyntaxNode, arg: NodeId) -> Option<usize> {
    match invocation.kind() {
        Node::MethodCall { args, .. } | Node::ObjectCreation { args, .. } => {
            args.iter().position(|id| *id == arg)
        }
        _ => None,
    }
}

/// The call and argument position `node` is passed at, if any.
fn argument_slot(node: &SyntaxNode) -> Option<(SyntaxNode, usize)> {
    let parent = node.parent()?;
    let index = argument_index(&parent, node.id())?;
    Some((parent, index))
}

/// `a.b.c` for a chain of plain names, `None` otherwise.
fn dotted_name(node: &SyntaxNode) -> Option<String> {
    match node.kind() {
        Node::Name { name } => Some(name.clone()),
        Node::FieldAccess { scope, name } => {
            let prefix = dotted_name(&node.with_id(*scope))?;
            Some(format!("{prefix}.{name}"))
        }
        _ => None,
    }
}

fn collect_type_variables(ty: &TypeUsage, out: &mut Vec<String>) {
    match ty {
        TypeUsage::TypeVariable(param) => {
            if !out.iter().any(|name| name == param.name()) {
                out.push(param.name().to_string());
            }
        }
        TypeUsage::Array(component) => collect_type_variables(component, out),
        TypeUsage::Wildcard(wildcard) => {
            if let Some(bound) = wildcard.bound() {
                collect_type_variables(bound, out);
            }
        }
        TypeUsage::Reference(reference) => {
            for arg in reference.type_arguments() {
                collect_type_variables(arg, out);
            }
        }
        _ => {}
    }
}
