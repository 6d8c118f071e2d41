//! Declarations read straight from syntax trees.

use std::fmt;
use std::sync::Arc;

use javelin_ast::{
    Ast, ConstructorDecl, MethodDecl, Node, SyntaxNode, TypeDecl, TypeDeclKind, TypeRef,
};

use crate::context::Context;
use crate::convert::{type_ref_to_usage, NamedType};
use crate::declarations::{
    ConstructorDeclaration, FieldDeclaration, MethodDeclaration, TypeDeclaration, TypeKind,
};
use crate::error::{ResolveError, Result};
use crate::model::{ParameterDeclaration, SymbolReference};
use crate::solver::TypeSolver;
use crate::types::{
    ReferenceType, TypeParameter, TypeParameterOrigin, TypeParameterOwner, TypeUsage, OBJECT,
};

/// Converts `ty` as written at `scope`.
pub(crate) fn convert_at(
    ty: &TypeRef,
    scope: &SyntaxNode,
    solver: &dyn TypeSolver,
) -> Result<TypeUsage> {
    let context = Context::of(scope);
    type_ref_to_usage(ty, &mut |name| match context.solve_type(name, solver)? {
        SymbolReference::Solved(TypeDeclaration::SourceTypeVariable(var)) => {
            Ok(NamedType::Variable(var.as_type_parameter()))
        }
        SymbolReference::Solved(decl) => Ok(NamedType::Declaration(decl)),
        SymbolReference::Unsolved => Err(ResolveError::unresolved(name, context.describe())),
    })
}

fn object_type(solver: &dyn TypeSolver) -> Result<ReferenceType> {
    Ok(ReferenceType::raw(solver.solve_type(OBJECT)?))
}

fn expect_reference(ty: TypeUsage) -> Result<ReferenceType> {
    match ty {
        TypeUsage::Reference(reference) => Ok(reference),
        other => Err(ResolveError::invalid_cast(
            "a class or interface type",
            other.describe(),
        )),
    }
}

fn enclosing_type_node(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.ancestors()
        .find(|ancestor| matches!(ancestor.kind(), Node::TypeDecl(_)))
}

fn qualified_name_of(node: &SyntaxNode) -> String {
    let mut parts: Vec<String> =
        node.kind().declared_name().map(str::to_string).into_iter().collect();
    for ancestor in node.ancestors() {
        match ancestor.kind() {
            Node::TypeDecl(decl) => parts.push(decl.name.clone()),
            Node::CompilationUnit {
                package: Some(package),
                ..
            } => parts.push(package.clone()),
            _ => {}
        }
    }
    parts.reverse();
    parts.join(".")
}

/// The type parameter declared by a `TypeParameter` node.
pub(crate) fn type_parameter_of(node: &SyntaxNode) -> Option<TypeParameter> {
    let Node::TypeParameter { name, .. } = node.kind() else {
        return None;
    };
    let parent = node.parent()?;
    let owner = match parent.kind() {
        Node::TypeDecl(_) => TypeParameterOwner::Type(qualified_name_of(&parent)),
        Node::Method(MethodDecl { name: method, .. })
        | Node::Constructor(ConstructorDecl { name: method, .. }) => TypeParameterOwner::Method {
            declaring_type: enclosing_type_node(&parent)
                .map(|owner| qualified_name_of(&owner))
                .unwrap_or_default(),
            name: method.clone(),
            slot: parent.id().idx(),
        },
        _ => return None,
    };
    Some(TypeParameter::new(
        name.clone(),
        owner,
        TypeParameterOrigin::Source(node.clone()),
    ))
}

pub(crate) fn type_parameter_bounds(
    node: &SyntaxNode,
    solver: &dyn TypeSolver,
) -> Result<Vec<TypeUsage>> {
    let Node::TypeParameter { bounds, .. } = node.kind() else {
        return Ok(Vec::new());
    };
    bounds
        .iter()
        .map(|bound| convert_at(bound, node, solver))
        .collect()
}

fn type_parameters_of(node: &SyntaxNode, ids: &[javelin_ast::NodeId]) -> Vec<TypeParameter> {
    ids.iter()
        .filter_map(|id| type_parameter_of(&node.with_id(*id)))
        .collect()
}

fn params_of(
    node: &SyntaxNode,
    ids: &[javelin_ast::NodeId],
    solver: &dyn TypeSolver,
) -> Result<Vec<ParameterDeclaration>> {
    ids.iter()
        .map(|id| {
            let param = node.with_id(*id);
            let Node::Parameter { name, ty, varargs } = param.kind() else {
                return Err(ResolveError::unsupported(param.kind().kind_name()));
            };
            let ty = ty.as_ref().ok_or_else(|| {
                ResolveError::unsupported(format!("implicitly typed parameter `{name}`"))
            })?;
            let mut type_usage = convert_at(ty, node, solver)?;
            if *varargs {
                type_usage = TypeUsage::array(type_usage);
            }
            Ok(ParameterDeclaration {
                name: Some(name.clone()),
                type_usage,
                is_variadic: *varargs,
            })
        })
        .collect()
}

fn last_param_is_varargs(node: &SyntaxNode, ids: &[javelin_ast::NodeId]) -> bool {
    ids.last().is_some_and(|id| {
        matches!(
            node.with_id(*id).kind(),
            Node::Parameter { varargs: true, .. }
        )
    })
}

/// A class, interface or enum declared in a syntax tree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceTypeDeclaration {
    node: SyntaxNode,
}

impl SourceTypeDeclaration {
    /// `None` unless `node` is a type declaration.
    #[must_use]
    pub fn new(node: SyntaxNode) -> Option<Self> {
        matches!(node.kind(), Node::TypeDecl(_)).then_some(SourceTypeDeclaration { node })
    }

    #[must_use]
    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    fn decl(&self) -> &TypeDecl {
        match self.node.kind() {
            Node::TypeDecl(decl) => decl,
            other => unreachable!("source type declaration over a {}", other.kind_name()),
        }
    }

    fn wrap(&self) -> TypeDeclaration {
        TypeDeclaration::Source(self.clone())
    }

    pub(crate) fn qualified_name(&self) -> String {
        qualified_name_of(&self.node)
    }

    pub(crate) fn name(&self) -> String {
        self.decl().name.clone()
    }

    pub(crate) fn kind(&self) -> TypeKind {
        match self.decl().kind {
            TypeDeclKind::Class => TypeKind::Class,
            TypeDeclKind::Interface => TypeKind::Interface,
            TypeDeclKind::Enum => TypeKind::Enum,
        }
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        Ok(type_parameters_of(&self.node, &self.decl().type_params))
    }

    pub(crate) fn superclass(&self, solver: &dyn TypeSolver) -> Result<Option<ReferenceType>> {
        let decl = self.decl();
        match decl.kind {
            TypeDeclKind::Interface => Ok(None),
            TypeDeclKind::Enum => {
                let SymbolReference::Solved(base) = solver.try_solve_type("java.lang.Enum")? else {
                    return object_type(solver).map(Some);
                };
                if base.type_parameters()?.len() != 1 {
                    return Ok(Some(ReferenceType::raw(base)));
                }
                let this = TypeUsage::reference(self.wrap());
                Ok(Some(ReferenceType::from_parts(base, vec![this].into())))
            }
            TypeDeclKind::Class => match decl.extends.first() {
                Some(ty) => convert_at(ty, &self.node, solver).and_then(expect_reference).map(Some),
                None if self.qualified_name() == OBJECT => Ok(None),
                None => object_type(solver).map(Some),
            },
        }
    }

    pub(crate) fn interfaces(&self, solver: &dyn TypeSolver) -> Result<Vec<ReferenceType>> {
        let decl = self.decl();
        let written = match decl.kind {
            TypeDeclKind::Interface => &decl.extends,
            TypeDeclKind::Class | TypeDeclKind::Enum => &decl.implements,
        };
        written
            .iter()
            .map(|ty| convert_at(ty, &self.node, solver).and_then(expect_reference))
            .collect()
    }

    fn members(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.decl().members.iter().map(|id| self.node.with_id(*id))
    }

    pub(crate) fn declared_fields(&self) -> Result<Vec<FieldDeclaration>> {
        let mut fields = Vec::new();
        for member in self.members() {
            match member.kind() {
                Node::EnumConstant { .. } => fields.push(member.clone()),
                Node::Field { variables, .. } => {
                    fields.extend(variables.iter().map(|id| member.with_id(*id)));
                }
                _ => {}
            }
        }
        Ok(fields
            .into_iter()
            .map(|node| {
                FieldDeclaration::Source(SourceField {
                    node,
                    owner: self.clone(),
                })
            })
            .collect())
    }

    pub(crate) fn declared_methods(&self) -> Result<Vec<MethodDeclaration>> {
        Ok(self
            .members()
            .filter(|member| matches!(member.kind(), Node::Method(_)))
            .map(|node| {
                MethodDeclaration::Source(SourceMethod {
                    node,
                    owner: self.clone(),
                })
            })
            .collect())
    }

    /// Only constructors written in source; no implicit default constructor.
    pub(crate) fn declared_constructors(&self) -> Result<Vec<ConstructorDeclaration>> {
        Ok(self
            .members()
            .filter(|member| matches!(member.kind(), Node::Constructor(_)))
            .map(|node| {
                ConstructorDeclaration::Source(SourceConstructor {
                    node,
                    owner: self.clone(),
                })
            })
            .collect())
    }

    pub(crate) fn nested_type(
        &self,
        name: &str,
        _solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<TypeDeclaration>> {
        Ok(self
            .members()
            .find(|member| matches!(member.kind(), Node::TypeDecl(decl) if decl.name == name))
            .and_then(SourceTypeDeclaration::new)
            .map(TypeDeclaration::Source)
            .into())
    }
}

impl fmt::Debug for SourceTypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceTypeDeclaration({})", self.qualified_name())
    }
}

/// A type variable found by name lookup in a source scope.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceTypeVariable {
    node: SyntaxNode,
}

impl SourceTypeVariable {
    #[must_use]
    pub fn new(node: SyntaxNode) -> Option<Self> {
        type_parameter_of(&node).map(|_| SourceTypeVariable { node })
    }

    #[must_use]
    pub fn as_type_parameter(&self) -> TypeParameter {
        type_parameter_of(&self.node).unwrap_or_else(|| {
            TypeParameter::new(
                self.name(),
                TypeParameterOwner::Type(String::new()),
                TypeParameterOrigin::Free,
            )
        })
    }

    pub(crate) fn qualified_name(&self) -> String {
        self.name()
    }

    pub(crate) fn name(&self) -> String {
        self.node.kind().declared_name().unwrap_or_default().to_string()
    }

    pub(crate) fn kind(&self) -> TypeKind {
        TypeKind::TypeVariable
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        Ok(Vec::new())
    }

    pub(crate) fn superclass(&self, _solver: &dyn TypeSolver) -> Result<Option<ReferenceType>> {
        Ok(None)
    }

    /// Bounds that are interfaces.
    pub(crate) fn interfaces(&self, solver: &dyn TypeSolver) -> Result<Vec<ReferenceType>> {
        Ok(type_parameter_bounds(&self.node, solver)?
            .into_iter()
            .filter_map(|bound| match bound {
                TypeUsage::Reference(reference) if reference.declaration().is_interface() => {
                    Some(reference)
                }
                _ => None,
            })
            .collect())
    }

    pub(crate) fn declared_fields(&self) -> Result<Vec<FieldDeclaration>> {
        Ok(Vec::new())
    }

    pub(crate) fn declared_methods(&self) -> Result<Vec<MethodDeclaration>> {
        Ok(Vec::new())
    }

    pub(crate) fn declared_constructors(&self) -> Result<Vec<ConstructorDeclaration>> {
        Ok(Vec::new())
    }

    pub(crate) fn nested_type(
        &self,
        _name: &str,
        _solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<TypeDeclaration>> {
        Ok(SymbolReference::Unsolved)
    }
}

impl fmt::Debug for SourceTypeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceTypeVariable({})", self.name())
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceMethod {
    node: SyntaxNode,
    owner: SourceTypeDeclaration,
}

impl SourceMethod {
    #[must_use]
    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    fn decl(&self) -> &MethodDecl {
        match self.node.kind() {
            Node::Method(decl) => decl,
            other => unreachable!("source method over a {}", other.kind_name()),
        }
    }

    pub(crate) fn name(&self) -> String {
        self.decl().name.clone()
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Source(self.owner.clone())
    }

    pub(crate) fn param_count(&self) -> usize {
        self.decl().params.len()
    }

    pub(crate) fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        params_of(&self.node, &self.decl().params, solver)
    }

    pub(crate) fn return_type(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        convert_at(&self.decl().return_type, &self.node, solver)
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        Ok(type_parameters_of(&self.node, &self.decl().type_params))
    }

    pub(crate) fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        self.decl()
            .throws
            .iter()
            .map(|ty| convert_at(ty, &self.node, solver))
            .collect()
    }

    pub(crate) fn is_variadic(&self) -> bool {
        last_param_is_varargs(&self.node, &self.decl().params)
    }

    pub(crate) fn is_static(&self) -> bool {
        self.decl().modifiers.is_static()
    }

    /// Interface methods without a body are implicitly abstract.
    pub(crate) fn is_abstract(&self) -> bool {
        let decl = self.decl();
        decl.modifiers.is_abstract()
            || (self.owner.kind() == TypeKind::Interface
                && decl.body.is_none()
                && !decl.modifiers.is_static()
                && !decl.modifiers.is_default())
    }

    pub(crate) fn is_default(&self) -> bool {
        self.decl().modifiers.is_default()
    }
}

impl fmt::Debug for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceMethod({}.{})", self.owner.qualified_name(), self.name())
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceConstructor {
    node: SyntaxNode,
    owner: SourceTypeDeclaration,
}

impl SourceConstructor {
    fn decl(&self) -> &ConstructorDecl {
        match self.node.kind() {
            Node::Constructor(decl) => decl,
            other => unreachable!("source constructor over a {}", other.kind_name()),
        }
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Source(self.owner.clone())
    }

    pub(crate) fn param_count(&self) -> usize {
        self.decl().params.len()
    }

    pub(crate) fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        params_of(&self.node, &self.decl().params, solver)
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        Ok(type_parameters_of(&self.node, &self.decl().type_params))
    }

    pub(crate) fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        self.decl()
            .throws
            .iter()
            .map(|ty| convert_at(ty, &self.node, solver))
            .collect()
    }

    pub(crate) fn is_variadic(&self) -> bool {
        last_param_is_varargs(&self.node, &self.decl().params)
    }

    pub(crate) fn is_private(&self) -> bool {
        self.decl().modifiers.is_private()
    }

    pub(crate) fn is_package_protected(&self) -> bool {
        self.decl().modifiers.is_package_private()
    }
}

impl fmt::Debug for SourceConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceConstructor({})", self.owner.qualified_name())
    }
}

/// A field declarator or an enum constant.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceField {
    node: SyntaxNode,
    owner: SourceTypeDeclaration,
}

impl SourceField {
    pub(crate) fn name(&self) -> String {
        self.node.kind().declared_name().unwrap_or_default().to_string()
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Source(self.owner.clone())
    }

    /// Enum constants and interface fields are implicitly static.
    pub(crate) fn is_static(&self) -> bool {
        match self.node.kind() {
            Node::EnumConstant { .. } => true,
            _ => {
                self.owner.kind() == TypeKind::Interface
                    || matches!(
                        self.node.parent().as_ref().map(SyntaxNode::kind),
                        Some(Node::Field { modifiers, .. }) if modifiers.is_static()
                    )
            }
        }
    }

    pub(crate) fn type_usage(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        match self.node.kind() {
            Node::EnumConstant { .. } => Ok(TypeUsage::reference(TypeDeclaration::Source(
                self.owner.clone(),
            ))),
            Node::VariableDeclarator { array_dims, .. } => {
                let field = self
                    .node
                    .parent()
                    .ok_or_else(|| ResolveError::unsupported("detached variable declarator"))?;
                let Node::Field { ty, .. } = field.kind() else {
                    return Err(ResolveError::unsupported(field.kind().kind_name()));
                };
                let mut type_usage = convert_at(ty, &field, solver)?;
                for _ in 0..*array_dims {
                    type_usage = TypeUsage::array(type_usage);
                }
                Ok(type_usage)
            }
            other => Err(ResolveError::unsupported(other.kind_name())),
        }
    }
}

impl fmt::Debug for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceField({}.{})", self.owner.qualified_name(), self.name())
    }
}

/// A parameter or local variable; its type is computed by the resolver.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceSymbol {
    node: SyntaxNode,
}

impl SourceSymbol {
    pub(crate) fn new(node: SyntaxNode) -> Self {
        SourceSymbol { node }
    }

    #[must_use]
    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.node.kind().declared_name().unwrap_or_default()
    }
}

impl fmt::Debug for SourceSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceSymbol({} {:?})", self.name(), self.node)
    }
}

/// Types declared in a set of compilation units.
#[derive(Debug, Clone, Default)]
pub struct SourceTypeSolver {
    units: Vec<Arc<Ast>>,
}

impl SourceTypeSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unit(mut self, unit: Arc<Ast>) -> Self {
        self.add(unit);
        self
    }

    pub fn add(&mut self, unit: Arc<Ast>) {
        self.units.push(unit);
    }

    fn find_in(unit: &Arc<Ast>, name: &str) -> Option<SourceTypeDeclaration> {
        let root = SyntaxNode::root(unit);
        let Node::CompilationUnit { package, types, .. } = root.kind() else {
            return None;
        };
        let path = match package {
            Some(package) => name.strip_prefix(package.as_str())?.strip_prefix('.')?,
            None => name,
        };
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = types
            .iter()
            .map(|id| root.with_id(*id))
            .find(|node| node.kind().declared_name() == Some(first))
            .and_then(SourceTypeDeclaration::new)?;
        for segment in segments {
            let next = current
                .members()
                .find(|member| {
                    matches!(member.kind(), Node::TypeDecl(decl) if decl.name == segment)
                })
                .and_then(SourceTypeDeclaration::new)?;
            current = next;
        }
        Some(current)
    }
}

impl TypeSolver for SourceTypeSolver {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>> {
        let found = self
            .units
            .iter()
            .find_map(|unit| Self::find_in(unit, name))
            .map(TypeDeclaration::Source);
        tracing::debug!(name, found = found.is_some(), "source lookup");
        Ok(found.into())
    }
}
