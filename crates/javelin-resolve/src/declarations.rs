//! The declaration model.
//!
//! Each concept is an enum over the three backends. Backends answer local
//! questions (what is declared here); everything that walks the hierarchy
//! lives in [`crate::logic`] and works the same for all of them.

use crate::bytecode::{BytecodeConstructor, BytecodeField, BytecodeMethod, BytecodeTypeDeclaration};
use crate::error::{ResolveError, Result};
use crate::logic;
use crate::model::{ParameterDeclaration, SymbolReference};
use crate::reflection::{
    ReflectedConstructor, ReflectedField, ReflectedMethod, ReflectedTypeDeclaration,
};
use crate::resolver::Resolver;
use crate::solver::TypeSolver;
use crate::source::{
    SourceConstructor, SourceField, SourceMethod, SourceSymbol, SourceTypeDeclaration,
    SourceTypeVariable,
};
use crate::types::{ReferenceType, TypeParameter, TypeUsage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    TypeVariable,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDeclaration {
    Source(SourceTypeDeclaration),
    SourceTypeVariable(SourceTypeVariable),
    Bytecode(BytecodeTypeDeclaration),
    Reflected(ReflectedTypeDeclaration),
}

macro_rules! dispatch {
    ($value:expr, $decl:ident => $body:expr) => {
        match $value {
            TypeDeclaration::Source($decl) => $body,
            TypeDeclaration::SourceTypeVariable($decl) => $body,
            TypeDeclaration::Bytecode($decl) => $body,
            TypeDeclaration::Reflected($decl) => $body,
        }
    };
}

impl TypeDeclaration {
    #[must_use]
    pub fn qualified_name(&self) -> String {
        dispatch!(self, decl => decl.qualified_name())
    }

    /// Simple name.
    #[must_use]
    pub fn name(&self) -> String {
        dispatch!(self, decl => decl.name())
    }

    #[must_use]
    pub fn kind(&self) -> TypeKind {
        dispatch!(self, decl => decl.kind())
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        self.kind() == TypeKind::Class
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind() == TypeKind::Interface
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind() == TypeKind::Enum
    }

    #[must_use]
    pub fn is_type_variable(&self) -> bool {
        self.kind() == TypeKind::TypeVariable
    }

    pub fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        dispatch!(self, decl => decl.type_parameters())
    }

    /// Direct superclass; `None` for interfaces, type variables and `Object`.
    pub fn superclass(&self, solver: &dyn TypeSolver) -> Result<Option<ReferenceType>> {
        dispatch!(self, decl => decl.superclass(solver))
    }

    /// Directly implemented (or, for interfaces, extended) interfaces.
    pub fn interfaces(&self, solver: &dyn TypeSolver) -> Result<Vec<ReferenceType>> {
        dispatch!(self, decl => decl.interfaces(solver))
    }

    pub fn declared_fields(&self) -> Result<Vec<FieldDeclaration>> {
        dispatch!(self, decl => decl.declared_fields())
    }

    pub fn declared_methods(&self) -> Result<Vec<MethodDeclaration>> {
        dispatch!(self, decl => decl.declared_methods())
    }

    /// Only classes and enums have constructors; other kinds fail with
    /// [`ResolveError::InvalidCast`].
    pub fn declared_constructors(&self) -> Result<Vec<ConstructorDeclaration>> {
        match self.kind() {
            TypeKind::Class | TypeKind::Enum => {}
            TypeKind::Interface | TypeKind::TypeVariable => {
                return Err(ResolveError::invalid_cast(
                    "a class",
                    format!("`{}`", self.qualified_name()),
                ))
            }
        }
        dispatch!(self, decl => decl.declared_constructors())
    }

    /// Member type `name`; a dotted `name` walks nested levels.
    pub fn nested_type(
        &self,
        name: &str,
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<TypeDeclaration>> {
        let (first, rest) = match name.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        let found = dispatch!(self, decl => decl.nested_type(first, solver))?;
        match (found, rest) {
            (SymbolReference::Solved(nested), Some(rest)) => nested.nested_type(rest, solver),
            (found, _) => Ok(found),
        }
    }

    /// Use of this declaration applied to its own type variables.
    pub fn self_type(&self) -> Result<ReferenceType> {
        let args: Vec<TypeUsage> = self
            .type_parameters()?
            .into_iter()
            .map(TypeUsage::TypeVariable)
            .collect();
        Ok(ReferenceType::from_parts(self.clone(), args.into()))
    }

    pub fn all_ancestors(&self, solver: &dyn TypeSolver) -> Result<Vec<ReferenceType>> {
        logic::all_ancestors(&ReferenceType::raw(self.clone()), solver)
    }

    /// Declared fields followed by those of every ancestor.
    pub fn all_fields(&self, solver: &dyn TypeSolver) -> Result<Vec<FieldDeclaration>> {
        logic::all_fields(self, solver)
    }

    pub fn solve_field(
        &self,
        name: &str,
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<FieldDeclaration>> {
        Ok(self
            .all_fields(solver)?
            .into_iter()
            .find(|field| field.name() == name)
            .into())
    }

    pub fn field(&self, name: &str, solver: &dyn TypeSolver) -> Result<FieldDeclaration> {
        self.solve_field(name, solver)?
            .into_result(name, &self.qualified_name())
    }

    pub fn has_field(&self, name: &str, solver: &dyn TypeSolver) -> Result<bool> {
        Ok(self.solve_field(name, solver)?.is_solved())
    }

    /// Overload resolution against this type and its ancestors, with the
    /// declaration's own type variables left unsubstituted.
    pub fn solve_method(
        &self,
        name: &str,
        args: &[TypeUsage],
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<MethodDeclaration>> {
        Ok(logic::solve_method(&ReferenceType::raw(self.clone()), name, args, solver)?
            .map(|found| found.declaration))
    }

    /// Whether `other` is this declaration or one of its subtypes.
    pub fn is_assignable_by(
        &self,
        other: &TypeDeclaration,
        solver: &dyn TypeSolver,
    ) -> Result<bool> {
        let target = self.qualified_name();
        if other.qualified_name() == target {
            return Ok(true);
        }
        Ok(other
            .all_ancestors(solver)?
            .iter()
            .any(|ancestor| ancestor.qualified_name() == target))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodDeclaration {
    Source(SourceMethod),
    Bytecode(BytecodeMethod),
    Reflected(ReflectedMethod),
}

macro_rules! dispatch_member {
    ($enum:ident, $value:expr, $member:ident => $body:expr) => {
        match $value {
            $enum::Source($member) => $body,
            $enum::Bytecode($member) => $body,
            $enum::Reflected($member) => $body,
        }
    };
}

impl MethodDeclaration {
    #[must_use]
    pub fn name(&self) -> String {
        dispatch_member!(MethodDeclaration, self, method => method.name())
    }

    #[must_use]
    pub fn declaring_type(&self) -> TypeDeclaration {
        dispatch_member!(MethodDeclaration, self, method => method.declaring_type())
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        dispatch_member!(MethodDeclaration, self, method => method.param_count())
    }

    pub fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        dispatch_member!(MethodDeclaration, self, method => method.params(solver))
    }

    pub fn param(&self, idx: usize, solver: &dyn TypeSolver) -> Result<ParameterDeclaration> {
        let count = self.param_count();
        self.params(solver)?.into_iter().nth(idx).ok_or_else(|| {
            ResolveError::invalid_cast(
                format!("a parameter index below {count}"),
                idx.to_string(),
            )
        })
    }

    pub fn return_type(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        dispatch_member!(MethodDeclaration, self, method => method.return_type(solver))
    }

    pub fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        dispatch_member!(MethodDeclaration, self, method => method.type_parameters())
    }

    pub fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        dispatch_member!(MethodDeclaration, self, method => method.exception_types(solver))
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        dispatch_member!(MethodDeclaration, self, method => method.is_variadic())
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        dispatch_member!(MethodDeclaration, self, method => method.is_static())
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        dispatch_member!(MethodDeclaration, self, method => method.is_abstract())
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        dispatch_member!(MethodDeclaration, self, method => method.is_default())
    }

    /// `Type.name(param, types)` for diagnostics.
    pub fn signature(&self, solver: &dyn TypeSolver) -> Result<String> {
        let params = self
            .params(solver)?
            .iter()
            .map(|param| param.type_usage.describe())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "{}.{}({params})",
            self.declaring_type().qualified_name(),
            self.name()
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstructorDeclaration {
    Source(SourceConstructor),
    Bytecode(BytecodeConstructor),
    Reflected(ReflectedConstructor),
}

impl ConstructorDeclaration {
    /// Simple name of the declaring class.
    #[must_use]
    pub fn name(&self) -> String {
        self.declaring_type().name()
    }

    #[must_use]
    pub fn declaring_type(&self) -> TypeDeclaration {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.declaring_type())
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.param_count())
    }

    pub fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.params(solver))
    }

    pub fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.type_parameters())
    }

    pub fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.exception_types(solver))
    }

    /// The last parameter is variadic.
    #[must_use]
    pub fn is_variadic(&self) -> bool {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.is_variadic())
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.is_private())
    }

    #[must_use]
    pub fn is_package_protected(&self) -> bool {
        dispatch_member!(ConstructorDeclaration, self, ctor => ctor.is_package_protected())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldDeclaration {
    Source(SourceField),
    Bytecode(BytecodeField),
    Reflected(ReflectedField),
}

impl FieldDeclaration {
    #[must_use]
    pub fn name(&self) -> String {
        dispatch_member!(FieldDeclaration, self, field => field.name())
    }

    #[must_use]
    pub fn declaring_type(&self) -> TypeDeclaration {
        dispatch_member!(FieldDeclaration, self, field => field.declaring_type())
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        dispatch_member!(FieldDeclaration, self, field => field.is_static())
    }

    /// Declared type, unsubstituted.
    pub fn type_usage(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        dispatch_member!(FieldDeclaration, self, field => field.type_usage(solver))
    }
}

/// Anything a simple name can denote as a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueDeclaration {
    Field(FieldDeclaration),
    Parameter(SourceSymbol),
    Variable(SourceSymbol),
}

impl ValueDeclaration {
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            ValueDeclaration::Field(field) => field.name(),
            ValueDeclaration::Parameter(symbol) | ValueDeclaration::Variable(symbol) => {
                symbol.name().to_string()
            }
        }
    }

    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self, ValueDeclaration::Field(_))
    }

    #[must_use]
    pub fn is_parameter(&self) -> bool {
        matches!(self, ValueDeclaration::Parameter(_))
    }

    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, ValueDeclaration::Variable(_))
    }

    /// Declared type; implicitly typed lambda parameters are inferred.
    pub fn type_usage(&self, resolver: &Resolver<'_>) -> Result<TypeUsage> {
        match self {
            ValueDeclaration::Field(field) => field.type_usage(resolver.solver()),
            ValueDeclaration::Parameter(symbol) | ValueDeclaration::Variable(symbol) => {
                resolver.type_of(symbol.node())
            }
        }
    }
}

/// What overload resolution needs from methods and constructors alike.
pub(crate) trait Invocable: Clone {
    fn name(&self) -> String;
    fn is_variadic(&self) -> bool;
    fn param_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>>;
    fn type_parameter_names(&self) -> Result<Vec<String>>;
}

impl Invocable for MethodDeclaration {
    fn name(&self) -> String {
        MethodDeclaration::name(self)
    }

    fn is_variadic(&self) -> bool {
        MethodDeclaration::is_variadic(self)
    }

    fn param_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        Ok(self
            .params(solver)?
            .into_iter()
            .map(|param| param.type_usage)
            .collect())
    }

    fn type_parameter_names(&self) -> Result<Vec<String>> {
        Ok(self
            .type_parameters()?
            .iter()
            .map(|param| param.name().to_string())
            .collect())
    }
}

impl Invocable for ConstructorDeclaration {
    fn name(&self) -> String {
        ConstructorDeclaration::name(self)
    }

    fn is_variadic(&self) -> bool {
        ConstructorDeclaration::is_variadic(self)
    }

    fn param_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        Ok(self
            .params(solver)?
            .into_iter()
            .map(|param| param.type_usage)
            .collect())
    }

    fn type_parameter_names(&self) -> Result<Vec<String>> {
        Ok(self
            .type_parameters()?
            .iter()
            .map(|param| param.name().to_string())
            .collect())
    }
}
