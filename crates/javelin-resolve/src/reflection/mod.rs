//! Declarations backed by classes the host runtime already knows about.

mod jdk;
mod registry;

use std::fmt;
use std::sync::Arc;

use javelin_ast::TypeRef;

pub use self::jdk::jdk;
pub use self::registry::{
    DeclarationParseError, RuntimeClass, RuntimeField, RuntimeKind, RuntimeMethod,
    RuntimeParameter, RuntimeRegistry, RuntimeTypeParameter,
};

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

fn class_type_parameter(class: &Arc<RuntimeClass>, index: usize) -> TypeParameter {
    TypeParameter::new(
        class.type_params()[index].name.clone(),
        TypeParameterOwner::Type(class.name().to_string()),
        TypeParameterOrigin::Reflected {
            class: Arc::clone(class),
            method: None,
            index,
        },
    )
}

fn method_type_parameter(class: &Arc<RuntimeClass>, method: usize, index: usize) -> TypeParameter {
    let declared = &class.methods()[method];
    TypeParameter::new(
        declared.type_params[index].name.clone(),
        TypeParameterOwner::Method {
            declaring_type: class.name().to_string(),
            name: declared.name.clone(),
            slot: method,
        },
        TypeParameterOrigin::Reflected {
            class: Arc::clone(class),
            method: Some(method),
            index,
        },
    )
}

/// Converts `ty` with the type variables of `class` and of `method` in scope.
fn convert(
    class: &Arc<RuntimeClass>,
    method: Option<usize>,
    ty: &TypeRef,
    solver: &dyn TypeSolver,
) -> Result<TypeUsage> {
    type_ref_to_usage(ty, &mut |name| {
        if let Some(method) = method {
            let params = &class.methods()[method].type_params;
            if let Some(index) = params.iter().position(|param| param.name == name) {
                return Ok(NamedType::Variable(method_type_parameter(class, method, index)));
            }
        }
        if let Some(index) = class.type_params().iter().position(|param| param.name == name) {
            return Ok(NamedType::Variable(class_type_parameter(class, index)));
        }
        solve_named(class, name, solver).map(NamedType::Declaration)
    })
}

/// A simple name the registry did not qualify is looked up in the declaring
/// class's package, then in `java.lang`, through the root solver.
fn solve_named(
    class: &RuntimeClass,
    name: &str,
    solver: &dyn TypeSolver,
) -> Result<TypeDeclaration> {
    if name.contains('.') {
        return solver.solve_type(name);
    }
    let local = match class.name().rsplit_once('.') {
        Some((package, _)) => format!("{package}.{name}"),
        None => name.to_string(),
    };
    for candidate in [local, format!("java.lang.{name}")] {
        if let SymbolReference::Solved(decl) = solver.try_solve_type(&candidate)? {
            return Ok(decl);
        }
    }
    Err(ResolveError::unresolved(name, "type solver"))
}

fn convert_reference(
    class: &Arc<RuntimeClass>,
    ty: &TypeRef,
    solver: &dyn TypeSolver,
) -> Result<ReferenceType> {
    match convert(class, None, ty, solver)? {
        TypeUsage::Reference(reference) => Ok(reference),
        other => Err(ResolveError::invalid_cast(
            "a class or interface type",
            other.describe(),
        )),
    }
}

pub(crate) fn type_parameter_bounds(
    class: &Arc<RuntimeClass>,
    method: Option<usize>,
    index: usize,
    solver: &dyn TypeSolver,
) -> Result<Vec<TypeUsage>> {
    let params = match method {
        Some(method) => &class.methods()[method].type_params,
        None => class.type_params(),
    };
    let Some(param) = params.get(index) else {
        return Ok(Vec::new());
    };
    param
        .bounds
        .iter()
        .map(|bound| convert(class, method, bound, solver))
        .collect()
}

#[derive(Clone)]
pub struct ReflectedTypeDeclaration {
    class: Arc<RuntimeClass>,
}

impl ReflectedTypeDeclaration {
    #[must_use]
    pub fn new(class: Arc<RuntimeClass>) -> Self {
        ReflectedTypeDeclaration { class }
    }

    #[must_use]
    pub fn runtime_class(&self) -> &RuntimeClass {
        &self.class
    }

    pub(crate) fn qualified_name(&self) -> String {
        self.class.name().to_string()
    }

    pub(crate) fn name(&self) -> String {
        self.class.simple_name().to_string()
    }

    pub(crate) fn kind(&self) -> TypeKind {
        match self.class.kind() {
            RuntimeKind::Class => TypeKind::Class,
            RuntimeKind::Interface => TypeKind::Interface,
            RuntimeKind::Enum => TypeKind::Enum,
        }
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        Ok((0..self.class.type_params().len())
            .map(|index| class_type_parameter(&self.class, index))
            .collect())
    }

    pub(crate) fn superclass(&self, solver: &dyn TypeSolver) -> Result<Option<ReferenceType>> {
        if self.class.kind() == RuntimeKind::Interface {
            return Ok(None);
        }
        match self.class.superclass() {
            Some(ty) => convert_reference(&self.class, ty, solver).map(Some),
            None if self.class.name() == OBJECT => Ok(None),
            None => Ok(Some(ReferenceType::raw(solver.solve_type(OBJECT)?))),
        }
    }

    pub(crate) fn interfaces(&self, solver: &dyn TypeSolver) -> Result<Vec<ReferenceType>> {
        self.class
            .interfaces()
            .iter()
            .map(|ty| convert_reference(&self.class, ty, solver))
            .collect()
    }

    pub(crate) fn declared_fields(&self) -> Result<Vec<FieldDeclaration>> {
        Ok((0..self.class.fields().len())
            .map(|index| {
                FieldDeclaration::Reflected(ReflectedField {
                    class: Arc::clone(&self.class),
                    index,
                })
            })
            .collect())
    }

    pub(crate) fn declared_methods(&self) -> Result<Vec<MethodDeclaration>> {
        Ok(self
            .class
            .methods()
            .iter()
            .enumerate()
            .filter(|(_, method)| !method.is_constructor())
            .map(|(index, _)| {
                MethodDeclaration::Reflected(ReflectedMethod {
                    class: Arc::clone(&self.class),
                    index,
                })
            })
            .collect())
    }

    pub(crate) fn declared_constructors(&self) -> Result<Vec<ConstructorDeclaration>> {
        Ok(self
            .class
            .methods()
            .iter()
            .enumerate()
            .filter(|(_, method)| method.is_constructor())
            .map(|(index, _)| {
                ConstructorDeclaration::Reflected(ReflectedConstructor {
                    class: Arc::clone(&self.class),
                    index,
                })
            })
            .collect())
    }

    pub(crate) fn nested_type(
        &self,
        name: &str,
        solver: &dyn TypeSolver,
    ) -> Result<SymbolReference<TypeDeclaration>> {
        solver.try_solve_type(&format!("{}.{name}", self.class.name()))
    }
}

impl PartialEq for ReflectedTypeDeclaration {
    fn eq(&self, other: &Self) -> bool {
        self.class.name() == other.class.name()
    }
}

impl Eq for ReflectedTypeDeclaration {}

impl std::hash::Hash for ReflectedTypeDeclaration {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.class.name().hash(state);
    }
}

impl fmt::Debug for ReflectedTypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReflectedTypeDeclaration({})", self.class.name())
    }
}

macro_rules! member_identity {
    ($ty:ident, $label:literal) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index && self.class.name() == other.class.name()
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.class.name().hash(state);
                self.index.hash(state);
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}#{})"), self.class.name(), self.index)
            }
        }
    };
}

/// Shared by methods and constructors, which live in one list.
trait RuntimeInvocable {
    fn class(&self) -> &Arc<RuntimeClass>;
    fn index(&self) -> usize;

    fn declared(&self) -> &RuntimeMethod {
        &self.class().methods()[self.index()]
    }

    fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Reflected(ReflectedTypeDeclaration::new(Arc::clone(self.class())))
    }

    fn param_count(&self) -> usize {
        self.declared().params.len()
    }

    fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        self.declared()
            .params
            .iter()
            .map(|param| {
                Ok(ParameterDeclaration {
                    name: Some(param.name.clone()),
                    type_usage: convert(self.class(), Some(self.index()), &param.ty, solver)?,
                    is_variadic: param.varargs,
                })
            })
            .collect()
    }

    fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        Ok((0..self.declared().type_params.len())
            .map(|index| method_type_parameter(self.class(), self.index(), index))
            .collect())
    }

    fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        self.declared()
            .throws
            .iter()
            .map(|ty| convert(self.class(), Some(self.index()), ty, solver))
            .collect()
    }

    fn is_variadic(&self) -> bool {
        self.declared().params.last().is_some_and(|param| param.varargs)
    }
}

#[derive(Clone)]
pub struct ReflectedMethod {
    class: Arc<RuntimeClass>,
    index: usize,
}

member_identity!(ReflectedMethod, "ReflectedMethod");

impl RuntimeInvocable for ReflectedMethod {
    fn class(&self) -> &Arc<RuntimeClass> {
        &self.class
    }

    fn index(&self) -> usize {
        self.index
    }
}

impl ReflectedMethod {
    pub(crate) fn name(&self) -> String {
        self.declared().name.clone()
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        RuntimeInvocable::declaring_type(self)
    }

    pub(crate) fn param_count(&self) -> usize {
        RuntimeInvocable::param_count(self)
    }

    pub(crate) fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        RuntimeInvocable::params(self, solver)
    }

    pub(crate) fn return_type(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        convert(&self.class, Some(self.index), &self.declared().return_type, solver)
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        RuntimeInvocable::type_parameters(self)
    }

    pub(crate) fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        RuntimeInvocable::exception_types(self, solver)
    }

    pub(crate) fn is_variadic(&self) -> bool {
        RuntimeInvocable::is_variadic(self)
    }

    pub(crate) fn is_static(&self) -> bool {
        self.declared().modifiers.is_static()
    }

    /// Interface methods are abstract unless `static` or `default`.
    pub(crate) fn is_abstract(&self) -> bool {
        let modifiers = self.declared().modifiers;
        modifiers.is_abstract()
            || (self.class.kind() == RuntimeKind::Interface
                && !modifiers.is_static()
                && !modifiers.is_default())
    }

    pub(crate) fn is_default(&self) -> bool {
        self.declared().modifiers.is_default()
    }
}

#[derive(Clone)]
pub struct ReflectedConstructor {
    class: Arc<RuntimeClass>,
    index: usize,
}

member_identity!(ReflectedConstructor, "ReflectedConstructor");

impl RuntimeInvocable for ReflectedConstructor {
    fn class(&self) -> &Arc<RuntimeClass> {
        &self.class
    }

    fn index(&self) -> usize {
        self.index
    }
}

impl ReflectedConstructor {
    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        RuntimeInvocable::declaring_type(self)
    }

    pub(crate) fn param_count(&self) -> usize {
        RuntimeInvocable::param_count(self)
    }

    pub(crate) fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        RuntimeInvocable::params(self, solver)
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        RuntimeInvocable::type_parameters(self)
    }

    pub(crate) fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        RuntimeInvocable::exception_types(self, solver)
    }

    pub(crate) fn is_variadic(&self) -> bool {
        RuntimeInvocable::is_variadic(self)
    }

    pub(crate) fn is_private(&self) -> bool {
        self.declared().modifiers.is_private()
    }

    pub(crate) fn is_package_protected(&self) -> bool {
        self.declared().modifiers.is_package_private()
    }
}

#[derive(Clone)]
pub struct ReflectedField {
    class: Arc<RuntimeClass>,
    index: usize,
}

member_identity!(ReflectedField, "ReflectedField");

impl ReflectedField {
    fn declared(&self) -> &RuntimeField {
        &self.class.fields()[self.index]
    }

    pub(crate) fn name(&self) -> String {
        self.declared().name.clone()
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Reflected(ReflectedTypeDeclaration::new(Arc::clone(&self.class)))
    }

    pub(crate) fn is_static(&self) -> bool {
        self.declared().modifiers.is_static() || self.class.kind() == RuntimeKind::Interface
    }

    pub(crate) fn type_usage(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        convert(&self.class, None, &self.declared().ty, solver)
    }
}

/// Resolves names against a [`RuntimeRegistry`].
#[derive(Debug, Clone)]
pub struct ReflectionTypeSolver {
    registry: Arc<RuntimeRegistry>,
}

impl ReflectionTypeSolver {
    #[must_use]
    pub fn new(registry: RuntimeRegistry) -> Self {
        ReflectionTypeSolver {
            registry: Arc::new(registry),
        }
    }

    /// The built-in platform classes.
    #[must_use]
    pub fn jdk() -> Self {
        Self::new(jdk().clone())
    }

    #[must_use]
    pub fn registry(&self) -> &RuntimeRegistry {
        &self.registry
    }
}

impl TypeSolver for ReflectionTypeSolver {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>> {
        let found = self
            .registry
            .get(name)
            .or_else(|| self.registry.get(&name.replace('$', ".")))
            .map(|class| {
                TypeDeclaration::Reflected(ReflectedTypeDeclaration::new(Arc::clone(class)))
            });
        tracing::debug!(name, found = found.is_some(), "reflection lookup");
        Ok(found.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::CombinedTypeSolver;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_names_fall_back_to_package_then_java_lang() {
        let widget = RuntimeClass::parse("public class demo.Widget", &[]).unwrap();
        let panel = RuntimeClass::parse(
            "public class demo.Panel",
            &["public CharSequence label()", "public Widget widget()", "public Missing broken()"],
        )
        .unwrap();
        let solver = CombinedTypeSolver::new()
            .with(ReflectionTypeSolver::new(RuntimeRegistry::from_classes([panel])))
            .with(ReflectionTypeSolver::new(RuntimeRegistry::from_classes([widget])))
            .with(ReflectionTypeSolver::jdk());
        let methods = solver.solve_type("demo.Panel").unwrap().declared_methods().unwrap();
        let return_of = |name: &str| {
            methods
                .iter()
                .find(|method| method.name() == name)
                .unwrap()
                .return_type(&solver)
        };

        assert_eq!(return_of("label").unwrap().describe(), "java.lang.CharSequence");
        assert_eq!(return_of("widget").unwrap().describe(), "demo.Widget");
        assert!(return_of("broken").unwrap_err().is_unresolved());
    }

    #[test]
    fn type_variables_convert_in_scope() {
        let solver = ReflectionTypeSolver::jdk();
        let list = solver.solve_type("java.util.List").unwrap();
        let get = list
            .declared_methods()
            .unwrap()
            .into_iter()
            .find(|method| method.name() == "get")
            .unwrap();
        let ret = get.return_type(&solver).unwrap();
        let var = ret.as_type_variable().unwrap();
        assert_eq!(var.name(), "E");
        assert!(var.declared_on_type());
        assert!(get.is_abstract());

        let of = list
            .declared_methods()
            .unwrap()
            .into_iter()
            .find(|method| method.name() == "of")
            .unwrap();
        assert!(of.is_static() && of.is_variadic() && !of.is_abstract());
        let param = of.param(0, &solver).unwrap();
        assert_eq!(param.type_usage.describe(), "E[]");
        let component = param.type_usage.as_array_component().unwrap();
        assert!(!component.as_type_variable().unwrap().declared_on_type());
    }

    #[test]
    fn enum_type_parameter_bound_is_recursive() {
        let solver = ReflectionTypeSolver::jdk();
        let params = solver.solve_type("java.lang.Enum").unwrap().type_parameters().unwrap();
        let bounds = params[0].bounds(&solver).unwrap();
        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].describe(), "java.lang.Enum<E>");
    }

    #[test]
    fn superclass_defaults_to_object() {
        let solver = ReflectionTypeSolver::jdk();
        let string = solver.solve_type("java.lang.String").unwrap();
        assert_eq!(
            string.superclass(&solver).unwrap().map(|sup| sup.qualified_name()),
            Some(OBJECT.to_string())
        );
        let object = solver.solve_type(OBJECT).unwrap();
        assert_eq!(object.superclass(&solver).unwrap(), None);
        assert_eq!(object.declared_constructors().unwrap().len(), 1);
        let out = solver
            .solve_type("java.lang.System")
            .unwrap()
            .field("out", &solver)
            .unwrap();
        assert!(out.is_static());
        assert_eq!(out.type_usage(&solver).unwrap().describe(), "java.io.PrintStream");
    }
}
