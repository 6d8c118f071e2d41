//! Declarations backed by compiled class metadata.
//!
//! Descriptors are always available; generic signatures are parsed per member
//! on request, so a signature the grammar rejects only breaks the member that
//! carries it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use javelin_classfile::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassStub, ClassTypeSignature, FieldStub, FieldType, MethodSignature, MethodStub, ReturnType,
    TypeArgument, TypeSignature, ACC_ABSTRACT, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC,
    ACC_VARARGS,
};

use crate::declarations::{
    ConstructorDeclaration, FieldDeclaration, MethodDeclaration, TypeDeclaration, TypeKind,
};
use crate::error::{ResolveError, Result};
use crate::model::{ParameterDeclaration, SymbolReference};
use crate::solver::TypeSolver;
use crate::types::{
    ReferenceType, TypeParameter, TypeParameterOrigin, TypeParameterOwner, TypeUsage, Wildcard,
};

fn signature_error(err: javelin_classfile::Error) -> ResolveError {
    match err {
        javelin_classfile::Error::InvalidSignature { signature, offset } => {
            ResolveError::MalformedGenericSignature {
                signature,
                reason: format!("unexpected input at offset {offset}"),
            }
        }
        other => ResolveError::ClassFile(other),
    }
}

fn class_signature(class: &ClassStub) -> Result<Option<ClassSignature>> {
    class
        .signature
        .as_deref()
        .map(parse_class_signature)
        .transpose()
        .map_err(signature_error)
}

fn method_signature(method: &MethodStub) -> Result<Option<MethodSignature>> {
    method
        .signature
        .as_deref()
        .map(parse_method_signature)
        .transpose()
        .map_err(signature_error)
}

/// Looks a binary name up, falling back to the canonical `Outer.Inner` form.
fn solve_internal(internal: &str, solver: &dyn TypeSolver) -> Result<TypeDeclaration> {
    let binary = internal.replace('/', ".");
    if let SymbolReference::Solved(decl) = solver.try_solve_type(&binary)? {
        return Ok(decl);
    }
    if binary.contains('$') {
        if let SymbolReference::Solved(decl) = solver.try_solve_type(&binary.replace('$', "."))? {
            return Ok(decl);
        }
    }
    Err(ResolveError::unresolved(binary, "class file"))
}

fn descriptor_type(ty: &FieldType, solver: &dyn TypeSolver) -> Result<TypeUsage> {
    Ok(match ty {
        FieldType::Base(base) => TypeUsage::Primitive((*base).into()),
        FieldType::Object(internal) => TypeUsage::reference(solve_internal(internal, solver)?),
        FieldType::Array(component) => TypeUsage::array(descriptor_type(component, solver)?),
    })
}

/// Type variables visible to a signature: the method's own, then the class's.
struct SignatureScope<'a> {
    class: &'a Arc<ClassStub>,
    class_params: Vec<javelin_classfile::TypeParameter>,
    method: Option<(usize, Vec<javelin_classfile::TypeParameter>)>,
    solver: &'a dyn TypeSolver,
}

impl<'a> SignatureScope<'a> {
    fn for_class(class: &'a Arc<ClassStub>, solver: &'a dyn TypeSolver) -> Result<Self> {
        Ok(SignatureScope {
            class,
            class_params: class_signature(class)?
                .map(|sig| sig.type_parameters)
                .unwrap_or_default(),
            method: None,
            solver,
        })
    }

    fn for_method(
        class: &'a Arc<ClassStub>,
        index: usize,
        params: Vec<javelin_classfile::TypeParameter>,
        solver: &'a dyn TypeSolver,
    ) -> Result<Self> {
        let mut scope = Self::for_class(class, solver)?;
        scope.method = Some((index, params));
        Ok(scope)
    }

    fn variable(&self, name: &str) -> TypeParameter {
        if let Some((method, params)) = &self.method {
            if let Some(index) = params.iter().position(|param| param.name == name) {
                return method_type_parameter(self.class, *method, index, name);
            }
        }
        let owner = TypeParameterOwner::Type(self.class.source_name());
        let origin = match self.class_params.iter().position(|param| param.name == name) {
            Some(index) => TypeParameterOrigin::Bytecode {
                class: Arc::clone(self.class),
                method: None,
                index,
            },
            None => TypeParameterOrigin::Free,
        };
        TypeParameter::new(name.to_string(), owner, origin)
    }

    fn convert(&self, ty: &TypeSignature) -> Result<TypeUsage> {
        Ok(match ty {
            TypeSignature::Base(base) => TypeUsage::Primitive((*base).into()),
            TypeSignature::Array(component) => TypeUsage::array(self.convert(component)?),
            TypeSignature::TypeVariable(name) => TypeUsage::TypeVariable(self.variable(name)),
            TypeSignature::Class(class) => TypeUsage::Reference(self.class_type(class)?),
        })
    }

    fn class_type(&self, ty: &ClassTypeSignature) -> Result<ReferenceType> {
        let decl = solve_internal(&ty.internal_name(), self.solver)?;
        let args = ty
            .type_arguments()
            .iter()
            .map(|arg| self.type_argument(arg))
            .collect::<Result<Vec<_>>>()?;
        ReferenceType::new(decl, args)
    }

    fn type_argument(&self, arg: &TypeArgument) -> Result<TypeUsage> {
        Ok(match arg {
            TypeArgument::Any => TypeUsage::Wildcard(Wildcard::Unbounded),
            TypeArgument::Exact(ty) => self.convert(ty)?,
            TypeArgument::Extends(ty) => {
                TypeUsage::Wildcard(Wildcard::Extends(Arc::new(self.convert(ty)?)))
            }
            TypeArgument::Super(ty) => {
                TypeUsage::Wildcard(Wildcard::Super(Arc::new(self.convert(ty)?)))
            }
        })
    }
}

fn method_type_parameter(
    class: &Arc<ClassStub>,
    method: usize,
    index: usize,
    name: &str,
) -> TypeParameter {
    let owner = TypeParameterOwner::Method {
        declaring_type: class.source_name(),
        name: class
            .methods
            .get(method)
            .map(|stub| stub.name.clone())
            .unwrap_or_default(),
        slot: method,
    };
    TypeParameter::new(
        name.to_string(),
        owner,
        TypeParameterOrigin::Bytecode {
            class: Arc::clone(class),
            method: Some(method),
            index,
        },
    )
}

pub(crate) fn type_parameter_bounds(
    class: &Arc<ClassStub>,
    method: Option<usize>,
    index: usize,
    solver: &dyn TypeSolver,
) -> Result<Vec<TypeUsage>> {
    let (scope, params) = match method {
        Some(method_index) => {
            let params = class
                .methods
                .get(method_index)
                .map(method_signature)
                .transpose()?
                .flatten()
                .map(|sig| sig.type_parameters)
                .unwrap_or_default();
            (
                SignatureScope::for_method(class, method_index, params.clone(), solver)?,
                params,
            )
        }
        None => {
            let scope = SignatureScope::for_class(class, solver)?;
            let params = scope.class_params.clone();
            (scope, params)
        }
    };
    let Some(param) = params.get(index) else {
        return Ok(Vec::new());
    };
    param.bounds().map(|bound| scope.convert(bound)).collect()
}

/// A compiled class or interface.
#[derive(Clone)]
pub struct BytecodeTypeDeclaration {
    class: Arc<ClassStub>,
}

impl BytecodeTypeDeclaration {
    #[must_use]
    pub fn new(class: Arc<ClassStub>) -> Self {
        BytecodeTypeDeclaration { class }
    }

    #[must_use]
    pub fn stub(&self) -> &ClassStub {
        &self.class
    }

    pub(crate) fn qualified_name(&self) -> String {
        self.class.source_name()
    }

    pub(crate) fn name(&self) -> String {
        let qualified = self.qualified_name();
        match qualified.rsplit_once('.') {
            Some((_, simple)) => simple.to_string(),
            None => qualified,
        }
    }

    pub(crate) fn kind(&self) -> TypeKind {
        if self.class.is_interface() {
            TypeKind::Interface
        } else if self.class.is_enum() {
            TypeKind::Enum
        } else {
            TypeKind::Class
        }
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        let Some(sig) = class_signature(&self.class)? else {
            return Ok(Vec::new());
        };
        let owner = TypeParameterOwner::Type(self.qualified_name());
        Ok(sig
            .type_parameters
            .iter()
            .enumerate()
            .map(|(index, param)| {
                TypeParameter::new(
                    param.name.clone(),
                    owner.clone(),
                    TypeParameterOrigin::Bytecode {
                        class: Arc::clone(&self.class),
                        method: None,
                        index,
                    },
                )
            })
            .collect())
    }

    pub(crate) fn superclass(&self, solver: &dyn TypeSolver) -> Result<Option<ReferenceType>> {
        if self.class.is_interface() {
            return Ok(None);
        }
        if let Some(sig) = class_signature(&self.class)? {
            let scope = SignatureScope::for_class(&self.class, solver)?;
            return scope.class_type(&sig.super_class).map(Some);
        }
        self.class
            .super_class
            .as_deref()
            .map(|internal| solve_internal(internal, solver).map(ReferenceType::raw))
            .transpose()
    }

    pub(crate) fn interfaces(&self, solver: &dyn TypeSolver) -> Result<Vec<ReferenceType>> {
        if let Some(sig) = class_signature(&self.class)? {
            let scope = SignatureScope::for_class(&self.class, solver)?;
            return sig
                .interfaces
                .iter()
                .map(|iface| scope.class_type(iface))
                .collect();
        }
        self.class
            .interfaces
            .iter()
            .map(|internal| solve_internal(internal, solver).map(ReferenceType::raw))
            .collect()
    }

    pub(crate) fn declared_fields(&self) -> Result<Vec<FieldDeclaration>> {
        Ok(self
            .class
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.is_synthetic())
            .map(|(index, _)| {
                FieldDeclaration::Bytecode(BytecodeField {
                    class: Arc::clone(&self.class),
                    index,
                })
            })
            .collect())
    }

    pub(crate) fn declared_methods(&self) -> Result<Vec<MethodDeclaration>> {
        Ok(self
            .class
            .methods
            .iter()
            .enumerate()
            .filter(|(_, method)| {
                !method.is_hidden() && !method.is_constructor() && !method.is_class_initializer()
            })
            .map(|(index, _)| {
                MethodDeclaration::Bytecode(BytecodeMethod {
                    class: Arc::clone(&self.class),
                    index,
                })
            })
            .collect())
    }

    pub(crate) fn declared_constructors(&self) -> Result<Vec<ConstructorDeclaration>> {
        Ok(self
            .class
            .methods
            .iter()
            .enumerate()
            .filter(|(_, method)| method.is_constructor() && !method.is_hidden())
            .map(|(index, _)| {
                ConstructorDeclaration::Bytecode(BytecodeConstructor {
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
        let Some(info) = self.class.inner_classes.iter().find(|info| {
            info.outer_class.as_deref() == Some(self.class.internal_name.as_str())
                && info.inner_name.as_deref() == Some(name)
        }) else {
            return Ok(SymbolReference::Unsolved);
        };
        solver.try_solve_type(&info.inner_class.replace('/', "."))
    }
}

impl PartialEq for BytecodeTypeDeclaration {
    fn eq(&self, other: &Self) -> bool {
        self.class.internal_name == other.class.internal_name
    }
}

impl Eq for BytecodeTypeDeclaration {}

impl std::hash::Hash for BytecodeTypeDeclaration {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.class.internal_name.hash(state);
    }
}

impl fmt::Debug for BytecodeTypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BytecodeTypeDeclaration({})", self.class.internal_name)
    }
}

/// Equality for members: same class, same slot.
macro_rules! member_identity {
    ($ty:ident, $label:literal) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index && self.class.internal_name == other.class.internal_name
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.class.internal_name.hash(state);
                self.index.hash(state);
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}#{})"), self.class.internal_name, self.index)
            }
        }
    };
}

/// Parameters from the signature when it lines up with the descriptor.
///
/// Signatures of inner class constructors omit synthetic leading
/// parameters, so a count mismatch falls back to the erased descriptor.
fn invocable_params(
    class: &Arc<ClassStub>,
    index: usize,
    stub: &MethodStub,
    solver: &dyn TypeSolver,
) -> Result<Vec<ParameterDeclaration>> {
    let variadic = stub.access_flags & ACC_VARARGS != 0;
    let count = stub.descriptor.params.len();
    let types = match method_signature(stub)? {
        Some(sig) if sig.parameters.len() == count => {
            let scope = SignatureScope::for_method(class, index, sig.type_parameters, solver)?;
            sig.parameters
                .iter()
                .map(|param| scope.convert(param))
                .collect::<Result<Vec<_>>>()?
        }
        _ => stub
            .descriptor
            .params
            .iter()
            .map(|param| descriptor_type(param, solver))
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(types
        .into_iter()
        .enumerate()
        .map(|(position, type_usage)| ParameterDeclaration {
            name: None,
            type_usage,
            is_variadic: variadic && position + 1 == count,
        })
        .collect())
}

fn invocable_type_parameters(
    class: &Arc<ClassStub>,
    index: usize,
    stub: &MethodStub,
) -> Result<Vec<TypeParameter>> {
    Ok(method_signature(stub)?
        .map(|sig| {
            sig.type_parameters
                .iter()
                .enumerate()
                .map(|(position, param)| method_type_parameter(class, index, position, &param.name))
                .collect()
        })
        .unwrap_or_default())
}

fn invocable_exceptions(
    class: &Arc<ClassStub>,
    index: usize,
    stub: &MethodStub,
    solver: &dyn TypeSolver,
) -> Result<Vec<TypeUsage>> {
    if let Some(sig) = method_signature(stub)? {
        if !sig.throws.is_empty() {
            let scope = SignatureScope::for_method(class, index, sig.type_parameters, solver)?;
            return sig.throws.iter().map(|ty| scope.convert(ty)).collect();
        }
    }
    stub.exceptions
        .iter()
        .map(|internal| solve_internal(internal, solver).map(TypeUsage::reference))
        .collect()
}

#[derive(Clone)]
pub struct BytecodeMethod {
    class: Arc<ClassStub>,
    index: usize,
}

member_identity!(BytecodeMethod, "BytecodeMethod");

impl BytecodeMethod {
    fn stub(&self) -> &MethodStub {
        &self.class.methods[self.index]
    }

    pub(crate) fn name(&self) -> String {
        self.stub().name.clone()
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Bytecode(BytecodeTypeDeclaration::new(Arc::clone(&self.class)))
    }

    pub(crate) fn param_count(&self) -> usize {
        self.stub().descriptor.params.len()
    }

    pub(crate) fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        invocable_params(&self.class, self.index, self.stub(), solver)
    }

    pub(crate) fn return_type(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        if let Some(sig) = method_signature(self.stub())? {
            let Some(ret) = &sig.return_type else {
                return Ok(TypeUsage::Void);
            };
            let type_parameters = sig.type_parameters.clone();
            let scope =
                SignatureScope::for_method(&self.class, self.index, type_parameters, solver)?;
            return scope.convert(ret);
        }
        match &self.stub().descriptor.return_type {
            ReturnType::Void => Ok(TypeUsage::Void),
            ReturnType::Type(ty) => descriptor_type(ty, solver),
        }
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        invocable_type_parameters(&self.class, self.index, self.stub())
    }

    pub(crate) fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        invocable_exceptions(&self.class, self.index, self.stub(), solver)
    }

    pub(crate) fn is_variadic(&self) -> bool {
        self.stub().access_flags & ACC_VARARGS != 0
    }

    pub(crate) fn is_static(&self) -> bool {
        self.stub().access_flags & ACC_STATIC != 0
    }

    pub(crate) fn is_abstract(&self) -> bool {
        self.stub().access_flags & ACC_ABSTRACT != 0
    }

    /// Concrete instance methods of interfaces.
    pub(crate) fn is_default(&self) -> bool {
        self.class.is_interface() && !self.is_abstract() && !self.is_static()
    }
}

#[derive(Clone)]
pub struct BytecodeConstructor {
    class: Arc<ClassStub>,
    index: usize,
}

member_identity!(BytecodeConstructor, "BytecodeConstructor");

impl BytecodeConstructor {
    fn stub(&self) -> &MethodStub {
        &self.class.methods[self.index]
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Bytecode(BytecodeTypeDeclaration::new(Arc::clone(&self.class)))
    }

    pub(crate) fn param_count(&self) -> usize {
        self.stub().descriptor.params.len()
    }

    pub(crate) fn params(&self, solver: &dyn TypeSolver) -> Result<Vec<ParameterDeclaration>> {
        invocable_params(&self.class, self.index, self.stub(), solver)
    }

    pub(crate) fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        invocable_type_parameters(&self.class, self.index, self.stub())
    }

    pub(crate) fn exception_types(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        invocable_exceptions(&self.class, self.index, self.stub(), solver)
    }

    pub(crate) fn is_variadic(&self) -> bool {
        self.stub().access_flags & ACC_VARARGS != 0
    }

    pub(crate) fn is_private(&self) -> bool {
        self.stub().access_flags & ACC_PRIVATE != 0
    }

    pub(crate) fn is_package_protected(&self) -> bool {
        self.stub().access_flags & (ACC_PUBLIC | ACC_PROTECTED | ACC_PRIVATE) == 0
    }
}

#[derive(Clone)]
pub struct BytecodeField {
    class: Arc<ClassStub>,
    index: usize,
}

member_identity!(BytecodeField, "BytecodeField");

impl BytecodeField {
    fn stub(&self) -> &FieldStub {
        &self.class.fields[self.index]
    }

    pub(crate) fn name(&self) -> String {
        self.stub().name.clone()
    }

    pub(crate) fn declaring_type(&self) -> TypeDeclaration {
        TypeDeclaration::Bytecode(BytecodeTypeDeclaration::new(Arc::clone(&self.class)))
    }

    pub(crate) fn is_static(&self) -> bool {
        self.stub().access_flags & ACC_STATIC != 0
    }

    pub(crate) fn type_usage(&self, solver: &dyn TypeSolver) -> Result<TypeUsage> {
        match &self.stub().signature {
            Some(signature) => {
                let sig = parse_field_signature(signature).map_err(signature_error)?;
                SignatureScope::for_class(&self.class, solver)?.convert(&sig)
            }
            None => descriptor_type(&self.stub().descriptor, solver),
        }
    }
}

/// Compiled classes, looked up by binary (`a.b.Outer$Inner`) or canonical
/// (`a.b.Outer.Inner`) name.
#[derive(Debug, Clone, Default)]
pub struct BytecodeTypeSolver {
    classes: HashMap<String, Arc<ClassStub>>,
}

impl BytecodeTypeSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class_bytes(mut self, bytes: &[u8]) -> Result<Self> {
        self.add_class_bytes(bytes)?;
        Ok(self)
    }

    pub fn add_class_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let stub = ClassStub::parse(bytes)?;
        self.add_stub(stub);
        Ok(())
    }

    pub fn add_stub(&mut self, stub: ClassStub) {
        let stub = Arc::new(stub);
        let binary = stub.internal_name.replace('/', ".");
        let canonical = stub.source_name();
        tracing::trace!(binary = %binary, canonical = %canonical, "indexed class");
        if canonical != binary {
            self.classes.insert(canonical, Arc::clone(&stub));
        }
        self.classes.insert(binary, stub);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes
            .iter()
            .filter(|(name, stub)| **name == stub.internal_name.replace('/', "."))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `a.b.Outer.Inner` for a class whose own table did not name it, tried
    /// as `a.b.Outer$Inner`, then `a.b$Outer$Inner`, and so on.
    fn lookup(&self, name: &str) -> Option<&Arc<ClassStub>> {
        if let Some(stub) = self.classes.get(name) {
            return Some(stub);
        }
        let mut candidate = name.to_string();
        while let Some(dot) = candidate.rfind('.') {
            candidate.replace_range(dot..=dot, "$");
            if let Some(stub) = self.classes.get(&candidate) {
                return Some(stub);
            }
        }
        None
    }
}

impl TypeSolver for BytecodeTypeSolver {
    fn try_solve_type(&self, name: &str) -> Result<SymbolReference<TypeDeclaration>> {
        let found = self
            .lookup(name)
            .map(|stub| TypeDeclaration::Bytecode(BytecodeTypeDeclaration::new(Arc::clone(stub))));
        tracing::debug!(name, found = found.is_some(), "bytecode lookup");
        Ok(found.into())
    }
}
