//! Static types as they occur at a program point.
//!
//! A [`TypeUsage`] is an immutable value. Substitution builds new values and
//! shares every subtree it did not touch.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use javelin_ast::{PrimitiveKind, SyntaxNode};
use javelin_classfile::{BaseType, ClassStub};

use crate::declarations::{MethodDeclaration, TypeDeclaration};
use crate::error::{ResolveError, Result};
use crate::logic;
use crate::reflection::RuntimeClass;
use crate::solver::TypeSolver;

pub(crate) const OBJECT: &str = "java.lang.Object";

/// Type variable name to the type it stands for.
pub type Substitution = HashMap<String, TypeUsage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Char,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        PrimitiveKind::from(self).keyword()
    }

    /// Qualified name of the wrapper class.
    #[must_use]
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        PrimitiveKind::from_keyword(name).map(Self::from)
    }

    #[must_use]
    pub fn from_boxed_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|prim| prim.boxed_name() == name)
    }
}

impl From<PrimitiveKind> for PrimitiveType {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => PrimitiveType::Boolean,
            PrimitiveKind::Byte => PrimitiveType::Byte,
            PrimitiveKind::Short => PrimitiveType::Short,
            PrimitiveKind::Int => PrimitiveType::Int,
            PrimitiveKind::Long => PrimitiveType::Long,
            PrimitiveKind::Char => PrimitiveType::Char,
            PrimitiveKind::Float => PrimitiveType::Float,
            PrimitiveKind::Double => PrimitiveType::Double,
        }
    }
}

impl From<PrimitiveType> for PrimitiveKind {
    fn from(prim: PrimitiveType) -> Self {
        match prim {
            PrimitiveType::Boolean => PrimitiveKind::Boolean,
            PrimitiveType::Byte => PrimitiveKind::Byte,
            PrimitiveType::Short => PrimitiveKind::Short,
            PrimitiveType::Int => PrimitiveKind::Int,
            PrimitiveType::Long => PrimitiveKind::Long,
            PrimitiveType::Char => PrimitiveKind::Char,
            PrimitiveType::Float => PrimitiveKind::Float,
            PrimitiveType::Double => PrimitiveKind::Double,
        }
    }
}

impl From<BaseType> for PrimitiveType {
    fn from(base: BaseType) -> Self {
        match base {
            BaseType::Boolean => PrimitiveType::Boolean,
            BaseType::Byte => PrimitiveType::Byte,
            BaseType::Short => PrimitiveType::Short,
            BaseType::Int => PrimitiveType::Int,
            BaseType::Long => PrimitiveType::Long,
            BaseType::Char => PrimitiveType::Char,
            BaseType::Float => PrimitiveType::Float,
            BaseType::Double => PrimitiveType::Double,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeUsage {
    Primitive(PrimitiveType),
    Void,
    Null,
    Array(Arc<TypeUsage>),
    TypeVariable(TypeParameter),
    Wildcard(Wildcard),
    Reference(ReferenceType),
    /// A lambda argument whose type depends on the method it is passed to.
    LambdaPlaceholder(LambdaArgumentPlaceholder),
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Wildcard {
    Unbounded,
    Extends(Arc<TypeUsage>),
    Super(Arc<TypeUsage>),
}

impl Wildcard {
    #[must_use]
    pub fn bound(&self) -> Option<&TypeUsage> {
        match self {
            Wildcard::Unbounded => None,
            Wildcard::Extends(bound) | Wildcard::Super(bound) => Some(bound),
        }
    }
}

/// A declared class or interface applied to zero (raw) or all of its type
/// arguments.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ReferenceType {
    declaration: TypeDeclaration,
    type_arguments: Arc<[TypeUsage]>,
}

impl ReferenceType {
    /// Fails with [`ResolveError::TypeArgumentCount`] unless `type_arguments`
    /// is empty or matches the declaration's type parameters one to one.
    pub fn new(declaration: TypeDeclaration, type_arguments: Vec<TypeUsage>) -> Result<Self> {
        if !type_arguments.is_empty() {
            let expected = declaration.type_parameters()?.len();
            if expected != type_arguments.len() {
                return Err(ResolveError::TypeArgumentCount {
                    type_name: declaration.qualified_name(),
                    expected,
                    found: type_arguments.len(),
                });
            }
        }
        Ok(Self::from_parts(declaration, type_arguments.into()))
    }

    #[must_use]
    pub fn raw(declaration: TypeDeclaration) -> Self {
        Self::from_parts(declaration, Vec::new().into())
    }

    pub(crate) fn from_parts(
        declaration: TypeDeclaration,
        type_arguments: Arc<[TypeUsage]>,
    ) -> Self {
        ReferenceType {
            declaration,
            type_arguments,
        }
    }

    #[must_use]
    pub fn declaration(&self) -> &TypeDeclaration {
        &self.declaration
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[TypeUsage] {
        &self.type_arguments
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.type_arguments.is_empty()
    }

    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.declaration.qualified_name()
    }

    /// The argument bound to the declaration's type parameter `name`.
    pub fn generic_parameter_by_name(&self, name: &str) -> Result<Option<TypeUsage>> {
        if self.is_raw() {
            return Ok(None);
        }
        let params = self.declaration.type_parameters()?;
        Ok(params
            .iter()
            .position(|param| param.name() == name)
            .and_then(|idx| self.type_arguments.get(idx).cloned()))
    }

    /// The declaration's type parameters mapped to this use's arguments;
    /// empty for raw uses.
    pub fn substitution(&self) -> Result<Substitution> {
        if self.is_raw() {
            return Ok(Substitution::new());
        }
        let params = self.declaration.type_parameters()?;
        Ok(params
            .into_iter()
            .map(|param| param.name().to_string())
            .zip(self.type_arguments.iter().cloned())
            .collect())
    }

    /// Every ancestor with this use's arguments pushed through.
    pub fn all_ancestors(&self, solver: &dyn TypeSolver) -> Result<Vec<ReferenceType>> {
        logic::all_ancestors(self, solver)
    }

    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.qualified_name();
        if !self.is_raw() {
            out.push('<');
            for (idx, arg) in self.type_arguments.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                out.push_str(&arg.describe());
            }
            out.push('>');
        }
        out
    }
}

impl fmt::Debug for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeParameterOwner {
    /// Qualified name of the generic type.
    Type(String),
    /// A generic method or constructor; `slot` tells overloads apart.
    Method {
        declaring_type: String,
        name: String,
        slot: usize,
    },
}

#[derive(Clone)]
pub(crate) enum TypeParameterOrigin {
    /// The `TypeParameter` node.
    Source(SyntaxNode),
    /// Entry `index` of the class signature, or of method `method`'s signature.
    Bytecode {
        class: Arc<ClassStub>,
        method: Option<usize>,
        index: usize,
    },
    Reflected {
        class: Arc<RuntimeClass>,
        method: Option<usize>,
        index: usize,
    },
    /// A variable referenced without a visible declaration; unbounded.
    Free,
}

/// A declared type variable. Bounds are computed on request.
#[derive(Clone)]
pub struct TypeParameter {
    name: String,
    owner: TypeParameterOwner,
    origin: TypeParameterOrigin,
}

impl TypeParameter {
    pub(crate) fn new(
        name: String,
        owner: TypeParameterOwner,
        origin: TypeParameterOrigin,
    ) -> Self {
        TypeParameter {
            name,
            owner,
            origin,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn owner(&self) -> &TypeParameterOwner {
        &self.owner
    }

    #[must_use]
    pub fn declared_on_type(&self) -> bool {
        matches!(self.owner, TypeParameterOwner::Type(_))
    }

    /// Declared bounds in order; empty means `Object`.
    pub fn bounds(&self, solver: &dyn TypeSolver) -> Result<Vec<TypeUsage>> {
        match &self.origin {
            TypeParameterOrigin::Source(node) => crate::source::type_parameter_bounds(node, solver),
            TypeParameterOrigin::Bytecode {
                class,
                method,
                index,
            } => crate::bytecode::type_parameter_bounds(class, *method, *index, solver),
            TypeParameterOrigin::Reflected {
                class,
                method,
                index,
            } => crate::reflection::type_parameter_bounds(class, *method, *index, solver),
            TypeParameterOrigin::Free => Ok(Vec::new()),
        }
    }
}

impl PartialEq for TypeParameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.owner == other.owner
    }
}

impl Eq for TypeParameter {}

impl Hash for TypeParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.owner.hash(state);
    }
}

impl fmt::Debug for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {:?}", self.name, self.owner)
    }
}

/// Stands in for a lambda argument during overload resolution. The method
/// finally chosen for the call is recorded once it is known.
#[derive(Clone)]
pub struct LambdaArgumentPlaceholder {
    index: usize,
    method: Arc<OnceLock<MethodDeclaration>>,
}

impl LambdaArgumentPlaceholder {
    #[must_use]
    pub fn new(index: usize) -> Self {
        LambdaArgumentPlaceholder {
            index,
            method: Arc::new(OnceLock::new()),
        }
    }

    /// Position of the lambda in the argument list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn method(&self) -> Option<&MethodDeclaration> {
        self.method.get()
    }

    /// Records the resolved method. Returns `false` if one was already set.
    pub fn set_method(&self, method: MethodDeclaration) -> bool {
        self.method.set(method).is_ok()
    }
}

impl PartialEq for LambdaArgumentPlaceholder {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for LambdaArgumentPlaceholder {}

impl Hash for LambdaArgumentPlaceholder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl TypeUsage {
    /// Raw use of `declaration`.
    #[must_use]
    pub fn reference(declaration: TypeDeclaration) -> Self {
        TypeUsage::Reference(ReferenceType::raw(declaration))
    }

    #[must_use]
    pub fn array(component: TypeUsage) -> Self {
        TypeUsage::Array(Arc::new(component))
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            TypeUsage::Primitive(prim) => prim.name().to_string(),
            TypeUsage::Void => "void".to_string(),
            TypeUsage::Null => "null".to_string(),
            TypeUsage::Array(component) => format!("{}[]", component.describe()),
            TypeUsage::TypeVariable(param) => param.name().to_string(),
            TypeUsage::Wildcard(Wildcard::Unbounded) => "?".to_string(),
            TypeUsage::Wildcard(Wildcard::Extends(bound)) => {
                format!("? extends {}", bound.describe())
            }
            TypeUsage::Wildcard(Wildcard::Super(bound)) => format!("? super {}", bound.describe()),
            TypeUsage::Reference(reference) => reference.describe(),
            TypeUsage::LambdaPlaceholder(placeholder) => {
                format!("<lambda argument #{}>", placeholder.index)
            }
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            TypeUsage::Primitive(_) => "a primitive type",
            TypeUsage::Void => "void",
            TypeUsage::Null => "the null type",
            TypeUsage::Array(_) => "an array type",
            TypeUsage::TypeVariable(_) => "a type variable",
            TypeUsage::Wildcard(_) => "a wildcard",
            TypeUsage::Reference(_) => "a reference type",
            TypeUsage::LambdaPlaceholder(_) => "a lambda placeholder",
        }
    }

    fn cast_error(&self, expected: &str) -> ResolveError {
        ResolveError::invalid_cast(
            expected,
            format!("{} `{}`", self.variant_name(), self.describe()),
        )
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeUsage::Primitive(_))
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeUsage::Void)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, TypeUsage::Null)
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, TypeUsage::Array(_))
    }

    #[must_use]
    pub fn is_type_variable(&self) -> bool {
        matches!(self, TypeUsage::TypeVariable(_))
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeUsage::Wildcard(_))
    }

    /// Reference types proper; arrays, variables and null are not included.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeUsage::Reference(_))
    }

    #[must_use]
    pub fn is_lambda_placeholder(&self) -> bool {
        matches!(self, TypeUsage::LambdaPlaceholder(_))
    }

    pub fn as_primitive(&self) -> Result<PrimitiveType> {
        match self {
            TypeUsage::Primitive(prim) => Ok(*prim),
            other => Err(other.cast_error("a primitive type")),
        }
    }

    pub fn as_reference(&self) -> Result<&ReferenceType> {
        match self {
            TypeUsage::Reference(reference) => Ok(reference),
            other => Err(other.cast_error("a reference type")),
        }
    }

    pub fn as_array_component(&self) -> Result<&TypeUsage> {
        match self {
            TypeUsage::Array(component) => Ok(component),
            other => Err(other.cast_error("an array type")),
        }
    }

    pub fn as_type_variable(&self) -> Result<&TypeParameter> {
        match self {
            TypeUsage::TypeVariable(param) => Ok(param),
            other => Err(other.cast_error("a type variable")),
        }
    }

    pub fn as_wildcard(&self) -> Result<&Wildcard> {
        match self {
            TypeUsage::Wildcard(wildcard) => Ok(wildcard),
            other => Err(other.cast_error("a wildcard")),
        }
    }

    pub fn as_lambda_placeholder(&self) -> Result<&LambdaArgumentPlaceholder> {
        match self {
            TypeUsage::LambdaPlaceholder(placeholder) => Ok(placeholder),
            other => Err(other.cast_error("a lambda placeholder")),
        }
    }

    /// Number of `[]` around the innermost component.
    #[must_use]
    pub fn array_level(&self) -> usize {
        match self {
            TypeUsage::Array(component) => 1 + component.array_level(),
            _ => 0,
        }
    }

    /// Replaces every occurrence of the type variable `name` with `value`.
    #[must_use]
    pub fn replace_param(&self, name: &str, value: &TypeUsage) -> TypeUsage {
        self.substitute(&|candidate| (candidate == name).then(|| value.clone()))
            .unwrap_or_else(|| self.clone())
    }

    /// Replaces all variables in `substitution` at once, so a value that
    /// mentions another variable of the map is not substituted again.
    #[must_use]
    pub fn replace_params(&self, substitution: &Substitution) -> TypeUsage {
        if substitution.is_empty() {
            return self.clone();
        }
        self.substitute(&|name| substitution.get(name).cloned())
            .unwrap_or_else(|| self.clone())
    }

    /// `None` when nothing below `self` changed.
    fn substitute<F>(&self, lookup: &F) -> Option<TypeUsage>
    where
        F: Fn(&str) -> Option<TypeUsage>,
    {
        match self {
            TypeUsage::TypeVariable(param) => lookup(param.name()),
            TypeUsage::Array(component) => component.substitute(lookup).map(TypeUsage::array),
            TypeUsage::Wildcard(Wildcard::Extends(bound)) => bound
                .substitute(lookup)
                .map(|bound| TypeUsage::Wildcard(Wildcard::Extends(Arc::new(bound)))),
            TypeUsage::Wildcard(Wildcard::Super(bound)) => bound
                .substitute(lookup)
                .map(|bound| TypeUsage::Wildcard(Wildcard::Super(Arc::new(bound)))),
            TypeUsage::Reference(reference) => {
                let mut changed: Option<Vec<TypeUsage>> = None;
                for (idx, arg) in reference.type_arguments.iter().enumerate() {
                    if let Some(new_arg) = arg.substitute(lookup) {
                        changed.get_or_insert_with(|| reference.type_arguments.to_vec())[idx] =
                            new_arg;
                    }
                }
                changed.map(|args| {
                    TypeUsage::Reference(ReferenceType::from_parts(
                        reference.declaration.clone(),
                        args.into(),
                    ))
                })
            }
            TypeUsage::Primitive(_)
            | TypeUsage::Void
            | TypeUsage::Null
            | TypeUsage::Wildcard(Wildcard::Unbounded)
            | TypeUsage::LambdaPlaceholder(_) => None,
        }
    }

    /// Whether a value of type `other` can be stored where `self` is expected.
    pub fn is_assignable_by(&self, other: &TypeUsage, solver: &dyn TypeSolver) -> Result<bool> {
        logic::is_assignable_by(self, other, solver)
    }
}

impl fmt::Display for TypeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for TypeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<PrimitiveType> for TypeUsage {
    fn from(prim: PrimitiveType) -> Self {
        TypeUsage::Primitive(prim)
    }
}

impl From<ReferenceType> for TypeUsage {
    fn from(reference: ReferenceType) -> Self {
        TypeUsage::Reference(reference)
    }
}

impl From<Wildcard> for TypeUsage {
    fn from(wildcard: Wildcard) -> Self {
        TypeUsage::Wildcard(wildcard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> TypeUsage {
        TypeUsage::TypeVariable(TypeParameter::new(
            name.to_string(),
            TypeParameterOwner::Type("Foo".to_string()),
            TypeParameterOrigin::Free,
        ))
    }

    #[test]
    fn describe_uses_java_spelling() {
        let int = TypeUsage::from(PrimitiveType::Int);
        assert_eq!(TypeUsage::array(TypeUsage::array(int.clone())).describe(), "int[][]");
        assert_eq!(
            TypeUsage::from(Wildcard::Super(Arc::new(var("T")))).describe(),
            "? super T"
        );
        assert_eq!(TypeUsage::from(Wildcard::Unbounded).describe(), "?");
        assert_eq!(TypeUsage::Null.describe(), "null");
    }

    #[test]
    fn replacing_a_variable_describes_like_the_value() {
        let value = TypeUsage::array(PrimitiveType::Char.into());
        assert_eq!(
            var("T").replace_param("T", &value).describe(),
            value.describe()
        );

        let nested = TypeUsage::array(TypeUsage::from(Wildcard::Extends(Arc::new(var("T")))));
        assert_eq!(
            nested.replace_param("T", &value).describe(),
            "? extends char[][]"
        );
    }

    #[test]
    fn untouched_values_keep_their_allocation() {
        let component = Arc::new(var("U"));
        let array = TypeUsage::Array(Arc::clone(&component));
        let replaced = array.replace_param("T", &PrimitiveType::Int.into());
        let TypeUsage::Array(after) = &replaced else {
            panic!("expected array, got {replaced:?}");
        };
        assert!(Arc::ptr_eq(after, &component));
    }

    #[test]
    fn simultaneous_substitution_does_not_chain() {
        let mut substitution = Substitution::new();
        substitution.insert("T".to_string(), var("U"));
        substitution.insert("U".to_string(), PrimitiveType::Long.into());
        let pair = TypeUsage::array(var("T"));
        assert_eq!(pair.replace_params(&substitution).describe(), "U[]");
    }

    #[test]
    fn narrowing_to_the_wrong_variant_is_invalid_cast() {
        let err = TypeUsage::Void.as_reference().unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCast { .. }), "{err:?}");
        assert!(!TypeUsage::Void.is_reference());
        assert_eq!(TypeUsage::Null.array_level(), 0);
    }

    #[test]
    fn placeholders_compare_by_position() {
        let first = LambdaArgumentPlaceholder::new(1);
        let second = LambdaArgumentPlaceholder::new(1);
        assert_eq!(
            TypeUsage::LambdaPlaceholder(first.clone()),
            TypeUsage::LambdaPlaceholder(second)
        );
        assert!(first.method().is_none());
    }

    #[test]
    fn primitive_names_and_wrappers() {
        assert_eq!(PrimitiveType::from_name("double"), Some(PrimitiveType::Double));
        assert_eq!(
            PrimitiveType::from_boxed_name("java.lang.Character"),
            Some(PrimitiveType::Char)
        );
        assert_eq!(PrimitiveType::Int.boxed_name(), "java.lang.Integer");
    }
}
