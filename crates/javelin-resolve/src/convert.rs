use std::sync::Arc;

use javelin_ast::{TypeRef, WildcardRef};

use crate::declarations::TypeDeclaration;
use crate::error::Result;
use crate::types::{ReferenceType, TypeParameter, TypeUsage, Wildcard};

/// What a written type name denotes.
pub(crate) enum NamedType {
    Declaration(TypeDeclaration),
    Variable(TypeParameter),
}

/// Converts a syntax-level type, asking `resolve` for every class name.
///
/// Arguments apply to the innermost segment; a diamond converts to a raw use.
pub(crate) fn type_ref_to_usage(
    ty: &TypeRef,
    resolve: &mut dyn FnMut(&str) -> Result<NamedType>,
) -> Result<TypeUsage> {
    Ok(match ty {
        TypeRef::Primitive(kind) => TypeUsage::Primitive((*kind).into()),
        TypeRef::Void => TypeUsage::Void,
        TypeRef::Array(component) => TypeUsage::array(type_ref_to_usage(component, resolve)?),
        TypeRef::Wildcard(WildcardRef::Unbounded) => TypeUsage::Wildcard(Wildcard::Unbounded),
        TypeRef::Wildcard(WildcardRef::Extends(bound)) => TypeUsage::Wildcard(Wildcard::Extends(
            Arc::new(type_ref_to_usage(bound, resolve)?),
        )),
        TypeRef::Wildcard(WildcardRef::Super(bound)) => TypeUsage::Wildcard(Wildcard::Super(
            Arc::new(type_ref_to_usage(bound, resolve)?),
        )),
        TypeRef::Class(class) => match resolve(&class.name())? {
            NamedType::Variable(param) => TypeUsage::TypeVariable(param),
            NamedType::Declaration(decl) => {
                let args = class
                    .type_args()
                    .iter()
                    .map(|arg| type_ref_to_usage(arg, resolve))
                    .collect::<Result<Vec<_>>>()?;
                TypeUsage::Reference(ReferenceType::new(decl, args)?)
            }
        },
    })
}
