//! Reader for compiled class metadata.
//!
//! Only what name resolution needs is decoded: the class header, member
//! names/descriptors/flags and the `Signature`, `InnerClasses` and `Exceptions`
//! attributes. Everything else is skipped.

#![forbid(unsafe_code)]

mod access;
mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;
mod signature;
mod stub;
mod writer;

pub use crate::access::*;
pub use crate::classfile::{ClassFile, ClassMember, InnerClassInfo};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, MethodSignature, SimpleClassTypeSignature, TypeArgument, TypeParameter,
    TypeSignature,
};
pub use crate::stub::{ClassStub, FieldStub, MethodStub};
pub use crate::writer::{ClassWriter, MemberSpec};
