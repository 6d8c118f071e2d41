//! Syntax tree consumed by the resolver.
//!
//! Parsing is not done here: trees are assembled with [`AstBuilder`] by whatever
//! front end produced them. Every node lives in one arena per compilation unit
//! and is addressed by a [`NodeId`]; each tree gets a process-unique [`AstId`] at
//! construction so `(AstId, NodeId)` is a stable key for caches.

#![forbid(unsafe_code)]

mod builder;
mod node;
mod tree;
mod type_ref;

pub use crate::builder::AstBuilder;
pub use crate::node::{
    AssignOp, BinaryOp, ConstructorDecl, Import, Literal, LiteralKind, MethodDecl, Modifiers,
    Node, TypeDecl, TypeDeclKind, UnaryOp,
};
pub use crate::tree::{Ast, AstId, NodeId, NodeKey, SyntaxNode};
pub use crate::type_ref::{
    ClassTypeRef, ClassTypeSegment, ParseTypeRefError, PrimitiveKind, TypeRef, WildcardRef,
};
