//! Symbol and type resolution for Java-like syntax trees.
//!
//! The crate answers two questions about a node of a [`javelin_ast`] tree:
//! what declaration a name or call refers to, and what type an expression
//! has. Declarations come from three backends behind one set of enums:
//! syntax trees ([`SourceTypeSolver`]), compiled class files
//! ([`BytecodeTypeSolver`]) and classes the host already describes
//! ([`ReflectionTypeSolver`]). Solvers are chained with
//! [`CombinedTypeSolver`] and queried through a [`Resolver`].
//!
//! ```no_run
//! use javelin_resolve::{CombinedTypeSolver, ReflectionTypeSolver, Resolver, SourceTypeSolver};
//! # fn demo(
//! #     unit: std::sync::Arc<javelin_ast::Ast>,
//! #     expr: javelin_ast::SyntaxNode,
//! # ) -> javelin_resolve::Result<()> {
//! let solver = CombinedTypeSolver::new()
//!     .with(SourceTypeSolver::new().with_unit(unit))
//!     .with(ReflectionTypeSolver::jdk());
//! let resolver = Resolver::new(&solver);
//! println!("{}", resolver.type_of(&expr)?.describe());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod bytecode;
mod config;
mod context;
mod convert;
mod declarations;
mod error;
mod logic;
mod model;
mod reflection;
mod resolver;
mod solver;
mod source;
mod types;

pub use crate::bytecode::{
    BytecodeConstructor, BytecodeField, BytecodeMethod, BytecodeTypeDeclaration, BytecodeTypeSolver,
};
pub use crate::config::{init_tracing, ConfigError, LoggingConfig, ResolverConfig};
pub use crate::context::Context;
pub use crate::declarations::{
    ConstructorDeclaration, FieldDeclaration, MethodDeclaration, TypeDeclaration, TypeKind,
    ValueDeclaration,
};
pub use crate::error::{ResolveError, Result};
pub use crate::logic::functional_method;
pub use crate::model::{
    ConstructorUsage, MethodUsage, ParameterDeclaration, SymbolReference, Value,
};
pub use crate::reflection::{
    jdk, DeclarationParseError, ReflectedConstructor, ReflectedField, ReflectedMethod,
    ReflectedTypeDeclaration, ReflectionTypeSolver, RuntimeClass, RuntimeField, RuntimeKind,
    RuntimeMethod, RuntimeParameter, RuntimeRegistry, RuntimeTypeParameter,
};
pub use crate::resolver::Resolver;
pub use crate::solver::{CombinedTypeSolver, TypeSolver};
pub use crate::source::{
    SourceConstructor, SourceField, SourceMethod, SourceSymbol, SourceTypeDeclaration,
    SourceTypeSolver, SourceTypeVariable,
};
pub use crate::types::{
    LambdaArgumentPlaceholder, PrimitiveType, ReferenceType, Substitution, TypeParameter,
    TypeParameterOwner, TypeUsage, Wildcard,
};
