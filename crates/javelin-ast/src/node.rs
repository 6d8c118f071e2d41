use std::ops::BitOr;

use crate::tree::NodeId;
use crate::type_ref::TypeRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(1 << 0);
    pub const PROTECTED: Modifiers = Modifiers(1 << 1);
    pub const PRIVATE: Modifiers = Modifiers(1 << 2);
    pub const STATIC: Modifiers = Modifiers(1 << 3);
    pub const FINAL: Modifiers = Modifiers(1 << 4);
    pub const ABSTRACT: Modifiers = Modifiers(1 << 5);
    pub const DEFAULT: Modifiers = Modifiers(1 << 6);

    #[must_use]
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    #[must_use]
    pub fn is_abstract(self) -> bool {
        self.contains(Modifiers::ABSTRACT)
    }

    #[must_use]
    pub fn is_private(self) -> bool {
        self.contains(Modifiers::PRIVATE)
    }

    #[must_use]
    pub fn is_default(self) -> bool {
        self.contains(Modifiers::DEFAULT)
    }

    /// No access modifier was written.
    #[must_use]
    pub fn is_package_private(self) -> bool {
        self.0 & (Modifiers::PUBLIC.0 | Modifiers::PROTECTED.0 | Modifiers::PRIVATE.0) == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Dotted path, without the trailing `.*` of on-demand imports.
    pub path: String,
    pub on_demand: bool,
    pub is_static: bool,
}

impl Import {
    #[must_use]
    pub fn single(path: impl Into<String>) -> Self {
        Import {
            path: path.into(),
            on_demand: false,
            is_static: false,
        }
    }

    #[must_use]
    pub fn on_demand(path: impl Into<String>) -> Self {
        Import {
            path: path.into(),
            on_demand: true,
            is_static: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub name: String,
    pub modifiers: Modifiers,
    /// `TypeParameter` nodes.
    pub type_params: Vec<NodeId>,
    /// Superclass for classes, superinterfaces for interfaces.
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    /// Fields, methods, constructors, enum constants and nested types.
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_params: Vec<NodeId>,
    pub return_type: TypeRef,
    /// `Parameter` nodes.
    pub params: Vec<NodeId>,
    pub throws: Vec<TypeRef>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_params: Vec<NodeId>,
    pub params: Vec<NodeId>,
    pub throws: Vec<TypeRef>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Source text of the literal.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Not,
    Complement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equals,
    NotEquals,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    LeftShift,
    SignedRightShift,
    UnsignedRightShift,
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEquals => "<=",
            BinaryOp::GreaterEquals => ">=",
            BinaryOp::LeftShift => "<<",
            BinaryOp::SignedRightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
    BitAnd,
    BitOr,
    BitXor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    CompilationUnit {
        package: Option<String>,
        imports: Vec<Import>,
        types: Vec<NodeId>,
    },
    TypeDecl(TypeDecl),
    TypeParameter {
        name: String,
        bounds: Vec<TypeRef>,
    },
    EnumConstant {
        name: String,
        args: Vec<NodeId>,
    },
    Field {
        modifiers: Modifiers,
        ty: TypeRef,
        /// `VariableDeclarator` nodes.
        variables: Vec<NodeId>,
    },
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    /// `ty` is `None` for implicitly typed lambda parameters.
    Parameter {
        name: String,
        ty: Option<TypeRef>,
        varargs: bool,
    },
    VariableDeclarator {
        name: String,
        /// Extra `[]` written after the name (`int a[]`).
        array_dims: usize,
        init: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    ExprStmt {
        expr: NodeId,
    },
    Return {
        expr: Option<NodeId>,
    },
    Name {
        name: String,
    },
    FieldAccess {
        scope: NodeId,
        name: String,
    },
    MethodCall {
        scope: Option<NodeId>,
        name: String,
        type_args: Vec<TypeRef>,
        args: Vec<NodeId>,
    },
    /// `body` is either an expression node or a `Block`.
    Lambda {
        params: Vec<NodeId>,
        body: NodeId,
    },
    Literal(Literal),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Conditional {
        condition: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    InstanceOf {
        expr: NodeId,
        ty: TypeRef,
    },
    Cast {
        ty: TypeRef,
        expr: NodeId,
    },
    ObjectCreation {
        ty: TypeRef,
        args: Vec<NodeId>,
    },
    ArrayCreation {
        element: TypeRef,
        /// Total number of `[]` pairs, sized or not.
        dims: usize,
        sizes: Vec<NodeId>,
    },
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    ClassLiteral {
        ty: TypeRef,
    },
    /// `this`, or `Outer.this` when `qualifier` is set.
    This {
        qualifier: Option<String>,
    },
    Assign {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    Enclosed {
        inner: NodeId,
    },
    VariableDeclaration {
        modifiers: Modifiers,
        ty: TypeRef,
        variables: Vec<NodeId>,
    },
}

impl Node {
    /// Child nodes in source order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::CompilationUnit { types, .. } => types.clone(),
            Node::TypeDecl(decl) => decl
                .type_params
                .iter()
                .chain(&decl.members)
                .copied()
                .collect(),
            Node::TypeParameter { .. }
            | Node::Parameter { .. }
            | Node::Name { .. }
            | Node::Literal(_)
            | Node::ClassLiteral { .. }
            | Node::This { .. } => Vec::new(),
            Node::EnumConstant { args, .. } => args.clone(),
            Node::Field { variables, .. } | Node::VariableDeclaration { variables, .. } => {
                variables.clone()
            }
            Node::Method(method) => method
                .type_params
                .iter()
                .chain(&method.params)
                .chain(&method.body)
                .copied()
                .collect(),
            Node::Constructor(ctor) => ctor
                .type_params
                .iter()
                .chain(&ctor.params)
                .chain(&ctor.body)
                .copied()
                .collect(),
            Node::VariableDeclarator { init, .. } => init.iter().copied().collect(),
            Node::Block { statements } => statements.clone(),
            Node::ExprStmt { expr } => vec![*expr],
            Node::Return { expr } => expr.iter().copied().collect(),
            Node::FieldAccess { scope, .. } => vec![*scope],
            Node::MethodCall { scope, args, .. } => {
                scope.iter().chain(args).copied().collect()
            }
            Node::Lambda { params, body } => {
                params.iter().chain(std::iter::once(body)).copied().collect()
            }
            Node::Unary { operand, .. } => vec![*operand],
            Node::Binary { left, right, .. } => vec![*left, *right],
            Node::Conditional {
                condition,
                then_expr,
                else_expr,
            } => vec![*condition, *then_expr, *else_expr],
            Node::InstanceOf { expr, .. } | Node::Cast { expr, .. } => vec![*expr],
            Node::ObjectCreation { args, .. } => args.clone(),
            Node::ArrayCreation { sizes, .. } => sizes.clone(),
            Node::ArrayAccess { array, index } => vec![*array, *index],
            Node::Assign { target, value, .. } => vec![*target, *value],
            Node::Enclosed { inner } => vec![*inner],
        }
    }

    /// Short human-readable name of the node kind, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::CompilationUnit { .. } => "compilation unit",
            Node::TypeDecl(decl) => match decl.kind {
                TypeDeclKind::Class => "class declaration",
                TypeDeclKind::Interface => "interface declaration",
                TypeDeclKind::Enum => "enum declaration",
            },
            Node::TypeParameter { .. } => "type parameter",
            Node::EnumConstant { .. } => "enum constant",
            Node::Field { .. } => "field declaration",
            Node::Method(_) => "method declaration",
            Node::Constructor(_) => "constructor declaration",
            Node::Parameter { .. } => "parameter",
            Node::VariableDeclarator { .. } => "variable declarator",
            Node::Block { .. } => "block",
            Node::ExprStmt { .. } => "expression statement",
            Node::Return { .. } => "return statement",
            Node::Name { .. } => "name expression",
            Node::FieldAccess { .. } => "field access",
            Node::MethodCall { .. } => "method call",
            Node::Lambda { .. } => "lambda expression",
            Node::Literal(_) => "literal",
            Node::Unary { .. } => "unary expression",
            Node::Binary { .. } => "binary expression",
            Node::Conditional { .. } => "conditional expression",
            Node::InstanceOf { .. } => "instanceof expression",
            Node::Cast { .. } => "cast expression",
            Node::ObjectCreation { .. } => "object creation",
            Node::ArrayCreation { .. } => "array creation",
            Node::ArrayAccess { .. } => "array access",
            Node::ClassLiteral { .. } => "class literal",
            Node::This { .. } => "this expression",
            Node::Assign { .. } => "assignment",
            Node::Enclosed { .. } => "parenthesized expression",
            Node::VariableDeclaration { .. } => "variable declaration",
        }
    }

    /// Simple name declared by this node, if it declares one.
    #[must_use]
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Node::TypeDecl(decl) => Some(&decl.name),
            Node::Method(method) => Some(&method.name),
            Node::Constructor(ctor) => Some(&ctor.name),
            Node::TypeParameter { name, .. }
            | Node::EnumConstant { name, .. }
            | Node::Parameter { name, .. }
            | Node::VariableDeclarator { name, .. } => Some(name),
            _ => None,
        }
    }
}
