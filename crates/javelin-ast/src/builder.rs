use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::node::{
    BinaryOp, Import, Literal, LiteralKind, MethodDecl, Modifiers, Node, TypeDecl, TypeDeclKind,
    UnaryOp,
};
use crate::tree::{Ast, AstId, NodeData, NodeId};
use crate::type_ref::TypeRef;

static NEXT_AST_ID: AtomicU32 = AtomicU32::new(0);

/// Bottom-up tree construction.
///
/// Children are allocated before their parent; allocating the parent records
/// it as the parent of every child it lists.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<NodeData>,
}

impl AstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        for child in node.children() {
            let slot = &mut self.nodes[child.idx()].parent;
            debug_assert!(slot.is_none(), "{child:?} already has a parent");
            *slot = Some(id);
        }
        self.nodes.push(NodeData { node, parent: None });
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()].node
    }

    /// Freezes the tree. `root` is normally the compilation unit.
    #[must_use]
    pub fn finish(self, root: NodeId) -> Arc<Ast> {
        let id = AstId::from_raw(NEXT_AST_ID.fetch_add(1, Ordering::Relaxed));
        Arc::new(Ast {
            id,
            nodes: self.nodes,
            root,
        })
    }

    pub fn compilation_unit(
        &mut self,
        package: Option<&str>,
        imports: Vec<Import>,
        types: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(Node::CompilationUnit {
            package: package.map(str::to_string),
            imports,
            types,
        })
    }

    pub fn type_decl(
        &mut self,
        kind: TypeDeclKind,
        name: &str,
        extends: Vec<TypeRef>,
        implements: Vec<TypeRef>,
        members: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(Node::TypeDecl(TypeDecl {
            kind,
            name: name.to_string(),
            modifiers: Modifiers::PUBLIC,
            type_params: Vec::new(),
            extends,
            implements,
            members,
        }))
    }

    pub fn class(&mut self, name: &str, members: Vec<NodeId>) -> NodeId {
        self.type_decl(TypeDeclKind::Class, name, Vec::new(), Vec::new(), members)
    }

    pub fn type_param(&mut self, name: &str, bounds: Vec<TypeRef>) -> NodeId {
        self.alloc(Node::TypeParameter {
            name: name.to_string(),
            bounds,
        })
    }

    pub fn field(&mut self, modifiers: Modifiers, ty: TypeRef, name: &str) -> NodeId {
        let declarator = self.declarator(name, None);
        self.alloc(Node::Field {
            modifiers,
            ty,
            variables: vec![declarator],
        })
    }

    pub fn method(
        &mut self,
        modifiers: Modifiers,
        return_type: TypeRef,
        name: &str,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        self.alloc(Node::Method(MethodDecl {
            name: name.to_string(),
            modifiers,
            type_params: Vec::new(),
            return_type,
            params,
            throws: Vec::new(),
            body,
        }))
    }

    pub fn param(&mut self, ty: Option<TypeRef>, name: &str) -> NodeId {
        self.alloc(Node::Parameter {
            name: name.to_string(),
            ty,
            varargs: false,
        })
    }

    pub fn declarator(&mut self, name: &str, init: Option<NodeId>) -> NodeId {
        self.alloc(Node::VariableDeclarator {
            name: name.to_string(),
            array_dims: 0,
            init,
        })
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Block { statements })
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.alloc(Node::ExprStmt { expr })
    }

    pub fn return_stmt(&mut self, expr: Option<NodeId>) -> NodeId {
        self.alloc(Node::Return { expr })
    }

    /// `ty name = init;` as a statement.
    pub fn local_var(&mut self, ty: TypeRef, name: &str, init: Option<NodeId>) -> NodeId {
        let declarator = self.declarator(name, init);
        let decl = self.alloc(Node::VariableDeclaration {
            modifiers: Modifiers::NONE,
            ty,
            variables: vec![declarator],
        });
        self.expr_stmt(decl)
    }

    pub fn name(&mut self, name: &str) -> NodeId {
        self.alloc(Node::Name {
            name: name.to_string(),
        })
    }

    /// `a.b.c` as nested field accesses over a leading name.
    pub fn qualified_name(&mut self, dotted: &str) -> NodeId {
        let mut parts = dotted.split('.');
        let first = parts.next().unwrap_or_default();
        let mut current = self.name(first);
        for part in parts {
            current = self.field_access(current, part);
        }
        current
    }

    pub fn field_access(&mut self, scope: NodeId, name: &str) -> NodeId {
        self.alloc(Node::FieldAccess {
            scope,
            name: name.to_string(),
        })
    }

    pub fn call(&mut self, scope: Option<NodeId>, name: &str, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::MethodCall {
            scope,
            name: name.to_string(),
            type_args: Vec::new(),
            args,
        })
    }

    pub fn lambda(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.alloc(Node::Lambda { params, body })
    }

    pub fn literal(&mut self, kind: LiteralKind, text: &str) -> NodeId {
        self.alloc(Node::Literal(Literal {
            kind,
            text: text.to_string(),
        }))
    }

    pub fn int(&mut self, value: i32) -> NodeId {
        self.literal(LiteralKind::Int, &value.to_string())
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.literal(LiteralKind::String, &format!("{value:?}"))
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.literal(LiteralKind::Boolean, if value { "true" } else { "false" })
    }

    pub fn null(&mut self) -> NodeId {
        self.literal(LiteralKind::Null, "null")
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(Node::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(Node::Binary { op, left, right })
    }

    pub fn this(&mut self) -> NodeId {
        self.alloc(Node::This { qualifier: None })
    }

    pub fn new_object(&mut self, ty: TypeRef, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::ObjectCreation { ty, args })
    }
}
